//! # Expression Module
//!
//! Arithmetic evaluator used by the calculator. User input is tokenized and
//! parsed by a recursive-descent parser into a closed syntax tree ([`Expr`])
//! that can only hold numeric literals, the binary operators
//! `+ - * / % **` and unary negation. Anything else fails to parse, so
//! nothing is evaluated unless the whole input is a valid arithmetic
//! expression.
//!
//! Precedence follows the usual calculator conventions:
//!
//! - `**` binds tightest and is right-associative (`2 ** 3 ** 2 == 512`)
//! - unary `-` binds looser than `**` on its right (`-2 ** 2 == -4`)
//! - `* / %` bind tighter than `+ -`

use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Longest input accepted by [`parse`], in characters
pub const MAX_EXPRESSION_LEN: usize = 256;

/// Deepest nesting of parentheses, negations and powers accepted by [`parse`]
pub const MAX_NESTING_DEPTH: usize = 64;

/// Errors produced while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The input is not an arithmetic expression over the supported operators
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    /// Division or modulo by zero, or zero raised to a negative power
    #[error("division by zero")]
    DivisionByZero,
    /// The result is infinite or not a number
    #[error("result is out of range")]
    OutOfRange,
}

impl EvalError {
    fn invalid(reason: impl Into<String>) -> Self {
        EvalError::InvalidExpression(reason.into())
    }
}

/// Binary operators allowed in an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(lhs / rhs)
            }
            BinaryOp::Mod => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                // The remainder takes the sign of the divisor
                let rem = lhs % rhs;
                if rem != 0.0 && (rem < 0.0) != (rhs < 0.0) {
                    Ok(rem + rhs)
                } else {
                    Ok(rem)
                }
            }
            BinaryOp::Pow => {
                if lhs == 0.0 && rhs < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(lhs.powf(rhs))
            }
        }
    }
}

/// Unary operators allowed in an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// Parsed arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate the tree
    ///
    /// Every intermediate value must stay finite, otherwise evaluation stops
    /// with [`EvalError::OutOfRange`].
    pub fn eval(&self) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Literal(value) => *value,
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => -operand.eval()?,
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                op.apply(lhs, rhs)?
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::OutOfRange)
        }
    }

    /// Numeric literals of the expression in source order
    pub fn literals(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals(&self, out: &mut Vec<f64>) {
        match self {
            Expr::Literal(value) => out.push(*value),
            Expr::Unary { operand, .. } => operand.collect_literals(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_literals(out);
                rhs.collect_literals(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", format_number(*value)),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "(-{operand})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::DoubleStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    return Err(EvalError::invalid("operator '//' is not supported"));
                }
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, next) = lex_number(&chars, i)?;
                tokens.push(Token::Number(value));
                i = next;
            }
            other => {
                return Err(EvalError::invalid(format!(
                    "unexpected character '{other}' at position {i}"
                )));
            }
        }
    }

    Ok(tokens)
}

/// Lex a decimal literal starting at `start`, returning its value and the
/// index just past it
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), EvalError> {
    let mut i = start;
    let mut digits = 0;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return Err(EvalError::invalid(format!("malformed number at position {start}")));
    }

    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        let exponent_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j == exponent_start {
            return Err(EvalError::invalid(format!("malformed exponent at position {i}")));
        }
        i = j;
    }

    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|e| EvalError::invalid(format!("malformed number '{text}': {e}")))?;

    Ok((value, i))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(EvalError::invalid("expression is nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let operand = self.parse_unary()?;
                self.ascend();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            Some(Token::Plus) => Err(EvalError::invalid("unary '+' is not supported")),
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if self.peek() != Some(Token::DoubleStar) {
            return Ok(base);
        }
        self.pos += 1;
        self.descend()?;
        let exponent = self.parse_unary()?;
        self.ascend();
        Ok(Expr::binary(BinaryOp::Pow, base, exponent))
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Literal(value)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_expr()?;
                self.ascend();
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(EvalError::invalid("missing closing parenthesis")),
                }
            }
            Some(token) => Err(EvalError::invalid(format!(
                "unexpected token {token:?} at position {}",
                self.pos - 1
            ))),
            None => Err(EvalError::invalid("unexpected end of expression")),
        }
    }
}

/// Parse `input` into an expression tree
///
/// Fails with [`EvalError::InvalidExpression`] unless the whole input
/// matches the arithmetic grammar.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    if input.chars().count() > MAX_EXPRESSION_LEN {
        return Err(EvalError::invalid(format!(
            "expression is longer than {MAX_EXPRESSION_LEN} characters"
        )));
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::invalid("expression is empty"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    if let Some(token) = parser.peek() {
        return Err(EvalError::invalid(format!(
            "unexpected token {token:?} at position {}",
            parser.pos
        )));
    }

    trace!(expression = %expr, "Parsed expression");
    Ok(expr)
}

/// Parse and evaluate `input`
///
/// # Examples
///
/// ```rust
/// use calc_bot::expression::{evaluate, EvalError};
///
/// assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
/// assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
/// ```
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    parse(input)?.eval()
}

/// Render a result for display in chat
///
/// Whole numbers print without a fractional part, very large or very small
/// magnitudes use exponent notation. The output always parses back to the
/// same value.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e15).contains(&magnitude) {
        format!("{value:e}")
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("2 ** 3 - 1"), Ok(7.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(3.0));
    }

    #[test]
    fn test_power_associativity() {
        assert_eq!(evaluate("2 ** 3 ** 2"), Ok(512.0));
        assert_eq!(evaluate("-2 ** 2"), Ok(-4.0));
        assert_eq!(evaluate("2 ** -1"), Ok(0.5));
    }

    #[test]
    fn test_modulo_sign_follows_divisor() {
        assert_eq!(evaluate("7 % 3"), Ok(1.0));
        assert_eq!(evaluate("-7 % 3"), Ok(2.0));
        assert_eq!(evaluate("7 % -3"), Ok(-2.0));
    }

    #[test]
    fn test_literals_in_source_order() {
        let expr = parse("3 * (1 + -2) ** 4").unwrap();
        assert_eq!(expr.literals(), vec![3.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(70), ")".repeat(70));
        assert!(matches!(parse(&deep), Err(EvalError::InvalidExpression(_))));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow), Ok(1.0));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1e20), "1e20");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
    }
}
