//! Calculator dialogue module for handling conversation state with users.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::expression::{parse, EvalError};

/// Represents the conversation state of the calculator dialogue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingExpression,
}

/// Type alias for our calculator dialogue
pub type CalcDialogue = Dialogue<ConversationState, InMemStorage<ConversationState>>;

/// A successfully evaluated calculator input
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// Numeric literals of the input in the order they were typed
    pub numbers: Vec<f64>,
    pub result: f64,
}

/// Evaluates a calculator input received from a user
pub fn calculate(input: &str) -> Result<Calculation, EvalError> {
    let expr = parse(input.trim())?;
    let result = expr.eval()?;

    Ok(Calculation {
        numbers: expr.literals(),
        result,
    })
}
