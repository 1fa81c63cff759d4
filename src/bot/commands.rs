//! Command parsing for inbound text messages

/// A slash command sent by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/calc` with the expression that followed it, if any
    Calc(Option<String>),
    History,
    /// `/pay` and its alias `/payment`
    Pay,
    Tariffs,
    Unknown(String),
}

impl Command {
    /// Parse a message text as a command
    ///
    /// Returns `None` for anything that is not a slash command. A
    /// `@botname` suffix on the command word is ignored.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;

        let (word, args) = match body.find(char::is_whitespace) {
            Some(idx) => (&body[..idx], body[idx..].trim()),
            None => (body, ""),
        };
        let name = word.split('@').next().unwrap_or(word);

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "calc" if args.is_empty() => Command::Calc(None),
            "calc" => Command::Calc(Some(args.to_string())),
            "history" => Command::History,
            "pay" | "payment" => Command::Pay,
            "tariffs" => Command::Tariffs,
            _ => Command::Unknown(format!("/{name}")),
        };

        Some(command)
    }
}
