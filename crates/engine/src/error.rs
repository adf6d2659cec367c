use std::fmt;

/// Errors from reading an authored rule set.
///
/// Evaluation itself has no error type: malformed references and missing
/// sheets contribute zero instead.
#[derive(Debug)]
pub enum RuleSetError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Structurally valid TOML that does not describe a usable rule set.
    Validation(String),
    /// A rule is missing the field its kind requires.
    MissingField { rule: usize, kind: String, field: &'static str },
}

impl fmt::Display for RuleSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "rule set parse error: {msg}"),
            Self::Validation(msg) => write!(f, "rule set validation error: {msg}"),
            Self::MissingField { rule, kind, field } => {
                write!(f, "rule {rule}: kind '{kind}' requires '{field}'")
            }
        }
    }
}

impl std::error::Error for RuleSetError {}
