//! Domain error types.

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// An operand needs bars before the start of the series.
///
/// Consumed locally during rule evaluation: the enclosing comparison is
/// `false` for that bar. Never surfaced past the signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("insufficient history")]
pub struct InsufficientHistory;

/// Top-level error type for rulebt.
#[derive(Debug, thiserror::Error)]
pub enum RulebtError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RulebtError> for std::process::ExitCode {
    fn from(err: &RulebtError) -> Self {
        let code: u8 = match err {
            RulebtError::Io(_) => 1,
            RulebtError::ConfigParse { .. }
            | RulebtError::ConfigMissing { .. }
            | RulebtError::ConfigInvalid { .. } => 2,
            RulebtError::Data { .. } => 3,
            RulebtError::RuleParse(_) => 4,
            RulebtError::InvalidInput { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
