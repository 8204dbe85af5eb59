use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed line [{0}] in CIP file")]
    MalformedLine(String),

    #[error("Unterminated quoted string in: {0}")]
    UnterminatedQuote(String),

    #[error("Unbalanced enclosure: {0}")]
    UnbalancedEnclosure(String),

    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CipError {
    /// Whether this error means the input text itself was malformed.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CipError::MalformedLine(_)
                | CipError::UnterminatedQuote(_)
                | CipError::UnbalancedEnclosure(_)
                | CipError::InvalidNumber { .. }
                | CipError::Grammar(_)
        )
    }

    pub(crate) fn invalid_number(field: &str, value: &str) -> Self {
        CipError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CipError>;
