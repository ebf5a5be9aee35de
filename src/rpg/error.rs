use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("invalid dice notation {notation:?}: {reason}")]
    InvalidNotation {
        notation: String,
        reason: &'static str,
    },
    #[error("initiative roster is empty")]
    EmptyRoster,
    #[error("no active encounter")]
    NoActiveEncounter,
}

impl TableError {
    pub(super) fn notation(notation: &str, reason: &'static str) -> Self {
        Self::InvalidNotation {
            notation: notation.to_string(),
            reason,
        }
    }
}
