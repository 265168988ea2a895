use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History entry is missing {0}")]
    IncompleteEntry(&'static str),

    #[error("Invalid share link: {0}")]
    InvalidShareLink(String),

    #[error("History serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

impl From<serde_json::Error> for HistoryError {
    fn from(error: serde_json::Error) -> Self {
        HistoryError::Serialization(error.to_string())
    }
}
