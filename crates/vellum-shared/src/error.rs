use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid role: {0}")]
    UnknownRole(String),

    #[error("Invalid status: {0}")]
    UnknownStatus(String),

    #[error("Unknown comment type: {0}")]
    UnknownCommentType(String),
}
