use crate::api;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Cannot reach the notes service: {0}")]
    Network(String),

    #[error("Notes service answered with HTTP status {0}")]
    Status(u16),

    #[error("Stored data is not valid JSON: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Both title and text required: title is empty")]
    EmptyTitle,

    #[error("Both title and text required: text is empty")]
    EmptyText,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("Cannot reach the notes service: {0}")]
    Network(String),

    #[error("Notes service refused the entry: {0}")]
    Rejected(#[from] api::Error),

    #[error("Notes service acknowledgement is not valid JSON: {0}")]
    Decode(String),
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
