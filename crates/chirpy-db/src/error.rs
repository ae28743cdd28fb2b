use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("user {requester} is not the author of chirp {message_id}")]
    Forbidden { requester: u64, message_id: u64 },

    #[error("user with email {0} already exists")]
    EmailExists(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode store document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl DbError {
    /// I/O and (de)serialisation failures, as opposed to domain outcomes.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Decode(_) | Self::Encode(_))
    }
}
