use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No connection to the database.")]
    NotConnected,

    #[error("No begin snapshot available, create begin and end snapshots first.")]
    MissingBeginSnapshot,

    #[error("No end snapshot available, create an end snapshot first.")]
    MissingEndSnapshot,

    #[error("Database operation failed: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfig(String),
}

impl SessionError {
    /// Wraps a driver or server failure without interpreting it.
    pub fn database(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        SessionError::Database(err.into())
    }
}
