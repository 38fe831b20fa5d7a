use thiserror::Error;

#[derive(Debug, Error)]
pub enum TdvqError {
    /// The API was driven out of order, e.g. connecting an already-used connection.
    #[error("usage: {message}")]
    Usage { message: String },

    #[error("config: {message}")]
    Configuration { message: String },

    #[error("connection: {message}")]
    Connection { message: String },

    #[error("driver: {message}")]
    Driver { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {message}")]
    Format { message: String },
}

impl TdvqError {
    /// The message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            TdvqError::Usage { message }
            | TdvqError::Configuration { message }
            | TdvqError::Connection { message }
            | TdvqError::Driver { message }
            | TdvqError::Format { message } => message.clone(),
            TdvqError::Io(e) => e.to_string(),
        }
    }
}
