use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

impl ChatterError {
    /// Short error code string used in structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            ChatterError::Config(_) => "CONFIG_ERROR",
            ChatterError::Io(_) => "IO_ERROR",
            ChatterError::InvalidAddress(_) => "INVALID_ADDRESS",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatterError>;
