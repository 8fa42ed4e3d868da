use thiserror::Error;

#[derive(Debug, Error)]
pub enum PillfeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog API returned HTTP {status}")]
    Api { status: u16 },

    #[error("Could not read source file {path}: {reason}")]
    SourceRead { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PillfeedError>;
