use thiserror::Error;

/// Errors from the hosted store client
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid store base URL")]
    InvalidBaseUrl,

    #[error("Invalid column name: {0}")]
    InvalidColumnName(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}
