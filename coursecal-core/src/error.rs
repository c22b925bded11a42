use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date/time parsing failed: {0}")]
    DateTime(#[from] chrono::ParseError),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("ICS generation failed: {0}")]
    IcsGeneration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
