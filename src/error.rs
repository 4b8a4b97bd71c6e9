use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Unknown letter '{0}'")]
    UnknownLetter(String),

    #[error("Background Evaluator Error: {0}")]
    Worker(String),
}

pub type TraceResult<T> = Result<T, TraceError>;
