use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid Condition Pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Format Error: {0}")]
    Format(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("External Tool Failure: {0}")]
    Tool(String),
}

pub type WfResult<T> = Result<T, WordForgeError>;
