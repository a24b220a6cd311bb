use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("Invalid event at line {line}: {message}")]
    Validation { line: u64, message: String },

    #[error("Report error: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, Error>;
