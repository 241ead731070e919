use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(
        "Missing required columns: {} (the file must contain: {})",
        .missing.join(", "),
        .required.join(", ")
    )]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error("File is empty or has no header row")]
    EmptyFile,

    #[error("Unsupported input format: {0} (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("Unparseable date {value:?} on line {line}")]
    UnparseableDate { line: usize, value: String },
}
