use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store error: {message}")]
    StoreError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Storage,
}

impl StockError {
    pub fn validation(field: &str, value: &str, reason: impl Into<String>) -> Self {
        StockError::ValidationError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StockError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StockError::ValidationError { .. }
            | StockError::NotFound { .. }
            | StockError::CsvError(_) => ErrorCategory::Input,
            StockError::ConfigError { .. } => ErrorCategory::Configuration,
            StockError::IoError(_)
            | StockError::SerializationError(_)
            | StockError::StoreError { .. } => ErrorCategory::Storage,
        }
    }

    /// 給使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            StockError::ValidationError { field, value, .. } => {
                format!("'{}' is not a valid value for {}", value, field)
            }
            StockError::NotFound { entity, id } => format!("{} {} does not exist", entity, id),
            StockError::ConfigError { message } => format!("Configuration problem: {}", message),
            StockError::CsvError(_) => "The CSV file could not be read".to_string(),
            _ => "Stock data could not be read or saved".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StockError>;
