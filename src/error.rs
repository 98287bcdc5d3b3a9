use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected at ingress before anything was stored.
    Validation,
    NotFound,
    Range,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Symbol must not be empty")]
    EmptySymbol,
    #[error("Symbol length must not exceed {max} characters")]
    SymbolTooLong { max: usize },
    #[error("Symbols limit reached ({max})")]
    SymbolLimitExceeded { max: usize },
    #[error("The list of trading values must contain at least 1 item")]
    BatchEmpty,
    #[error("The list should have at most {max} items, not {actual}")]
    BatchTooLarge { max: usize, actual: usize },
    #[error("Value at index {index} is not a valid number")]
    NonNumericValue { index: usize },
    #[error("Value at index {index} must not be negative, got {value}")]
    NegativeValue { index: usize, value: f64 },
    #[error("Value at index {index} must be finite")]
    NonFiniteValue { index: usize },
    #[error("Symbol {0} not found")]
    SymbolNotFound(String),
    #[error("Invalid k input. Only values {min}-{max} are accepted, got {k}")]
    ExponentOutOfRange { k: i64, min: u32, max: u32 },
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::SymbolNotFound(_) => ErrorCategory::NotFound,
            ServiceError::ExponentOutOfRange { .. } => ErrorCategory::Range,
            _ => ErrorCategory::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
