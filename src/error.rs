use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("payment not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    /// Stable error code used in HTTP error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Config(_) => "config",
            PaymentError::Auth(_) => "auth",
            PaymentError::Gateway(_) => "gateway",
            PaymentError::Validation(_) => "validation",
            PaymentError::NotFound(_) => "not_found",
            PaymentError::Io(_) => "io",
            PaymentError::Internal(_) => "internal",
        }
    }
}
