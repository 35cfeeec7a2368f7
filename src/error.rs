use thiserror::Error;

/// Inline validation failures. These are caught before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Account number must be numeric")]
    NonNumericAccount,
    #[error("IFSC code must be 4 letters followed by 7 letters or digits")]
    RoutingCodeShape,
    #[error("UPI ID must not start with '-'")]
    NegativeHandle,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    Validation(#[from] FieldError),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16, body: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    /// Message safe to show to the user. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Validation(field) => field.to_string(),
            PaymentError::Transport(_) | PaymentError::Status { .. } => {
                "Something went wrong while contacting the payment service. Please try again."
                    .to_string()
            }
            PaymentError::Config(msg) => msg.clone(),
            PaymentError::Csv(_) | PaymentError::Io(_) | PaymentError::Internal(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PaymentError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
