//! Error types shared by the engine, the solver and the persistence layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    /// Loan terms or schedule parameters that make the calculation meaningless
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// No uniform extra payment pays the loan off by the requested month
    #[error(
        "Target payoff at month {target_months} is unreachable; best achievable payoff is month {best_payoff_month}"
    )]
    UnsatisfiableTarget {
        target_months: u32,
        best_payoff_month: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MortgageError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MortgageError>;
