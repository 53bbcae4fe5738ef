//! Loan terms and their persistence

mod terms;
pub mod loader;

pub use terms::{annuity_payment, DownPayment, LoanTerms, STANDARD_TERMS_YEARS};
pub use loader::{load_loan_terms, load_prepayments, save_loan_terms, save_prepayments};
