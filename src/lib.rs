//! Mortgage Planner - amortization schedules and prepayment planning for fixed-rate loans
//!
//! This library provides:
//! - Month-by-month amortization schedules under arbitrary prepayment maps
//! - A bisection solver for the recurring extra payment that meets a payoff horizon
//! - Batch solving of many horizons
//! - JSON persistence of loan details and CSV export of results

pub mod error;
pub mod loan;
pub mod amortization;
pub mod solver;
pub mod report;

// Re-export commonly used types
pub use error::{MortgageError, Result};
pub use loan::{DownPayment, LoanTerms};
pub use amortization::{generate_schedule, AmortizationEngine, AmortizationEntry, PrepaymentMap, Schedule};
pub use solver::{solve_extra_payment, PlanRunner, PrepaymentPlan, PrepaymentSolver, SolverConfig};
