//! Amortization engine for single loan schedules

mod state;
mod engine;
mod schedule;
mod prepayment;

pub use state::{AmortizationState, BALANCE_EPSILON};
pub use engine::{generate_schedule, AmortizationEngine, ScheduleIter};
pub use schedule::{AmortizationEntry, PrepaymentSavings, Schedule, ScheduleSummary};
pub use prepayment::PrepaymentMap;
