//! Prepayment solver: extra payment needed to reach a payoff horizon

mod bisection;
mod runner;

pub use bisection::{
    solve_extra_payment, PrepaymentPlan, PrepaymentSolver, SolvePrecision, SolverConfig,
    DEFAULT_TOLERANCE, MAX_ITERATIONS_CEILING,
};
pub use runner::{HorizonPlan, PlanRunner};
