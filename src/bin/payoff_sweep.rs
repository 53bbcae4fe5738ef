//! Solve the required extra payment for a range of payoff horizons
//!
//! Loads the saved loan details and solves one plan per whole year between
//! SWEEP_MIN_YEARS and SWEEP_MAX_YEARS in parallel.
//! Supports JSON output via --json flag (CSV on stdout otherwise)
//! Accepts config via environment variables:
//!   MORTGAGE_DETAILS_PATH, SWEEP_START_MONTH, SWEEP_FREQUENCY_MONTHS,
//!   SWEEP_MIN_YEARS, SWEEP_MAX_YEARS

use std::env;
use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use mortgage_planner::loan::{self, loader};
use mortgage_planner::report;
use mortgage_planner::solver::HorizonPlan;
use mortgage_planner::{LoanTerms, MortgageError, PlanRunner};

#[derive(Serialize)]
struct SweepResponse {
    loan: LoanTerms,
    base_payment: f64,
    baseline_interest: f64,
    start_month: u32,
    frequency_months: u32,
    plans: Vec<HorizonPlan>,
    unreachable_targets: Vec<u32>,
    execution_time_ms: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    env_logger::init();

    let json_output = env::args().any(|arg| arg == "--json");
    let start = Instant::now();

    let path = loader::default_loan_details_path();
    let terms = loan::load_loan_terms(&path)
        .with_context(|| format!("Failed to load loan details from {}", path))?;

    let start_month: u32 = env_or("SWEEP_START_MONTH", 1);
    let frequency_months: u32 = env_or("SWEEP_FREQUENCY_MONTHS", 12);
    let min_years: u32 = env_or("SWEEP_MIN_YEARS", 5).max(1);
    let max_years: u32 = env_or("SWEEP_MAX_YEARS", terms.term_years).min(terms.term_years);

    let runner = PlanRunner::new(terms)?;
    let targets: Vec<u32> = (min_years..=max_years).map(|years| years * 12).collect();

    let mut plans = Vec::with_capacity(targets.len());
    let mut unreachable_targets = Vec::new();
    for (target, result) in runner.run_horizons(&targets, start_month, frequency_months) {
        match result {
            Ok(plan) => plans.push(plan),
            Err(e @ MortgageError::UnsatisfiableTarget { .. }) => {
                warn!("Target month {}: {}", target, e);
                unreachable_targets.push(target);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to solve target month {}", target))
            }
        }
    }

    if json_output {
        let response = SweepResponse {
            loan: terms,
            base_payment: terms.base_payment(),
            baseline_interest: runner.baseline().total_interest(),
            start_month,
            frequency_months,
            plans,
            unreachable_targets,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        report::write_sweep_csv(io::stdout().lock(), &plans)?;
        eprintln!(
            "Solved {} horizons ({} unreachable) in {:?}",
            plans.len(),
            unreachable_targets.len(),
            start.elapsed()
        );
    }

    Ok(())
}
