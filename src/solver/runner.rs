//! Batch runner for solving many payoff horizons
//!
//! Builds the engine, the solver and the plain baseline schedule once, then
//! solves each target horizon in parallel and replays the resulting plan
//! through the engine.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bisection::{PrepaymentSolver, SolverConfig};
use crate::amortization::{AmortizationEngine, PrepaymentMap, Schedule};
use crate::error::Result;
use crate::loan::LoanTerms;

/// Outcome of one solved horizon, flattened for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPlan {
    pub target_months: u32,
    pub extra_payment: f64,
    pub prepayment_count: usize,
    pub payoff_month: u32,
    pub total_extra: f64,
    pub total_interest: f64,
    pub interest_saved: f64,
    pub months_saved: i64,
    pub approximate: bool,
}

/// Pre-built runner for one loan
#[derive(Debug, Clone)]
pub struct PlanRunner {
    engine: AmortizationEngine,
    solver: PrepaymentSolver,
    baseline: Schedule,
}

impl PlanRunner {
    pub fn new(loan: LoanTerms) -> Result<Self> {
        let engine = AmortizationEngine::new(loan)?;
        let solver = PrepaymentSolver::new(loan)?;
        let baseline = engine.generate_schedule(&PrepaymentMap::new());
        Ok(Self {
            engine,
            solver,
            baseline,
        })
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver = self.solver.with_config(config);
        self
    }

    /// Schedule without prepayments
    pub fn baseline(&self) -> &Schedule {
        &self.baseline
    }

    /// Solve one horizon and replay the plan through the engine
    pub fn run(&self, target_months: u32, start_month: u32, frequency_months: u32) -> Result<HorizonPlan> {
        let plan = self.solver.solve(target_months, start_month, frequency_months)?;
        let schedule = self.engine.generate_schedule(&plan.schedule);
        let summary = schedule.summary();
        let savings = schedule.savings_against(&self.baseline);

        Ok(HorizonPlan {
            target_months,
            extra_payment: plan.extra_payment,
            prepayment_count: plan.schedule.len(),
            payoff_month: summary.payoff_month,
            total_extra: summary.total_extra,
            total_interest: summary.total_interest,
            interest_saved: savings.interest_saved,
            months_saved: savings.months_saved,
            approximate: plan.is_approximate(),
        })
    }

    /// Solve many horizons in parallel, preserving input order
    pub fn run_horizons(
        &self,
        targets: &[u32],
        start_month: u32,
        frequency_months: u32,
    ) -> Vec<(u32, Result<HorizonPlan>)> {
        targets
            .par_iter()
            .map(|&target| (target, self.run(target, start_month, frequency_months)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MortgageError;

    fn reference_loan() -> LoanTerms {
        LoanTerms::new(500_000.0, 100_000.0, 30, 6.375).unwrap()
    }

    #[test]
    fn test_run_single_horizon() {
        let runner = PlanRunner::new(reference_loan()).unwrap();
        assert_eq!(runner.baseline().len(), 360);

        let result = runner.run(180, 1, 12).unwrap();
        assert!(result.payoff_month <= 180);
        assert_eq!(result.prepayment_count, 15);
        assert!(result.interest_saved > 0.0);
        assert!(result.months_saved >= 180);
        assert!(!result.approximate);
    }

    #[test]
    fn test_shorter_horizons_need_larger_payments() {
        let runner = PlanRunner::new(reference_loan()).unwrap();
        let targets = [60, 120, 180, 240];
        let results = runner.run_horizons(&targets, 1, 12);

        assert_eq!(results.len(), 4);
        let extras: Vec<f64> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().extra_payment)
            .collect();
        for pair in extras.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        for ((target, _), expected) in results.iter().zip(targets) {
            assert_eq!(*target, expected);
        }
    }

    #[test]
    fn test_unreachable_horizon_reported_per_target() {
        let runner = PlanRunner::new(reference_loan()).unwrap();
        let results = runner.run_horizons(&[12, 120], 24, 12);

        assert!(matches!(
            results[0].1,
            Err(MortgageError::UnsatisfiableTarget { target_months: 12, .. })
        ));
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_bad_recurrence_is_a_configuration_error() {
        let runner = PlanRunner::new(reference_loan()).unwrap();

        // Frequency 0 is not an unreachable horizon
        let results = runner.run_horizons(&[120, 240], 1, 0);
        for (_, result) in &results {
            match result {
                Err(MortgageError::InvalidInput { field, .. }) => assert_eq!(*field, "frequency_months"),
                other => panic!("expected InvalidInput, got {:?}", other),
            }
        }

        assert!(matches!(
            runner.run(120, 0, 12),
            Err(MortgageError::InvalidInput { .. })
        ));
    }
}
