//! Solve for the uniform extra payment that retires a loan by a target month
//!
//! Uses bisection on the final balance of a simulated payoff. The simulation
//! follows the engine's balance-update rule but keeps a signed ledger: once the
//! balance would cross zero the overshoot is carried as a negative balance.
//! That makes the final balance linear and strictly decreasing in the extra
//! payment whenever at least one scheduled month falls inside the horizon.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationState, PrepaymentMap, BALANCE_EPSILON};
use crate::error::{MortgageError, Result};
use crate::loan::LoanTerms;

/// Acceptable final balance (currency units)
pub const DEFAULT_TOLERANCE: f64 = 1e-2;

/// Extra halvings allowed beyond `log2(principal / tolerance)`
const ITERATION_HEADROOM: u32 = 32;

/// Hard ceiling on the derived iteration cap
pub const MAX_ITERATIONS_CEILING: u32 = 256;

/// Bisection settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// A solution is accepted when `-tolerance < final_balance <= 0`
    pub tolerance: f64,

    /// Override the derived iteration cap
    pub max_iterations: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
        }
    }
}

impl SolverConfig {
    /// Iterations allowed for a search over `[0, principal]`
    pub fn iteration_cap(&self, principal: f64) -> u32 {
        self.max_iterations.unwrap_or_else(|| {
            let bits = (principal / self.tolerance).log2().ceil().max(1.0) as u32;
            (bits + ITERATION_HEADROOM).min(MAX_ITERATIONS_CEILING)
        })
    }

    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MortgageError::invalid("tolerance", "must be a positive amount"));
        }
        Ok(())
    }
}

/// How closely the returned extra payment meets the tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolvePrecision {
    /// Final balance within tolerance
    Converged,
    /// Iteration cap reached; the smallest candidate known to pay the loan off is returned
    Approximate { final_balance: f64 },
}

/// Result of a solve: the extra payment and the prepayment map that realizes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentPlan {
    pub extra_payment: f64,
    pub target_months: u32,
    pub start_month: u32,
    pub frequency_months: u32,

    /// One entry of `extra_payment` per scheduled month up to `target_months`
    pub schedule: PrepaymentMap,

    pub iterations: u32,
    pub precision: SolvePrecision,
}

impl PrepaymentPlan {
    pub fn is_approximate(&self) -> bool {
        matches!(self.precision, SolvePrecision::Approximate { .. })
    }

    pub fn into_parts(self) -> (f64, PrepaymentMap) {
        (self.extra_payment, self.schedule)
    }
}

/// Prepayment solver for one set of loan terms
#[derive(Debug, Clone)]
pub struct PrepaymentSolver {
    principal: f64,
    monthly_rate: f64,
    total_periods: u32,
    base_payment: f64,
    config: SolverConfig,
}

impl PrepaymentSolver {
    pub fn new(loan: LoanTerms) -> Result<Self> {
        loan.validate()?;
        Ok(Self {
            principal: loan.principal(),
            monthly_rate: loan.monthly_rate(),
            total_periods: loan.total_periods(),
            base_payment: loan.base_payment(),
            config: SolverConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Find the extra payment, made every `frequency_months` from `start_month`,
    /// that pays the loan off by `target_months`
    pub fn solve(
        &self,
        target_months: u32,
        start_month: u32,
        frequency_months: u32,
    ) -> Result<PrepaymentPlan> {
        self.config.validate()?;
        if frequency_months == 0 {
            return Err(MortgageError::invalid("frequency_months", "must be at least one month"));
        }
        if start_month == 0 {
            return Err(MortgageError::invalid("start_month", "periods are numbered from 1"));
        }

        if target_months == 0 {
            return Ok(PrepaymentPlan {
                extra_payment: 0.0,
                target_months,
                start_month,
                frequency_months,
                schedule: PrepaymentMap::new(),
                iterations: 0,
                precision: SolvePrecision::Converged,
            });
        }

        let simulate =
            |extra: f64| self.simulate_final_balance(extra, target_months, start_month, frequency_months);
        let tolerance = self.config.tolerance;

        // Regular payments alone already finish by the target
        if simulate(0.0) < BALANCE_EPSILON {
            debug!("No prepayment needed to pay off by month {}", target_months);
            return self.plan(0.0, target_months, start_month, frequency_months, 0, SolvePrecision::Converged);
        }

        let at_max = simulate(self.principal);
        if at_max >= BALANCE_EPSILON {
            let best_payoff_month = self.payoff_month_with(self.principal, start_month, frequency_months);
            return Err(MortgageError::UnsatisfiableTarget {
                target_months,
                best_payoff_month,
            });
        }

        let cap = self.config.iteration_cap(self.principal);
        let mut low = 0.0_f64;
        let mut high = self.principal;
        let mut high_balance = at_max;
        let mut iterations = 0;

        while iterations < cap {
            let mid = 0.5 * (low + high);
            if mid <= low || mid >= high {
                break;
            }
            iterations += 1;

            let final_balance = simulate(mid);
            trace!(
                "iteration {}: extra={:.6} final_balance={:.6}",
                iterations, mid, final_balance
            );

            if final_balance > 0.0 {
                low = mid;
            } else {
                high = mid;
                high_balance = final_balance;
                if final_balance > -tolerance {
                    info!(
                        "Extra payment {:.2} every {} month(s) from month {} pays off by month {} ({} iterations)",
                        mid, frequency_months, start_month, target_months, iterations
                    );
                    return self.plan(
                        mid,
                        target_months,
                        start_month,
                        frequency_months,
                        iterations,
                        SolvePrecision::Converged,
                    );
                }
            }
        }

        warn!(
            "Bisection stopped after {} iterations without meeting tolerance {}; using extra payment {:.6} (final balance {:.6})",
            iterations, tolerance, high, high_balance
        );
        self.plan(
            high,
            target_months,
            start_month,
            frequency_months,
            iterations,
            SolvePrecision::Approximate {
                final_balance: high_balance,
            },
        )
    }

    /// Balance after `target_months` with `extra` paid at every scheduled month
    ///
    /// Negative results measure overpayment; see the module docs.
    pub fn simulate_final_balance(
        &self,
        extra: f64,
        target_months: u32,
        start_month: u32,
        frequency_months: u32,
    ) -> f64 {
        let mut balance = self.principal;
        for month in 1..=target_months {
            if is_scheduled(month, start_month, frequency_months) {
                balance -= extra;
            }
            let interest = balance * self.monthly_rate;
            balance -= self.base_payment - interest;
        }
        balance
    }

    /// First month the balance reaches zero under the engine's clamped rule
    fn payoff_month_with(&self, extra: f64, start_month: u32, frequency_months: u32) -> u32 {
        let mut state = AmortizationState::new(self.principal, self.base_payment);
        for month in 1..=self.total_periods {
            let requested = if is_scheduled(month, start_month, frequency_months) {
                extra
            } else {
                0.0
            };
            state.advance(requested, self.monthly_rate);
            if state.is_paid_off() {
                return month;
            }
        }
        self.total_periods
    }

    fn plan(
        &self,
        extra_payment: f64,
        target_months: u32,
        start_month: u32,
        frequency_months: u32,
        iterations: u32,
        precision: SolvePrecision,
    ) -> Result<PrepaymentPlan> {
        let intervals = if target_months >= start_month {
            (target_months - start_month) / frequency_months + 1
        } else {
            0
        };
        let schedule = PrepaymentMap::recurring(start_month, frequency_months, intervals, extra_payment)?;

        Ok(PrepaymentPlan {
            extra_payment,
            target_months,
            start_month,
            frequency_months,
            schedule,
            iterations,
            precision,
        })
    }
}

fn is_scheduled(month: u32, start_month: u32, frequency_months: u32) -> bool {
    month >= start_month && (month - start_month) % frequency_months == 0
}

/// Validate the loan terms and solve with the default configuration
pub fn solve_extra_payment(
    loan: &LoanTerms,
    target_months: u32,
    start_month: u32,
    frequency_months: u32,
) -> Result<PrepaymentPlan> {
    PrepaymentSolver::new(*loan)?.solve(target_months, start_month, frequency_months)
}
