//! Core amortization engine for monthly schedules under a prepayment map

use log::debug;

use super::prepayment::PrepaymentMap;
use super::schedule::{AmortizationEntry, Schedule};
use super::state::AmortizationState;
use crate::error::Result;
use crate::loan::LoanTerms;

/// Amortization engine for one set of loan terms
///
/// Holds only values derived from the terms; every schedule run gets its
/// own `AmortizationState`, so repeated runs are identical.
#[derive(Debug, Clone)]
pub struct AmortizationEngine {
    loan: LoanTerms,
    principal: f64,
    monthly_rate: f64,
    total_periods: u32,
    base_payment: f64,
}

impl AmortizationEngine {
    /// Create an engine, rejecting invalid loan terms
    pub fn new(loan: LoanTerms) -> Result<Self> {
        loan.validate()?;
        Ok(Self {
            loan,
            principal: loan.principal(),
            monthly_rate: loan.monthly_rate(),
            total_periods: loan.total_periods(),
            base_payment: loan.base_payment(),
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    pub fn total_periods(&self) -> u32 {
        self.total_periods
    }

    /// Standard monthly payment without prepayments
    pub fn base_payment(&self) -> f64 {
        self.base_payment
    }

    /// Lazily produce schedule entries; calling again restarts from period 1
    pub fn iter<'a>(&'a self, prepayments: &'a PrepaymentMap) -> ScheduleIter<'a> {
        ScheduleIter {
            engine: self,
            prepayments,
            state: AmortizationState::new(self.principal, self.base_payment),
        }
    }

    /// Run the full schedule
    pub fn generate_schedule(&self, prepayments: &PrepaymentMap) -> Schedule {
        let entries: Vec<AmortizationEntry> = self.iter(prepayments).collect();

        debug!(
            "Generated schedule: {} of {} periods, {} prepayments scheduled",
            entries.len(),
            self.total_periods,
            prepayments.len()
        );

        Schedule {
            principal: self.principal,
            home_value: self.loan.home_value,
            base_payment: self.base_payment,
            entries,
        }
    }
}

/// Iterator over the periods of one schedule run
pub struct ScheduleIter<'a> {
    engine: &'a AmortizationEngine,
    prepayments: &'a PrepaymentMap,
    state: AmortizationState,
}

impl<'a> ScheduleIter<'a> {
    /// State after the last produced entry
    pub fn state(&self) -> &AmortizationState {
        &self.state
    }
}

impl<'a> Iterator for ScheduleIter<'a> {
    type Item = AmortizationEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_paid_off() || self.state.period >= self.engine.total_periods {
            return None;
        }

        let extra = self.prepayments.get(self.state.period + 1);
        Some(self.state.advance(extra, self.engine.monthly_rate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_paid_off() {
            return (0, Some(0));
        }
        let remaining = self.engine.total_periods.saturating_sub(self.state.period) as usize;
        (remaining.min(1), Some(remaining))
    }
}

impl<'a> std::iter::FusedIterator for ScheduleIter<'a> {}

/// Validate the loan terms and produce the schedule under `prepayments`
pub fn generate_schedule(loan: &LoanTerms, prepayments: &PrepaymentMap) -> Result<Schedule> {
    let engine = AmortizationEngine::new(*loan)?;
    Ok(engine.generate_schedule(prepayments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MortgageError;
    use approx::assert_abs_diff_eq;

    fn reference_loan() -> LoanTerms {
        LoanTerms::new(500_000.0, 100_000.0, 30, 6.375).unwrap()
    }

    fn assert_conserves_principal(schedule: &Schedule) {
        let paid: f64 = schedule
            .entries
            .iter()
            .map(|e| e.principal_component + e.extra_payment)
            .sum();
        let outstanding = schedule.entries.last().map(|e| e.remaining_balance).unwrap_or(0.0);
        assert_abs_diff_eq!(paid + outstanding, schedule.principal, epsilon = 0.01);
    }

    fn assert_balance_decreasing(schedule: &Schedule) {
        let mut previous = schedule.principal;
        for entry in &schedule.entries {
            assert!(entry.remaining_balance >= 0.0);
            assert!(
                entry.remaining_balance < previous,
                "balance did not decrease at period {}",
                entry.period
            );
            previous = entry.remaining_balance;
        }
    }

    #[test]
    fn test_plain_schedule() {
        let engine = AmortizationEngine::new(reference_loan()).unwrap();
        assert_abs_diff_eq!(engine.base_payment(), 2495.48, epsilon = 0.01);

        let schedule = engine.generate_schedule(&PrepaymentMap::new());
        assert_eq!(schedule.len(), 360);

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.period, 360);
        assert_abs_diff_eq!(last.remaining_balance, 0.0, epsilon = 0.01);

        for (i, entry) in schedule.entries.iter().enumerate() {
            assert_eq!(entry.period, i as u32 + 1);
            assert_eq!(entry.extra_payment, 0.0);
            assert_abs_diff_eq!(
                entry.principal_component + entry.interest_component,
                entry.payment,
                epsilon = 1e-9
            );
        }

        assert_conserves_principal(&schedule);
        assert_balance_decreasing(&schedule);
    }

    #[test]
    fn test_first_period_split() {
        let schedule = generate_schedule(&reference_loan(), &PrepaymentMap::new()).unwrap();
        let first = &schedule.entries[0];
        assert_abs_diff_eq!(first.interest_component, 2125.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.principal_component, 370.48, epsilon = 0.01);
    }

    #[test]
    fn test_prepayment_shortens_term() {
        let loan = reference_loan();
        let prepayments = PrepaymentMap::recurring_until(1, 1, 360, 5_000.0).unwrap();
        let schedule = generate_schedule(&loan, &prepayments).unwrap();

        assert!(schedule.len() < 360);
        let last = schedule.entries.last().unwrap();
        assert_abs_diff_eq!(last.remaining_balance, 0.0, epsilon = 0.01);
        assert!(last.extra_payment <= 5_000.0);

        assert_conserves_principal(&schedule);
        assert_balance_decreasing(&schedule);
    }

    #[test]
    fn test_sparse_unsorted_prepayments() {
        let loan = reference_loan();
        let prepayments: PrepaymentMap =
            vec![(240_u32, 10_000.0), (12, 25_000.0), (61, 3_000.0)].into_iter().collect();
        let schedule = generate_schedule(&loan, &prepayments).unwrap();

        assert!(schedule.len() < 360);
        assert_eq!(schedule.entries[11].extra_payment, 25_000.0);
        assert_eq!(schedule.entries[60].extra_payment, 3_000.0);
        assert_eq!(schedule.entries[0].extra_payment, 0.0);
        assert_conserves_principal(&schedule);
        assert_balance_decreasing(&schedule);
    }

    #[test]
    fn test_lump_sum_payoff_clamps_extra() {
        let loan = reference_loan();
        let mut prepayments = PrepaymentMap::new();
        prepayments.insert(3, 1_000_000.0).unwrap();

        let schedule = generate_schedule(&loan, &prepayments).unwrap();
        assert_eq!(schedule.len(), 3);

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.remaining_balance, 0.0);
        assert_eq!(last.payment, 0.0);
        assert_abs_diff_eq!(last.extra_payment, schedule.entries[1].remaining_balance);
        assert_conserves_principal(&schedule);
    }

    #[test]
    fn test_zero_rate() {
        let loan = LoanTerms::new(250_000.0, 10_000.0, 15, 0.0).unwrap();
        let engine = AmortizationEngine::new(loan).unwrap();
        assert_eq!(engine.base_payment(), 240_000.0 / 180.0);

        let schedule = engine.generate_schedule(&PrepaymentMap::new());
        assert_eq!(schedule.len(), 180);
        assert!(schedule.entries.iter().all(|e| e.interest_component == 0.0));
        assert_abs_diff_eq!(schedule.entries.last().unwrap().remaining_balance, 0.0, epsilon = 0.01);
        assert_conserves_principal(&schedule);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let loan = reference_loan();
        let prepayments = PrepaymentMap::recurring(6, 12, 10, 7_500.0).unwrap();
        let engine = AmortizationEngine::new(loan).unwrap();

        let first = engine.generate_schedule(&prepayments);
        let second = engine.generate_schedule(&prepayments);
        assert_eq!(first, second);
        assert_eq!(engine.base_payment(), loan.base_payment());

        let third = generate_schedule(&loan, &prepayments).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_iterator_is_lazy_and_restartable() {
        let engine = AmortizationEngine::new(reference_loan()).unwrap();
        let prepayments = PrepaymentMap::new();

        let first_year: Vec<_> = engine.iter(&prepayments).take(12).collect();
        assert_eq!(first_year.len(), 12);

        let full = engine.generate_schedule(&prepayments);
        assert_eq!(&full.entries[..12], &first_year[..]);

        let mut iter = engine.iter(&prepayments);
        assert_eq!(iter.next().unwrap().period, 1);
        assert_eq!(iter.state().period, 1);
    }

    #[test]
    fn test_invalid_loan_rejected() {
        let loan = LoanTerms {
            home_value: 100_000.0,
            down_payment: 100_000.0,
            term_years: 30,
            annual_rate_percent: 5.0,
        };
        let result = generate_schedule(&loan, &PrepaymentMap::new());
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));

        let negative_rate = LoanTerms {
            annual_rate_percent: -1.0,
            down_payment: 0.0,
            ..loan
        };
        assert!(AmortizationEngine::new(negative_rate).is_err());
    }

    #[test]
    fn test_long_term_schedule_stays_finite() {
        let loan = LoanTerms::new(500_000.0, 100_000.0, 100, 6.375).unwrap();
        let schedule = generate_schedule(&loan, &PrepaymentMap::new()).unwrap();
        assert_eq!(schedule.len(), 1200);
        assert!(schedule.entries.iter().all(|e| e.payment.is_finite() && e.remaining_balance.is_finite()));
        assert_abs_diff_eq!(schedule.entries.last().unwrap().remaining_balance, 0.0, epsilon = 0.01);
        assert_conserves_principal(&schedule);

        let interest_only = LoanTerms {
            term_years: 20_000,
            ..loan
        };
        assert!(matches!(
            generate_schedule(&interest_only, &PrepaymentMap::new()),
            Err(MortgageError::InvalidInput { .. })
        ));
    }
}
