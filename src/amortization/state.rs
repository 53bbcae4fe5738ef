//! Balance state carried through one schedule run

use log::debug;

use super::schedule::AmortizationEntry;

/// Balances closer to zero than this are treated as paid off
pub const BALANCE_EPSILON: f64 = 1e-6;

/// State of a loan at a point in time during one schedule run
///
/// Owned by a single run: the revised final payment never leaks into
/// another call.
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Last completed period (0 before the first period)
    pub period: u32,

    /// Outstanding principal
    pub balance: f64,

    /// Regular payment currently in force
    pub current_payment: f64,

    /// Set once the final partial installment has revised `current_payment`
    pub payment_revised: bool,
}

impl AmortizationState {
    pub fn new(principal: f64, base_payment: f64) -> Self {
        Self {
            period: 0,
            balance: principal,
            current_payment: base_payment,
            payment_revised: false,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Apply one period: the extra payment first, then the regular payment
    pub fn advance(&mut self, requested_extra: f64, monthly_rate: f64) -> AmortizationEntry {
        self.period += 1;

        let mut extra_payment = 0.0;
        if requested_extra > 0.0 {
            if requested_extra >= self.balance - BALANCE_EPSILON {
                // Extra payment clears the loan; only the outstanding balance counts
                extra_payment = self.balance;
                self.balance = 0.0;
                return AmortizationEntry {
                    period: self.period,
                    payment: 0.0,
                    principal_component: 0.0,
                    interest_component: 0.0,
                    extra_payment,
                    remaining_balance: 0.0,
                };
            }
            self.balance -= requested_extra;
            extra_payment = requested_extra;
        }

        let interest_component = self.balance * monthly_rate;
        let mut principal_component = self.current_payment - interest_component;

        if principal_component > self.balance {
            principal_component = self.balance;
            self.current_payment = principal_component + interest_component;
            self.payment_revised = true;
            debug!(
                "Final installment at period {} revised to {:.2}",
                self.period, self.current_payment
            );
        }

        self.balance -= principal_component;
        if self.balance < BALANCE_EPSILON {
            self.balance = 0.0;
        }

        AmortizationEntry {
            period: self.period,
            payment: self.current_payment,
            principal_component,
            interest_component,
            extra_payment,
            remaining_balance: self.balance,
        }
    }
}
