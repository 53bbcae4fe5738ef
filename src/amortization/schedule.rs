//! Schedule output structures

use serde::{Deserialize, Serialize};

/// One period of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub period: u32,

    /// Regular payment applied (smaller than the base payment on a final partial installment)
    pub payment: f64,
    pub principal_component: f64,
    pub interest_component: f64,

    /// Extra principal paid before the regular payment, on top of `payment`
    pub extra_payment: f64,
    pub remaining_balance: f64,
}

/// Complete amortization schedule for one loan and prepayment map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Amount financed
    pub principal: f64,

    /// Home value (for the interest-to-home-value ratio)
    pub home_value: f64,

    /// Standard payment before any final-period revision
    pub base_payment: f64,

    /// Entries in ascending period order
    pub entries: Vec<AmortizationEntry>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Period of the last entry
    pub fn payoff_month(&self) -> u32 {
        self.entries.last().map(|e| e.period).unwrap_or(0)
    }

    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest_component).sum()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_interest = self.total_interest();
        let total_principal: f64 = self.entries.iter().map(|e| e.principal_component).sum();
        let total_extra: f64 = self.entries.iter().map(|e| e.extra_payment).sum();
        let total_regular: f64 = self.entries.iter().map(|e| e.payment).sum();
        let final_balance = self
            .entries
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(self.principal);

        ScheduleSummary {
            payoff_month: self.payoff_month(),
            total_interest,
            total_principal,
            total_extra,
            total_paid: total_regular + total_extra,
            final_balance,
            interest_to_principal: total_interest / self.principal,
            interest_to_home_value: total_interest / self.home_value,
        }
    }

    /// Months and interest saved relative to a baseline schedule (usually the plain one)
    pub fn savings_against(&self, baseline: &Schedule) -> PrepaymentSavings {
        PrepaymentSavings {
            months_saved: baseline.payoff_month() as i64 - self.payoff_month() as i64,
            interest_saved: baseline.total_interest() - self.total_interest(),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub payoff_month: u32,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_extra: f64,
    pub total_paid: f64,
    pub final_balance: f64,
    pub interest_to_principal: f64,
    pub interest_to_home_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    pub months_saved: i64,
    pub interest_saved: f64,
}
