//! Fixed-rate loan terms and the values derived from them

use serde::{Deserialize, Serialize};

use crate::error::{MortgageError, Result};

/// Loan terms offered by most lenders (years)
pub const STANDARD_TERMS_YEARS: [u32; 3] = [10, 15, 30];

/// Immutable description of a fixed-rate loan
///
/// Field names on disk follow the persisted mortgage details format
/// (`loan_term`, `interest_rate`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Purchase price of the home
    pub home_value: f64,

    /// Cash paid up front
    pub down_payment: f64,

    /// Loan term in years
    #[serde(rename = "loan_term")]
    pub term_years: u32,

    /// Annual interest rate as a percentage (6.375 means 6.375%)
    #[serde(rename = "interest_rate")]
    pub annual_rate_percent: f64,
}

impl LoanTerms {
    /// Build validated loan terms
    pub fn new(
        home_value: f64,
        down_payment: f64,
        term_years: u32,
        annual_rate_percent: f64,
    ) -> Result<Self> {
        let terms = Self {
            home_value,
            down_payment,
            term_years,
            annual_rate_percent,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Check terms that were built directly or deserialized
    pub fn validate(&self) -> Result<()> {
        if !self.home_value.is_finite() || self.home_value <= 0.0 {
            return Err(MortgageError::invalid("home_value", "must be a positive amount"));
        }
        if !self.down_payment.is_finite() || self.down_payment < 0.0 {
            return Err(MortgageError::invalid("down_payment", "must be zero or a positive amount"));
        }
        if self.down_payment >= self.home_value {
            return Err(MortgageError::invalid(
                "down_payment",
                "must be less than home_value so that principal is positive",
            ));
        }
        if self.term_years == 0 {
            return Err(MortgageError::invalid("term_years", "must be at least one year"));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(MortgageError::invalid("annual_rate_percent", "must not be negative"));
        }
        if self.term_years.checked_mul(12).is_none() {
            return Err(MortgageError::invalid("term_years", "too many monthly periods"));
        }

        let payment = self.base_payment();
        if !payment.is_finite() {
            return Err(MortgageError::invalid("term_years", "monthly payment is not a finite amount"));
        }
        // A payment that only covers interest never retires the loan
        if payment <= self.principal() * self.monthly_rate() {
            return Err(MortgageError::invalid(
                "term_years",
                "monthly payment does not exceed the first month's interest",
            ));
        }
        Ok(())
    }

    /// Amount financed
    pub fn principal(&self) -> f64 {
        self.home_value - self.down_payment
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    pub fn total_periods(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    /// Standard fixed monthly payment without prepayments
    pub fn base_payment(&self) -> f64 {
        annuity_payment(self.principal(), self.monthly_rate(), self.total_periods())
    }

    /// Down payment as a percentage of the home value
    pub fn down_payment_pct(&self) -> f64 {
        self.down_payment / self.home_value * 100.0
    }

    pub fn is_standard_term(&self) -> bool {
        STANDARD_TERMS_YEARS.contains(&self.term_years)
    }
}

/// Level payment that retires `principal` over `periods` at periodic rate `rate`
pub fn annuity_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if rate != 0.0 {
        // The discount factor tends to 0 on long terms instead of overflowing
        let discount = (1.0 + rate).powf(-(periods as f64));
        principal * rate / (1.0 - discount)
    } else {
        principal / periods as f64
    }
}

/// Down payment as entered by the user: a share of the home value or a dollar amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownPayment {
    /// Percentage of the home value (20.0 means 20%)
    Percent(f64),
    /// Dollar amount
    Amount(f64),
}

impl DownPayment {
    /// Parse `"20%"`, `"40000"` or `"$40,000"`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f64 = pct.trim().parse().map_err(|_| {
                MortgageError::invalid("down_payment", format!("cannot parse percentage '{}'", input))
            })?;
            return Ok(DownPayment::Percent(value));
        }

        let cleaned: String = trimmed
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        let value: f64 = cleaned.parse().map_err(|_| {
            MortgageError::invalid("down_payment", format!("cannot parse amount '{}'", input))
        })?;
        Ok(DownPayment::Amount(value))
    }

    /// Dollar amount for a given home value
    pub fn resolve(&self, home_value: f64) -> f64 {
        match self {
            DownPayment::Percent(pct) => home_value * pct / 100.0,
            DownPayment::Amount(amount) => *amount,
        }
    }
}
