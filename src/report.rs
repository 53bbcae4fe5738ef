//! Text and CSV output for schedules and horizon sweeps

use std::io;

use crate::amortization::{Schedule, ScheduleSummary};
use crate::error::Result;
use crate::loan::LoanTerms;
use crate::solver::HorizonPlan;

/// Write one CSV row per schedule entry
pub fn write_schedule_csv<W: io::Write>(writer: W, schedule: &Schedule) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in &schedule.entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one CSV row per solved horizon
pub fn write_sweep_csv<W: io::Write>(writer: W, rows: &[HorizonPlan]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Loan parameters and key results
pub fn write_summary<W: io::Write>(
    out: &mut W,
    loan: &LoanTerms,
    summary: &ScheduleSummary,
) -> Result<()> {
    writeln!(out, "Mortgage Summary:")?;
    writeln!(out, "  Home Value:         ${:.2}", loan.home_value)?;
    writeln!(
        out,
        "  Down Payment:       ${:.2} ({:.1}%)",
        loan.down_payment,
        loan.down_payment_pct()
    )?;
    writeln!(out, "  Loan Term:          {} years", loan.term_years)?;
    writeln!(out, "  Interest Rate:      {:.3}%", loan.annual_rate_percent)?;
    writeln!(out, "  Principal:          ${:.2}", loan.principal())?;
    writeln!(out, "  Monthly Payment:    ${:.2}", loan.base_payment())?;
    writeln!(out, "  Total Payments:     {} months", loan.total_periods())?;
    writeln!(out, "  Payoff Month:       {}", summary.payoff_month)?;
    writeln!(out, "  Total Interest:     ${:.2}", summary.total_interest)?;
    writeln!(out, "  Total Extra:        ${:.2}", summary.total_extra)?;
    writeln!(out, "  Total Paid:         ${:.2}", summary.total_paid)?;
    writeln!(
        out,
        "  Interest/Principal: {:.2}%",
        summary.interest_to_principal * 100.0
    )?;
    writeln!(
        out,
        "  Interest/Home:      {:.2}%",
        summary.interest_to_home_value * 100.0
    )?;
    Ok(())
}

/// Month-by-month table
pub fn write_schedule_table<W: io::Write>(out: &mut W, schedule: &Schedule) -> Result<()> {
    writeln!(
        out,
        "{:>5} | {:>11} | {:>11} | {:>11} | {:>13} | {:>12}",
        "Month", "Payment", "Principal", "Interest", "Extra Payment", "Balance"
    )?;
    writeln!(out, "{}", "-".repeat(82))?;
    for e in &schedule.entries {
        writeln!(
            out,
            "{:>5} | {:>11.2} | {:>11.2} | {:>11.2} | {:>13.2} | {:>12.2}",
            e.period,
            e.payment,
            e.principal_component,
            e.interest_component,
            e.extra_payment,
            e.remaining_balance
        )?;
    }
    Ok(())
}
