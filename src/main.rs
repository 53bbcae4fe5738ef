//! Mortgage Planner CLI
//!
//! Command-line interface for amortization schedules and prepayment planning

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use mortgage_planner::loan::{self, loader};
use mortgage_planner::report;
use mortgage_planner::{AmortizationEngine, DownPayment, LoanTerms, PrepaymentMap, PrepaymentSolver, Schedule};

/// Amortization schedules and prepayment planning for fixed-rate mortgages
#[derive(Parser)]
#[command(name = "mortgage-planner", version)]
struct Cli {
    #[command(flatten)]
    loan: LoanArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LoanArgs {
    /// Loan details JSON file (default: $MORTGAGE_DETAILS_PATH or data/mortgage_details.json)
    #[arg(long)]
    loan: Option<PathBuf>,

    /// Home value in dollars
    #[arg(long)]
    home_value: Option<f64>,

    /// Down payment as a percentage ("20%") or a dollar amount ("40000")
    #[arg(long)]
    down_payment: Option<String>,

    /// Loan term in years (10, 15 or 30)
    #[arg(long)]
    term_years: Option<u32>,

    /// Annual interest rate as a percentage (e.g. 6.375)
    #[arg(long)]
    rate: Option<f64>,

    /// Accept loan terms other than 10, 15 or 30 years
    #[arg(long)]
    any_term: bool,

    /// Save loan details given on the command line to the loan details file
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the loan summary without prepayments
    Summary,
    /// Amortization schedule with an optional prepayment plan
    Schedule(ScheduleArgs),
    /// Extra payment required to pay the loan off within a target time
    Solve(SolveArgs),
}

#[derive(Args)]
struct ScheduleArgs {
    /// Month of the first prepayment
    #[arg(long, default_value_t = 1)]
    prepay_start: u32,

    /// Months between prepayments
    #[arg(long, default_value_t = 12)]
    prepay_frequency: u32,

    /// Number of prepayments (default: every interval until the end of the term)
    #[arg(long)]
    prepay_count: Option<u32>,

    /// Equal prepayment amount for every interval
    #[arg(long, conflicts_with = "prepay_amounts")]
    prepay_amount: Option<f64>,

    /// Custom amount per interval, comma separated
    #[arg(long, value_delimiter = ',')]
    prepay_amounts: Vec<f64>,

    /// Load the prepayment map from a JSON file instead
    #[arg(long, conflicts_with_all = ["prepay_amount", "prepay_amounts"])]
    prepay_file: Option<PathBuf>,

    /// Save the prepayment map to a JSON file
    #[arg(long)]
    save_prepayments: Option<PathBuf>,

    /// Print the full month-by-month table
    #[arg(long)]
    table: bool,

    /// Write the schedule to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct SolveArgs {
    /// Desired payoff time in years
    #[arg(long)]
    target_years: f64,

    /// Months between prepayments
    #[arg(long, default_value_t = 12)]
    frequency: u32,

    /// Month of the first prepayment
    #[arg(long, default_value_t = 1)]
    start: u32,

    /// Print the full month-by-month table for the solved plan
    #[arg(long)]
    table: bool,

    /// Write the solved schedule to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let terms = resolve_loan(&cli.loan)?;
    let engine = AmortizationEngine::new(terms)?;
    let baseline = engine.generate_schedule(&PrepaymentMap::new());

    report::write_summary(&mut io::stdout().lock(), &terms, &baseline.summary())?;
    println!();

    match cli.command {
        Commands::Summary => {}
        Commands::Schedule(args) => {
            let prepayments = build_prepayments(&args, engine.total_periods())?;
            if let Some(path) = &args.save_prepayments {
                loan::save_prepayments(path, &prepayments)
                    .with_context(|| format!("Failed to save prepayments to {}", path.display()))?;
                println!("Prepayment schedule saved to {}", path.display());
            }

            let schedule = engine.generate_schedule(&prepayments);
            print_outcome(&schedule, &baseline, !prepayments.is_empty());
            write_outputs(&schedule, args.table, args.csv.as_ref())?;
        }
        Commands::Solve(args) => {
            if !args.target_years.is_finite() || args.target_years <= 0.0 {
                bail!("--target-years must be a positive number");
            }
            let target_months = (args.target_years * 12.0) as u32;

            let plan = PrepaymentSolver::new(terms)?.solve(target_months, args.start, args.frequency)?;
            println!(
                "To pay off the loan in {} years, you need to prepay ${:.2} every {} month(s) starting at month {}.",
                args.target_years, plan.extra_payment, plan.frequency_months, plan.start_month
            );
            if plan.is_approximate() {
                println!("  (approximate: the search stopped before reaching the one-cent tolerance)");
            }

            let schedule = engine.generate_schedule(&plan.schedule);
            print_outcome(&schedule, &baseline, true);
            write_outputs(&schedule, args.table, args.csv.as_ref())?;
        }
    }

    Ok(())
}

/// Loan terms from the command line, or from the saved details file
fn resolve_loan(args: &LoanArgs) -> Result<LoanTerms> {
    let path = args
        .loan
        .clone()
        .unwrap_or_else(|| PathBuf::from(loader::default_loan_details_path()));

    let terms = match (args.home_value, args.down_payment.as_deref(), args.term_years, args.rate) {
        (Some(home_value), Some(down_payment), Some(term_years), Some(rate)) => {
            let down_payment = DownPayment::parse(down_payment)?.resolve(home_value);
            let terms = LoanTerms::new(home_value, down_payment, term_years, rate)?;
            if args.save {
                loan::save_loan_terms(&path, &terms)
                    .with_context(|| format!("Failed to save loan details to {}", path.display()))?;
                println!("Mortgage details saved to {}", path.display());
            }
            terms
        }
        (None, None, None, None) => loan::load_loan_terms(&path)
            .with_context(|| format!("Failed to load loan details from {}", path.display()))?,
        _ => bail!("--home-value, --down-payment, --term-years and --rate must be given together"),
    };

    if !args.any_term && !terms.is_standard_term() {
        bail!(
            "Loan term of {} years is not one of 10, 15 or 30 (use --any-term to allow it)",
            terms.term_years
        );
    }
    Ok(terms)
}

fn build_prepayments(args: &ScheduleArgs, total_periods: u32) -> Result<PrepaymentMap> {
    if let Some(path) = &args.prepay_file {
        let map = loan::load_prepayments(path)
            .with_context(|| format!("Failed to load prepayments from {}", path.display()))?;
        return Ok(map);
    }

    let map = if !args.prepay_amounts.is_empty() {
        PrepaymentMap::custom(args.prepay_start, args.prepay_frequency, &args.prepay_amounts)?
    } else {
        match (args.prepay_amount, args.prepay_count) {
            (None, _) => PrepaymentMap::new(),
            (Some(amount), Some(count)) => {
                PrepaymentMap::recurring(args.prepay_start, args.prepay_frequency, count, amount)?
            }
            (Some(amount), None) => {
                PrepaymentMap::recurring_until(args.prepay_start, args.prepay_frequency, total_periods, amount)?
            }
        }
    };
    Ok(map)
}

fn print_outcome(schedule: &Schedule, baseline: &Schedule, with_prepayments: bool) {
    if !with_prepayments {
        return;
    }
    let summary = schedule.summary();
    let savings = schedule.savings_against(baseline);

    println!("\nWith prepayments:");
    println!("  Payoff Month:       {}", summary.payoff_month);
    println!("  Total Extra:        ${:.2}", summary.total_extra);
    println!("  Total Interest:     ${:.2}", summary.total_interest);
    println!("  Months Saved:       {}", savings.months_saved);
    println!("  Interest Saved:     ${:.2}", savings.interest_saved);
}

fn write_outputs(schedule: &Schedule, table: bool, csv_path: Option<&PathBuf>) -> Result<()> {
    if table {
        println!();
        report::write_schedule_table(&mut io::stdout().lock(), schedule)?;
        println!();
    }
    if let Some(path) = csv_path {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        report::write_schedule_csv(file, schedule)?;
        println!("\nSchedule written to: {}", path.display());
    }
    Ok(())
}
