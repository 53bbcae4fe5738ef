//! Persist loan details and prepayment maps as JSON

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;

use super::LoanTerms;
use crate::amortization::PrepaymentMap;
use crate::error::Result;

/// Default location of saved loan details
pub const DEFAULT_LOAN_DETAILS_PATH: &str = "data/mortgage_details.json";

/// Environment variable overriding the loan details location
pub const LOAN_DETAILS_PATH_ENV: &str = "MORTGAGE_DETAILS_PATH";

/// Resolve the loan details path from the environment or the default
pub fn default_loan_details_path() -> String {
    std::env::var(LOAN_DETAILS_PATH_ENV).unwrap_or_else(|_| DEFAULT_LOAN_DETAILS_PATH.to_string())
}

/// Load and validate loan terms
pub fn load_loan_terms<P: AsRef<Path>>(path: P) -> Result<LoanTerms> {
    let file = File::open(path.as_ref())?;
    let terms: LoanTerms = serde_json::from_reader(BufReader::new(file))?;
    terms.validate()?;
    debug!("Loaded loan terms from {}", path.as_ref().display());
    Ok(terms)
}

pub fn save_loan_terms<P: AsRef<Path>>(path: P, terms: &LoanTerms) -> Result<()> {
    write_json(path.as_ref(), terms)
}

/// Load a prepayment map, rejecting negative or non-finite amounts
pub fn load_prepayments<P: AsRef<Path>>(path: P) -> Result<PrepaymentMap> {
    let file = File::open(path.as_ref())?;
    let raw: std::collections::BTreeMap<u32, f64> = serde_json::from_reader(BufReader::new(file))?;

    let mut map = PrepaymentMap::new();
    for (period, amount) in raw {
        map.insert(period, amount)?;
    }
    debug!(
        "Loaded {} prepayments from {}",
        map.len(),
        path.as_ref().display()
    );
    Ok(map)
}

pub fn save_prepayments<P: AsRef<Path>>(path: P, prepayments: &PrepaymentMap) -> Result<()> {
    write_json(path.as_ref(), prepayments)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    debug!("Saved {}", path.display());
    Ok(())
}
