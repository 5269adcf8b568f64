//! Serde-driven CSV readers for applicant and package records.

use std::path::Path;

use credence_loan::{CustomerProfile, LoanPackage};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::IoError;

/// Deserialize every row of a headed CSV file into `T`.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let records = rdr
        .deserialize()
        .map(|result| {
            result.map_err(|e: csv::Error| IoError::CsvParse {
                path: path.to_path_buf(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })
        })
        .collect::<Result<Vec<T>, IoError>>()?;

    if records.is_empty() {
        return Err(IoError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    Ok(records)
}

/// Read applicant profiles.
///
/// Columns are the [`CustomerProfile`] field names. Booleans are written
/// `true`/`false`; the asset columns may be omitted and an empty
/// `approval_status` cell means unknown.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | A row cannot be decoded into a profile |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_profiles(path: &Path) -> Result<Vec<CustomerProfile>, IoError> {
    let profiles: Vec<CustomerProfile> = read_records(path)?;
    info!(n_profiles = profiles.len(), "applicant profiles loaded");
    Ok(profiles)
}

/// Read a loan package catalog, keeping file order.
///
/// Columns are the [`LoanPackage`] field names.
///
/// # Errors
///
/// Same as [`read_profiles`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_packages(path: &Path) -> Result<Vec<LoanPackage>, IoError> {
    let packages: Vec<LoanPackage> = read_records(path)?;
    info!(n_packages = packages.len(), "loan packages loaded");
    Ok(packages)
}
