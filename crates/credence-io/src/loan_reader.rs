//! CSV reader for the labeled loan-approval dataset.

use std::path::{Path, PathBuf};

use credence_loan::FEATURE_NAMES;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::LoanDataset;

/// Outcome column name.
const LABEL_COLUMN: &str = "loan_status";

/// How a schema column's cells are decoded.
#[derive(Debug, Clone, Copy)]
enum Encoding {
    /// A finite float.
    Numeric,
    /// A two-valued category mapped to 0.0 and 1.0.
    Binary {
        zero: &'static str,
        one: &'static str,
        expected: &'static str,
    },
}

fn encoding_for(column: &str) -> Encoding {
    match column {
        "self_employed" => Encoding::Binary {
            zero: "No",
            one: "Yes",
            expected: "No or Yes",
        },
        "education" => Encoding::Binary {
            zero: "Not Graduate",
            one: "Graduate",
            expected: "Not Graduate or Graduate",
        },
        _ => Encoding::Numeric,
    }
}

const LABEL_ENCODING: Encoding = Encoding::Binary {
    zero: "Rejected",
    one: "Approved",
    expected: "Rejected or Approved",
};

/// Reads the labeled loan-approval dataset from a CSV file.
///
/// Expected CSV format:
/// - Header row required; names and cells are whitespace-trimmed
/// - Every column of the feature schema plus `loan_status`, in any order
/// - Other columns (`loan_id`, `no_of_dependents`, ...) are ignored
///
/// Categorical columns are encoded as `self_employed` No/Yes → 0/1,
/// `education` Not Graduate/Graduate → 0/1 and `loan_status`
/// Rejected/Approved → 0/1.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent |
/// | [`IoError::InvalidCategory`] | A categorical cell holds another value |
/// | [`IoError::NonFiniteValue`] | A numeric cell is NaN, Inf, or unparseable |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct LoanDatasetReader {
    path: PathBuf,
}

impl LoanDatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    fn decode(&self, encoding: Encoding, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        match encoding {
            Encoding::Binary { zero, one, expected } => {
                if raw == zero {
                    Ok(0.0)
                } else if raw == one {
                    Ok(1.0)
                } else {
                    Err(IoError::InvalidCategory {
                        path: self.path.clone(),
                        row_index,
                        column: column.to_string(),
                        raw: raw.to_string(),
                        expected,
                    })
                }
            }
            Encoding::Numeric => {
                let non_finite = || IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    column: column.to_string(),
                    raw: raw.to_string(),
                };
                let value: f64 = raw.parse().map_err(|_| non_finite())?;
                if !value.is_finite() {
                    return Err(non_finite());
                }
                Ok(value)
            }
        }
    }

    /// Read and validate the CSV file, returning a [`LoanDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LoanDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let position = |column: &str| -> Result<usize, IoError> {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column: column.to_string(),
                })
        };

        let feature_columns: Vec<(usize, &str, Encoding)> = FEATURE_NAMES
            .iter()
            .map(|&name| -> Result<(usize, &str, Encoding), IoError> {
                Ok((position(name)?, name, encoding_for(name)))
            })
            .collect::<Result<_, IoError>>()?;
        let label_index = position(LABEL_COLUMN)?;
        debug!(n_columns = header.len(), "resolved schema columns");

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;

            let row = feature_columns
                .iter()
                .map(|&(index, name, encoding)| {
                    self.decode(encoding, record.get(index).unwrap_or(""), row_index, name)
                })
                .collect::<Result<Vec<f64>, IoError>>()?;
            let label = self.decode(
                LABEL_ENCODING,
                record.get(label_index).unwrap_or(""),
                row_index,
                LABEL_COLUMN,
            )?;

            features.push(row);
            labels.push(label as usize);
        }

        if labels.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = LoanDataset::new(credence_loan::feature_names(), features, labels);
        info!(
            n_samples = dataset.n_samples(),
            n_approved = dataset.n_approved(),
            "loan dataset loaded"
        );
        Ok(dataset)
    }
}
