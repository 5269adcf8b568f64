//! File I/O, validation, and serialization for the credence pipeline.

mod domain;
mod error;
mod loan_reader;
mod record_reader;
mod writer;

pub use domain::{ExperimentName, LoanDataset};
pub use error::IoError;
pub use loan_reader::LoanDatasetReader;
pub use record_reader::{read_packages, read_profiles};
pub use writer::{ApplicantRecommendation, EvaluationReport, ResultWriter};
