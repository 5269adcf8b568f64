//! Loan eligibility domain: applicant profiles, the feature schema, model
//! assessment, and loan package ranking.

mod approval;
mod error;
mod package;
mod profile;
mod ranker;
mod schema;

pub use approval::{assess, with_predicted_status};
pub use error::LoanError;
pub use package::LoanPackage;
pub use profile::{ApprovalStatus, CustomerProfile};
pub use ranker::{RankedPackage, closeness, is_eligible, rank, recommend, recommend_for_approved};
pub use schema::{FEATURE_NAMES, N_FEATURES, feature_names, featurize};
