//! Applicant records and the approval label encoding.

use std::fmt;

use crate::LoanError;

/// An applicant's financial profile.
///
/// Used both to build the classifier's feature vector and to rank loan
/// packages. Asset values default to zero when absent from the input.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomerProfile {
    /// Applicant name, used in messages only.
    pub name: String,
    /// Employment flag.
    pub is_employed: bool,
    /// Annual income.
    pub income: f64,
    /// Graduate education flag.
    pub is_graduated: bool,
    /// Residential asset value.
    #[serde(default)]
    pub residential_assets: f64,
    /// Commercial asset value.
    #[serde(default)]
    pub commercial_assets: f64,
    /// Luxury asset value.
    #[serde(default)]
    pub luxury_assets: f64,
    /// Bank asset value.
    #[serde(default)]
    pub bank_assets: f64,
    /// Credit score.
    pub credit_score: u32,
    /// Requested loan amount.
    pub loan_amount: f64,
    /// Requested loan term.
    pub loan_term: u32,
    /// Known approval outcome, if any.
    #[serde(default)]
    pub approval_status: Option<bool>,
}

impl CustomerProfile {
    /// Sum of the four asset categories.
    #[must_use]
    pub fn total_assets(&self) -> f64 {
        self.residential_assets + self.commercial_assets + self.luxury_assets + self.bank_assets
    }

    /// Return `true` only when the approval status is known and positive.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approval_status == Some(true)
    }
}

/// Binary eligibility outcome, encoded as classifier labels `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ApprovalStatus {
    /// Label `0`.
    Rejected,
    /// Label `1`.
    Approved,
}

impl ApprovalStatus {
    /// Display names indexed by label.
    pub const CLASS_NAMES: [&'static str; 2] = ["Rejected", "Approved"];

    /// Return the classifier label for this status.
    #[must_use]
    pub fn label(self) -> usize {
        match self {
            ApprovalStatus::Rejected => 0,
            ApprovalStatus::Approved => 1,
        }
    }

    /// Decode a classifier label.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::UnknownLabel`] for any label other than 0 or 1.
    pub fn from_label(label: usize) -> Result<Self, LoanError> {
        match label {
            0 => Ok(ApprovalStatus::Rejected),
            1 => Ok(ApprovalStatus::Approved),
            _ => Err(LoanError::UnknownLabel { label }),
        }
    }

    /// Return `true` for [`ApprovalStatus::Approved`].
    #[must_use]
    pub fn is_approved(self) -> bool {
        self == ApprovalStatus::Approved
    }
}

impl From<bool> for ApprovalStatus {
    fn from(approved: bool) -> Self {
        if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::CLASS_NAMES[self.label()])
    }
}
