use credence_rf::RfError;

/// Errors from loan eligibility and package ranking.
#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    /// Returned when packages are requested for an applicant who is not approved.
    #[error("applicant {name} is not eligible for a loan")]
    NotApproved {
        /// The applicant's name.
        name: String,
    },

    /// Returned when a classifier emits a label outside the approval encoding.
    #[error("label {label} is not an approval status (expected 0 or 1)")]
    UnknownLabel {
        /// The label produced by the model.
        label: usize,
    },

    /// Returned when the eligibility model fails.
    #[error("eligibility model failed")]
    Model(#[from] RfError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_applicant() {
        let err = LoanError::NotApproved {
            name: "Asha".to_string(),
        };
        assert_eq!(err.to_string(), "applicant Asha is not eligible for a loan");
    }

    #[test]
    fn model_errors_keep_their_source() {
        let err = LoanError::from(RfError::NotFitted);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("model has not been fitted"));
    }
}
