//! Eligibility prediction for applicant profiles.

use credence_rf::RandomForest;
use tracing::{debug, instrument};

use crate::{ApprovalStatus, CustomerProfile, LoanError, featurize};

/// Predict an approval status for every profile, in input order.
///
/// # Errors
///
/// | Variant                     | When                                         |
/// |-----------------------------|----------------------------------------------|
/// | [`LoanError::Model`]        | the model is unfitted or was trained on a different width |
/// | [`LoanError::UnknownLabel`] | the model emits a label other than 0 or 1    |
#[instrument(skip_all, fields(n_profiles = profiles.len()))]
pub fn assess(model: &RandomForest, profiles: &[CustomerProfile]) -> Result<Vec<ApprovalStatus>, LoanError> {
    let rows: Vec<Vec<f64>> = profiles.iter().map(featurize).collect();
    let labels = model.predict(&rows)?;
    let statuses = labels
        .into_iter()
        .map(ApprovalStatus::from_label)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        n_approved = statuses.iter().filter(|s| s.is_approved()).count(),
        "profiles assessed"
    );
    Ok(statuses)
}

/// Return a copy of `profile` with its approval status set from `model`.
///
/// # Errors
///
/// Same as [`assess`].
pub fn with_predicted_status(
    model: &RandomForest,
    profile: &CustomerProfile,
) -> Result<CustomerProfile, LoanError> {
    let status = model
        .predict_row(&featurize(profile))
        .map_err(LoanError::from)
        .and_then(ApprovalStatus::from_label)?;
    Ok(CustomerProfile {
        approval_status: Some(status.is_approved()),
        ..profile.clone()
    })
}

#[cfg(test)]
mod tests {
    use credence_rf::{RandomForestConfig, RfError};

    use super::*;

    fn profile(credit_score: u32) -> CustomerProfile {
        CustomerProfile {
            name: format!("score-{credit_score}"),
            is_employed: false,
            income: 5_000_000.0,
            is_graduated: true,
            residential_assets: 1_000_000.0,
            commercial_assets: 0.0,
            luxury_assets: 0.0,
            bank_assets: 500_000.0,
            credit_score,
            loan_amount: 10_000_000.0,
            loan_term: 10,
            approval_status: None,
        }
    }

    /// Approval is decided by credit score alone.
    fn trained_model() -> RandomForest {
        let profiles: Vec<CustomerProfile> = (300..900).step_by(20).map(profile).collect();
        let rows: Vec<Vec<f64>> = profiles.iter().map(featurize).collect();
        let labels: Vec<usize> = profiles
            .iter()
            .map(|p| usize::from(p.credit_score >= 600))
            .collect();
        let mut model = RandomForest::new(RandomForestConfig::new(9).unwrap());
        model.fit(&rows, &labels).unwrap();
        model
    }

    #[test]
    fn assess_follows_learned_rule() {
        let model = trained_model();
        let statuses = assess(&model, &[profile(320), profile(880)]).unwrap();
        assert_eq!(statuses, vec![ApprovalStatus::Rejected, ApprovalStatus::Approved]);
    }

    #[test]
    fn predicted_status_is_written_back() {
        let model = trained_model();
        let updated = with_predicted_status(&model, &profile(860)).unwrap();
        assert_eq!(updated.approval_status, Some(true));
        assert_eq!(updated.credit_score, 860);
    }

    #[test]
    fn unfitted_model_surfaces_as_model_error() {
        let model = RandomForest::new(RandomForestConfig::new(1).unwrap());
        let err = assess(&model, &[profile(700)]).unwrap_err();
        assert!(matches!(err, LoanError::Model(RfError::NotFitted)));
    }

    #[test]
    fn labels_outside_encoding_are_rejected() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| featurize(&profile(400 + i * 100))).collect();
        let mut model = RandomForest::new(RandomForestConfig::new(1).unwrap());
        model.fit(&rows, &[2, 2, 2, 2]).unwrap();
        let err = assess(&model, &[profile(500)]).unwrap_err();
        assert!(matches!(err, LoanError::UnknownLabel { label: 2 }));
    }
}
