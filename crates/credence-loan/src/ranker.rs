//! Eligibility filtering and closeness ranking of loan packages.

use tracing::debug;

use crate::{CustomerProfile, LoanError, LoanPackage};

/// An eligible package with its closeness score (lower is closer).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedPackage<'a> {
    /// The eligible package.
    pub package: &'a LoanPackage,
    /// `|requested amount - offered amount| + |requested term - offered term|`.
    pub score: f64,
}

/// Return `true` if `profile` meets all three of the package's minimums.
///
/// Equality qualifies.
#[must_use]
pub fn is_eligible(package: &LoanPackage, profile: &CustomerProfile) -> bool {
    profile.income >= package.min_income
        && profile.total_assets() >= package.min_assets
        && f64::from(profile.credit_score) >= package.min_credit_score
}

/// Distance between the requested and offered amount and term.
#[must_use]
pub fn closeness(package: &LoanPackage, profile: &CustomerProfile) -> f64 {
    (profile.loan_amount - package.loan_amount).abs()
        + (f64::from(profile.loan_term) - f64::from(package.loan_term)).abs()
}

/// Score every eligible package and sort ascending by score.
///
/// The sort is stable: packages with equal scores keep their input order.
/// Nothing is truncated.
#[must_use]
pub fn rank<'a>(packages: &'a [LoanPackage], profile: &CustomerProfile) -> Vec<RankedPackage<'a>> {
    let mut ranked: Vec<RankedPackage<'a>> = packages
        .iter()
        .filter(|package| is_eligible(package, profile))
        .map(|package| RankedPackage {
            package,
            score: closeness(package, profile),
        })
        .collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));

    debug!(
        applicant = %profile.name,
        n_packages = packages.len(),
        n_eligible = ranked.len(),
        "packages ranked"
    );
    ranked
}

/// Return the eligible packages, closest first.
#[must_use]
pub fn recommend<'a>(packages: &'a [LoanPackage], profile: &CustomerProfile) -> Vec<&'a LoanPackage> {
    rank(packages, profile)
        .into_iter()
        .map(|ranked| ranked.package)
        .collect()
}

/// Rank packages for an applicant whose approval status is `true`.
///
/// # Errors
///
/// Returns [`LoanError::NotApproved`] when the profile's approval status is
/// `false` or unknown.
pub fn recommend_for_approved<'a>(
    packages: &'a [LoanPackage],
    profile: &CustomerProfile,
) -> Result<Vec<RankedPackage<'a>>, LoanError> {
    if !profile.is_approved() {
        return Err(LoanError::NotApproved {
            name: profile.name.clone(),
        });
    }
    Ok(rank(packages, profile))
}
