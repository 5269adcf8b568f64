//! The fixed feature layout shared by training and inference.

use crate::CustomerProfile;

/// Number of columns in a feature vector.
pub const N_FEATURES: usize = 10;

/// Feature column names, in vector order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "self_employed",
    "income_annum",
    "loan_amount",
    "cibil_score",
    "education",
    "loan_term",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
];

/// Return [`FEATURE_NAMES`] as owned strings.
#[must_use]
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Encode a profile as a feature vector in [`FEATURE_NAMES`] order.
///
/// The employment flag fills the `self_employed` column.
#[must_use]
pub fn featurize(profile: &CustomerProfile) -> Vec<f64> {
    vec![
        flag(profile.is_employed),
        profile.income,
        profile.loan_amount,
        f64::from(profile.credit_score),
        flag(profile.is_graduated),
        f64::from(profile.loan_term),
        profile.residential_assets,
        profile.commercial_assets,
        profile.luxury_assets,
        profile.bank_assets,
    ]
}
