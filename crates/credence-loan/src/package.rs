/// A loan product offered by a bank.
///
/// Carries the minimum qualifications an applicant must meet and the terms
/// on offer. Ranking only reads packages.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoanPackage {
    /// Package identifier.
    pub id: u64,
    /// Display name.
    pub loan_name: String,
    /// Offered loan amount.
    pub loan_amount: f64,
    /// Minimum annual income.
    pub min_income: f64,
    /// Minimum total assets.
    pub min_assets: f64,
    /// Minimum credit score.
    pub min_credit_score: f64,
    /// Offered loan term.
    pub loan_term: u32,
    /// Interest rate.
    pub interest_rate: f64,
}
