//! JSON result writer for training, prediction, and recommendation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use credence_loan::{ApprovalStatus, CustomerProfile, RankedPackage};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Held-out evaluation of a trained model, as plain values.
///
/// The writer has no dependency on `credence-rf`; callers copy the numbers
/// out of their confusion matrix and importance ranking.
#[derive(Debug, Clone)]
pub struct EvaluationReport<'a> {
    /// Number of trees in the evaluated forest.
    pub n_estimators: usize,
    /// Depth limit of the evaluated forest.
    pub max_depth: Option<usize>,
    /// Seed used for splitting and training.
    pub seed: u64,
    /// Rows used for training.
    pub n_train: usize,
    /// Rows held out for evaluation.
    pub n_test: usize,
    /// Held-out accuracy.
    pub accuracy: f64,
    /// `confusion_matrix[true][predicted]`.
    pub confusion_matrix: &'a [Vec<usize>],
    /// Per-class `(precision, recall, f1, support)`, indexed by label.
    pub class_metrics: &'a [(f64, f64, f64, usize)],
    /// Feature names, indexed by column.
    pub feature_names: &'a [String],
    /// Normalized importance per column.
    pub feature_importances: &'a [f64],
    /// 1-based importance rank per column.
    pub feature_ranks: &'a [usize],
}

/// The recommendation outcome for one applicant.
#[derive(Debug, Clone)]
pub struct ApplicantRecommendation<'a> {
    /// Applicant name.
    pub applicant: &'a str,
    /// Whether the applicant was treated as approved.
    pub approved: bool,
    /// Eligible packages, closest first; empty when not approved.
    pub packages: Vec<RankedPackage<'a>>,
}

/// Writes training, prediction, and recommendation results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_evaluation.json`,
/// `{experiment}_predictions.json`, and `{experiment}_recommendations.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}.json", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::EncodeJson {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write an evaluation report to `{experiment}_evaluation.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::EncodeJson`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_evaluation(&self, report: &EvaluationReport<'_>) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("evaluation");

        let mut features: Vec<FeatureEntry> = report
            .feature_names
            .iter()
            .zip(report.feature_importances)
            .zip(report.feature_ranks)
            .map(|((name, &importance), &rank)| FeatureEntry {
                name: name.as_str(),
                importance,
                rank,
            })
            .collect();
        features.sort_by_key(|f| f.rank);

        let classes: Vec<ClassEntry> = report
            .class_metrics
            .iter()
            .enumerate()
            .map(|(label, &(precision, recall, f1, support))| ClassEntry {
                class: ApprovalStatus::from_label(label)
                    .map_or_else(|_| label.to_string(), |s| s.to_string()),
                precision,
                recall,
                f1,
                support,
            })
            .collect();

        let artifact = EvaluationArtifact {
            experiment: self.experiment.as_str(),
            n_estimators: report.n_estimators,
            max_depth: report.max_depth,
            seed: report.seed,
            n_train: report.n_train,
            n_test: report.n_test,
            accuracy: report.accuracy,
            confusion_matrix: report.confusion_matrix,
            class_metrics: classes,
            feature_importances: features,
        };

        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }

    /// Write one predicted approval status per applicant to
    /// `{experiment}_predictions.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::EncodeJson`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all, fields(n_applicants = profiles.len()))]
    pub fn write_predictions(
        &self,
        profiles: &[CustomerProfile],
        statuses: &[ApprovalStatus],
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("predictions");

        let predictions: Vec<PredictionEntry> = profiles
            .iter()
            .zip(statuses)
            .map(|(profile, &status)| PredictionEntry {
                applicant: profile.name.as_str(),
                approval_status: status.is_approved(),
                label: status.label(),
            })
            .collect();

        let artifact = PredictionsArtifact {
            experiment: self.experiment.as_str(),
            n_applicants: predictions.len(),
            n_approved: predictions.iter().filter(|p| p.approval_status).count(),
            predictions,
        };

        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    /// Write ranked packages per applicant to `{experiment}_recommendations.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::EncodeJson`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all, fields(n_applicants = recommendations.len()))]
    pub fn write_recommendations(
        &self,
        recommendations: &[ApplicantRecommendation<'_>],
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("recommendations");

        let entries: Vec<RecommendationEntry> = recommendations
            .iter()
            .map(|rec| RecommendationEntry {
                applicant: rec.applicant,
                approved: rec.approved,
                packages: rec
                    .packages
                    .iter()
                    .map(|ranked| PackageEntry {
                        id: ranked.package.id,
                        loan_name: ranked.package.loan_name.as_str(),
                        loan_amount: ranked.package.loan_amount,
                        loan_term: ranked.package.loan_term,
                        interest_rate: ranked.package.interest_rate,
                        score: ranked.score,
                    })
                    .collect(),
            })
            .collect();

        let artifact = RecommendationsArtifact {
            experiment: self.experiment.as_str(),
            recommendations: entries,
        };

        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "recommendations written");
        Ok(path)
    }

    /// Return the path where the model binary should be saved.
    ///
    /// Does not write anything; just computes `{output_dir}/{experiment}_model.bin`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_model.bin", self.experiment.as_str()))
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    n_estimators: usize,
    max_depth: Option<usize>,
    seed: u64,
    n_train: usize,
    n_test: usize,
    accuracy: f64,
    confusion_matrix: &'a [Vec<usize>],
    class_metrics: Vec<ClassEntry>,
    feature_importances: Vec<FeatureEntry<'a>>,
}

#[derive(Serialize)]
struct FeatureEntry<'a> {
    name: &'a str,
    importance: f64,
    rank: usize,
}

#[derive(Serialize)]
struct ClassEntry {
    class: String,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct PredictionsArtifact<'a> {
    experiment: &'a str,
    n_applicants: usize,
    n_approved: usize,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    applicant: &'a str,
    approval_status: bool,
    label: usize,
}

#[derive(Serialize)]
struct RecommendationsArtifact<'a> {
    experiment: &'a str,
    recommendations: Vec<RecommendationEntry<'a>>,
}

#[derive(Serialize)]
struct RecommendationEntry<'a> {
    applicant: &'a str,
    approved: bool,
    packages: Vec<PackageEntry<'a>>,
}

#[derive(Serialize)]
struct PackageEntry<'a> {
    id: u64,
    loan_name: &'a str,
    loan_amount: f64,
    loan_term: u32,
    interest_rate: f64,
    score: f64,
}
