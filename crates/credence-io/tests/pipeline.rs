//! End-to-end integration tests: CSV -> train/recommend -> JSON -> deserialize.

use std::fs;
use std::path::Path;

use credence_io::{
    ApplicantRecommendation, EvaluationReport, ExperimentName, LoanDatasetReader, ResultWriter,
    read_packages, read_profiles,
};
use credence_loan::{ApprovalStatus, assess, rank};
use credence_rf::{RandomForest, RandomForestConfig, train_test_split};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn train_evaluate_round_trip() {
    // 1. Read CSV
    let dataset = LoanDatasetReader::new(&fixture_path("loans_40.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(dataset.n_samples(), 40);
    assert_eq!(dataset.n_features(), 10);
    assert_eq!(dataset.n_approved(), 21);

    // 2. Split, train, evaluate
    let split = train_test_split(dataset.features(), dataset.labels(), 0.2, 42).unwrap();
    let mut forest = RandomForest::new(
        RandomForestConfig::new(25)
            .unwrap()
            .with_max_depth(Some(10))
            .with_seed(42),
    );
    forest.fit(&split.train_features, &split.train_labels).unwrap();
    let matrix = forest
        .evaluate(&split.test_features, &split.test_labels)
        .unwrap()
        .with_class_names(&ApprovalStatus::CLASS_NAMES);

    let ranked = forest.rank_features(dataset.feature_names());
    let importances = forest.feature_importances();
    let ranks: Vec<usize> = dataset
        .feature_names()
        .iter()
        .map(|name| ranked.iter().find(|r| &r.name == name).map_or(0, |r| r.rank))
        .collect();
    let metrics: Vec<(f64, f64, f64, usize)> = matrix
        .class_metrics()
        .iter()
        .map(|m| (m.precision, m.recall, m.f1, m.support))
        .collect();

    // 3. Write JSON artifact and the model
    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("train_rt".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let path = writer
        .write_evaluation(&EvaluationReport {
            n_estimators: 25,
            max_depth: Some(10),
            seed: 42,
            n_train: split.train_labels.len(),
            n_test: split.test_labels.len(),
            accuracy: matrix.accuracy(),
            confusion_matrix: matrix.as_rows(),
            class_metrics: &metrics,
            feature_names: dataset.feature_names(),
            feature_importances: &importances,
            feature_ranks: &ranks,
        })
        .unwrap();
    forest.save(writer.model_path()).unwrap();

    // 4. Deserialize back and verify
    let content = read_json(&path);
    assert_eq!(content["experiment"], "train_rt");
    assert_eq!(content["n_train"], 32);
    assert_eq!(content["n_test"], 8);
    assert_eq!(content["feature_importances"].as_array().unwrap().len(), 10);
    // The outcome is a threshold on credit score alone.
    assert_eq!(content["feature_importances"][0]["name"], "cibil_score");

    let reloaded = RandomForest::load(dir.path().join("train_rt_model.bin")).unwrap();
    assert_eq!(
        reloaded.predict(dataset.features()).unwrap(),
        forest.predict(dataset.features()).unwrap()
    );
}

#[test]
fn recommend_round_trip() {
    let profiles = read_profiles(&fixture_path("applicants.csv")).unwrap();
    let packages = read_packages(&fixture_path("packages.csv")).unwrap();
    assert_eq!(profiles.len(), 3);
    assert_eq!(packages.len(), 4);

    let recommendations: Vec<ApplicantRecommendation> = profiles
        .iter()
        .map(|profile| {
            let approved = profile.is_approved();
            ApplicantRecommendation {
                applicant: &profile.name,
                approved,
                packages: if approved { rank(&packages, profile) } else { Vec::new() },
            }
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("rec_rt".into()).unwrap()).unwrap();
    let path = writer.write_recommendations(&recommendations).unwrap();

    let content = read_json(&path);
    let recs = content["recommendations"].as_array().unwrap();
    let ids = |i: usize| -> Vec<u64> {
        recs[i]["packages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_u64().unwrap())
            .collect()
    };
    assert_eq!(ids(0), vec![3, 2]);
    assert!(ids(1).is_empty());
    assert_eq!(recs[1]["approved"], false);
    // Unknown approval status is not treated as approved.
    assert_eq!(recs[2]["approved"], false);
}

#[test]
fn model_predictions_round_trip() {
    let dataset = LoanDatasetReader::new(&fixture_path("loans_40.csv")).read().unwrap();
    let mut forest = RandomForest::new(RandomForestConfig::new(15).unwrap());
    forest.fit(dataset.features(), dataset.labels()).unwrap();

    let profiles = read_profiles(&fixture_path("applicants.csv")).unwrap();
    let statuses = assess(&forest, &profiles).unwrap();
    assert_eq!(
        statuses,
        vec![ApprovalStatus::Approved, ApprovalStatus::Rejected, ApprovalStatus::Approved]
    );

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("pred_rt".into()).unwrap()).unwrap();
    let path = writer.write_predictions(&profiles, &statuses).unwrap();
    let content = read_json(&path);
    assert_eq!(content["n_approved"], 2);
    assert_eq!(content["predictions"][0]["applicant"], "Asha");
}
