use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use credence_io::{
    ApplicantRecommendation, EvaluationReport, ExperimentName, LoanDatasetReader, ResultWriter,
    read_packages, read_profiles,
};
use credence_loan::{
    ApprovalStatus, CustomerProfile, LoanError, assess, recommend_for_approved,
    with_predicted_status,
};
use credence_rf::{MaxFeatures, ModelHandle, RandomForest, RandomForestConfig, train_test_split};

#[derive(Parser)]
#[command(name = "credence")]
#[command(about = "Loan approval classification and loan package recommendation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Train a Random Forest on a labeled loan dataset and evaluate it on held-out rows
    Train {
        /// Path to the loan dataset CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of trees in the Random Forest
        #[arg(long, default_value_t = 100)]
        n_estimators: usize,

        /// Maximum tree depth, or "none" for unlimited
        #[arg(long, default_value = "10", value_parser = parse_max_depth)]
        max_depth: MaxDepth,

        /// Features per split: "all", "sqrt", "log2", or a count
        #[arg(long, default_value = "all")]
        max_features: String,

        /// Sample `max_features` candidate features at every split
        #[arg(long, default_value_t = false)]
        subsample_features: bool,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
    },

    /// Predict approval status for applicants with a trained model
    Predict {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        /// Path to the applicants CSV file
        #[arg(long)]
        applicants: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Rank eligible loan packages for every approved applicant
    Recommend {
        /// Path to the loan package catalog CSV file
        #[arg(long)]
        packages: PathBuf,

        /// Path to the applicants CSV file
        #[arg(long)]
        applicants: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Trained model used to decide approval (CSV status used if not set)
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_samples: usize,
    n_train: usize,
    n_test: usize,
    n_estimators: usize,
    accuracy: f64,
    top_feature: Option<String>,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_applicants: usize,
    n_approved: usize,
    model_n_trees: usize,
    model_n_features: usize,
}

#[derive(Serialize)]
struct RecommendOutput {
    experiment: String,
    n_applicants: usize,
    n_approved: usize,
    n_packages: usize,
    status_source: &'static str,
}

/// Depth limit as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaxDepth(Option<usize>);

fn parse_max_depth(s: &str) -> Result<MaxDepth, String> {
    match s {
        "none" | "unlimited" => Ok(MaxDepth(None)),
        other => other
            .parse::<usize>()
            .map(|d| MaxDepth(Some(d)))
            .map_err(|_| format!("expected a depth or \"none\", got {other}")),
    }
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "all" => Ok(MaxFeatures::All),
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        other => other.parse::<usize>().map(MaxFeatures::Fixed).map_err(|_| {
            anyhow::anyhow!("unknown max features: {other} (expected all, sqrt, log2, or a count)")
        }),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            experiment,
            output_dir,
            n_estimators,
            max_depth,
            max_features,
            subsample_features,
            test_fraction,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read dataset
            let dataset = LoanDatasetReader::new(&data)
                .read()
                .context("failed to read loan dataset CSV")?;

            // 2. Hold out evaluation rows
            let split = train_test_split(dataset.features(), dataset.labels(), test_fraction, cli.seed)
                .context("failed to split dataset")?;
            info!(
                n_train = split.train_labels.len(),
                n_test = split.test_labels.len(),
                "dataset split"
            );

            // 3. Train
            let config = RandomForestConfig::new(n_estimators)?
                .with_max_depth(max_depth.0)
                .with_max_features(parse_max_features(&max_features)?)
                .with_feature_subsampling(subsample_features)
                .with_seed(cli.seed);
            let mut forest = RandomForest::new(config);
            forest
                .fit(&split.train_features, &split.train_labels)
                .context("training failed")?;

            // 4. Evaluate on held-out rows
            let matrix = forest
                .evaluate(&split.test_features, &split.test_labels)
                .context("evaluation failed")?
                .with_class_names(&ApprovalStatus::CLASS_NAMES);
            info!(accuracy = matrix.accuracy(), "held-out evaluation complete");
            if !cli.quiet {
                eprintln!("{matrix}");
            }

            // 5. Save model
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            forest
                .save(writer.model_path())
                .context("failed to save model")?;
            info!(path = %writer.model_path().display(), "model saved");

            // 6. Write evaluation JSON
            let importances = forest.feature_importances();
            let ranked = forest.rank_features(dataset.feature_names());
            let ranks: Vec<usize> = dataset
                .feature_names()
                .iter()
                .map(|name| ranked.iter().find(|r| &r.name == name).map_or(0, |r| r.rank))
                .collect();
            let class_metrics: Vec<(f64, f64, f64, usize)> = matrix
                .class_metrics()
                .iter()
                .map(|m| (m.precision, m.recall, m.f1, m.support))
                .collect();

            writer.write_evaluation(&EvaluationReport {
                n_estimators,
                max_depth: max_depth.0,
                seed: cli.seed,
                n_train: split.train_labels.len(),
                n_test: split.test_labels.len(),
                accuracy: matrix.accuracy(),
                confusion_matrix: matrix.as_rows(),
                class_metrics: &class_metrics,
                feature_names: dataset.feature_names(),
                feature_importances: &importances,
                feature_ranks: &ranks,
            })?;

            // 7. Print summary
            let output = TrainOutput {
                experiment,
                n_samples: dataset.n_samples(),
                n_train: split.train_labels.len(),
                n_test: split.test_labels.len(),
                n_estimators,
                accuracy: matrix.accuracy(),
                top_feature: ranked.first().map(|r| r.name.clone()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            applicants,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Load model
            let handle = ModelHandle::load(&model).context("failed to load model")?;
            let forest = handle.current();
            info!(
                n_trees = forest.n_trees(),
                n_features = forest.n_features(),
                "model loaded"
            );

            // 2. Read applicants
            let profiles = read_profiles(&applicants).context("failed to read applicants CSV")?;

            // 3. Predict
            let statuses = assess(&forest, &profiles).context("prediction failed")?;

            // 4. Write predictions JSON
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_predictions(&profiles, &statuses)?;

            // 5. Print summary
            let output = PredictOutput {
                experiment,
                n_applicants: profiles.len(),
                n_approved: statuses.iter().filter(|s| s.is_approved()).count(),
                model_n_trees: forest.n_trees(),
                model_n_features: forest.n_features(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Recommend {
            packages,
            applicants,
            experiment,
            output_dir,
            model,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read inputs
            let catalog = read_packages(&packages).context("failed to read packages CSV")?;
            let profiles = read_profiles(&applicants).context("failed to read applicants CSV")?;

            // 2. Decide approval, from the model when one is given
            let status_source = if model.is_some() { "model" } else { "csv" };
            let profiles: Vec<CustomerProfile> = match &model {
                Some(path) => {
                    let handle = ModelHandle::load(path).context("failed to load model")?;
                    let forest = handle.current();
                    profiles
                        .iter()
                        .map(|p| with_predicted_status(&forest, p))
                        .collect::<Result<Vec<_>, _>>()
                        .context("prediction failed")?
                }
                None => profiles,
            };

            // 3. Rank packages for approved applicants
            let mut recommendations = Vec::with_capacity(profiles.len());
            for profile in &profiles {
                let packages = match recommend_for_approved(&catalog, profile) {
                    Ok(ranked) => ranked,
                    Err(LoanError::NotApproved { name }) => {
                        warn!(applicant = %name, "applicant not approved, no packages ranked");
                        Vec::new()
                    }
                    Err(e) => return Err(e.into()),
                };
                recommendations.push(ApplicantRecommendation {
                    applicant: &profile.name,
                    approved: profile.is_approved(),
                    packages,
                });
            }

            // 4. Write recommendations JSON
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_recommendations(&recommendations)?;

            // 5. Print summary
            let output = RecommendOutput {
                experiment,
                n_applicants: profiles.len(),
                n_approved: recommendations.iter().filter(|r| r.approved).count(),
                n_packages: catalog.len(),
                status_source,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
