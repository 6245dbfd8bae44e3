use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;

use somnia::{
    init_logger, normalize_category, ApiClient, CategoryField, ModelManager, PredictionRequest, PredictionService,
    ServerConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP prediction API
    Serve {
        /// Model artifact to load (defaults to $SOMNIA_MODEL, then ./models)
        #[arg(short, long)]
        model: Option<PathBuf>,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
        /// Expected SHA-256 of the artifact
        #[arg(long)]
        sha256: Option<String>,
        /// Exit instead of serving 503s when the model cannot be loaded
        #[arg(long)]
        require_model: bool,
        /// Disable cross-origin headers
        #[arg(long)]
        no_cors: bool,
    },
    /// Print a summary of a model artifact
    Inspect {
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Predict from a JSON file holding one request or an array of requests
    Predict {
        #[arg(short, long)]
        model: Option<PathBuf>,
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Smoke-test a running server
    Check {
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// Download an artifact and verify it before installing it
    Fetch {
        #[arg(short, long)]
        url: String,
        #[arg(long)]
        sha256: String,
        /// Destination path (defaults to $SOMNIA_MODEL, then ./models)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

fn manager_for(model: Option<PathBuf>) -> ModelManager {
    model.map(ModelManager::new).unwrap_or_else(ModelManager::new_default)
}

fn inspect(manager: &ModelManager) -> Result<()> {
    let model = manager.load_model()?;
    let tree = model.tree();
    println!("Artifact:       {}", manager.model_path().display());
    println!("SHA-256:        {}", manager.compute_hash()?);
    println!("Tree depth:     {}", tree.depth());
    println!("Leaves:         {}", tree.root().n_leaves());
    let metadata = model.metadata();
    if let Some(accuracy) = metadata.accuracy {
        println!("Accuracy:       {:.4}", accuracy);
    }
    if let Some(trained_on) = &metadata.trained_on {
        println!("Trained on:     {}", trained_on);
    }

    for field in CategoryField::ALL {
        println!("\n{}:", field.column_name());
        for (code, value) in model.category(field).values().iter().enumerate() {
            println!("  {:>2}: {}", code, value);
        }
    }

    println!("\nFeature order:");
    for (index, feature) in model.feature_order().iter().enumerate() {
        println!("  {:>2}: {}", index, feature);
    }

    let service = PredictionService::with_model(model);
    let example = service.example_request()?;
    println!("\nExample request:\n{}", serde_json::to_string_pretty(&example)?);
    let model = service.predictor()?.model();
    let occupation_ok = model.category(CategoryField::Occupation).contains(&example.occupation);
    let bmi_ok = normalize_category(CategoryField::BmiCategory, &example.bmi_category)
        .map(|canonical| model.category(CategoryField::BmiCategory).contains(&canonical))
        .unwrap_or(false);
    println!("Occupation '{}' valid: {}", example.occupation, occupation_ok);
    println!("BMI category '{}' valid: {}", example.bmi_category, bmi_ok);
    Ok(())
}

fn predict_file(manager: &ModelManager, input: &Path) -> Result<()> {
    let model = manager.load_model()?;
    let service = PredictionService::with_model(model);
    let text = fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let value: Value = serde_json::from_str(&text).context("Input is not valid JSON")?;

    if let Value::Array(items) = value {
        println!("{}", serde_json::to_string_pretty(&service.predict_batch(items)?)?);
        return Ok(());
    }

    let request: PredictionRequest = serde_json::from_value(value).context("Input is not a prediction request")?;
    let result = service.predictor()?.predict_request(&request)?;
    println!("Prediction: {}", result.label);
    println!("Confidence: {:.2}%", result.confidence);
    println!("Message:    {}", result.message);

    let mut probabilities = result.probabilities;
    probabilities.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    println!("Probabilities:");
    for p in probabilities {
        println!("  {:<12} {:.1}%", p.label, p.probability * 100.0);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    match args.command {
        Command::Serve { model, host, port, sha256, require_model, no_cors } => {
            let config = ServerConfig {
                host,
                port,
                model_path: model.unwrap_or_else(ModelManager::get_default_model_path),
                expected_sha256: sha256,
                require_model,
                cors: !no_cors,
            };
            info!("=== Starting Sleep Disorder Prediction API ===");
            let service = PredictionService::from_config(&config).context("Failed to load model")?;
            somnia::server::serve(&config, service).await?;
        }
        Command::Inspect { model } => inspect(&manager_for(model))?,
        Command::Predict { model, input } => predict_file(&manager_for(model), &input)?,
        Command::Check { url } => {
            let report = ApiClient::new(url).smoke_check().await;
            print!("{}", report);
            if !report.all_passed() {
                bail!("Some checks failed");
            }
            println!("All checks passed");
        }
        Command::Fetch { url, sha256, model } => {
            let manager = manager_for(model);
            let model = manager.ensure_model_downloaded(&url, &sha256).await?;
            info!(
                "Model ready at {:?} with classes {:?}",
                manager.model_path(),
                model.class_labels()
            );
        }
    }

    Ok(())
}
