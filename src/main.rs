use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};

use common::models::{ApiDeclaration, ModelResource};
use common::types::PredictorType;
use config::{ConfigValidator, UpdateStrategy};
use model_resolver::{load_declarations, AppOptions, ModelResolverApp};

/// Resolve and validate model artifacts before deployment
#[derive(Debug, Parser)]
#[command(name = "model-resolver", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "MODEL_RESOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory relative model paths are resolved against
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a single model, or every model in a directory
    Resolve {
        /// Model path, local or s3://
        path: String,

        /// Predictor the model is served with (tensorflow, onnx, python)
        #[arg(long, short)]
        predictor: PredictorType,

        /// The TensorFlow model is compiled for Inferentia
        #[arg(long)]
        neuron: bool,

        /// Model name, defaults to the last path component
        #[arg(long)]
        name: Option<String>,

        /// Treat the path as a directory holding one model per child
        #[arg(long)]
        models_dir: bool,
    },

    /// Resolve every API in a JSON file of API declarations
    ResolveFile {
        /// JSON file holding an array of API declarations
        file: PathBuf,
    },

    /// Validate a rolling update strategy
    CheckRollout {
        /// Pods that may be created above the desired count
        #[arg(long, default_value = "25%")]
        max_surge: String,

        /// Pods that may be unavailable during the update
        #[arg(long, default_value = "25%")]
        max_unavailable: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::CheckRollout { max_surge, max_unavailable } = &cli.command {
        ConfigValidator::validate_update_strategy(&UpdateStrategy {
            max_surge: max_surge.clone(),
            max_unavailable: max_unavailable.clone(),
        })?;
        println!("max_surge={} max_unavailable={} ok", max_surge, max_unavailable);
        return Ok(());
    }

    let options = AppOptions {
        config_path: cli.config.clone(),
        project_dir: cli.project_dir.clone(),
        json_logs: cli.json_logs,
    };
    let app = ModelResolverApp::new(&options).await?;

    match cli.command {
        Command::Resolve { path, predictor, neuron, name, models_dir } => {
            let api_name = name.unwrap_or_else(|| default_name(&path));
            let mut api = ApiDeclaration::new(api_name.clone(), predictor).with_neuron(neuron);
            api = if models_dir {
                api.with_models_dir(path)
            } else {
                api.with_model(ModelResource::new(api_name, path))
            };

            let models = app.resolve_api(&api).await?;
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
        Command::ResolveFile { file } => {
            let apis = load_declarations(&file)?;
            let resolved = app.resolve_apis(&apis).await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Command::CheckRollout { .. } => {}
    }

    Ok(())
}

fn default_name(path: &str) -> String {
    common::utils::base_name(path).to_string()
}
