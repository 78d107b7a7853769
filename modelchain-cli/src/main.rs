//! Modelchain CLI
//!
//! The `modelchain` command runs a chain of Bedrock models, each stage
//! building on the output of the ones before it.
//!
//! ## Commands
//!
//! - `run`: Execute a preset or a JSON pipeline file
//! - `models`: List foundation models visible in the region

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modelchain::adapter::classify;
use modelchain::config::{apply_model_overrides, PipelineConfig};
use modelchain::events::LoggingEventSink;
use modelchain::pipeline::{PipelineReport, PipelineRunner, Preset};
use modelchain::testing::EchoTransport;
use modelchain::transport::{BedrockTransport, Transport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Level};

const BANNER_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "modelchain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chain Bedrock foundation models into a sequential pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline
    Run {
        /// Built-in pipeline (game, content, analysis)
        #[arg(short, long)]
        preset: Option<Preset>,

        /// JSON pipeline file; takes precedence over --preset
        #[arg(short, long)]
        stages: Option<PathBuf>,

        /// Request handed to the first stage
        #[arg(long)]
        project: Option<String>,

        /// AWS region
        #[arg(long)]
        region: Option<String>,

        /// Answer every stage with an echo instead of calling Bedrock
        #[arg(long)]
        simulate: bool,

        /// Write the run report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List foundation models
    Models {
        /// Only show models from this provider (e.g. Anthropic, Amazon)
        #[arg(long)]
        provider: Option<String>,

        /// AWS region
        #[arg(long)]
        region: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    match cli.command {
        Commands::Run {
            preset,
            stages,
            project,
            region,
            simulate,
            report,
        } => {
            let config =
                apply_run_flags(PipelineConfig::from_env()?, preset, stages, project, region);
            cmd_run(&config, simulate, report.as_deref())
        }
        Commands::Models { provider, region } => {
            let config = PipelineConfig::from_env()?;
            let region = region.unwrap_or(config.region);
            cmd_models(&region, provider.as_deref())
        }
    }
}

/// Layers command-line flags over the environment. `--preset` replaces a
/// stages file from the environment; `--stages` wins over both.
fn apply_run_flags(
    mut config: PipelineConfig,
    preset: Option<Preset>,
    stages: Option<PathBuf>,
    project: Option<String>,
    region: Option<String>,
) -> PipelineConfig {
    if let Some(preset) = preset {
        config = config.use_preset(preset);
    }
    if let Some(stages) = stages {
        config = config.with_stages_file(stages);
    }
    if let Some(project) = project {
        config = config.with_project_request(project);
    }
    if let Some(region) = region {
        config = config.with_region(region);
    }
    config
}

fn cmd_run(config: &PipelineConfig, simulate: bool, report_path: Option<&Path>) -> Result<()> {
    let mut pipeline = config.pipeline()?;
    apply_model_overrides(&mut pipeline, |key| std::env::var(key).ok());

    let transport: Box<dyn Transport> = if simulate {
        info!("Simulating model calls, Bedrock will not be contacted");
        Box::new(EchoTransport::new().with_prefix("[simulated] "))
    } else {
        Box::new(
            BedrockTransport::connect(&config.region)
                .context("Failed to set up the Bedrock client")?,
        )
    };

    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("Pipeline: {} ({} stages)", pipeline.name(), pipeline.len());
    println!("Request: {}", config.request());
    for (index, stage) in pipeline.stages().iter().enumerate() {
        println!("  {}. {} -> {}", index + 1, stage.label, stage.model_id);
    }
    println!("{}", "=".repeat(BANNER_WIDTH));

    let runner =
        PipelineRunner::new(transport).with_event_sink(Arc::new(LoggingEventSink::debug()));

    match runner.run(&pipeline, config.request()) {
        Ok(report) => {
            print_outputs(&report);
            println!("\n{}", report.summary_table());
            write_report(report_path, &report)?;
            Ok(())
        }
        Err(failure) => {
            print_outputs(&failure.report);
            eprintln!("\n{}", failure.report.summary_table());
            eprintln!("\n{}", failure.diagnostics(&config.region));
            write_report(report_path, &failure.report)?;
            Err(failure.into())
        }
    }
}

fn print_outputs(report: &PipelineReport) {
    for output in &report.outputs {
        println!("\n{}", "=".repeat(BANNER_WIDTH));
        println!("{}", output.label.to_uppercase());
        println!("{}", "=".repeat(BANNER_WIDTH));
        println!("{}", output.text);
    }
}

fn write_report(path: Option<&Path>, report: &PipelineReport) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

fn cmd_models(region: &str, provider: Option<&str>) -> Result<()> {
    let transport =
        BedrockTransport::connect(region).context("Failed to set up the Bedrock client")?;
    let models = transport
        .list_foundation_models()
        .context("Failed to list foundation models")?;

    let wanted = provider.map(str::to_ascii_lowercase);
    let mut shown = 0usize;
    for model in &models {
        let provider_name = model.provider_name.as_deref().unwrap_or("-");
        if let Some(wanted) = &wanted {
            if provider_name.to_ascii_lowercase() != *wanted {
                continue;
            }
        }
        let family = classify(&model.model_id)
            .map_or_else(|_| "unsupported".to_string(), |f| f.to_string());
        println!(
            "{:<50} {:<12} {:<12} {}",
            model.model_id,
            provider_name,
            family,
            model.model_name.as_deref().unwrap_or("")
        );
        shown += 1;
    }
    info!(region, shown, total = models.len(), "Listed foundation models");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "modelchain",
            "--verbose",
            "run",
            "--preset",
            "content",
            "--project",
            "A to-do app",
            "--simulate",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                preset,
                project,
                simulate,
                stages,
                ..
            } => {
                assert_eq!(preset, Some(Preset::Content));
                assert_eq!(project.as_deref(), Some("A to-do app"));
                assert!(simulate);
                assert!(stages.is_none());
            }
            Commands::Models { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_preset_flag_beats_env_stages_file() {
        let env = PipelineConfig::new().with_stages_file("from-env.json");

        let config = apply_run_flags(env.clone(), Some(Preset::Analysis), None, None, None);
        assert_eq!(config.stages_file, None);
        assert_eq!(config.preset, Preset::Analysis);

        let config = apply_run_flags(
            env,
            Some(Preset::Analysis),
            Some(PathBuf::from("flag.json")),
            Some("req".to_string()),
            Some("eu-west-1".to_string()),
        );
        assert_eq!(config.stages_file, Some(PathBuf::from("flag.json")));
        assert_eq!(config.request(), "req");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(Cli::try_parse_from(["modelchain", "run", "--preset", "poetry"]).is_err());
    }

    #[test]
    fn test_parse_models_provider() {
        let cli = Cli::try_parse_from(["modelchain", "models", "--provider", "Anthropic"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Models { provider: Some(ref p), .. } if p == "Anthropic"
        ));
    }
}
