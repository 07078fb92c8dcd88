use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use liftrs::config::EngineConfig;
use liftrs::engine::{AdaptiveProgressionEngine, ProgressionInput, ProgressionOutcome};
use liftrs::error::ErrorSeverity;
use liftrs::export::{self, ExportFormat};
use liftrs::logging::{init_logging, LogConfig};
use liftrs::regenerate::RegeneratedPlanWorkout;
use liftrs::validation::{PlanValidator, ValidationReport};

/// LiftRS - Adaptive Progression CLI
///
/// Turns logged strength-training history into a readiness assessment and a
/// revised, safety-bounded workout plan with a four-week cycle.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(author = "LiftRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Adaptive workout progression CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute performance metrics and the progression recommendation
    Analyze {
        /// Progression input file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Regenerate the plan from logged history
    Regenerate {
        /// Progression input file (JSON object, or array for a batch)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (stdout if omitted; the format's extension is added when missing)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, csv, text)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,

        /// Skip the four-week cycle expansion
        #[arg(long)]
        no_cycle: bool,
    },

    /// Validate regenerated workouts (JSON array)
    Validate {
        /// Regenerated workouts file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

/// A single request or a batch of independent requests
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Batch(Vec<ProgressionInput>),
    Single(Box<ProgressionInput>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::for_verbosity(cli.verbose))?;

    let config_path = cli.config.clone().unwrap_or_else(EngineConfig::default_config_path);
    let config = if matches!(cli.command, Commands::Config { init: true, .. }) {
        EngineConfig::default()
    } else {
        load_config(cli.config.as_deref())?
    };

    match cli.command {
        Commands::Analyze { input } => {
            let input = ProgressionInput::from_json_file(&input)
                .with_context(|| format!("Failed to load input: {}", input.display()))?;
            preflight(&input);

            let engine = AdaptiveProgressionEngine::with_config(&config);
            let (metrics, recommendation) = engine.analyze(&input);

            println!("{}", "Performance analysis".cyan().bold());
            println!("  Completion rate:    {:.1}%", metrics.completion_rate);
            println!("  Volume progression: {:+.1}%", metrics.volume_progression);
            match metrics.average_rpe {
                Some(rpe) => println!("  Average RPE:        {:.1}", rpe),
                None => println!("  Average RPE:        n/a"),
            }
            println!("  Consistency:        {:.1}", metrics.consistency_score);
            println!("  Readiness:          {:.1}", metrics.readiness_score);
            println!("  Recovery:           {:.1}", metrics.recovery_score);
            println!("  Performance score:  {:.1}", metrics.performance_score());
            println!();
            println!(
                "{} {} (volume {:+}%, intensity {:+}%, confidence {:.0})",
                "Recommendation:".bold(),
                recommendation.action.to_string().to_uppercase().green().bold(),
                recommendation.volume_adjustment,
                recommendation.intensity_adjustment,
                recommendation.confidence
            );
            println!("  {}", recommendation.rationale);
        }

        Commands::Regenerate {
            input,
            output,
            format,
            no_cycle,
        } => {
            let format: ExportFormat = format.parse()?;
            let content = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read input file: {}", input.display()))?;
            let document: InputDocument = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse input file: {}", input.display()))?;

            let config = EngineConfig {
                generate_cycle: config.generate_cycle && !no_cycle,
                ..config
            };
            let engine = AdaptiveProgressionEngine::with_config(&config);

            let outcomes = match document {
                InputDocument::Single(input) => {
                    preflight(&input);
                    vec![engine.regenerate(&input)]
                }
                InputDocument::Batch(inputs) => {
                    inputs.iter().for_each(preflight);
                    engine.regenerate_batch(&inputs)
                }
            };

            for outcome in &outcomes {
                print_summary(outcome);
            }
            write_outcomes(&outcomes, format, output.as_deref())?;
        }

        Commands::Validate { input } => {
            let content = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read workouts file: {}", input.display()))?;
            let workouts: Vec<RegeneratedPlanWorkout> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse workouts file: {}", input.display()))?;

            let report = PlanValidator::with_config(config.validation.clone()).validate(&workouts);
            print_report(&report);
        }

        Commands::Config { init, show } => {
            if init {
                let mut fresh = EngineConfig::default();
                fresh.save_to_file(&config_path)?;
                println!("{} {}", "✓ Configuration written to".green(), config_path.display());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from_file(path),
        None => Ok(EngineConfig::load_or_default()),
    }
}

/// Report structural problems without stopping the run
fn preflight(input: &ProgressionInput) {
    if let Err(err) = input.check() {
        match err.severity() {
            ErrorSeverity::Warning => {
                tracing::warn!(plan_id = %input.plan.id, error = %err, "Input pre-flight failed")
            }
            ErrorSeverity::Error => {
                tracing::error!(plan_id = %input.plan.id, error = %err, "Input pre-flight failed")
            }
        }
        eprintln!("{} {}", "⚠".yellow(), err.user_message().yellow());
    }
}

fn print_summary(outcome: &ProgressionOutcome) {
    eprintln!(
        "{} {}: {} ({} workouts, {} safety adjustments, {} warnings)",
        "✓".green(),
        outcome.plan_id.bold(),
        outcome.recommendation.action.to_string().to_uppercase(),
        outcome.workouts.len(),
        outcome.safety_adjustments.len(),
        outcome.validation.warnings.len()
    );
}

fn write_outcomes(outcomes: &[ProgressionOutcome], format: ExportFormat, output: Option<&Path>) -> Result<()> {
    if let [outcome] = outcomes {
        match output {
            Some(path) => {
                let path = export::output_path(path, format);
                export::export_outcome(outcome, format, &path)?;
                eprintln!("{} {}", "✓ Written to".green(), path.display());
            }
            None => println!("{}", export::render(outcome, format)?),
        }
        return Ok(());
    }

    let rendered = match format {
        ExportFormat::Json => export::json::to_json_string(&outcomes)?,
        ExportFormat::Csv => {
            let workouts: Vec<RegeneratedPlanWorkout> =
                outcomes.iter().flat_map(|o| o.workouts.iter().cloned()).collect();
            let mut buffer = Vec::new();
            export::csv::write_workouts(&workouts, &mut buffer)?;
            String::from_utf8(buffer)?
        }
        ExportFormat::Text => outcomes
            .iter()
            .map(export::text::render_outcome)
            .collect::<Vec<_>>()
            .join("\n"),
    };

    match output {
        Some(path) => {
            let path = export::output_path(path, format);
            fs::write(&path, rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!("{} {}", "✓ Written to".green(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    if report.valid {
        println!("{}", "✓ Plan passed all checks".green().bold());
        return;
    }

    println!("{}", format!("{} warning(s)", report.warnings.len()).yellow().bold());
    for warning in &report.warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }
}
