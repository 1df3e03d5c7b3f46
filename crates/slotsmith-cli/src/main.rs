//! Slotsmith CLI - propose meeting slots from a free-text calendar

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use slotsmith_core::config::{
    COMPRESSION_KEY_VARS, Config, compression_api_key, generation_api_key,
};
use slotsmith_core::pipeline::{Credentials, Pipeline, PipelineOutcome};
use slotsmith_core::schedule::{ScheduleCandidate, find_slots};
use tracing::{debug, warn};

const DEMO_CALENDAR: &str = "MONDAY
09:00 AM - 10:00 AM: Weekly Team Sync
13:00 PM - 14:00 PM: Deep Work Block

TUESDAY
10:00 AM - 11:00 AM: Client Introduction Call
14:00 PM - 15:00 PM: Project Review

WEDNESDAY
09:00 AM - 12:00 PM: Coding Sprint (Do not disturb)
15:00 PM - 15:30 PM: 1:1 with Manager

THURSDAY
11:00 AM - 12:00 PM: All Hands Meeting";

const DEMO_PREFERENCES: &str = "I need to schedule a 30-minute sync with the design team.
Avoid Tuesday mornings.
Wednesday afternoon is best.
Ensure it doesn't overlap with existing meetings.";

const STDIN_PATH: &str = "-";

#[derive(Parser)]
#[command(name = "slotsmith")]
#[command(author, version, about = "Propose meeting slots from a free-text calendar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: compress, generate, fall back as needed
    Optimize {
        /// Calendar file ("-" for stdin)
        #[arg(short, long)]
        calendar: Option<PathBuf>,
        /// Preferences file ("-" for stdin)
        #[arg(short, long)]
        preferences: Option<PathBuf>,
        /// Use the built-in demo calendar and preferences for missing inputs
        #[arg(long)]
        demo: bool,
        /// Generation model ID (defaults to generation.default_model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Run only the local slot-finding heuristic
    Slots {
        /// Calendar file ("-" for stdin)
        #[arg(short, long)]
        calendar: Option<PathBuf>,
        /// Use the built-in demo calendar
        #[arg(long)]
        demo: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slotsmith=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Optimize {
            calendar,
            preferences,
            demo,
            model,
        } => {
            cmd_optimize(
                calendar.as_deref(),
                preferences.as_deref(),
                demo,
                model.as_deref(),
                cli.format,
                cli.quiet,
            )
            .await
        }

        Commands::Slots { calendar, demo } => {
            cmd_slots(calendar.as_deref(), demo, cli.format, cli.quiet)
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),
    };

    if let Err(e) = &result
        && let Some(hint) = error_hint(e)
    {
        eprintln!("Hint: {}", hint);
    }
    result
}

/// Recovery suggestion for errors raised by the core library
fn error_hint(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<slotsmith_core::Error>())
        .and_then(|e| e.suggestion())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_optimize(
    calendar: Option<&Path>,
    preferences: Option<&Path>,
    demo: bool,
    model: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?.with_env_overrides();
    config.validate()?;

    let model = resolve_model(model, &config)?;
    let (calendar_text, preferences_text) = read_inputs(calendar, preferences, demo)?;

    let mut credentials = Credentials::new(model);
    match compression_api_key() {
        Some(key) => credentials = credentials.with_compression_key(key),
        None => warn!(
            "No compression API key set ({}); direct mode is unavailable",
            COMPRESSION_KEY_VARS.join(" or ")
        ),
    }
    if let Some(key) = generation_api_key() {
        credentials = credentials.with_generation_key(key);
    }
    debug!(?credentials, "Resolved credentials");

    let pipeline = Pipeline::from_config(&config)?;
    let outcome = pipeline
        .run(&calendar_text, &preferences_text, &credentials)
        .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome, quiet),
    }
    Ok(())
}

fn cmd_slots(
    calendar: Option<&Path>,
    demo: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let calendar_text = match calendar {
        Some(path) => read_input(path)?,
        None if demo => DEMO_CALENDAR.to_string(),
        None => return Err(missing_calendar()),
    };

    let candidates = find_slots(&calendar_text);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&candidates)?),
        OutputFormat::Text => {
            if !quiet {
                println!("Proposed slots");
                println!("==============");
            }
            print_candidates(&candidates);
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

// ============================================================================
// Input
// ============================================================================

fn resolve_model(model: Option<&str>, config: &Config) -> anyhow::Result<String> {
    match model {
        Some(model) if model.trim().is_empty() => Err(anyhow!("Model ID must not be empty")),
        Some(model) => Ok(model.trim().to_string()),
        None => Ok(config.generation.default_model.clone()),
    }
}

fn read_inputs(
    calendar: Option<&Path>,
    preferences: Option<&Path>,
    demo: bool,
) -> anyhow::Result<(String, String)> {
    if calendar.is_some_and(is_stdin) && preferences.is_some_and(is_stdin) {
        return Err(anyhow!("Only one input can be read from stdin"));
    }

    let calendar_text = match calendar {
        Some(path) => read_input(path)?,
        None if demo => DEMO_CALENDAR.to_string(),
        None => return Err(missing_calendar()),
    };
    let preferences_text = match preferences {
        Some(path) => read_input(path)?,
        None if demo => DEMO_PREFERENCES.to_string(),
        None => String::new(),
    };

    Ok((calendar_text, preferences_text))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn missing_calendar() -> anyhow::Error {
    anyhow!("No calendar given. Pass --calendar FILE, --calendar - for stdin, or --demo")
}

// ============================================================================
// Output
// ============================================================================

fn print_outcome(outcome: &PipelineOutcome, quiet: bool) {
    let result = &outcome.result;

    if !quiet {
        if let Some(banner) = outcome.banner() {
            println!("{}", banner);
            println!();
        }

        let metrics = &result.metrics;
        println!("Original size:     {} chars", metrics.raw_input_size);
        println!("Compressed size:   {} chars", metrics.compressed_input_size);
        println!("Compression ratio: {}", metrics.compression_ratio);
        println!(
            "Latency:           compression {} ms, generation {} ms, total {} ms",
            metrics.compression_latency_ms,
            metrics.generation_latency_ms,
            metrics.total_pipeline_ms
        );
        println!("Speedup:           {}", metrics.speedup_factor);
        println!();

        println!("Compressed context");
        println!("------------------");
        if result.compressed_text.is_empty() {
            println!("Error: No compressed text returned.");
        } else {
            println!("{}", result.compressed_text);
        }
        println!();

        println!("Proposed slots");
        println!("--------------");
    }

    match result.candidates() {
        Some(candidates) => print_candidates(&candidates),
        None if !result.schedule.trim().is_empty() => println!("{}", result.schedule.trim()),
        None => {}
    }
}

fn print_candidates(candidates: &[ScheduleCandidate]) {
    for (index, candidate) in candidates.iter().enumerate() {
        println!("{}", format_candidate(index, candidate));
    }
}

fn format_candidate(index: usize, candidate: &ScheduleCandidate) -> String {
    let title = if candidate.title.trim().is_empty() {
        format!("Option {}", index + 1)
    } else {
        candidate.title.clone()
    };
    format!(
        "{}. {}\n   {} | {} ({} min)\n   Why this works: {}",
        index + 1,
        title,
        candidate.date,
        candidate.time,
        candidate.duration_minutes,
        candidate.reasoning
    )
}
