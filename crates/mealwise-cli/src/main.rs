mod chat_cmd;
mod config;
mod export_cmd;
mod generate_cmd;
mod progress_cmd;
mod reset_cmd;
mod tui;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mealwise_core::export::DEFAULT_FILE_NAME;
use mealwise_core::profile::UserProfile;

use config::MealwiseConfig;

#[derive(Parser)]
#[command(
    name = "mealwise",
    version,
    about = "Build a weekly nutrition plan with an LLM and track your progress"
)]
struct Cli {
    /// Gemini API key (overrides MEALWISE_API_KEY / GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Defaults to `wizard` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a mealwise config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Launch the interactive wizard (default)
    Wizard,
    /// Profile helpers
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Generate a plan from a profile file without the wizard
    Generate {
        /// Path to a profile TOML file (see `mealwise profile template`)
        #[arg(long)]
        profile: PathBuf,
        /// Accept the terms of use
        #[arg(long)]
        accept_terms: bool,
        /// Write the plan JSON here (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also render the plan as a PDF at this path
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// Render a saved plan JSON file as a PDF
    Export {
        /// Path to a plan JSON file
        #[arg(long)]
        plan: PathBuf,
        /// Output PDF path
        #[arg(long, default_value = DEFAULT_FILE_NAME)]
        output: PathBuf,
    },
    /// Chat with the nutrition assistant about a saved plan
    Chat {
        /// Path to a plan JSON file
        #[arg(long)]
        plan: PathBuf,
    },
    /// Weight and photo progress log
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },
    /// Erase the progress history
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print a profile TOML template to stdout
    Template,
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Record a weigh-in
    Add {
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Front photo (any common image format)
        #[arg(long)]
        front: Option<PathBuf>,
        /// Back photo
        #[arg(long)]
        back: Option<PathBuf>,
        /// Side photo
        #[arg(long)]
        side: Option<PathBuf>,
    },
    /// Show the history, newest first, and the weight trend
    Show,
}

/// Execute the `mealwise init` command: write config file.
fn cmd_init(api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        api: config::ApiSection {
            key: api_key.map(str::to_string),
            ..config::ApiSection::default()
        },
        ..config::ConfigFile::default()
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => {
            let prefix: String = key.chars().take(4).collect();
            println!("  api.key = {prefix}...");
        }
        None => {
            println!("  api.key = (not set)");
            println!();
            println!("Set MEALWISE_API_KEY or re-run with --api-key before generating a plan.");
        }
    }

    Ok(())
}

/// Execute the `mealwise profile template` command.
fn cmd_profile_template() -> anyhow::Result<()> {
    let template =
        toml::to_string_pretty(&UserProfile::default()).context("failed to render template")?;
    println!("# mealwise profile. Edit and pass to `mealwise generate --profile`.");
    print!("{template}");
    Ok(())
}

/// Install the global subscriber. The TUI owns the terminal, so its logs go
/// to `mealwise.log` in the data directory instead of stderr.
fn init_tracing(log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Resolve config and start logging for commands that need both.
fn setup(api_key: Option<&str>, tui: bool) -> anyhow::Result<MealwiseConfig> {
    let config = MealwiseConfig::resolve(api_key)?;
    init_tracing(tui.then(|| config.data_dir.join("mealwise.log")))?;
    if config.gemini.api_key.is_none() {
        tracing::warn!("no API key configured; plan generation and chat will fail");
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api_key = cli.api_key.as_deref();

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Init { force } => {
            init_tracing(None)?;
            cmd_init(api_key, force)?;
        }
        Commands::Profile {
            command: ProfileCommands::Template,
        } => {
            cmd_profile_template()?;
        }
        Commands::Wizard => {
            let config = setup(api_key, true)?;
            tui::run_wizard(&config).await?;
        }
        Commands::Generate {
            profile,
            accept_terms,
            output,
            pdf,
        } => {
            let config = setup(api_key, false)?;
            let options = generate_cmd::GenerateOptions {
                profile,
                accept_terms,
                output,
                pdf,
            };
            generate_cmd::run_generate(&config, &options).await?;
        }
        Commands::Export { plan, output } => {
            init_tracing(None)?;
            export_cmd::run_export(&plan, &output)?;
        }
        Commands::Chat { plan } => {
            let config = setup(api_key, false)?;
            chat_cmd::run_chat(&config, &plan).await?;
        }
        Commands::Progress { command } => {
            let config = setup(api_key, false)?;
            let mut log = config.progress_log();
            progress_cmd::run_progress_command(command, &mut log).await?;
        }
        Commands::Reset { yes } => {
            let config = setup(api_key, false)?;
            let mut log = config.progress_log();
            reset_cmd::run_reset(&mut log, yes)?;
        }
    }

    Ok(())
}
