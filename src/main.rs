//! Planwise - turn a project idea into a task plan.
//!
//! Runs the interactive wizard by default; subcommands cover scripted
//! generation and inspecting or clearing saved progress.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use planwise::core::{Config, StateFile, UploadFile, UserInputStore};
use planwise::tui::{self, Theme};
use planwise::wizard::{TaskBoard, View, COLUMNS};
use planwise::{ApiClient, App, WizardController};

/// Turn a project idea into a task plan
#[derive(Parser)]
#[command(name = "planwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend URL (overrides config and PLANWISE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive wizard (default)
    Run,

    /// Run every wizard step non-interactively and print the plan
    ///
    /// Starts from a clean wizard; the result replaces saved progress.
    Generate {
        /// Project description
        #[arg(short, long)]
        description: String,

        /// Requirements document to extract
        #[arg(short, long, value_name = "PATH")]
        requirements: Option<PathBuf>,

        /// Inspiration image (repeatable)
        #[arg(short, long, value_name = "PATH")]
        inspiration: Vec<PathBuf>,

        /// Integration to include (repeatable)
        #[arg(short = 'I', long = "integration", value_name = "NAME")]
        integrations: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show saved wizard input
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the saved task board
    Tasks {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Clear saved input and tasks
    Reset,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Run));
    init_logging(cli.verbose, interactive);

    let api_url = cli.api_url.as_deref();
    match cli.command {
        None | Some(Commands::Run) => {
            cmd_run(api_url)?;
        }
        Some(Commands::Generate { description, requirements, inspiration, integrations, format }) => {
            cmd_generate(api_url, description, requirements, inspiration, integrations, format)?;
        }
        Some(Commands::Show { format }) => {
            cmd_show(api_url, format)?;
        }
        Some(Commands::Tasks { format }) => {
            cmd_tasks(api_url, format)?;
        }
        Some(Commands::Reset) => {
            cmd_reset(api_url)?;
        }
        Some(Commands::Config { path }) => {
            cmd_config(api_url, path)?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Set up tracing. The wizard owns the screen, so it logs to a file.
fn init_logging(verbose: bool, to_file: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if to_file {
        let file = Config::data_dir().and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            OpenOptions::new().create(true).append(true).open(dir.join("planwise.log")).ok()
        });
        let layer = file.map(|file| {
            fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file))
        });
        tracing_subscriber::registry().with(layer).with(filter).init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .with(filter)
            .init();
    }
}

fn load_config(api_url: Option<&str>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
    }
    Ok(config)
}

fn open_store(config: &Config) -> UserInputStore {
    match config.state_file() {
        Some(path) => UserInputStore::open(StateFile::new(path)),
        None => UserInputStore::in_memory(),
    }
}

fn build_controller(config: &Config) -> Result<Arc<WizardController>> {
    let store = Arc::new(open_store(config));
    let client = ApiClient::from_config(&config.api).context("Failed to create HTTP client")?;
    Ok(Arc::new(WizardController::from_config(config, store, Arc::new(client))))
}

/// Run the interactive wizard.
fn cmd_run(api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let controller = build_controller(&config)?;
    tracing::info!("Starting wizard against {}", config.api.base_url);

    let app = App::new(controller, config.wizard.integrations.clone(), runtime.handle().clone())
        .with_theme(Theme::detect());
    tui::run_tui(app)
}

/// Drive the wizard from arguments.
fn cmd_generate(
    api_url: Option<&str>,
    description: String,
    requirements: Option<PathBuf>,
    inspiration: Vec<PathBuf>,
    integrations: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(api_url)?;
    let controller = build_controller(&config)?;

    let max_size = config.uploads.max_file_size;
    let read = |path: &PathBuf| UploadFile::from_path(path, max_size);
    let requirements = requirements.as_ref().map(read).transpose()?;
    let inspiration = inspiration.iter().map(read).collect::<Result<Vec<_>, _>>()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if let Err(e) = controller.reset() {
            eprintln!("Warning: {e}");
        }
        controller.set_description(description);

        controller.next_step();
        if let Some(file) = requirements {
            eprintln!("Processing {}...", file.name);
            controller.upload_files(vec![file]).await?;
        }

        controller.next_step();
        if !inspiration.is_empty() {
            eprintln!("Processing {} image(s)...", inspiration.len());
            controller.upload_files(inspiration).await?;
        }

        controller.next_step();
        let unique: BTreeSet<_> = integrations.into_iter().collect();
        for name in &unique {
            if !config.wizard.integrations.contains(name) {
                tracing::warn!("{} is not in the integration catalog", name);
            }
            controller.toggle_integration(name);
        }

        eprintln!("Generating tasks...");
        let view = controller.advance().await?;
        if view != View::TaskBoard {
            bail!("Task generation was interrupted");
        }
        Ok::<(), anyhow::Error>(())
    })?;

    if let Some(warning) = controller.status().warning {
        eprintln!("Warning: {warning}");
    }

    let tasks = controller.store().sorted_tasks();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
        OutputFormat::Text => print_board(&TaskBoard::new(tasks)),
    }
    Ok(())
}

/// Print saved wizard input.
fn cmd_show(api_url: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = load_config(api_url)?;
    let input = open_store(&config).user_input();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&input)?);
        return Ok(());
    }

    println!("Description:");
    println!("  {}", if input.description.is_empty() { "(none)" } else { input.description.as_str() });

    println!("\nRequirements:");
    match input.requirements.file_type {
        Some(ref file_type) => {
            println!("  {} characters from {}", input.requirements.content.len(), file_type);
        }
        None if input.requirements.content.is_empty() => println!("  (none)"),
        None => println!("  {} characters", input.requirements.content.len()),
    }

    println!("\nInspiration:");
    if input.inspiration.images.is_empty() {
        println!("  (none)");
    }
    for image in &input.inspiration.images {
        let modified = chrono::DateTime::from_timestamp_millis(image.last_modified)
            .map_or_else(String::new, |t| format!(", modified {}", t.format("%Y-%m-%d %H:%M")));
        println!("  {} ({}, {} bytes{})", image.name, image.mime_type, image.size, modified);
    }

    println!("\nIntegrations:");
    if input.integrations.is_empty() {
        println!("  (none)");
    } else {
        println!("  {}", input.integrations.join(", "));
    }

    Ok(())
}

/// Print the saved task board.
fn cmd_tasks(api_url: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = load_config(api_url)?;
    let tasks = open_store(&config).sorted_tasks();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
        OutputFormat::Text if tasks.is_empty() => {
            println!("No tasks yet. Run `planwise` to create a plan.");
        }
        OutputFormat::Text => print_board(&TaskBoard::new(tasks)),
    }
    Ok(())
}

fn print_board(board: &TaskBoard) {
    for status in COLUMNS {
        let column = board.column(status);
        println!("{} ({})", status.label(), column.len());
        for task in column {
            println!("  {:10} {}", task.id, task.title);
            if !task.description.is_empty() {
                println!("  {:10} {}", "", task.description);
            }
        }
        println!();
    }
    println!("Total: {} tasks", board.len());
}

/// Clear saved progress.
fn cmd_reset(api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let Some(path) = config.state_file() else {
        println!("Progress is not saved (storage.persist = false); nothing to reset.");
        return Ok(());
    };

    UserInputStore::open(StateFile::new(&path))
        .reset()
        .with_context(|| format!("Failed to reset {}", path.display()))?;
    println!("Cleared saved progress in {}", path.display());
    Ok(())
}

/// Show configuration.
fn cmd_config(api_url: Option<&str>, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = load_config(api_url)?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "planwise", &mut io::stdout());
}
