//! Prompt Copilot - offline prompt-template browser
//!
//! CLI entry point: opens the browser or runs one-shot catalog commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use promptcopilot::catalog::{Catalog, Task, VarSpec, display_value, load_catalog};
use promptcopilot::cli::{Cli, Command, get_log_path};
use promptcopilot::compose::{Mode, compose_task};
use promptcopilot::config::Config;
use promptcopilot::diagnostic::{DiagnosticStatus, MISSING_HINT, diagnose, locate};
use promptcopilot::form::{FORM_COLUMNS, Form};
use promptcopilot::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let catalog_path = cli.catalog.clone().unwrap_or_else(|| config.catalog.path.clone());
    info!("Prompt Copilot using catalog {}", catalog_path.display());

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Browse) => {
            debug!("main: matched Browse command");
            let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
            tui::run(catalog_path, config.ui.default_mode, tick_rate)
        }
        Some(Command::Categories) => {
            debug!("main: matched Categories command");
            cmd_categories(&catalog_path)
        }
        Some(Command::Tasks { category }) => {
            debug!(%category, "main: matched Tasks command");
            cmd_tasks(&catalog_path, &category)
        }
        Some(Command::Show { category, task }) => {
            debug!(%category, %task, "main: matched Show command");
            cmd_show(&catalog_path, &category, &task)
        }
        Some(Command::Compose {
            category,
            task,
            mode,
            set,
        }) => {
            debug!(%category, %task, ?mode, "main: matched Compose command");
            let mode = mode.unwrap_or(config.ui.default_mode);
            cmd_compose(&catalog_path, &category, &task, mode, &set)
        }
        Some(Command::Modes) => {
            debug!("main: matched Modes command");
            cmd_modes();
            Ok(())
        }
        Some(Command::Doctor { dir, file }) => {
            debug!(?dir, ?file, "main: matched Doctor command");
            cmd_doctor(&catalog_path, dir, file)
        }
    }
}

/// Load the catalog, treating a missing file as an error
fn load_required_catalog(path: &Path) -> Result<Catalog> {
    load_catalog(path)
        .context(format!("Failed to load catalog {}", path.display()))?
        .ok_or_else(|| {
            eyre!(
                "Catalog file `{}` not found. Make sure it is in the same directory. Run `pc doctor` for details",
                path.display()
            )
        })
}

fn find_task<'a>(catalog: &'a Catalog, category: &str, task: &str) -> Result<&'a Task> {
    let tasks = catalog
        .category(category)
        .ok_or_else(|| eyre!("Unknown category '{}'", category))?;
    tasks
        .task(task)
        .ok_or_else(|| eyre!("Unknown task '{}' in category '{}'", task, category))
}

fn cmd_categories(path: &Path) -> Result<()> {
    let catalog = load_required_catalog(path)?;
    if catalog.is_empty() {
        println!("{}", "No categories".dimmed());
        return Ok(());
    }
    for (name, category) in catalog.categories() {
        println!("{}  {}", name.bold(), format!("({} tasks)", category.len()).dimmed());
    }
    Ok(())
}

fn cmd_tasks(path: &Path, category: &str) -> Result<()> {
    let catalog = load_required_catalog(path)?;
    let tasks = catalog
        .category(category)
        .ok_or_else(|| eyre!("Unknown category '{}'", category))?;
    if tasks.is_empty() {
        println!("{}", "No tasks".dimmed());
        return Ok(());
    }
    for (name, task) in tasks.tasks() {
        match &task.description {
            Some(description) => println!("{}  {}", name.bold(), description.dimmed()),
            None => println!("{}", name.bold()),
        }
    }
    Ok(())
}

fn cmd_show(path: &Path, category: &str, task_name: &str) -> Result<()> {
    let catalog = load_required_catalog(path)?;
    let task = find_task(&catalog, category, task_name)?;

    println!("{} / {}", category.cyan().bold(), task_name.cyan().bold());
    if let Some(description) = &task.description {
        println!("{}", description);
    }
    println!();

    println!("{}", "Template:".bold());
    match &task.template {
        Some(template) => println!("{}", template),
        None => println!("{}", "(no template)".red()),
    }
    println!();

    println!("{}", "Variables:".bold());
    if task.variables.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (index, variable) in task.variables.iter().enumerate() {
        let default = match &variable.spec {
            VarSpec::Scalar(value) => format!("\"{}\"", value),
            VarSpec::Choice(options) | VarSpec::MultiChoice(options) => options
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(" | "),
        };
        println!(
            "  {:<20} {:<7} col {}  {}",
            variable.label.green(),
            variable.spec.kind(),
            index % FORM_COLUMNS + 1,
            default.dimmed()
        );
    }
    Ok(())
}

fn cmd_compose(path: &Path, category: &str, task_name: &str, mode: Mode, set: &[(String, String)]) -> Result<()> {
    let catalog = load_required_catalog(path)?;
    let task = find_task(&catalog, category, task_name)?;

    let mut form = Form::from_task(task);
    form.apply_overrides(set)?;

    let prompt = compose_task(task, &form.snapshot(), mode).context("Failed to compose prompt, check the template")?;
    println!("{}", prompt);
    Ok(())
}

fn cmd_modes() {
    for mode in Mode::ALL {
        let value = mode.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
        println!("{:<12} {}", value.cyan(), mode.label());
    }
}

fn cmd_doctor(catalog_path: &Path, dir: Option<PathBuf>, file: Option<String>) -> Result<()> {
    let (default_dir, default_file) = locate(catalog_path);
    let dir = dir.unwrap_or(default_dir);
    let file = file.unwrap_or(default_file);

    let report = diagnose(&dir, &file)?;

    println!("{} {}", "Directory:".bold(), report.dir);
    for entry in &report.entries {
        if *entry == report.filename {
            println!("  {}", entry.green().bold());
        } else {
            println!("  {}", entry);
        }
    }
    println!();

    match &report.status {
        DiagnosticStatus::Missing => {
            println!("{} {}", "⚠".yellow(), report.summary().yellow());
            println!("{}", MISSING_HINT);
        }
        DiagnosticStatus::Malformed { .. } => {
            println!("{} {}", "✗".red(), report.summary().red());
        }
        DiagnosticStatus::Valid { .. } => {
            println!("{} {}", "✓".green(), report.summary().green());
        }
    }
    Ok(())
}
