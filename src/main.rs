//! Hostpilot CLI - interactive console and headless runner

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use colored::Colorize;

use hostpilot::catalog::Category;
use hostpilot::error::{FixSuggestion, HostpilotError, Result};
use hostpilot::logstore::{redact_result, FileLogStore, LogStore, MemoryLogStore};
use hostpilot::{run_batch, ActionProvider, AppConfig, Catalog, FieldValues, ShellRunner};

/// Diagnostics file under the data dir in console mode
const DIAGNOSTICS_FILE: &str = "hostpilot.log";

#[derive(Parser)]
#[command(name = "hostpilot")]
#[command(about = "Hostpilot - terminal console for installing and maintaining server software")]
#[command(version)]
struct Cli {
    /// Keep the command log in memory only
    #[arg(long, global = true)]
    no_log: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive console (default)
    Tui,

    /// List services and their actions
    Catalog,

    /// Run one action without the console
    Run {
        /// Service id (see `hostpilot catalog`)
        service: String,

        /// Action id
        action: String,

        /// Field value, repeatable
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Print the command log
    Logs {
        /// Show only the last N lines
        #[arg(short, long)]
        tail: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    init_tracing(matches!(command, Commands::Tui));

    let result = match AppConfig::load() {
        Ok(config) => {
            let config = config.with_env();
            let log = log_store(&config, cli.no_log);
            match command {
                Commands::Tui => hostpilot::tui::run(config, log).await,
                Commands::Catalog => list_catalog(&config),
                Commands::Run {
                    service,
                    action,
                    set,
                } => run_action(&config, log, &service, &action, &set).await,
                Commands::Logs { tail } => print_logs(log.as_ref(), tail),
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

/// Console mode writes diagnostics to a file so the screen stays clean
fn init_tracing(console: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if console {
        let dir = AppConfig::data_dir();
        match open_diagnostics(&dir) {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init(),
            Err(e) => eprintln!(
                "{} diagnostics disabled, cannot open {}: {}",
                "Warning:".yellow().bold(),
                dir.join(DIAGNOSTICS_FILE).display(),
                e
            ),
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_diagnostics(dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(DIAGNOSTICS_FILE))
}

fn log_store(config: &AppConfig, no_log: bool) -> Arc<dyn LogStore> {
    if no_log {
        Arc::new(MemoryLogStore::new())
    } else {
        Arc::new(FileLogStore::new(config.log_file.clone()))
    }
}

fn list_catalog(config: &AppConfig) -> Result<()> {
    let catalog = Catalog::load_or_builtin(config.catalog.as_deref())?;

    for category in catalog.categories() {
        println!("{}", category.title().cyan().bold());
        for service in catalog.services_in(category) {
            println!("  {:<16} {}", service.id.bold(), service.name);
            for action in &service.actions {
                let fields = action
                    .fields
                    .iter()
                    .map(|f| {
                        if f.required {
                            format!("{}*", f.name)
                        } else {
                            f.name.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "    {:<14} {}{}",
                    action.id,
                    action.name.dimmed(),
                    if fields.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", fields)
                    }
                );
            }
        }
    }

    let total: usize = Category::all()
        .iter()
        .map(|c| catalog.services_in(*c).count())
        .sum();
    println!("\n{} services", total);
    Ok(())
}

fn parse_sets(pairs: &[String]) -> Result<FieldValues> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| HostpilotError::InvalidValue {
                    value: pair.clone(),
                    reason: "expected KEY=VALUE".to_string(),
                })
        })
        .collect()
}

async fn run_action(
    config: &AppConfig,
    log: Arc<dyn LogStore>,
    service: &str,
    action: &str,
    sets: &[String],
) -> Result<()> {
    let catalog = Catalog::load_or_builtin(config.catalog.as_deref())?;
    let values = parse_sets(sets)?;
    let plan = catalog.plan(service, action, &values)?;

    println!(
        "{} {} ({} step(s), shell: {})",
        "→".cyan(),
        plan.title.cyan().bold(),
        plan.commands.len(),
        config.shell
    );

    let runner = Arc::new(ShellRunner::new(config.shell.clone()));
    let report = run_batch(runner, &plan.label, plan.commands.clone()).await;

    let result = redact_result(&report.result, &plan.secrets);
    if let Err(e) = log.log_command(&result) {
        eprintln!("{} {}", "⚠".yellow(), e);
    }

    for line in &report.results_log {
        let line = plan.redacted(line);
        if line.starts_with('✗') {
            println!("  {}", line.red());
        } else {
            println!("  {}", line.green());
        }
    }

    if report.is_success() {
        return Ok(());
    }

    if let Some(step) = report.steps.last() {
        let output = plan.redacted(&step.output);
        if !output.trim().is_empty() {
            println!("{}", "Output:".cyan().bold());
            println!("{}", output.trim_end());
        }
    }
    Err(HostpilotError::CommandFailed {
        command: report
            .steps
            .last()
            .map(|s| plan.redacted(&s.command.to_string()))
            .unwrap_or_else(|| plan.label.clone()),
        exit_code: report.result.exit_code,
    })
}

fn print_logs(log: &dyn LogStore, tail: Option<usize>) -> Result<()> {
    let lines = log.read_lines()?;
    let skip = tail.map(|n| lines.len().saturating_sub(n)).unwrap_or(0);
    for line in &lines[skip..] {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_diagnostics_creates_dir_and_file() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join("data/hostpilot");

        open_diagnostics(&dir).unwrap();
        assert!(dir.join(DIAGNOSTICS_FILE).exists());
    }

    #[test]
    fn test_open_diagnostics_reports_unusable_dir() {
        let home = TempDir::new().unwrap();
        // a regular file where the data dir should be
        let blocked = home.path().join("data");
        fs::write(&blocked, "").unwrap();

        assert!(open_diagnostics(&blocked.join("hostpilot")).is_err());
    }
}
