//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use aievents_core::normalize::parse_date;
use aievents_core::{
    ProgressReporter, SilentProgress, UpdateCatalogConfig, UpdateCatalogResult, build_sources,
    check_catalog, update_catalog,
};
use aievents_shared::{
    AppConfig, fingerprint_parts, init_config, init_config_at, load_config, load_config_from,
};
use aievents_storage::{CatalogBackend, CatalogStore, JsonFileBackend};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// aievents: keep the AI events catalog current.
#[derive(Parser)]
#[command(
    name = "aievents",
    version,
    about = "Merge newly announced AI events into the published events catalog.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.aievents/aievents.toml.
    #[arg(long, global = true, env = "AIEVENTS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Gather candidates and merge net-new events into the catalog.
    Update {
        /// Catalog file (defaults to `catalog.store_path` from config).
        #[arg(long)]
        store: Option<PathBuf>,

        /// Extra JSON file of candidates (can be specified multiple times).
        #[arg(long)]
        input: Vec<PathBuf>,

        /// Extra JSON feed URL (can be specified multiple times).
        #[arg(long)]
        feed: Vec<String>,

        /// Skip the built-in curated list.
        #[arg(long)]
        no_curated: bool,

        /// Print a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
    },

    /// Print the catalog in order.
    List {
        /// Catalog file (defaults to `catalog.store_path` from config).
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Verify catalog invariants. Exits non-zero on any violation.
    Check {
        /// Catalog file (defaults to `catalog.store_path` from config).
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print the identity fingerprint of a name and date.
    Fingerprint {
        /// Event name.
        #[arg(long)]
        name: String,

        /// Event start date.
        #[arg(long)]
        date: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "aievents=info",
        1 => "aievents=debug",
        _ => "aievents=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Update {
            store,
            input,
            feed,
            no_curated,
            json,
        } => {
            let mut config = resolve_config(config_path)?;
            if no_curated {
                config.sources.curated = false;
            }
            config
                .sources
                .files
                .extend(input.iter().map(|p| p.to_string_lossy().into_owned()));
            config.sources.feeds.extend(feed);

            cmd_update(&config, store, json).await
        }
        Command::List { store } => cmd_list(&resolve_config(config_path)?, store),
        Command::Check { store } => cmd_check(&resolve_config(config_path)?, store),
        Command::Fingerprint { name, date } => cmd_fingerprint(&name, &date),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the config from `--config` when given, else from the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

fn store_path(config: &AppConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(&config.catalog.store_path))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_update(config: &AppConfig, store: Option<PathBuf>, json: bool) -> Result<()> {
    let update_config = UpdateCatalogConfig {
        store_path: store_path(config, store),
    };
    let sources = build_sources(&config.sources)?;

    info!(
        store = %update_config.store_path.display(),
        sources = sources.len(),
        "updating catalog"
    );

    let result = if json {
        update_catalog(&update_config, &sources, &SilentProgress).await?
    } else {
        update_catalog(&update_config, &sources, &CliProgress::new()).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&result))?);
    } else {
        print_summary(&update_config.store_path, &result);
    }

    Ok(())
}

fn summary_json(result: &UpdateCatalogResult) -> serde_json::Value {
    serde_json::json!({
        "added": result.added,
        "total": result.total,
        "changed": result.changed(),
        "duplicates": result.duplicates,
        "added_names": result.added_names,
        "warnings": result.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "source_failures": result
            .source_failures
            .iter()
            .map(|f| serde_json::json!({ "source": f.source, "message": f.message }))
            .collect::<Vec<_>>(),
    })
}

fn print_summary(path: &Path, result: &UpdateCatalogResult) {
    println!();
    if result.changed() {
        println!("  Catalog updated!");
    } else {
        println!("  Catalog already up to date.");
    }
    println!("  Path:       {}", path.display());
    println!("  Added:      {}", result.added);
    println!("  Duplicates: {}", result.duplicates);
    println!("  Rejected:   {}", result.warnings.len());
    println!("  Total:      {}", result.total);
    if let Some((first, last)) = result.date_range {
        println!("  Range:      {first} .. {last}");
    }
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());

    for name in &result.added_names {
        println!("    + {name}");
    }
    for warning in &result.warnings {
        println!("    ! {warning}");
    }
    for failure in &result.source_failures {
        println!("    ! source {}: {}", failure.source, failure.message);
    }
    println!();
}

fn cmd_list(config: &AppConfig, store: Option<PathBuf>) -> Result<()> {
    let path = store_path(config, store);
    let store = CatalogStore::load(JsonFileBackend::new(&path))?;

    if store.is_empty() {
        println!("catalog at {} is empty", path.display());
        return Ok(());
    }

    for event in store.events() {
        println!(
            "{:>3}. {}  {}  [{}, {}]  {}",
            event.sequence_number, event.date, event.name, event.event_type, event.format, event.venue
        );
    }
    Ok(())
}

fn cmd_check(config: &AppConfig, store: Option<PathBuf>) -> Result<()> {
    let path = store_path(config, store);
    // Inspect the document as written; loading a store would drop duplicates.
    let events = JsonFileBackend::new(&path).read()?.unwrap_or_default();
    let violations = check_catalog(&events);

    if violations.is_empty() {
        println!("OK: {} events in {}", events.len(), path.display());
        return Ok(());
    }

    for violation in &violations {
        println!("  {violation}");
    }
    Err(eyre!(
        "{} invariant violation(s) in {}",
        violations.len(),
        path.display()
    ))
}

fn cmd_fingerprint(name: &str, date: &str) -> Result<()> {
    let date = parse_date("date", date)?;
    println!("{}", fingerprint_parts(name, date));
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => init_config_at(p)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Also reached when the pipeline fails before `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn candidates_collected(&self, count: usize, failed_sources: usize) {
        if failed_sources > 0 {
            self.spinner
                .set_message(format!("Merging {count} candidates ({failed_sources} source(s) failed)"));
        } else {
            self.spinner.set_message(format!("Merging {count} candidates"));
        }
    }

    fn done(&self, _result: &UpdateCatalogResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_flags_accumulate() {
        let cli = Cli::try_parse_from([
            "aievents",
            "update",
            "--input",
            "a.json",
            "--input",
            "b.json",
            "--feed",
            "https://example.com/events.json",
            "--no-curated",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Command::Update {
                input,
                feed,
                no_curated,
                json,
                store,
            } => {
                assert_eq!(input, [PathBuf::from("a.json"), PathBuf::from("b.json")]);
                assert_eq!(feed, ["https://example.com/events.json"]);
                assert!(no_curated);
                assert!(json);
                assert!(store.is_none());
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn store_flag_overrides_config() {
        let config = AppConfig::default();
        assert_eq!(store_path(&config, None), PathBuf::from("docs/events_data.json"));
        assert_eq!(
            store_path(&config, Some(PathBuf::from("out.json"))),
            PathBuf::from("out.json")
        );
    }

    #[test]
    fn dropped_progress_clears_spinner() {
        let progress = CliProgress::new();
        progress.phase("Loading catalog");
        let spinner = progress.spinner.clone();
        drop(progress);
        assert!(spinner.is_finished());
    }

    #[test]
    fn fingerprint_requires_name_and_date() {
        assert!(Cli::try_parse_from(["aievents", "fingerprint", "--name", "X"]).is_err());
        assert!(cmd_fingerprint("NeurIPS 2025", "2025-12-08").is_ok());
        assert!(cmd_fingerprint("NeurIPS 2025", "someday").is_err());
    }
}
