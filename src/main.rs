//! # Source Registry CLI (`srcreg`)
//!
//! Manage the sources of a web crawl registry from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! srcreg --config ./config/srcreg.toml <command>
//! srcreg --url http://localhost:8081 <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `srcreg sources list` | List registered sources |
//! | `srcreg sources add <url>` | Register a new source |
//! | `srcreg sources delete <id>` | Delete a source |
//! | `srcreg sources resync <id>` | Re-run ingestion for a source |
//! | `srcreg settings show` | Show registry settings |
//! | `srcreg settings set` | Change registry settings |
//! | `srcreg completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Crawl two levels deep, skipping login and admin pages
//! srcreg sources add https://example.com --max-depth 2 \
//!     --exclude /login --exclude /admin
//!
//! # Same, with exclusions kept in a file (one pattern per line)
//! srcreg sources add https://example.com --exclusions-file excludes.txt
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use source_registry::api::HttpRegistryClient;
use source_registry::config::{self, Config};
use source_registry::form::SourceForm;
use source_registry::logging;
use source_registry::settings::SettingsStore;
use source_registry::settings_cmd::{self, SettingsPatch};
use source_registry::sources_cmd;
use source_registry::store::SourceStore;

/// Source Registry CLI — manage web crawl sources and registry settings.
#[derive(Parser)]
#[command(name = "srcreg", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/srcreg.toml")]
    config: PathBuf,

    /// Registry base URL. Overrides `[registry].base_url`; when given, the
    /// config file is optional.
    #[arg(long = "url", id = "registry_url", global = true, value_name = "URL")]
    registry_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage crawl sources.
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },
    /// Show or change registry settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print shell completions to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SourcesAction {
    /// List all sources with their crawl status.
    List,
    /// Register a new source.
    ///
    /// Passing `--max-depth`, `--exclude`, or `--exclusions-file` submits the
    /// advanced crawl options; otherwise only the URL and name are sent.
    Add {
        url: String,
        /// Display name. Defaults to the URL.
        #[arg(long)]
        name: Option<String>,
        /// Maximum link depth to crawl from the URL.
        #[arg(long)]
        max_depth: Option<u32>,
        /// Path pattern to skip. Repeatable.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// File with one exclusion pattern per line.
        #[arg(long)]
        exclusions_file: Option<PathBuf>,
    },
    /// Delete a source by id.
    Delete { id: String },
    /// Ask the registry to re-run ingestion for a source.
    Resync { id: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings (API keys are masked).
    Show,
    /// Update one or more settings. An empty key value clears that key.
    Set {
        #[arg(long)]
        rerank_provider: Option<String>,
        #[arg(long)]
        rerank_api_key: Option<String>,
        #[arg(long)]
        gemini_api_key: Option<String>,
    },
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    match &cli.registry_url {
        Some(url) => {
            let mut cfg = if cli.config.exists() {
                config::load_config(&cli.config)?
            } else {
                Config::for_base_url(url.clone())
            };
            cfg.registry.base_url = url.clone();
            cfg.validate()?;
            Ok(cfg)
        }
        None => config::load_config(&cli.config),
    }
}

fn build_form(
    url: String,
    name: Option<String>,
    max_depth: Option<u32>,
    exclude: Vec<String>,
    exclusions_file: Option<PathBuf>,
) -> Result<SourceForm> {
    let mut exclusions_text = exclude.join("\n");
    if let Some(path) = exclusions_file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read exclusions file: {}", path.display()))?;
        if !exclusions_text.is_empty() {
            exclusions_text.push('\n');
        }
        exclusions_text.push_str(&content);
    }

    let advanced = max_depth.is_some() || !exclusions_text.trim().is_empty();
    Ok(SourceForm {
        url,
        name,
        advanced,
        max_depth_text: max_depth.map(|d| d.to_string()),
        exclusions_text: Some(exclusions_text).filter(|t| !t.is_empty()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "srcreg", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = resolve_config(&cli)?;
    logging::init(&cfg.logging.filter);
    let client = HttpRegistryClient::from_config(&cfg.registry)?;

    match cli.command {
        Commands::Sources { action } => {
            let store = SourceStore::new(client);
            match action {
                SourcesAction::List => sources_cmd::list_sources(&store).await?,
                SourcesAction::Add {
                    url,
                    name,
                    max_depth,
                    exclude,
                    exclusions_file,
                } => {
                    let form = build_form(url, name, max_depth, exclude, exclusions_file)?;
                    sources_cmd::add_source(&store, form).await?;
                }
                SourcesAction::Delete { id } => sources_cmd::delete_source(&store, &id).await?,
                SourcesAction::Resync { id } => sources_cmd::resync_source(&store, &id).await?,
            }
        }
        Commands::Settings { action } => {
            let store = SettingsStore::new(client);
            match action {
                SettingsAction::Show => settings_cmd::show_settings(&store).await?,
                SettingsAction::Set {
                    rerank_provider,
                    rerank_api_key,
                    gemini_api_key,
                } => {
                    let patch = SettingsPatch {
                        rerank_provider,
                        rerank_api_key,
                        gemini_api_key,
                    };
                    settings_cmd::set_settings(&store, &patch).await?;
                }
            }
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
