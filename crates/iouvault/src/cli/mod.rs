//! cli subcommands for iouvault.
//!
//! - `iouvault migrate` - create or upgrade the database schema
//! - `iouvault schema show` - print a schema version's column layout
//! - `iouvault schema check` - compare the live table with a schema version
//! - `iouvault ious create|list|history|show` - record and query obligations

mod ious;
mod migrate;
mod schema;

pub use ious::{IousCommand, validate_new_iou};
pub use migrate::MigrateCommand;
pub use schema::SchemaCommand;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use iouvault_db::IouVaultDb;
use iouvault_types::{Config, DatabaseConfig};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// default config file search paths (in order of priority).
const CONFIG_SEARCH_PATHS: &[&str] = &["/etc/iouvault/config.toml", "./config.toml"];

/// iouvault - durable store for iou obligation records
#[derive(Parser, Debug)]
#[command(name = "iouvault")]
#[command(about = "Durable store for IOU obligation records", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// create or upgrade the database schema
    Migrate(MigrateCommand),

    /// inspect obligation schema versions
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// record and query obligations
    #[command(subcommand)]
    Ious(IousCommand),
}

/// database and logging options shared by every command that touches the store
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// path to config file (toml format)
    #[arg(short, long, env = "IOUVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// database url (sqlite:<path> or postgres://)
    #[arg(long, env = "IOUVAULT_DATABASE_URL")]
    pub database_url: Option<String>,

    /// log level (trace, debug, info, warn, error)
    #[arg(long, env = "IOUVAULT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl DbArgs {
    /// resolve the effective configuration.
    ///
    /// priority order: defaults -> config file -> cli flags / environment
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match load_config_file(self.config.as_deref())? {
            Some(file_config) => file_config,
            None => Config::default(),
        };

        if let Some(url) = &self.database_url {
            config.database = DatabaseConfig::from_url(url)
                .with_context(|| format!("invalid database url: {}", url))?;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    /// load config, initialise logging and open the database (running migrations).
    pub async fn connect(&self) -> Result<IouVaultDb> {
        let config = self.load_config()?;
        init_tracing(&config.log_level)?;

        debug!(
            db_type = %config.database.db_type,
            "connecting to database"
        );
        let db = IouVaultDb::new(&config)
            .await
            .context("failed to open database")?;
        info!("database ready");
        Ok(db)
    }
}

/// find and load a config file, returning none if no config file is found.
///
/// an explicitly given path must exist; otherwise the default search paths are tried.
pub fn load_config_file(config_path: Option<&Path>) -> Result<Option<Config>> {
    if let Some(path) = config_path {
        return read_config(path).map(Some);
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            return read_config(path).map(Some);
        }
    }

    Ok(None)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config file: {:?}", path))
}

/// install the global fmt subscriber. logs go to stderr so json output stays clean.
fn init_tracing(level: &str) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level: {}", level))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// table or json output
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// aligned text table
    #[default]
    Table,
    /// pretty-printed json
    Json,
}
