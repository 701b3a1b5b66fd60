use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "campus-coffee")]
#[command(about = "Manage campus coffee points of sale and import them from OpenStreetMap")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the OSM API, e.g. https://www.openstreetmap.org/api/0.6
    #[arg(long)]
    pub osm_api_url: Option<String>,

    /// Timeout for a single OSM API request
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// JSON file holding the POS records
    #[arg(long)]
    pub store_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import a POS from an OpenStreetMap node
    Import {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        node_id: u64,
    },
    /// List all POS
    List,
    /// Show a single POS
    Get { id: u64 },
    /// Create or update a POS from a JSON document
    Upsert { file: PathBuf },
    /// Remove every POS
    Clear,
}

impl CliConfig {
    /// Loads the config file (if any) and applies the command line overrides.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        // 應用命令列覆蓋設定
        if let Some(url) = &self.osm_api_url {
            config.osm.api_url = url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.osm.timeout_seconds = timeout;
        }
        if let Some(path) = &self.store_path {
            config.store.path = path.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }

        Ok(config)
    }
}
