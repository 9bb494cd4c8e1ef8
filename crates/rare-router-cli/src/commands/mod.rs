// Module exports for CLI subcommands
//
// Each module handles a specific CLI subcommand. main.rs parses arguments,
// opens an `AppContext` and dispatches to these handlers.

pub mod plan;
pub mod rares;
pub mod status;
pub mod systems;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{debug, warn};

use rare_router_lib::config::{self, CURATED_LEGALITY_FILE, CURATED_PRICES_FILE};
use rare_router_lib::{
    load_curated_legality, load_curated_prices, InMemoryDirectory, RareCatalog, RouterConfig,
    SystemDirectory, SystemResolver,
};

use crate::terminal::ColorPalette;

/// Number of "did you mean" suggestions shown for unknown names.
pub const MAX_SUGGESTIONS: usize = 3;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Directory holding the system cache, origin table and catalog.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to a JSON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rare goods catalog to use instead of `<data-dir>/rares.json`.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Resolve systems from a local JSON file instead of EDSM.
    #[arg(long, global = true, value_name = "SYSTEMS_JSON")]
    pub offline: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Configuration and the system resolver for one CLI invocation.
pub struct AppContext {
    pub config: RouterConfig,
    pub data_dir: PathBuf,
    pub format: OutputFormat,
    pub palette: ColorPalette,
    catalog_path: PathBuf,
    resolver: Arc<SystemResolver>,
}

impl AppContext {
    /// Load configuration and open the resolver over the chosen directory.
    pub async fn open(options: &GlobalOptions) -> Result<Self> {
        let config =
            RouterConfig::load(options.config.as_deref()).context("failed to load configuration")?;
        let data_dir = config
            .resolve_data_dir(options.data_dir.as_deref())
            .context("failed to resolve the data directory")?;

        let directory: Arc<dyn SystemDirectory> = match &options.offline {
            Some(path) => {
                let directory = InMemoryDirectory::from_path(path).with_context(|| {
                    format!("failed to load offline systems from {}", path.display())
                })?;
                debug!(path = %path.display(), systems = directory.len(), "using offline directory");
                Arc::new(directory)
            }
            None => Arc::new(
                config
                    .edsm_client()
                    .context("failed to build the EDSM client")?,
            ),
        };

        let resolver = SystemResolver::open(directory, config.cache_settings(&data_dir)).await;
        let catalog_path = options
            .catalog
            .clone()
            .unwrap_or_else(|| config::catalog_path(&data_dir));

        Ok(Self {
            config,
            data_dir,
            format: options.format,
            palette: ColorPalette::detect(),
            catalog_path,
            resolver: Arc::new(resolver),
        })
    }

    pub fn resolver(&self) -> &Arc<SystemResolver> {
        &self.resolver
    }

    /// Load the rare goods catalog and apply curated overrides from the data directory.
    pub fn load_catalog(&self) -> Result<RareCatalog> {
        let path = &self.catalog_path;
        let mut catalog = RareCatalog::from_path(path)
            .with_context(|| format!("failed to load rare goods catalog from {}", path.display()))?;

        let legality_path = self.data_dir.join(CURATED_LEGALITY_FILE);
        let legality = load_curated_legality(&legality_path).with_context(|| {
            format!("failed to load curated legality from {}", legality_path.display())
        })?;
        let prices_path = self.data_dir.join(CURATED_PRICES_FILE);
        let prices = load_curated_prices(&prices_path).with_context(|| {
            format!("failed to load curated prices from {}", prices_path.display())
        })?;

        let touched = catalog.apply_curated(&legality, &prices);
        debug!(goods = catalog.len(), curated = touched, "loaded rare goods catalog");
        Ok(catalog)
    }

    /// Stop the resolver and flush pending cache writes.
    ///
    /// Persistence failures are logged; the command result stands.
    pub async fn close(&self) {
        if let Err(err) = self.resolver.close().await {
            warn!(error = %err, "failed to persist system cache");
        }
    }
}
