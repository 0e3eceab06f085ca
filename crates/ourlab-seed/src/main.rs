//! `ourlab-seed` binary.
//!
//! Loads the seed CSV extracts into the SQLite catalogue:
//!
//! ```text
//! ourlab-seed --database ourlab.db --mapping db/seed/mapping.json
//! ```
//!
//! The graduate extract defaults to `db/seed/seed_loader.csv`; pass
//! `--graduate ""` to skip the refinement pass.
//!
//! Settings that are not given on the command line come from
//! `ourlab-seed.toml` (or the path given with `--config`) and `OURLAB_*`
//! environment variables.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use ourlab_core::model::EntityKind;
use ourlab_seed::{LoadOptions, Loader, Sources, WriteFailurePolicy, config::SeedConfig};
use ourlab_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "OURLAB seed CSV loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ourlab-seed.toml")]
  config: PathBuf,

  /// Universities CSV.
  #[arg(long, env = "UNIVERSITIES_CSV", default_value = "db/seed/universities.csv")]
  universities: PathBuf,

  /// Departments CSV.
  #[arg(long, env = "DEPARTMENTS_CSV", default_value = "db/seed/departments.csv")]
  departments: PathBuf,

  /// Labs CSV.
  #[arg(long, env = "LABS_CSV", default_value = "db/seed/labs.csv")]
  labs: PathBuf,

  /// Graduate-program extract. An empty value skips the refinement pass.
  #[arg(long, env = "SEED_LOADER_CSV", default_value = "db/seed/seed_loader.csv")]
  graduate: String,

  /// Column-remapping JSON: `{ "<kind>": { "<canonical>": "<source column>" } }`.
  #[arg(long, env = "SEED_MAPPING_JSON")]
  mapping: Option<String>,

  /// Load a single stage: universities, departments, labs or graduate.
  #[arg(long, value_name = "KIND")]
  only: Option<EntityKind>,

  /// SQLite database file. Overrides the config file.
  #[arg(long, env = "OURLAB_DATABASE")]
  database: Option<PathBuf>,

  /// What to do when a row write fails: abort or skip.
  #[arg(long, value_name = "POLICY")]
  on_write_error: Option<WriteFailurePolicy>,
}

impl Cli {
  fn sources(&self) -> Sources {
    let given = |p: &String| (!p.trim().is_empty()).then(|| PathBuf::from(p));
    Sources {
      universities: self.universities.clone(),
      departments:  self.departments.clone(),
      labs:         self.labs.clone(),
      graduate:     given(&self.graduate),
      mapping:      self.mapping.as_ref().and_then(given),
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = SeedConfig::load(&cli.config).context("failed to read config")?;
  let database = cli.database.clone().unwrap_or_else(|| cfg.database.clone());

  let sources = cli.sources();

  let options = LoadOptions {
    only:           cli.only,
    on_write_error: cli.on_write_error.unwrap_or(cfg.on_write_error),
    normalizer:     cfg.normalizer(),
  };

  let store = SqliteStore::open(&database)
    .await
    .with_context(|| format!("failed to open store at {database:?}"))?;

  let summary = Loader::new(&store, options)
    .run(&sources)
    .await
    .context("seed load failed")?;

  for (kind, counts) in &summary.counts {
    tracing::info!(
      "[{kind}] rows={} inserted={} updated={} skipped={}",
      counts.rows,
      counts.inserted,
      counts.updated,
      counts.skipped
    );
  }
  if !summary.warnings.is_empty() {
    tracing::warn!("{} rows were skipped; see warnings above", summary.warnings.len());
  }

  Ok(())
}
