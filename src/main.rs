//! tsindex CLI
//!
//! Command-line interface for time-series index conversion:
//! - Convert index specs between time-series and bucket schemas
//! - Register collections in a catalog file
//! - Create and list indexes the way the server commands do

use anyhow::Context;
use bson::{Bson, Document};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tsindex::config::{generate_default_config, Config};
use tsindex::timeseries::{to_bucket_schema, to_logical_schema, Granularity, IndexKeySpec};
use tsindex::{create_index, list_indexes, CollectionCatalog, CollectionOptions, Namespace, TimeseriesOptions};

#[derive(Parser)]
#[command(name = "tsindex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Index schema conversion for time-series bucket collections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog file (overrides config)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a time-series index spec to the bucket schema
    ToBuckets {
        /// Index key pattern as JSON, e.g. '{"mm.tag1": 1, "tm": 1}'
        spec: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Convert a bucket index spec to the time-series schema
    ToTimeseries {
        /// Index key pattern as JSON
        spec: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Register a collection in the catalog
    CreateCollection {
        /// Namespace as <db>.<collection>
        namespace: String,
        /// Time field; makes this a time-series collection
        #[arg(long)]
        time_field: Option<String>,
        /// Metadata field
        #[arg(long, requires = "time_field")]
        meta_field: Option<String>,
        /// Bucket granularity (seconds, minutes, hours)
        #[arg(long, default_value = "seconds")]
        granularity: String,
        /// Maximum time span of a single bucket
        #[arg(long, requires = "time_field")]
        bucket_max_span_seconds: Option<u32>,
    },

    /// Create an index on a collection
    CreateIndex {
        /// Namespace as <db>.<collection>
        namespace: String,
        /// Index key pattern as JSON
        spec: String,
        /// Index name (default: derived from the key pattern)
        #[arg(long)]
        name: Option<String>,
    },

    /// List indexes of a collection
    ListIndexes {
        /// Namespace as <db>.<collection>
        namespace: String,
    },

    /// Print a default config file
    InitConfig,
}

#[derive(clap::Args)]
pub struct FieldArgs {
    /// Time field of the collection
    #[arg(long)]
    pub time_field: String,
    /// Metadata field of the collection
    #[arg(long)]
    pub meta_field: Option<String>,
}

impl FieldArgs {
    fn options(&self) -> anyhow::Result<TimeseriesOptions> {
        let options = TimeseriesOptions::new(&self.time_field)?;
        Ok(match &self.meta_field {
            Some(meta) => options.with_meta_field(meta)?,
            None => options,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(catalog) = &cli.catalog {
        config.catalog.path = catalog.clone();
    }

    init_logging(&config);

    match cli.command {
        Commands::ToBuckets { spec, fields } => {
            let options = fields.options()?;
            let spec = parse_spec(&spec)?;
            let physical =
                to_bucket_schema(&options, &spec, config.conversion.meta_index_policy)?;
            print_document(physical.to_document())?;
        }

        Commands::ToTimeseries { spec, fields } => {
            let options = fields.options()?;
            let spec = parse_spec(&spec)?;
            let logical = to_logical_schema(&options, &spec);
            if logical.is_empty() {
                tracing::info!("Spec does not correspond to a time-series index");
            }
            print_document(logical.to_document())?;
        }

        Commands::CreateCollection {
            namespace,
            time_field,
            meta_field,
            granularity,
            bucket_max_span_seconds,
        } => {
            let ns: Namespace = namespace.parse()?;
            let options = match time_field {
                Some(time_field) => {
                    let granularity: Granularity =
                        granularity.parse().map_err(anyhow::Error::msg)?;
                    let mut ts = TimeseriesOptions::new(time_field)?.granularity(granularity);
                    if let Some(meta) = meta_field {
                        ts = ts.with_meta_field(meta)?;
                    }
                    if let Some(seconds) = bucket_max_span_seconds {
                        ts = ts.bucket_max_span_seconds(seconds);
                    }
                    CollectionOptions::timeseries(ts)
                }
                None => CollectionOptions::default(),
            };

            let catalog = open_catalog(&config)?;
            catalog.create_collection(&ns, options)?;
            catalog.persist()?;
            println!("Created {}", ns);
        }

        Commands::CreateIndex {
            namespace,
            spec,
            name,
        } => {
            let ns: Namespace = namespace.parse()?;
            let key = parse_spec(&spec)?;

            let catalog = open_catalog(&config)?;
            let created = create_index(
                &catalog,
                &ns,
                name.as_deref(),
                &key,
                config.conversion.meta_index_policy,
            )?;
            catalog.persist()?;

            println!("Created index '{}'", created.name);
            print_document(created.key)?;
        }

        Commands::ListIndexes { namespace } => {
            let ns: Namespace = namespace.parse()?;
            let catalog = open_catalog(&config)?;

            for index in list_indexes(&catalog, &ns)? {
                let mut doc = Document::new();
                doc.insert("name", index.name);
                doc.insert("key", index.key);
                print_document(doc)?;
            }
        }

        Commands::InitConfig => {
            print!("{}", generate_default_config());
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("tsindex={}", config.logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_catalog(config: &Config) -> anyhow::Result<CollectionCatalog> {
    CollectionCatalog::open(&config.catalog.path)
        .with_context(|| format!("Failed to open catalog {:?}", config.catalog.path))
}

/// Parse a JSON object into an ordered key pattern, keeping repeated paths
fn parse_spec(json: &str) -> anyhow::Result<IndexKeySpec> {
    serde_json::from_str(json).context("Index spec must be a JSON object of field paths")
}

fn print_document(doc: Document) -> anyhow::Result<()> {
    let json = Bson::Document(doc).into_relaxed_extjson();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
