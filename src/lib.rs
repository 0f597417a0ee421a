//! # tsindex
//!
//! Index schema conversion for time-series collections stored as buckets.
//!
//! Users declare indexes against a time-series collection's field names;
//! the indexes are built on the bucket collection, which keeps per-bucket
//! `control.min`/`control.max` summaries of the time field and the metadata
//! under `meta`.
//!
//! ## Modules
//!
//! - [`timeseries`]: Options and the two-way index spec conversion
//! - [`catalog`]: Collection catalog and time-series options lookup
//! - [`commands`]: createIndexes/listIndexes over the catalog
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use bson::doc;
//! use tsindex::timeseries::*;
//!
//! let options = TimeseriesOptions::new("tm")?.with_meta_field("mm")?;
//!
//! let buckets = convert_logical_index_spec_to_physical(&options, &doc! { "mm.tag1": 1, "tm": 1 })?;
//! assert_eq!(buckets, doc! { "meta.tag1": 1, "control.min.tm": 1, "control.max.tm": 1 });
//!
//! let logical = convert_physical_index_spec_to_logical(&options, &buckets);
//! assert_eq!(logical, doc! { "mm.tag1": 1, "tm": 1 });
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod timeseries;

// Re-export top-level types for convenience
pub use timeseries::{
    convert_logical_index_spec_to_physical, convert_physical_index_spec_to_logical,
    to_bucket_schema, to_logical_schema, ErrorCode, Granularity, IndexDirective, IndexKey,
    IndexKeySpec, IndexSpecError, IndexType, MetaIndexPolicy, OptionsError, TimeseriesOptions,
};

pub use catalog::{
    get_timeseries_options, Catalog, CatalogError, CatalogResult, CollectionCatalog,
    CollectionOptions, IndexDescriptor, Namespace,
};

pub use commands::{create_index, default_index_name, list_indexes, CommandError, CommandResult};

pub use config::{Config, ConfigError, LoggingConfig};
