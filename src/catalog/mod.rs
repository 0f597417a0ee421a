//! Collection Catalog
//!
//! Stores collection options and index descriptors, and answers the one
//! question the index converters need: "what are the time-series options
//! of this namespace?"
//!
//! ```text
//! test.weather                    { timeseries: { timeField: "tm", metaField: "mm" } }
//! test.system.buckets.weather     indexes: [ { meta.tag1: 1, control.min.tm: 1, control.max.tm: 1 } ]
//! ```

mod collection_catalog;
mod error;
mod namespace;
mod resolver;

pub use collection_catalog::{CollectionCatalog, CollectionOptions, IndexDescriptor};
pub use error::{CatalogError, CatalogResult};
pub use namespace::{Namespace, BUCKETS_PREFIX};
pub use resolver::get_timeseries_options;

/// Read/write access to collection metadata
pub trait Catalog {
    /// Options of `ns`, or `None` if no such collection exists
    fn collection_options(&self, ns: &Namespace) -> CatalogResult<Option<CollectionOptions>>;

    /// Indexes stored on `ns`
    fn list_index_descriptors(&self, ns: &Namespace) -> CatalogResult<Vec<IndexDescriptor>>;

    /// Store an index on `ns`
    fn add_index(&self, ns: &Namespace, index: IndexDescriptor) -> CatalogResult<()>;
}
