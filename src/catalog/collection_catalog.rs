//! Collection Catalog - Collection options and index descriptors
//!
//! In-memory map guarded by a read/write lock, with optional JSON
//! persistence. Readers (options lookups, index listings) share the read
//! lock; registrations take the write lock.
//!
//! # Design Notes
//! - Creating a time-series collection also registers its bucket collection
//! - Index keys are stored as canonical extended JSON so value types survive
//! - Persists on demand and, best effort, on drop

use crate::catalog::{Catalog, CatalogError, CatalogResult, Namespace};
use crate::timeseries::TimeseriesOptions;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

const CATALOG_FORMAT_VERSION: u32 = 1;

/// Declared options of a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeseries: Option<TimeseriesOptions>,
}

impl CollectionOptions {
    pub fn timeseries(options: TimeseriesOptions) -> Self {
        Self {
            timeseries: Some(options),
        }
    }
}

/// A named index as stored on a collection
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    pub name: String,
    pub key: Document,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, key: Document) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CollectionEntry {
    options: CollectionOptions,
    indexes: Vec<IndexDescriptor>,
}

#[derive(Debug, Default)]
struct CatalogState {
    collections: BTreeMap<Namespace, CollectionEntry>,
    dirty: bool,
}

/// Serialization format for JSON persistence
#[derive(Serialize, Deserialize)]
struct CatalogData {
    version: u32,
    collections: Vec<CollectionData>,
}

#[derive(Serialize, Deserialize)]
struct CollectionData {
    namespace: Namespace,
    #[serde(default)]
    options: CollectionOptions,
    #[serde(default)]
    indexes: Vec<IndexData>,
}

#[derive(Serialize, Deserialize)]
struct IndexData {
    name: String,
    key: serde_json::Value,
}

/// Catalog of collections, optionally backed by a JSON file
#[derive(Debug)]
pub struct CollectionCatalog {
    state: RwLock<CatalogState>,
    /// Path to persistence file, `None` when in-memory only
    path: Option<PathBuf>,
}

impl CollectionCatalog {
    /// Create an empty catalog that is never persisted
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            path: None,
        }
    }

    /// Open a catalog file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let path = path.into();

        let collections = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            "Opened catalog {:?} with {} collections",
            path,
            collections.len()
        );

        Ok(Self {
            state: RwLock::new(CatalogState {
                collections,
                dirty: false,
            }),
            path: Some(path),
        })
    }

    /// Load catalog from JSON file
    fn load_from_file(path: &Path) -> CatalogResult<BTreeMap<Namespace, CollectionEntry>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let data: CatalogData = serde_json::from_reader(reader).map_err(|e| {
            CatalogError::Serialization(format!("Failed to load catalog {:?}: {}", path, e))
        })?;

        if data.version != CATALOG_FORMAT_VERSION {
            return Err(CatalogError::Serialization(format!(
                "Unsupported catalog version {} in {:?}",
                data.version, path
            )));
        }

        let mut collections = BTreeMap::new();
        for collection in data.collections {
            if let Some(ts) = &collection.options.timeseries {
                ts.validate().map_err(|e| CatalogError::InvalidOptions {
                    namespace: collection.namespace.to_string(),
                    error: e.to_string(),
                })?;
            }

            let indexes = collection
                .indexes
                .into_iter()
                .map(|index| Ok(IndexDescriptor::new(index.name, key_from_json(index.key)?)))
                .collect::<CatalogResult<Vec<_>>>()?;

            collections.insert(
                collection.namespace,
                CollectionEntry {
                    options: collection.options,
                    indexes,
                },
            );
        }

        Ok(collections)
    }

    fn read(&self) -> CatalogResult<RwLockReadGuard<'_, CatalogState>> {
        self.state
            .read()
            .map_err(|e| CatalogError::Lock(format!("catalog read lock poisoned: {}", e)))
    }

    fn write(&self) -> CatalogResult<RwLockWriteGuard<'_, CatalogState>> {
        self.state
            .write()
            .map_err(|e| CatalogError::Lock(format!("catalog write lock poisoned: {}", e)))
    }

    /// Register a collection
    ///
    /// A time-series collection also gets its bucket collection registered.
    pub fn create_collection(&self, ns: &Namespace, options: CollectionOptions) -> CatalogResult<()> {
        if let Some(ts) = &options.timeseries {
            if ns.is_bucket_namespace() {
                return Err(CatalogError::InvalidOptions {
                    namespace: ns.to_string(),
                    error: "a bucket collection cannot itself be time-series".to_string(),
                });
            }
            ts.validate().map_err(|e| CatalogError::InvalidOptions {
                namespace: ns.to_string(),
                error: e.to_string(),
            })?;
        }

        let mut state = self.write()?;

        let bucket_ns = options.timeseries.as_ref().map(|_| ns.bucket_namespace());
        let taken = state.collections.contains_key(ns)
            || bucket_ns
                .as_ref()
                .is_some_and(|b| state.collections.contains_key(b));
        if taken {
            return Err(CatalogError::NamespaceExists(ns.to_string()));
        }

        if let Some(bucket_ns) = bucket_ns {
            state
                .collections
                .insert(bucket_ns, CollectionEntry::default());
        }

        let is_timeseries = options.timeseries.is_some();
        state.collections.insert(
            ns.clone(),
            CollectionEntry {
                options,
                indexes: Vec::new(),
            },
        );
        state.dirty = true;

        tracing::info!(namespace = %ns, timeseries = is_timeseries, "Created collection");
        Ok(())
    }

    /// Remove a collection (and its bucket collection, if any)
    ///
    /// Returns whether the collection existed.
    pub fn drop_collection(&self, ns: &Namespace) -> CatalogResult<bool> {
        let mut state = self.write()?;

        let Some(entry) = state.collections.remove(ns) else {
            return Ok(false);
        };
        if entry.options.timeseries.is_some() {
            state.collections.remove(&ns.bucket_namespace());
        }
        state.dirty = true;

        tracing::info!(namespace = %ns, "Dropped collection");
        Ok(true)
    }

    pub fn collection_count(&self) -> CatalogResult<usize> {
        Ok(self.read()?.collections.len())
    }

    /// Persist catalog to JSON file
    pub fn persist(&self) -> CatalogResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut state = self.write()?;
        if !state.dirty {
            return Ok(());
        }

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = CatalogData {
            version: CATALOG_FORMAT_VERSION,
            collections: state
                .collections
                .iter()
                .map(|(ns, entry)| CollectionData {
                    namespace: ns.clone(),
                    options: entry.options.clone(),
                    indexes: entry
                        .indexes
                        .iter()
                        .map(|index| IndexData {
                            name: index.name.clone(),
                            key: Bson::Document(index.key.clone()).into_canonical_extjson(),
                        })
                        .collect(),
                })
                .collect(),
        };

        let file = File::create(path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &data).map_err(|e| {
            CatalogError::Serialization(format!("Failed to persist catalog: {}", e))
        })?;

        state.dirty = false;
        Ok(())
    }

    /// Check if there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.state.read().map(|s| s.dirty).unwrap_or(false)
    }

    /// Get the persistence file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Catalog for CollectionCatalog {
    fn collection_options(&self, ns: &Namespace) -> CatalogResult<Option<CollectionOptions>> {
        Ok(self
            .read()?
            .collections
            .get(ns)
            .map(|entry| entry.options.clone()))
    }

    fn list_index_descriptors(&self, ns: &Namespace) -> CatalogResult<Vec<IndexDescriptor>> {
        self.read()?
            .collections
            .get(ns)
            .map(|entry| entry.indexes.clone())
            .ok_or_else(|| CatalogError::NamespaceNotFound(ns.to_string()))
    }

    fn add_index(&self, ns: &Namespace, index: IndexDescriptor) -> CatalogResult<()> {
        let mut state = self.write()?;

        let entry = state
            .collections
            .get_mut(ns)
            .ok_or_else(|| CatalogError::NamespaceNotFound(ns.to_string()))?;

        if entry.indexes.iter().any(|existing| existing.name == index.name) {
            return Err(CatalogError::IndexExists {
                namespace: ns.to_string(),
                name: index.name,
            });
        }

        entry.indexes.push(index);
        state.dirty = true;
        Ok(())
    }
}

impl Drop for CollectionCatalog {
    fn drop(&mut self) {
        // Auto-persist on drop (best effort)
        if self.is_dirty() {
            if let Err(e) = self.persist() {
                tracing::warn!("Failed to persist catalog on drop: {}", e);
            }
        }
    }
}

fn key_from_json(value: serde_json::Value) -> CatalogResult<Document> {
    match Bson::try_from(value) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(other) => Err(CatalogError::Serialization(format!(
            "index key must be a document, got {}",
            other
        ))),
        Err(e) => Err(CatalogError::Serialization(format!(
            "invalid index key: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use tempfile::tempdir;

    fn weather() -> Namespace {
        "test.weather".parse().unwrap()
    }

    fn ts_options() -> CollectionOptions {
        CollectionOptions::timeseries(
            TimeseriesOptions::new("tm")
                .unwrap()
                .with_meta_field("mm")
                .unwrap(),
        )
    }

    #[test]
    fn test_catalog_creation() {
        let catalog = CollectionCatalog::in_memory();
        assert_eq!(catalog.collection_count().unwrap(), 0);
        assert!(catalog.path().is_none());
        assert!(!catalog.is_dirty());
    }

    #[test]
    fn test_create_timeseries_collection() {
        let catalog = CollectionCatalog::in_memory();
        catalog.create_collection(&weather(), ts_options()).unwrap();

        assert_eq!(catalog.collection_count().unwrap(), 2);
        assert_eq!(
            catalog.collection_options(&weather()).unwrap(),
            Some(ts_options())
        );
        assert_eq!(
            catalog
                .collection_options(&weather().bucket_namespace())
                .unwrap(),
            Some(CollectionOptions::default())
        );
    }

    #[test]
    fn test_create_duplicate_collection() {
        let catalog = CollectionCatalog::in_memory();
        catalog.create_collection(&weather(), ts_options()).unwrap();

        let err = catalog
            .create_collection(&weather(), CollectionOptions::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::NamespaceExists(_)));
    }

    #[test]
    fn test_create_with_invalid_options() {
        let catalog = CollectionCatalog::in_memory();
        let options: TimeseriesOptions =
            serde_json::from_str(r#"{"timeField": "t", "metaField": "t"}"#).unwrap();

        let err = catalog
            .create_collection(&weather(), CollectionOptions::timeseries(options))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOptions { .. }));
        assert_eq!(catalog.collection_count().unwrap(), 0);
    }

    #[test]
    fn test_timeseries_on_bucket_namespace() {
        let catalog = CollectionCatalog::in_memory();
        let buckets = weather().bucket_namespace();

        let err = catalog.create_collection(&buckets, ts_options()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOptions { .. }));
        assert_eq!(catalog.collection_count().unwrap(), 0);

        catalog
            .create_collection(&buckets, CollectionOptions::default())
            .unwrap();
        assert_eq!(catalog.collection_count().unwrap(), 1);
    }

    #[test]
    fn test_drop_collection() {
        let catalog = CollectionCatalog::in_memory();
        catalog.create_collection(&weather(), ts_options()).unwrap();

        assert!(catalog.drop_collection(&weather()).unwrap());
        assert_eq!(catalog.collection_count().unwrap(), 0);
        assert!(!catalog.drop_collection(&weather()).unwrap());
    }

    #[test]
    fn test_add_and_list_indexes() {
        let catalog = CollectionCatalog::in_memory();
        let ns: Namespace = "test.plain".parse().unwrap();
        catalog
            .create_collection(&ns, CollectionOptions::default())
            .unwrap();

        catalog
            .add_index(&ns, IndexDescriptor::new("a_1", doc! { "a": 1 }))
            .unwrap();
        catalog
            .add_index(&ns, IndexDescriptor::new("b_-1", doc! { "b": -1 }))
            .unwrap();

        let indexes = catalog.list_index_descriptors(&ns).unwrap();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "a_1");
        assert_eq!(indexes[1].key, doc! { "b": -1 });

        let err = catalog
            .add_index(&ns, IndexDescriptor::new("a_1", doc! { "a": -1 }))
            .unwrap_err();
        assert!(matches!(err, CatalogError::IndexExists { .. }));
    }

    #[test]
    fn test_unknown_namespace() {
        let catalog = CollectionCatalog::in_memory();
        assert_eq!(catalog.collection_options(&weather()).unwrap(), None);
        assert!(matches!(
            catalog.list_index_descriptors(&weather()),
            Err(CatalogError::NamespaceNotFound(_))
        ));
        assert!(matches!(
            catalog.add_index(&weather(), IndexDescriptor::new("x", doc! { "x": 1 })),
            Err(CatalogError::NamespaceNotFound(_))
        ));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let key = doc! { "meta.tag1": 1, "control.min.tm": 1_i64, "control.max.tm": 1_i64 };

        // Create and populate
        {
            let catalog = CollectionCatalog::open(&path).unwrap();
            catalog.create_collection(&weather(), ts_options()).unwrap();
            catalog
                .add_index(
                    &weather().bucket_namespace(),
                    IndexDescriptor::new("mm.tag1_1_tm_1", key.clone()),
                )
                .unwrap();
            catalog.persist().unwrap();
            assert!(!catalog.is_dirty());
        }

        // Reopen and verify
        {
            let catalog = CollectionCatalog::open(&path).unwrap();
            assert_eq!(catalog.collection_count().unwrap(), 2);
            assert_eq!(
                catalog.collection_options(&weather()).unwrap(),
                Some(ts_options())
            );

            let indexes = catalog
                .list_index_descriptors(&weather().bucket_namespace())
                .unwrap();
            assert_eq!(indexes.len(), 1);
            assert_eq!(indexes[0].key, key);
            let paths: Vec<&String> = indexes[0].key.keys().collect();
            assert_eq!(paths, vec!["meta.tag1", "control.min.tm", "control.max.tm"]);
        }
    }

    #[test]
    fn test_persist_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        {
            let catalog = CollectionCatalog::open(&path).unwrap();
            catalog.create_collection(&weather(), ts_options()).unwrap();
        }

        let catalog = CollectionCatalog::open(&path).unwrap();
        assert_eq!(catalog.collection_count().unwrap(), 2);
    }

    #[test]
    fn test_corrupt_catalog_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();

        let err = CollectionCatalog::open(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }
}
