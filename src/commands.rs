//! Index Commands
//!
//! The createIndexes/listIndexes path for collections that may be
//! time-series:
//!
//! ```text
//! create_index(test.weather, { mm.tag1: 1, tm: 1 })
//!   → resolve options → to_bucket_schema
//!   → store { meta.tag1: 1, control.min.tm: 1, control.max.tm: 1 } on test.system.buckets.weather
//!
//! list_indexes(test.weather)
//!   → read test.system.buckets.weather → to_logical_schema each
//!   → drop indexes that map to {}
//! ```

use crate::catalog::{get_timeseries_options, Catalog, CatalogError, IndexDescriptor, Namespace};
use crate::timeseries::{to_bucket_schema, to_logical_schema, IndexKey, IndexKeySpec, IndexSpecError, MetaIndexPolicy};
use bson::Bson;
use thiserror::Error;

/// Errors from index commands
#[derive(Error, Debug)]
pub enum CommandError {
    /// Catalog lookup or update failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Key pattern cannot be built on the bucket collection
    #[error(transparent)]
    IndexSpec(#[from] IndexSpecError),
}

/// Result type for index commands
pub type CommandResult<T> = Result<T, CommandError>;

/// Default index name: each `<path>_<value>` joined by `_`
pub fn default_index_name(key: &IndexKeySpec) -> String {
    key.iter()
        .map(|IndexKey { path, value }| match value {
            Bson::String(s) => format!("{}_{}", path, s),
            other => format!("{}_{}", path, other),
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Create an index on `ns`, translating to the bucket schema if needed
///
/// Returns the descriptor as stored in the catalog.
pub fn create_index<C: Catalog + ?Sized>(
    catalog: &C,
    ns: &Namespace,
    name: Option<&str>,
    key: &IndexKeySpec,
    policy: MetaIndexPolicy,
) -> CommandResult<IndexDescriptor> {
    if let Some(field) = key.first_duplicate() {
        return Err(IndexSpecError::DuplicateKey {
            field: field.to_string(),
        }
        .into());
    }

    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_index_name(key));

    let (target, stored_key) = match get_timeseries_options(catalog, ns)? {
        Some(options) => {
            let physical = to_bucket_schema(&options, key, policy)?;
            (ns.bucket_namespace(), physical.to_document())
        }
        None => (ns.clone(), key.to_document()),
    };

    let descriptor = IndexDescriptor::new(name, stored_key);
    catalog.add_index(&target, descriptor.clone())?;

    tracing::info!(
        namespace = %ns,
        target = %target,
        index = %descriptor.name,
        "Created index"
    );
    Ok(descriptor)
}

/// List indexes of `ns` in the schema the user sees
///
/// Bucket indexes with no time-series equivalent are omitted.
pub fn list_indexes<C: Catalog + ?Sized>(
    catalog: &C,
    ns: &Namespace,
) -> CommandResult<Vec<IndexDescriptor>> {
    let Some(options) = get_timeseries_options(catalog, ns)? else {
        if catalog.collection_options(ns)?.is_none() {
            return Err(CatalogError::NamespaceNotFound(ns.to_string()).into());
        }
        return Ok(catalog.list_index_descriptors(ns)?);
    };

    let indexes = catalog
        .list_index_descriptors(&ns.bucket_namespace())?
        .into_iter()
        .filter_map(|index| {
            let logical = to_logical_schema(&options, &IndexKeySpec::from(&index.key));
            if logical.is_empty() {
                tracing::debug!(
                    namespace = %ns,
                    index = %index.name,
                    "Skipping bucket index with no time-series equivalent"
                );
                return None;
            }
            Some(IndexDescriptor::new(index.name, logical.to_document()))
        })
        .collect();

    Ok(indexes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CollectionCatalog, CollectionOptions};
    use crate::timeseries::{ErrorCode, TimeseriesOptions};
    use bson::doc;

    fn key(doc: bson::Document) -> IndexKeySpec {
        IndexKeySpec::from(&doc)
    }

    fn weather() -> Namespace {
        "test.weather".parse().unwrap()
    }

    fn setup() -> CollectionCatalog {
        let catalog = CollectionCatalog::in_memory();
        catalog
            .create_collection(
                &weather(),
                CollectionOptions::timeseries(
                    TimeseriesOptions::new("tm")
                        .unwrap()
                        .with_meta_field("mm")
                        .unwrap(),
                ),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_default_index_name() {
        assert_eq!(default_index_name(&key(doc! { "tm": 1 })), "tm_1");
        assert_eq!(
            default_index_name(&key(doc! { "mm.tag1": -1, "tm": 1 })),
            "mm.tag1_-1_tm_1"
        );
        assert_eq!(default_index_name(&key(doc! { "mm.loc": "2dsphere" })), "mm.loc_2dsphere");
    }

    #[test]
    fn test_create_index_on_timeseries() {
        let catalog = setup();

        let created = create_index(
            &catalog,
            &weather(),
            None,
            &key(doc! { "mm.tag1": 1, "tm": 1 }),
            MetaIndexPolicy::default(),
        )
        .unwrap();

        assert_eq!(created.name, "mm.tag1_1_tm_1");
        assert_eq!(
            created.key,
            doc! { "meta.tag1": 1, "control.min.tm": 1, "control.max.tm": 1 }
        );

        let stored = catalog
            .list_index_descriptors(&weather().bucket_namespace())
            .unwrap();
        assert_eq!(stored, vec![created]);
        assert!(catalog.list_index_descriptors(&weather()).unwrap().is_empty());
    }

    #[test]
    fn test_create_invalid_index_on_timeseries() {
        let catalog = setup();

        let err = create_index(
            &catalog,
            &weather(),
            Some("bad"),
            &key(doc! { "other.field": 1 }),
            MetaIndexPolicy::default(),
        )
        .unwrap_err();

        match err {
            CommandError::IndexSpec(e) => {
                assert_eq!(e.code(), ErrorCode::InvalidIndexSpecification);
                assert_eq!(e.field(), Some("other.field"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(catalog
            .list_index_descriptors(&weather().bucket_namespace())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_create_index_rejects_repeated_paths() {
        let catalog = setup();
        let ns: Namespace = "test.plain".parse().unwrap();
        catalog
            .create_collection(&ns, CollectionOptions::default())
            .unwrap();

        let repeated: IndexKeySpec =
            serde_json::from_str(r#"{"tm": 1, "mm.a": 1, "tm": -1}"#).unwrap();

        for target in [weather(), ns] {
            let err = create_index(&catalog, &target, None, &repeated, MetaIndexPolicy::default())
                .unwrap_err();
            match err {
                CommandError::IndexSpec(e) => {
                    assert_eq!(e.code(), ErrorCode::InvalidIndexSpecification);
                    assert_eq!(e.field(), Some("tm"));
                }
                other => panic!("unexpected error: {}", other),
            }
        }
        assert!(catalog
            .list_index_descriptors(&weather().bucket_namespace())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_indexes_round_trip() {
        let catalog = setup();
        create_index(&catalog, &weather(), None, &key(doc! { "tm": -1 }), MetaIndexPolicy::default())
            .unwrap();
        create_index(
            &catalog,
            &weather(),
            Some("by_tag"),
            &key(doc! { "mm.tag1": 1, "tm": 1 }),
            MetaIndexPolicy::default(),
        )
        .unwrap();

        let listed = list_indexes(&catalog, &weather()).unwrap();
        assert_eq!(
            listed,
            vec![
                IndexDescriptor::new("tm_-1", doc! { "tm": -1 }),
                IndexDescriptor::new("by_tag", doc! { "mm.tag1": 1, "tm": 1 }),
            ]
        );
    }

    #[test]
    fn test_list_indexes_omits_unrecognized() {
        let catalog = setup();
        let buckets = weather().bucket_namespace();

        catalog
            .add_index(&buckets, IndexDescriptor::new("_id_", doc! { "_id": 1 }))
            .unwrap();
        catalog
            .add_index(
                &buckets,
                IndexDescriptor::new("lone_min", doc! { "control.min.tm": 1 }),
            )
            .unwrap();
        catalog
            .add_index(&buckets, IndexDescriptor::new("meta_1", doc! { "meta": 1 }))
            .unwrap();

        let listed = list_indexes(&catalog, &weather()).unwrap();
        assert_eq!(listed, vec![IndexDescriptor::new("meta_1", doc! { "mm": 1 })]);
    }

    #[test]
    fn test_plain_collection_passthrough() {
        let catalog = setup();
        let ns: Namespace = "test.plain".parse().unwrap();
        catalog
            .create_collection(&ns, CollectionOptions::default())
            .unwrap();

        let created =
            create_index(&catalog, &ns, None, &key(doc! { "x": "text" }), MetaIndexPolicy::default())
                .unwrap();
        assert_eq!(created.key, doc! { "x": "text" });
        assert_eq!(list_indexes(&catalog, &ns).unwrap(), vec![created]);
    }

    #[test]
    fn test_unknown_namespace() {
        let catalog = setup();
        let ns: Namespace = "test.missing".parse().unwrap();

        assert!(matches!(
            list_indexes(&catalog, &ns),
            Err(CommandError::Catalog(CatalogError::NamespaceNotFound(_)))
        ));
        assert!(matches!(
            create_index(&catalog, &ns, None, &key(doc! { "a": 1 }), MetaIndexPolicy::default()),
            Err(CommandError::Catalog(CatalogError::NamespaceNotFound(_)))
        ));
    }
}
