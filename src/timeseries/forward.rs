//! Time-series → bucket index conversion
//!
//! ```text
//! { "mm.tag1": 1, "tm": 1 }
//!        ↓
//! { "meta.tag1": 1, "control.min.tm": 1, "control.max.tm": 1 }
//! ```

use crate::timeseries::field_path::{self, BUCKET_META_FIELD};
use crate::timeseries::{
    IndexDirective, IndexKey, IndexKeySpec, IndexSpecError, IndexSpecResult, TimeseriesOptions,
};
use bson::Document;
use serde::{Deserialize, Serialize};

/// Whether special index types may be built on the metadata field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaIndexPolicy {
    /// Accept text, hashed, geo and wildcard keys under the metadata field
    #[default]
    AllowSpecial,
    /// Only ascending/descending keys
    DirectionsOnly,
}

impl std::str::FromStr for MetaIndexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_special" => Ok(MetaIndexPolicy::AllowSpecial),
            "directions_only" => Ok(MetaIndexPolicy::DirectionsOnly),
            other => Err(format!("unknown meta index policy '{}'", other)),
        }
    }
}

/// Map a time-series index spec onto the bucket collection schema
pub fn to_bucket_schema(
    options: &TimeseriesOptions,
    spec: &IndexKeySpec,
    policy: MetaIndexPolicy,
) -> IndexSpecResult<IndexKeySpec> {
    if spec.is_empty() {
        return Err(IndexSpecError::Empty);
    }

    if let Some(field) = spec.first_duplicate() {
        return Err(IndexSpecError::DuplicateKey {
            field: field.to_string(),
        });
    }

    let time_field = options.time_field();
    let mut out = IndexKeySpec::new();

    for key in spec {
        if key.path == time_field {
            if !key.directive().is_directional() {
                return Err(IndexSpecError::TimeFieldNotDirectional {
                    field: key.path.clone(),
                    value: key.value.to_string(),
                });
            }
            out.push(IndexKey::new(field_path::control_min(time_field), key.value.clone()));
            out.push(IndexKey::new(field_path::control_max(time_field), key.value.clone()));
            continue;
        }

        let bucket_path = options
            .meta_field()
            .and_then(|meta| field_path::rewrite_root(&key.path, meta, BUCKET_META_FIELD));

        let Some(bucket_path) = bucket_path else {
            return Err(IndexSpecError::UnsupportedField {
                field: key.path.clone(),
                time_field: time_field.to_string(),
                meta_field: options.meta_field().map(str::to_string),
            });
        };

        match key.directive() {
            IndexDirective::Ascending | IndexDirective::Descending => {}
            IndexDirective::Special(kind) => {
                if policy == MetaIndexPolicy::DirectionsOnly {
                    return Err(IndexSpecError::SpecialIndexOnMetaField {
                        field: key.path.clone(),
                        value: kind.to_string(),
                    });
                }
            }
            IndexDirective::Invalid => {
                return Err(IndexSpecError::InvalidDirective {
                    field: key.path.clone(),
                    value: key.value.to_string(),
                });
            }
        }

        out.push(IndexKey::new(bucket_path, key.value.clone()));
    }

    Ok(out)
}

/// Document form of [`to_bucket_schema`] with the default policy
pub fn convert_logical_index_spec_to_physical(
    options: &TimeseriesOptions,
    spec: &Document,
) -> IndexSpecResult<Document> {
    to_bucket_schema(options, &IndexKeySpec::from(spec), MetaIndexPolicy::default())
        .map(|spec| spec.to_document())
}
