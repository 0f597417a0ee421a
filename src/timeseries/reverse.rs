//! Bucket → time-series index conversion
//!
//! Recognition is all-or-nothing: a bucket index that deviates anywhere from
//! a shape the forward conversion produces maps to an empty spec, which
//! listings treat as "hide this index".

use crate::timeseries::field_path::{self, BUCKET_META_FIELD};
use crate::timeseries::{IndexKey, IndexKeySpec, TimeseriesOptions};
use bson::Document;
use std::collections::HashSet;

/// Map a bucket collection index spec back onto the time-series schema
///
/// Returns an empty spec if `spec` is not a valid time-series index shape.
pub fn to_logical_schema(options: &TimeseriesOptions, spec: &IndexKeySpec) -> IndexKeySpec {
    match collapse(options, spec.keys()) {
        Some(logical) => logical,
        None => {
            tracing::trace!(
                time_field = options.time_field(),
                keys = spec.len(),
                "Bucket index does not match a time-series index shape"
            );
            IndexKeySpec::new()
        }
    }
}

/// Document form of [`to_logical_schema`]
pub fn convert_physical_index_spec_to_logical(
    options: &TimeseriesOptions,
    spec: &Document,
) -> Document {
    to_logical_schema(options, &IndexKeySpec::from(spec)).to_document()
}

fn collapse(options: &TimeseriesOptions, keys: &[IndexKey]) -> Option<IndexKeySpec> {
    let time_field = options.time_field();
    let min_path = field_path::control_min(time_field);
    let max_path = field_path::control_max(time_field);

    let mut out = IndexKeySpec::new();
    let mut seen = HashSet::with_capacity(keys.len());
    let mut i = 0;

    while i < keys.len() {
        let key = &keys[i];

        if key.path == min_path {
            if !key.directive().is_directional() {
                return None;
            }
            let max = keys.get(i + 1)?;
            if max.path != max_path || max.value != key.value {
                return None;
            }
            if !seen.insert(time_field.to_string()) {
                return None;
            }
            out.push(IndexKey::new(time_field, key.value.clone()));
            i += 2;
            continue;
        }

        let meta = options.meta_field()?;
        let logical_path = field_path::rewrite_root(&key.path, BUCKET_META_FIELD, meta)?;
        if !seen.insert(logical_path.clone()) {
            return None;
        }
        out.push(IndexKey::new(logical_path, key.value.clone()));
        i += 1;
    }

    if out.is_empty() {
        return None;
    }
    Some(out)
}
