//! Time-series options lookup

use crate::catalog::{Catalog, CatalogResult, Namespace};
use crate::timeseries::TimeseriesOptions;

/// Time-series options of `ns`, if it is a time-series collection
///
/// `Ok(None)` covers both "no such collection" and "not time-series".
/// Catalog faults are returned as errors.
pub fn get_timeseries_options<C: Catalog + ?Sized>(
    catalog: &C,
    ns: &Namespace,
) -> CatalogResult<Option<TimeseriesOptions>> {
    let options = catalog
        .collection_options(ns)?
        .and_then(|options| options.timeseries);

    tracing::debug!(
        namespace = %ns,
        timeseries = options.is_some(),
        "Resolved time-series options"
    );

    Ok(options)
}
