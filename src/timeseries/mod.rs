//! Time-series Index Schema Conversion
//!
//! A time-series collection is a logical view over a bucket collection.
//! Indexes are declared against time-series field names but built on the
//! bucket layout:
//!
//! - **forward**: time-series spec → bucket spec (may fail)
//! - **reverse**: bucket spec → time-series spec (empty if unrecognized)
//! - **field_path**: dotted-path helpers shared by both directions
//!
//! # Schema Mapping
//!
//! ```text
//! Time-series collection          Bucket collection
//! ──────────────────────          ─────────────────────────────────
//! <timeField>: D           ⇄      control.min.<timeField>: D,
//!                                 control.max.<timeField>: D
//! <metaField>[.suffix]: D  ⇄      meta[.suffix]: D
//! ```

mod error;
pub mod field_path;
mod forward;
mod key_spec;
mod options;
mod reverse;

pub use error::{ErrorCode, IndexSpecError, IndexSpecResult, OptionsError};
pub use forward::{convert_logical_index_spec_to_physical, to_bucket_schema, MetaIndexPolicy};
pub use key_spec::{IndexDirective, IndexKey, IndexKeySpec, IndexType, WILDCARD_COMPONENT};
pub use options::{Granularity, TimeseriesOptions};
pub use reverse::{convert_physical_index_spec_to_logical, to_logical_schema};
