//! Time-series collection options
//!
//! The declared configuration of a time-series collection. Only `time_field`
//! and `meta_field` drive index conversion; the bucketing parameters are
//! carried along so catalog entries round-trip intact.

use crate::timeseries::OptionsError;
use serde::{Deserialize, Serialize};

/// Bucketing granularity of a time-series collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Seconds => write!(f, "seconds"),
            Granularity::Minutes => write!(f, "minutes"),
            Granularity::Hours => write!(f, "hours"),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seconds" => Ok(Granularity::Seconds),
            "minutes" => Ok(Granularity::Minutes),
            "hours" => Ok(Granularity::Hours),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}

/// Declared time-series configuration of a collection
///
/// Immutable once validated. Mappers only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesOptions {
    time_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta_field: Option<String>,
    #[serde(default)]
    granularity: Granularity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bucket_max_span_seconds: Option<u32>,
}

impl TimeseriesOptions {
    /// Create options with a time field and no metadata field
    pub fn new(time_field: impl Into<String>) -> Result<Self, OptionsError> {
        let options = Self {
            time_field: time_field.into(),
            meta_field: None,
            granularity: Granularity::default(),
            bucket_max_span_seconds: None,
        };
        options.validate()?;
        Ok(options)
    }

    /// Builder method: set the metadata field
    pub fn with_meta_field(mut self, meta_field: impl Into<String>) -> Result<Self, OptionsError> {
        self.meta_field = Some(meta_field.into());
        self.validate()?;
        Ok(self)
    }

    /// Builder method: set the bucketing granularity
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Builder method: set the maximum bucket span
    pub fn bucket_max_span_seconds(mut self, seconds: u32) -> Self {
        self.bucket_max_span_seconds = Some(seconds);
        self
    }

    /// Check the field-name invariants
    ///
    /// Needed after deserialization, which bypasses the constructors.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.time_field.is_empty() {
            return Err(OptionsError::EmptyTimeField);
        }
        check_top_level(&self.time_field)?;

        if let Some(meta) = &self.meta_field {
            if meta.is_empty() {
                return Err(OptionsError::EmptyMetaField);
            }
            check_top_level(meta)?;
            if *meta == self.time_field {
                return Err(OptionsError::SameField(meta.clone()));
            }
        }

        Ok(())
    }

    pub fn time_field(&self) -> &str {
        &self.time_field
    }

    pub fn meta_field(&self) -> Option<&str> {
        self.meta_field.as_deref()
    }

    pub fn get_granularity(&self) -> Granularity {
        self.granularity
    }
}

fn check_top_level(name: &str) -> Result<(), OptionsError> {
    if name.contains('.') || name.starts_with('$') {
        return Err(OptionsError::NotTopLevel(name.to_string()));
    }
    Ok(())
}
