//! Collection namespaces
//!
//! A namespace is `<db>.<collection>`. The bucket collection backing a
//! time-series collection lives at `<db>.system.buckets.<collection>`.

use crate::catalog::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection-name prefix of bucket collections
pub const BUCKETS_PREFIX: &str = "system.buckets.";

/// Fully qualified collection name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    db: String,
    coll: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Result<Self, CatalogError> {
        let db = db.into();
        let coll = coll.into();

        if db.is_empty() || coll.is_empty() || db.contains('.') {
            return Err(CatalogError::InvalidNamespace(format!("{}.{}", db, coll)));
        }

        Ok(Self { db, coll })
    }

    pub fn db(&self) -> &str {
        &self.db
    }

    pub fn coll(&self) -> &str {
        &self.coll
    }

    /// Namespace of the bucket collection backing this one
    pub fn bucket_namespace(&self) -> Namespace {
        Namespace {
            db: self.db.clone(),
            coll: format!("{}{}", BUCKETS_PREFIX, self.coll),
        }
    }

    pub fn is_bucket_namespace(&self) -> bool {
        self.coll.starts_with(BUCKETS_PREFIX)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.coll)
    }
}

impl FromStr for Namespace {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (db, coll) = s
            .split_once('.')
            .ok_or_else(|| CatalogError::InvalidNamespace(s.to_string()))?;
        Namespace::new(db, coll)
    }
}

impl TryFrom<String> for Namespace {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let ns: Namespace = "test.weather".parse().unwrap();
        assert_eq!(ns.db(), "test");
        assert_eq!(ns.coll(), "weather");
        assert_eq!(ns.to_string(), "test.weather");

        let ns: Namespace = "test.a.b".parse().unwrap();
        assert_eq!(ns.coll(), "a.b");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("weather".parse::<Namespace>().is_err());
        assert!(".weather".parse::<Namespace>().is_err());
        assert!("test.".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_bucket_namespace() {
        let ns: Namespace = "test.weather".parse().unwrap();
        let buckets = ns.bucket_namespace();

        assert_eq!(buckets.to_string(), "test.system.buckets.weather");
        assert!(buckets.is_bucket_namespace());
        assert!(!ns.is_bucket_namespace());
    }

    #[test]
    fn test_serde_as_string() {
        let ns: Namespace = "test.weather".parse().unwrap();
        let json = serde_json::to_string(&ns).unwrap();
        assert_eq!(json, r#""test.weather""#);

        let back: Namespace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ns);
        assert!(serde_json::from_str::<Namespace>(r#""nodot""#).is_err());
    }
}
