//! Index key patterns
//!
//! An [`IndexKeySpec`] is an ordered list of `(field path, directive)` pairs.
//! Directive values are kept as the original BSON so a converted spec
//! reproduces the caller's exact values; [`IndexDirective`] classifies them.

use bson::{Bson, Document};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashSet;

/// Path component that marks a wildcard index key
pub const WILDCARD_COMPONENT: &str = "$**";

/// Named special index types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    Text,
    Hashed,
    Geo2d,
    Geo2dSphere,
    GeoHaystack,
    Wildcard,
}

impl IndexType {
    /// Parse the string tag used as a directive value
    ///
    /// Wildcard indexes are keyed by path, not by tag, so they never parse here.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(IndexType::Text),
            "hashed" => Some(IndexType::Hashed),
            "2d" => Some(IndexType::Geo2d),
            "2dsphere" => Some(IndexType::Geo2dSphere),
            "geoHaystack" => Some(IndexType::GeoHaystack),
            _ => None,
        }
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexType::Text => write!(f, "text"),
            IndexType::Hashed => write!(f, "hashed"),
            IndexType::Geo2d => write!(f, "2d"),
            IndexType::Geo2dSphere => write!(f, "2dsphere"),
            IndexType::GeoHaystack => write!(f, "geoHaystack"),
            IndexType::Wildcard => write!(f, "wildcard"),
        }
    }
}

/// Classification of a key's directive value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirective {
    Ascending,
    Descending,
    Special(IndexType),
    Invalid,
}

impl IndexDirective {
    /// Classify a raw directive value
    pub fn classify(value: &Bson) -> Self {
        let number = match value {
            Bson::Int32(v) => *v as f64,
            Bson::Int64(v) => *v as f64,
            Bson::Double(v) => *v,
            Bson::String(tag) => {
                return IndexType::from_tag(tag)
                    .map(IndexDirective::Special)
                    .unwrap_or(IndexDirective::Invalid)
            }
            _ => return IndexDirective::Invalid,
        };

        if number > 0.0 {
            IndexDirective::Ascending
        } else if number < 0.0 {
            IndexDirective::Descending
        } else {
            // Zero and NaN carry no direction
            IndexDirective::Invalid
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self, IndexDirective::Ascending | IndexDirective::Descending)
    }
}

/// A single `(field path, directive)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct IndexKey {
    pub path: String,
    pub value: Bson,
}

impl IndexKey {
    pub fn new(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Directive of this key, with wildcard paths classified as such
    pub fn directive(&self) -> IndexDirective {
        let directive = IndexDirective::classify(&self.value);
        if directive.is_directional() && self.is_wildcard() {
            return IndexDirective::Special(IndexType::Wildcard);
        }
        directive
    }

    pub fn is_wildcard(&self) -> bool {
        self.path
            .rsplit('.')
            .next()
            .map(|last| last == WILDCARD_COMPONENT)
            .unwrap_or(false)
    }
}

/// Ordered index key pattern
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexKeySpec {
    keys: Vec<IndexKey>,
}

impl IndexKeySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: append a key
    pub fn key(mut self, path: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.keys.push(IndexKey::new(path, value));
        self
    }

    pub fn push(&mut self, key: IndexKey) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// First path that appears more than once, if any
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.keys.len());
        self.keys
            .iter()
            .map(|key| key.path.as_str())
            .find(|path| !seen.insert(*path))
    }

    /// Convert to an ordered document
    ///
    /// A later duplicate path overwrites the earlier value in place.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for key in &self.keys {
            doc.insert(key.path.clone(), key.value.clone());
        }
        doc
    }
}

impl From<&Document> for IndexKeySpec {
    fn from(doc: &Document) -> Self {
        Self {
            keys: doc
                .iter()
                .map(|(path, value)| IndexKey::new(path.clone(), value.clone()))
                .collect(),
        }
    }
}

impl From<IndexKeySpec> for Document {
    fn from(spec: IndexKeySpec) -> Self {
        spec.to_document()
    }
}

impl FromIterator<IndexKey> for IndexKeySpec {
    fn from_iter<I: IntoIterator<Item = IndexKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IndexKeySpec {
    type Item = &'a IndexKey;
    type IntoIter = std::slice::Iter<'a, IndexKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Deserializes a key pattern object pair by pair, so repeated paths
/// reach duplicate detection instead of overwriting each other.
impl<'de> Deserialize<'de> for IndexKeySpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyPatternVisitor;

        impl<'de> Visitor<'de> for KeyPatternVisitor {
            type Value = IndexKeySpec;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an index key pattern object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut spec = IndexKeySpec::new();
                while let Some((path, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let value = Bson::try_from(value).map_err(|e| {
                        <A::Error as de::Error>::custom(format!(
                            "invalid value for '{}': {}",
                            path, e
                        ))
                    })?;
                    spec.push(IndexKey::new(path, value));
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_map(KeyPatternVisitor)
    }
}
