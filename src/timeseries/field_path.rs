//! Dotted field-path helpers
//!
//! Index keys are dot-separated paths; only the leading segment matters
//! for classifying a key against the time-series schema.

/// Root of the metadata sub-document on a bucket
pub const BUCKET_META_FIELD: &str = "meta";

/// Prefix of per-bucket minimum summaries
pub const CONTROL_MIN_PREFIX: &str = "control.min.";

/// Prefix of per-bucket maximum summaries
pub const CONTROL_MAX_PREFIX: &str = "control.max.";

/// True if `path` is `root` itself or a sub-path of it
pub fn is_rooted_at(path: &str, root: &str) -> bool {
    match path.strip_prefix(root) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

/// Replace the leading segment `from` with `to`, keeping any suffix
///
/// Returns `None` when `path` is not rooted at `from`.
pub fn rewrite_root(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_rooted_at(path, from) {
        return None;
    }
    Some(format!("{}{}", to, &path[from.len()..]))
}

pub fn control_min(time_field: &str) -> String {
    format!("{}{}", CONTROL_MIN_PREFIX, time_field)
}

pub fn control_max(time_field: &str) -> String {
    format!("{}{}", CONTROL_MAX_PREFIX, time_field)
}
