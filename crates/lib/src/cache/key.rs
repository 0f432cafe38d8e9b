//! Cache keys.
//!
//! A [`QueryKey`] is an ordered tuple of string segments naming a cacheable
//! resource or resource family, e.g. `["projects"]`, `["tasks", project_id]`.
//! Invalidation works by prefix: `["tasks", p]` covers every key that starts
//! with those segments.

use std::fmt;

/// An ordered tuple of segments identifying a cacheable resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The key's segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this key belongs to the family named by `prefix`.
    ///
    /// A key is always a prefix of itself.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for QueryKey {
    fn from(segments: [S; N]) -> Self {
        Self::new(segments)
    }
}
