//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a field source within a registry.
///
/// Assigned sequentially by the registry at registration time and never
/// reused for the lifetime of that registry, even after the source is
/// removed or the registry is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SourceId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
