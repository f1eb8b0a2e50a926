//! Opaque identifier for mask instances.
//!
//! Every stateful piece of the engine (slots, cursor) lives inside a
//! [`MaskParser`](crate::MaskParser), and parsers are looked up by `MaskId` in a
//! [`MaskRegistry`](crate::MaskRegistry). Two masks on the same page never
//! share state because they never share an id.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier for one mask instance.
///
/// The value has no meaning beyond identity. Ids produced by [`MaskId::next`]
/// are unique for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaskId(u64);

impl MaskId {
    /// Generate a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a `MaskId` from a raw value supplied by an integration layer.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying raw value.
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for MaskId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<MaskId> for u64 {
    #[inline]
    fn from(id: MaskId) -> Self {
        id.as_raw()
    }
}

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mask#{}", self.0)
    }
}
