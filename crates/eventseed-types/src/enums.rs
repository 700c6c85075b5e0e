//! Enumeration types shared across the generator.

use serde::{Deserialize, Serialize};

/// Temporal bucket an event is created in.
///
/// The bucket only selects which window the start time is sampled from.
/// Whether an event counts as "in the past" for participation is decided
/// later against an explicit as-of timestamp, not by the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Start time drawn from the historical window.
    Past,
    /// Start time drawn from the forward window.
    Future,
}

impl Bucket {
    /// Map the `is_future` flag used by catalog scripts onto a bucket.
    pub const fn from_is_future(is_future: bool) -> Self {
        if is_future { Self::Future } else { Self::Past }
    }

    /// Return `true` for [`Bucket::Future`].
    pub const fn is_future(self) -> bool {
        matches!(self, Self::Future)
    }

    /// The key used for this bucket in catalog files: `past` or `future`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

impl core::fmt::Display for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
