//! Request ids for discarding stale background results.
//!
//! Each fetch gets the next id from its view's tracker. A result is applied
//! only if its id is still the latest one issued.

/// Monotonically increasing id of a background request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request ids for one target view. Owned by that view; background
/// tasks only carry the `RequestId` they were issued.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id, superseding every earlier one.
    pub fn issue(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    /// True if `id` is the most recently issued id.
    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest == id.0
    }

    /// The most recently issued id, if any.
    pub fn latest(&self) -> Option<RequestId> {
        match self.latest {
            0 => None,
            n => Some(RequestId(n)),
        }
    }
}
