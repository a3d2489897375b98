//! Shared, ordered collection of stub mappings.

use super::types::StubMapping;
use crate::matching::{find_best_match, IncomingRequest, MatchResult};
use parking_lot::RwLock;
use tracing::debug;

/// Thread-safe stub storage. Insertion order is significant for tie-breaking.
#[derive(Debug, Default)]
pub struct StubRepository {
    stubs: RwLock<Vec<StubMapping>>,
}

impl StubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all mappings, keeping their order.
    pub fn import(&self, mappings: Vec<StubMapping>) -> usize {
        let count = mappings.len();
        self.stubs.write().extend(mappings);
        debug!("Imported {} stub mappings", count);
        count
    }

    /// Append one mapping.
    pub fn add(&self, mapping: StubMapping) {
        self.stubs.write().push(mapping);
    }

    /// Remove every mapping, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut stubs = self.stubs.write();
        let count = stubs.len();
        stubs.clear();
        count
    }

    /// Snapshot of all mappings in insertion order.
    pub fn list(&self) -> Vec<StubMapping> {
        self.stubs.read().clone()
    }

    pub fn len(&self) -> usize {
        self.stubs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.read().is_empty()
    }

    /// Run the match engine under the read lock.
    pub fn find_best_match(&self, request: &IncomingRequest) -> MatchResult {
        let stubs = self.stubs.read();
        find_best_match(request, &stubs)
    }
}
