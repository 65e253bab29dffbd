// ── Entity registry reconciliation ──
//
// The host platform owns the registry of persisted entities. The core only
// needs to list what is registered and remove what it no longer wants, so
// the platform is reached through the small `EntityRegistry` trait.

use std::collections::BTreeSet;

use dashmap::DashMap;
use tracing::debug;

use crate::entity::{Entity, EntitySet};
use crate::model::EntityKey;

/// Platform-owned store of registered entities.
pub trait EntityRegistry: Send + Sync {
    /// Unique ids of every registered entity owned by this integration.
    fn entries(&self) -> Vec<String>;

    /// Remove one entry. Returns `false` if it was not registered.
    fn remove(&self, unique_id: &str) -> bool;
}

// ── Reconciler ───────────────────────────────────────────────────────

/// Diffs successive desired entity sets and removes what dropped out.
#[derive(Debug, Default)]
pub struct EntityReconciler {
    previous: BTreeSet<String>,
}

impl EntityReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove registry entries that were desired last cycle but not this one.
    ///
    /// Entries the reconciler never produced are left alone. Returns the
    /// removed ids in sorted order.
    pub fn reconcile(&mut self, desired: &EntitySet, registry: &dyn EntityRegistry) -> Vec<String> {
        let registered: BTreeSet<String> = registry.entries().into_iter().collect();
        let removed: Vec<String> = self
            .previous
            .iter()
            .filter(|id| !desired.contains(id) && registered.contains(*id))
            .filter(|id| registry.remove(id))
            .cloned()
            .collect();

        if !removed.is_empty() {
            debug!(count = removed.len(), "removed stale entities");
        }
        self.previous = desired.ids();
        removed
    }

    /// Ids produced by the last reconciled cycle.
    pub fn previous(&self) -> &BTreeSet<String> {
        &self.previous
    }
}

/// Remove site-scoped entries whose site is not in `selected`.
///
/// SD-WAN entries are account-wide and always kept. An empty selection
/// keeps everything.
pub fn prune_unselected(registry: &dyn EntityRegistry, selected: &BTreeSet<String>) -> Vec<String> {
    if selected.is_empty() {
        return Vec::new();
    }

    let mut removed: Vec<String> = registry
        .entries()
        .into_iter()
        .filter(|id| EntityKey::site_scope(id).is_some_and(|site| !selected.contains(site)))
        .filter(|id| registry.remove(id))
        .collect();
    removed.sort();

    if !removed.is_empty() {
        debug!(count = removed.len(), "pruned entities of deselected sites");
    }
    removed
}

// ── In-memory registry ───────────────────────────────────────────────

/// Registry kept in process, for CLIs and tests.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: DashMap<String, Entity>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or update) every entity in `set`.
    pub fn register_all(&self, set: &EntitySet) {
        for entity in set.entities() {
            self.entries.insert(entity.unique_id(), entity.clone());
        }
    }

    pub fn get(&self, unique_id: &str) -> Option<Entity> {
        self.entries.get(unique_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityRegistry for MemoryRegistry {
    fn entries(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    fn remove(&self, unique_id: &str) -> bool {
        self.entries.remove(unique_id).is_some()
    }
}
