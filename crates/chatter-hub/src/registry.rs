use std::sync::Arc;

use chatter_core::ConnId;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::connection::Connection;

/// Live connections keyed by connection id.
///
/// Every operation is atomic on its own. `snapshot` clones the `Arc` handles
/// and drops all shard guards before returning, so callers may await while
/// iterating without blocking concurrent register/unregister.
#[derive(Default)]
pub struct Registry {
    members: DashMap<ConnId, Arc<Connection>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns false (and changes nothing) if already present.
    pub fn register(&self, conn: Arc<Connection>) -> bool {
        match self.members.entry(conn.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(conn);
                true
            }
        }
    }

    /// Remove a connection. Returns false if it was not registered.
    pub fn unregister(&self, id: &ConnId) -> bool {
        self.members.remove(id).is_some()
    }

    pub fn contains(&self, id: &ConnId) -> bool {
        self.members.contains_key(id)
    }

    /// Members at this instant.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.members
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn() -> Arc<Connection> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(Connection::new(tx))
    }

    #[test]
    fn register_connection() {
        let registry = Registry::new();
        let c = conn();
        assert!(registry.register(Arc::clone(&c)));
        assert!(registry.contains(&c.id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_register_is_noop() {
        let registry = Registry::new();
        let c = conn();
        assert!(registry.register(Arc::clone(&c)));
        assert!(!registry.register(Arc::clone(&c)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_connection() {
        let registry = Registry::new();
        let c = conn();
        registry.register(Arc::clone(&c));
        assert!(registry.unregister(&c.id));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let registry = Registry::new();
        registry.register(conn());
        assert!(!registry.unregister(&ConnId::from("no_such")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let registry = Registry::new();
        let a = conn();
        let b = conn();
        registry.register(Arc::clone(&a));
        registry.register(Arc::clone(&b));

        let snap = registry.snapshot();
        registry.unregister(&a.id);

        assert_eq!(snap.len(), 2);
        assert_eq!(registry.len(), 1);
    }
}
