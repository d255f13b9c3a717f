//! Entity runtime ID registry
//!
//! Each session numbers the entities its client knows about. The session's
//! own entity is always [`SELF_RUNTIME_ID`]; every other entity gets the next
//! value of a counter that never goes backwards, so an ID is never handed out
//! twice by the same registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

/// Runtime ID of the session's own entity
pub const SELF_RUNTIME_ID: u64 = 1;

/// Session-local mapping from entity UUID to runtime ID
#[derive(Debug)]
pub struct EntityRegistry {
    ids: Mutex<HashMap<Uuid, u64>>,
    counter: AtomicU64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            ids: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(SELF_RUNTIME_ID),
        }
    }

    /// Assign a runtime ID to an entity. Registering an entity again replaces
    /// its old ID with a fresh one.
    pub fn register(&self, uuid: Uuid, is_self: bool) -> u64 {
        let mut ids = self.ids.lock();
        let runtime_id = if is_self {
            SELF_RUNTIME_ID
        } else {
            self.counter.fetch_add(1, Ordering::SeqCst) + 1
        };
        ids.insert(uuid, runtime_id);
        runtime_id
    }

    /// Forget an entity, returning the ID it had
    pub fn unregister(&self, uuid: &Uuid) -> Option<u64> {
        self.ids.lock().remove(uuid)
    }

    pub fn runtime_id(&self, uuid: &Uuid) -> Option<u64> {
        self.ids.lock().get(uuid).copied()
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_self_is_one() {
        let registry = EntityRegistry::new();
        assert_eq!(registry.register(Uuid::new_v4(), true), SELF_RUNTIME_ID);
    }

    #[test]
    fn test_peers_increase() {
        let registry = EntityRegistry::new();
        let a = registry.register(Uuid::new_v4(), false);
        let b = registry.register(Uuid::new_v4(), false);

        assert_eq!(a, 2);
        assert_eq!(b, 3);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregister_gets_fresh_id() {
        let registry = EntityRegistry::new();
        let peer = Uuid::new_v4();
        let first = registry.register(peer, false);
        let second = registry.register(peer, false);

        assert_ne!(first, second);
        assert_eq!(registry.runtime_id(&peer), Some(second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = EntityRegistry::new();
        let peer = Uuid::new_v4();
        let id = registry.register(peer, false);

        assert_eq!(registry.unregister(&peer), Some(id));
        assert_eq!(registry.unregister(&peer), None);
        assert!(registry.is_empty());

        // Freed IDs are not handed out again
        assert!(registry.register(Uuid::new_v4(), false) > id);
    }

    #[test]
    fn test_concurrent_ids_are_distinct() {
        let registry = Arc::new(EntityRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| registry.register(Uuid::new_v4(), false))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(id > SELF_RUNTIME_ID);
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
