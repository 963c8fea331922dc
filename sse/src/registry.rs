use crate::connection::{ConnectionHandle, UserId};
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Maps each user to their single live connection.
///
/// Entries are weak: a handle is owned by the subscription that created it,
/// the registry only routes to it. Operations on different users never
/// contend on the same lock; operations on one user serialize on its shard.
pub struct SubscriptionRegistry {
    connections: DashMap<UserId, Weak<ConnectionHandle>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Installs `handle` as its user's live connection - O(1)
    ///
    /// Returns the connection it replaced, if that one is still alive. The
    /// caller is responsible for terminating it.
    pub fn register(&self, handle: &Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        self.connections
            .insert(handle.user_id().clone(), Arc::downgrade(handle))
            .and_then(|previous| previous.upgrade())
    }

    /// Current live connection for a user - O(1)
    ///
    /// An entry whose handle was dropped without reaching a terminal state
    /// is pruned here.
    pub fn lookup(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        let entry = self.connections.get(user_id)?;
        let handle = entry.value().upgrade();
        // The shard guard must be released before `remove_if` takes it again
        drop(entry);

        if handle.is_none() {
            self.connections
                .remove_if(user_id, |_, current| current.strong_count() == 0);
        }
        handle
    }

    /// Removes the user's entry only if it still points at `expected`.
    ///
    /// A stale connection's cleanup can therefore never evict a newer
    /// connection that replaced it.
    pub fn remove(&self, user_id: &str, expected: &ConnectionHandle) -> bool {
        self.connections
            .remove_if(user_id, |_, current| {
                std::ptr::eq(current.as_ptr(), expected as *const ConnectionHandle)
            })
            .is_some()
    }

    /// Users that currently have a live connection - O(n)
    pub fn recipients(&self) -> Vec<UserId> {
        self.connections
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of users with a live connection - O(n)
    pub fn len(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Frame;
    use tokio::sync::mpsc;

    fn handle(user_id: &str) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::unbounded_channel::<Frame>();
        Arc::new(ConnectionHandle::new(user_id.to_string(), Box::new(tx)))
    }

    #[test]
    fn test_register_returns_previous_handle_for_same_user() {
        let registry = SubscriptionRegistry::new();
        let first = handle("1");
        let second = handle("1");

        assert!(registry.register(&first).is_none());
        let previous = registry.register(&second).unwrap();

        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&registry.lookup("1").unwrap(), &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_users_do_not_replace_each_other() {
        let registry = SubscriptionRegistry::new();
        let alice = handle("alice");
        let bob = handle("bob");

        assert!(registry.register(&alice).is_none());
        assert!(registry.register(&bob).is_none());

        assert!(Arc::ptr_eq(&registry.lookup("alice").unwrap(), &alice));
        assert!(Arc::ptr_eq(&registry.lookup("bob").unwrap(), &bob));

        let mut recipients = registry.recipients();
        recipients.sort();
        assert_eq!(recipients, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_remove_only_matches_the_registered_handle() {
        let registry = SubscriptionRegistry::new();
        let stale = handle("1");
        let current = handle("1");
        registry.register(&stale);
        registry.register(&current);

        assert!(!registry.remove("1", &stale));
        assert!(Arc::ptr_eq(&registry.lookup("1").unwrap(), &current));

        assert!(registry.remove("1", &current));
        assert!(registry.lookup("1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_ignores_dropped_handles() {
        let registry = SubscriptionRegistry::new();
        let dropped = handle("1");
        registry.register(&dropped);
        drop(dropped);

        assert!(registry.lookup("1").is_none());
        assert!(registry.recipients().is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_lookup_prunes_dropped_entry_without_touching_successor() {
        let registry = SubscriptionRegistry::new();
        let dropped = handle("1");
        registry.register(&dropped);
        drop(dropped);

        assert!(registry.lookup("1").is_none());
        assert!(registry.connections.get("1").is_none());

        let current = handle("1");
        assert!(registry.register(&current).is_none());
        assert!(Arc::ptr_eq(&registry.lookup("1").unwrap(), &current));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_user() {
        let registry = SubscriptionRegistry::new();

        assert!(registry.lookup("nobody").is_none());
        assert!(!registry.remove("nobody", &handle("nobody")));
    }
}
