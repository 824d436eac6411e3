/// Notification state store
///
/// Ordered collection (most recent first) plus the unread counter. The counter is
/// maintained incrementally but always equals the number of unread records; every
/// mutation takes `&mut self`, so no reader can observe the two out of step.
use crate::notification::{Notification, NotificationId};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub items: Vec<Notification>,
    pub unread_count: usize,
    pub visible: bool,
}

impl Projection {
    /// Unread count recomputed from `items`
    pub fn derived_unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }
}

#[derive(Debug, Default)]
pub struct NotificationStore {
    items: VecDeque<Notification>,
    ids: HashSet<NotificationId>,
    unread: usize,
    visible: bool,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `notification` as unread.
    ///
    /// Returns `false` and leaves the store untouched if a record with the same id is
    /// already present.
    pub fn append(&mut self, mut notification: Notification) -> bool {
        if self.ids.contains(&notification.id) {
            debug!(notification_id = %notification.id, "Duplicate notification dropped");
            return false;
        }

        notification.read = false;
        self.ids.insert(notification.id.clone());
        self.items.push_front(notification);
        self.unread += 1;

        debug_assert_eq!(self.unread, self.recount());
        true
    }

    /// Mark every record read. Returns how many were unread.
    pub fn mark_all_read(&mut self) -> usize {
        let marked = self.unread;
        for notification in self.items.iter_mut() {
            notification.read = true;
        }
        self.unread = 0;
        marked
    }

    /// Flip panel visibility; returns the new value
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn projection(&self) -> Projection {
        Projection {
            items: self.items.iter().cloned().collect(),
            unread_count: self.unread,
            visible: self.visible,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.ids.contains(id)
    }

    fn recount(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> Notification {
        Notification::new(title, "body")
    }

    #[test]
    fn test_store_creation() {
        let store = NotificationStore::new();
        let projection = store.projection();

        assert!(projection.items.is_empty());
        assert_eq!(projection.unread_count, 0);
        assert!(!projection.visible);
        assert!(store.is_empty());
        assert!(!store.is_visible());
    }

    #[test]
    fn test_appends_are_most_recent_first() {
        let mut store = NotificationStore::new();
        for idx in 0..5 {
            assert!(store.append(titled(&format!("n{idx}"))));
        }

        let projection = store.projection();
        assert_eq!(projection.items.len(), 5);
        assert_eq!(projection.unread_count, 5);
        assert_eq!(projection.items[0].title, "n4");
        assert_eq!(projection.items[4].title, "n0");
        assert_eq!(projection.derived_unread_count(), projection.unread_count);
    }

    #[test]
    fn test_mark_all_read_is_idempotent() {
        let mut store = NotificationStore::new();
        store.append(titled("a"));
        store.append(titled("b"));

        assert_eq!(store.mark_all_read(), 2);
        assert_eq!(store.unread_count(), 0);

        assert_eq!(store.mark_all_read(), 0);
        let projection = store.projection();
        assert_eq!(projection.unread_count, 0);
        assert!(projection.items.iter().all(|n| n.read));
    }

    #[test]
    fn test_append_after_mark_all_read() {
        let mut store = NotificationStore::new();
        store.append(titled("old-1"));
        store.append(titled("old-2"));
        store.mark_all_read();

        store.append(titled("new-1"));
        store.append(titled("new-2"));
        store.append(titled("new-3"));

        let projection = store.projection();
        assert_eq!(projection.unread_count, 3);
        assert_eq!(projection.derived_unread_count(), 3);
        assert!(projection.items[3].read);
        assert!(projection.items[4].read);
    }

    #[test]
    fn test_appended_record_is_always_unread() {
        let mut store = NotificationStore::new();
        let mut notification = titled("pre-read");
        notification.read = true;

        store.append(notification);
        assert_eq!(store.unread_count(), 1);
        assert!(!store.projection().items[0].read);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut store = NotificationStore::new();
        let notification = titled("a");
        let duplicate = notification.clone();

        let id = notification.id.clone();

        assert!(store.append(notification));
        assert!(store.contains(&id));
        store.mark_all_read();
        assert!(!store.append(duplicate));
        assert_eq!(store.len(), 1);

        let projection = store.projection();
        assert_eq!(projection.items.len(), 1);
        assert_eq!(projection.unread_count, 0);
        assert!(projection.items[0].read);
    }

    #[test]
    fn test_toggle_visibility_leaves_data_alone() {
        let mut store = NotificationStore::new();
        store.append(titled("a"));
        let before = store.projection();

        assert!(store.toggle_visibility());
        assert!(store.is_visible());
        let after = store.projection();
        assert!(after.visible);
        assert_eq!(after.items, before.items);
        assert_eq!(after.unread_count, before.unread_count);

        assert!(!store.toggle_visibility());
    }
}
