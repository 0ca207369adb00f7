//! In-memory set of open connections.
//!
//! The registry itself is not synchronised; [`crate::hub::PresenceHub`]
//! owns it behind a lock so every mutation and the snapshot that follows it
//! happen as one step.

use std::collections::HashMap;

use footfall_common::{ConnectionId, PresenceError};

use crate::aggregate::{compute_snapshot, Snapshot};

/// One live browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// `None` until the client reports a page.
    pub current_page: Option<String>,
    /// Fixed at connect time.
    pub country: String,
}

/// Connection id -> connection record.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    connections: HashMap<ConnectionId, Connection>,
    unknown_page: String,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page key used in snapshots for connections with no reported page.
    pub fn with_unknown_page(mut self, label: impl Into<String>) -> Self {
        self.unknown_page = label.into();
        self
    }

    pub fn unknown_page(&self) -> &str {
        &self.unknown_page
    }

    /// Insert a new connection with no page.
    ///
    /// An id that is already present is replaced with the fresh record and
    /// `DuplicateConnection` is returned so the caller can report it.
    pub fn register(
        &mut self,
        id: ConnectionId,
        country: impl Into<String>,
    ) -> Result<(), PresenceError> {
        let connection = Connection {
            id: id.clone(),
            current_page: None,
            country: country.into(),
        };
        match self.connections.insert(id.clone(), connection) {
            Some(_) => Err(PresenceError::DuplicateConnection(id)),
            None => Ok(()),
        }
    }

    /// Record the page a connection is viewing. Never inserts.
    pub fn set_page(
        &mut self,
        id: &ConnectionId,
        page: impl Into<String>,
    ) -> Result<(), PresenceError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or_else(|| PresenceError::UnknownConnection(id.clone()))?;
        connection.current_page = Some(page.into());
        Ok(())
    }

    /// Remove a connection, returning its last record.
    pub fn unregister(&mut self, id: &ConnectionId) -> Result<Connection, PresenceError> {
        self.connections
            .remove(id)
            .ok_or_else(|| PresenceError::UnknownConnection(id.clone()))
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        compute_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_inserts_without_page() {
        let mut registry = PresenceRegistry::new();
        let id = ConnectionId::from("a");
        registry.register(id.clone(), "EG").unwrap();

        let conn = registry.get(&id).unwrap();
        assert_eq!(conn.country, "EG");
        assert_eq!(conn.current_page, None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_register_overwrites_and_reports() {
        let mut registry = PresenceRegistry::new();
        let id = ConnectionId::from("a");
        registry.register(id.clone(), "EG").unwrap();
        registry.set_page(&id, "/products").unwrap();

        let err = registry.register(id.clone(), "US").unwrap_err();
        assert!(matches!(err, PresenceError::DuplicateConnection(ref dup) if *dup == id));

        let conn = registry.get(&id).unwrap();
        assert_eq!(conn.country, "US");
        assert_eq!(conn.current_page, None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn set_page_updates_existing() {
        let mut registry = PresenceRegistry::new();
        let id = ConnectionId::from("a");
        registry.register(id.clone(), "EG").unwrap();
        registry.set_page(&id, "/").unwrap();
        registry.set_page(&id, "/about").unwrap();
        assert_eq!(registry.get(&id).unwrap().current_page.as_deref(), Some("/about"));
    }

    #[test]
    fn set_page_on_unknown_does_not_insert() {
        let mut registry = PresenceRegistry::new();
        let id = ConnectionId::from("ghost");
        let err = registry.set_page(&id, "/").unwrap_err();
        assert!(matches!(err, PresenceError::UnknownConnection(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = PresenceRegistry::new();
        let id = ConnectionId::from("a");
        registry.register(id.clone(), "EG").unwrap();

        let removed = registry.unregister(&id).unwrap();
        assert_eq!(removed.country, "EG");
        assert!(registry.unregister(&id).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn late_page_after_unregister_leaves_snapshot_alone() {
        let mut registry = PresenceRegistry::new();
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        registry.register(a.clone(), "EG").unwrap();
        registry.register(b.clone(), "US").unwrap();
        registry.set_page(&b, "/products").unwrap();
        registry.unregister(&a).unwrap();

        let before = registry.snapshot();
        assert!(registry.set_page(&a, "/about").is_err());
        assert!(!registry.contains(&a));
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn unknown_page_label_is_configurable() {
        let registry = PresenceRegistry::new().with_unknown_page("(none)");
        assert_eq!(registry.unknown_page(), "(none)");
    }
}
