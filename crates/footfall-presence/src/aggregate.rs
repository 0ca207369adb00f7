//! Snapshot derivation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::PresenceRegistry;

/// Point-in-time visitor counts.
///
/// `total` always equals the sum of `pages` and the sum of `countries`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub total: usize,
    pub pages: BTreeMap<String, usize>,
    pub countries: BTreeMap<String, usize>,
}

impl Snapshot {
    pub fn is_consistent(&self) -> bool {
        self.pages.values().sum::<usize>() == self.total
            && self.countries.values().sum::<usize>() == self.total
    }
}

/// Count the registry by page and by country in one pass.
pub fn compute_snapshot(registry: &PresenceRegistry) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for conn in registry.iter() {
        snapshot.total += 1;
        let page = conn
            .current_page
            .as_deref()
            .unwrap_or_else(|| registry.unknown_page());
        *snapshot.pages.entry(page.to_string()).or_insert(0) += 1;
        *snapshot.countries.entry(conn.country.clone()).or_insert(0) += 1;
    }
    snapshot
}
