//! Presence tracking settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Snapshots buffered per connection before newer ones are dropped.
    pub outbound_queue: u32,
    /// Longest page path accepted from a client.
    pub max_page_length: u32,
    /// Page key for connections that have not reported a page yet.
    pub unknown_page: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            outbound_queue: 16,
            max_page_length: 256,
            unknown_page: String::new(),
        }
    }
}
