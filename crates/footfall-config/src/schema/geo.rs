//! Geo-IP lookup settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// When false every public address is counted under "UN".
    pub enabled: bool,
    /// Lookup URL; `{ip}` is replaced with the client address.
    pub endpoint: String,
    pub timeout_ms: u32,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://ip-api.com/json/{ip}?fields=countryCode".into(),
            timeout_ms: 1500,
        }
    }
}
