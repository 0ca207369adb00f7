//! Configuration schema types for footfall.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod geo;
mod logging;
mod presence;
mod server;

pub use geo::*;
pub use logging::*;
pub use presence::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FootfallConfig {
    pub server: ServerConfig,
    pub presence: PresenceConfig,
    pub geo: GeoConfig,
    pub logging: LoggingConfig,
}
