//! Live visitor presence.
//!
//! Tracks which browser sessions are connected, the page each one is on
//! and the country it connects from, and pushes an aggregate snapshot to
//! every connected session whenever any of that changes. Transport is left
//! to the caller: the hub hands out a bounded receiver per connection.

pub mod aggregate;
pub mod geo;
pub mod hub;
pub mod page;
pub mod registry;

pub use aggregate::{compute_snapshot, Snapshot};
pub use geo::{resolve_country, GeoResolver, HttpGeoResolver, StaticGeoResolver};
pub use geo::{LOCAL_COUNTRY, UNKNOWN_COUNTRY};
pub use hub::{FanoutReport, HubConfig, PresenceHub, SnapshotReceiver};
pub use page::canonical_page;
pub use registry::{Connection, PresenceRegistry};
