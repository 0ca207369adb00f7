pub mod errors;
pub mod id;

pub use errors::{ConfigError, FootfallError, PresenceError};
pub use id::ConnectionId;

pub type Result<T> = std::result::Result<T, FootfallError>;
