use std::path::PathBuf;

use crate::id::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("no platform config directory; pass --config")]
    NoConfigDir,

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures inside the presence core. None of these reach a client; the hub
/// and connection handlers log them and carry on.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("duplicate connection: {0}")]
    DuplicateConnection(ConnectionId),

    #[error("geo lookup failed: {0}")]
    GeoLookup(String),

    #[error("push to {id} failed: {reason}")]
    PushFailed { id: ConnectionId, reason: String },

    #[error("invalid page: {0}")]
    InvalidPage(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FootfallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.port = 0".into());
        assert_eq!(err.to_string(), "config validation error: server.port = 0");

        assert_eq!(
            ConfigError::NoConfigDir.to_string(),
            "no platform config directory; pass --config"
        );

        let err = ConfigError::WriteFailed {
            path: PathBuf::from("/ro/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(err.to_string(), "failed to write /ro/config.toml: read-only");
    }

    #[test]
    fn presence_error_display() {
        let id = ConnectionId::from("abc");
        assert_eq!(
            PresenceError::UnknownConnection(id.clone()).to_string(),
            "unknown connection: abc"
        );
        assert_eq!(
            PresenceError::DuplicateConnection(id.clone()).to_string(),
            "duplicate connection: abc"
        );

        let err = PresenceError::PushFailed {
            id,
            reason: "queue closed".into(),
        };
        assert_eq!(err.to_string(), "push to abc failed: queue closed");

        let err = PresenceError::GeoLookup("timed out".into());
        assert_eq!(err.to_string(), "geo lookup failed: timed out");
    }

    #[test]
    fn footfall_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: FootfallError = config_err.into();
        assert!(matches!(err, FootfallError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn footfall_error_from_presence() {
        let err: FootfallError = PresenceError::InvalidPage("http://x".into()).into();
        assert!(matches!(err, FootfallError::Presence(_)));
        assert_eq!(err.to_string(), "invalid page: http://x");
    }

    #[test]
    fn footfall_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: FootfallError = io_err.into();
        assert!(matches!(err, FootfallError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }
}
