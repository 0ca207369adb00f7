//! Per-section validators.

use std::net::IpAddr;

use crate::schema::FootfallConfig;

use super::helpers::validate_range;

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &FootfallConfig) {
    let server = &config.server;
    validate_range(errors, "server.port", server.port, 1, 65535);
    validate_range(
        errors,
        "server.handshake_timeout_secs",
        server.handshake_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "server.ping_interval_secs",
        server.ping_interval_secs,
        5,
        600,
    );
    validate_range(
        errors,
        "server.pong_timeout_secs",
        server.pong_timeout_secs,
        1,
        120,
    );
    if server.bind_address.parse::<IpAddr>().is_err() {
        errors.push(format!(
            "server.bind_address = {:?} is not an IP address",
            server.bind_address
        ));
    }
}

pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &FootfallConfig) {
    validate_range(
        errors,
        "presence.outbound_queue",
        config.presence.outbound_queue,
        1,
        1024,
    );
    validate_range(
        errors,
        "presence.max_page_length",
        config.presence.max_page_length,
        1,
        2048,
    );
}

pub(crate) fn validate_geo(errors: &mut Vec<String>, config: &FootfallConfig) {
    validate_range(errors, "geo.timeout_ms", config.geo.timeout_ms, 50, 10_000);
    if config.geo.enabled && !config.geo.endpoint.contains("{ip}") {
        errors.push("geo.endpoint must contain an {ip} placeholder".into());
    }
}
