//! Best-effort country resolution for a connection's source address.
//!
//! Resolution never fails a connection: private and loopback addresses map
//! to [`LOCAL_COUNTRY`], anything that cannot be resolved in time maps to
//! [`UNKNOWN_COUNTRY`].

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use async_trait::async_trait;
use footfall_common::PresenceError;
use serde::Deserialize;
use tracing::debug;

/// Country code for loopback, private and link-local sources.
pub const LOCAL_COUNTRY: &str = "LC";

/// Country code when no lookup result is available.
pub const UNKNOWN_COUNTRY: &str = "UN";

/// Geo-IP backend.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Two-letter country code for a public address.
    async fn lookup(&self, ip: IpAddr) -> Result<String, PresenceError>;
}

/// Resolve the country to record for `ip`.
///
/// Must be called before the connection is registered; the lookup may take
/// up to `timeout`.
pub async fn resolve_country(
    resolver: Option<&dyn GeoResolver>,
    ip: IpAddr,
    timeout: Duration,
) -> String {
    if is_local(&ip) {
        return LOCAL_COUNTRY.to_string();
    }
    let Some(resolver) = resolver else {
        return UNKNOWN_COUNTRY.to_string();
    };

    let result = match tokio::time::timeout(timeout, resolver.lookup(ip)).await {
        Ok(result) => result,
        Err(_) => Err(PresenceError::GeoLookup(format!(
            "timed out after {}ms",
            timeout.as_millis()
        ))),
    };

    match result {
        Ok(code) if is_country_code(&code) => code.to_ascii_uppercase(),
        Ok(code) => {
            debug!(ip = %ip, code = %code, "Geo lookup returned a malformed code");
            UNKNOWN_COUNTRY.to_string()
        }
        Err(e) => {
            debug!(ip = %ip, error = %e, "Geo lookup failed");
            UNKNOWN_COUNTRY.to_string()
        }
    }
}

/// Whether `ip` is not publicly routable and therefore not worth a lookup.
pub fn is_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_local_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_local_v4(&v4),
            None => is_local_v6(v6),
        },
    }
}

fn is_local_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 shared address space (CGNAT)
        || (a == 100 && (b & 0xc0) == 64)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // TEST-NET-1/2/3
        || matches!((a, b, c), (192, 0, 2) | (198, 51, 100) | (203, 0, 113))
}

fn is_local_v6(ip: &Ipv6Addr) -> bool {
    let [first, second, ..] = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && second == 0x0db8)
}

fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

// ---------------------------------------------------------------------------
// HTTP resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// Resolver backed by a JSON geo-IP endpoint such as ip-api.com.
///
/// The endpoint is a URL template; `{ip}` is replaced by the address and
/// the response must carry a `countryCode` field.
pub struct HttpGeoResolver {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpGeoResolver {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PresenceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PresenceError::GeoLookup(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub(crate) fn url_for(&self, ip: IpAddr) -> String {
        self.endpoint.replace("{ip}", &ip.to_string())
    }
}

#[async_trait]
impl GeoResolver for HttpGeoResolver {
    async fn lookup(&self, ip: IpAddr) -> Result<String, PresenceError> {
        let response = self
            .http
            .get(self.url_for(ip))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PresenceError::GeoLookup(e.to_string()))?;

        let body: GeoResponse = response
            .json()
            .await
            .map_err(|e| PresenceError::GeoLookup(format!("bad response body: {e}")))?;

        body.country_code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| PresenceError::GeoLookup(format!("no country for {ip}")))
    }
}

// ---------------------------------------------------------------------------
// Static resolver
// ---------------------------------------------------------------------------

/// Fixed address table. Addresses not in the table fail to resolve.
#[derive(Debug, Default, Clone)]
pub struct StaticGeoResolver {
    table: HashMap<IpAddr, String>,
}

impl StaticGeoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ip: IpAddr, code: impl Into<String>) -> Self {
        self.table.insert(ip, code.into());
        self
    }
}

#[async_trait]
impl GeoResolver for StaticGeoResolver {
    async fn lookup(&self, ip: IpAddr) -> Result<String, PresenceError> {
        self.table
            .get(&ip)
            .cloned()
            .ok_or_else(|| PresenceError::GeoLookup(format!("no entry for {ip}")))
    }
}
