//! WebSocket upgrade and client address resolution.

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

/// Upgrade `stream`, capturing the `X-Forwarded-For` header if present.
pub async fn accept(
    stream: TcpStream,
) -> Result<(WebSocketStream<TcpStream>, Option<String>), tokio_tungstenite::tungstenite::Error> {
    let mut forwarded_for = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        forwarded_for = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Ok(resp)
    };
    let ws = accept_hdr_async(stream, callback).await?;
    Ok((ws, forwarded_for))
}

/// Address used for geo resolution.
///
/// With `trust_forwarded_for`, the left-most `X-Forwarded-For` entry wins
/// when it parses; otherwise the TCP peer address is used.
pub fn client_ip(peer: SocketAddr, forwarded_for: Option<&str>, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_for
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
        {
            return ip;
        }
    }
    peer.ip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.0.0.5:50000".parse().unwrap()
    }

    #[test]
    fn untrusted_header_is_ignored() {
        let ip = client_ip(peer(), Some("41.33.1.1"), false);
        assert_eq!(ip, "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_header_uses_first_entry() {
        let ip = client_ip(peer(), Some("41.33.1.1, 10.0.0.1"), true);
        assert_eq!(ip, "41.33.1.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_header_accepts_ipv6() {
        let ip = client_ip(peer(), Some(" 2001:db8::1 "), true);
        assert_eq!(ip, "2001:db8::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn unparsable_header_falls_back_to_peer() {
        let ip = client_ip(peer(), Some("unknown"), true);
        assert_eq!(ip, peer().ip());
    }

    #[test]
    fn missing_header_falls_back_to_peer() {
        assert_eq!(client_ip(peer(), None, true), peer().ip());
    }
}
