//! Wire protocol: JSON text frames tagged by `type`.

use footfall_presence::Snapshot;
use serde::{Deserialize, Serialize};

/// Messages a browser sends.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// The browser navigated to `page`.
    #[serde(rename = "page-visit")]
    PageVisit {
        #[serde(alias = "data")]
        page: String,
    },
}

/// Messages the server pushes.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage<'a> {
    #[serde(rename = "visitors-update")]
    VisitorsUpdate(&'a Snapshot),
}

pub fn parse_client_message(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn encode_server_message(message: &ServerMessage<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
