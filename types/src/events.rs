pub mod client;
pub mod server;

use client::*;
use server::*;

use crate::setup::Setup;

/// Outbound messages. Each serializes as a single-key object, ex: `{"setup": {...}}`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ClientMessage {
    #[serde(rename = "setup")]
    Setup(Setup),
    #[serde(rename = "client_content")]
    ClientContent(ClientContent),
    #[serde(rename = "realtime_input")]
    RealtimeInput(RealtimeInput),
}

/// Inbound messages. The service sends one populated field per message.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_content: Option<ServerContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}
