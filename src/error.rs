use std::time::Duration;

use gemini_live_utils::audio::AudioError;
use thiserror::Error;

use crate::client::ConnectionState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The client could not be created, ex: an empty api key.
    #[error("construction error: {0}")]
    Construction(String),

    /// Malformed `send` input.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("connection is not ready (state: {0:?})")]
    NotReady(ConnectionState),

    #[error("state error: {0}")]
    State(String),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The outbound queue is gone or full.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint could not be built from the configured base url.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An inbound frame could not be understood. Logged, never returned to callers.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
