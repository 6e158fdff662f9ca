mod client;
mod error;

pub use client::{config, AudioSink, ConnectionState, GeminiLive, DEFAULT_SEND_TIMEOUT};
pub use client::{CloseCallback, LifecycleCallback, ResponseCallback};
pub use error::{Error, Result};
pub use gemini_live_types as types;
pub use gemini_live_utils as utils;
