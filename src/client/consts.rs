use std::time::Duration;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

pub const BASE_URL: &str = "wss://generativelanguage.googleapis.com";
pub const API_VERSION: &str = "v1alpha";

pub const DEFAULT_CAPACITY: usize = 1024;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(15000);

/// Close code reported when the socket goes away without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;
/// Close code reported for a close frame without a status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Bytes read per realtime chunk when piping a reader into the sink.
pub const PIPE_CHUNK_SIZE: usize = 4096;
