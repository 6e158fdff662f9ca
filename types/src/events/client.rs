use crate::audio::{Base64EncodedAudioBytes, PCM_MIME_TYPE};
use crate::content::turn::Turn;

/// `client_content` message
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientContent {
    /// Ordered conversation turns
    turns: Vec<Turn>,

    /// Asks the model to answer after these turns
    turn_complete: bool,
}

impl ClientContent {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            turn_complete: true,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_complete(&self) -> bool {
        self.turn_complete
    }
}

/// `realtime_input` message
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RealtimeInput {
    media_chunks: Vec<MediaChunk>,
}

impl RealtimeInput {
    /// A single chunk of raw little-endian 16-bit PCM.
    pub fn pcm(data: Base64EncodedAudioBytes) -> Self {
        Self {
            media_chunks: vec![MediaChunk {
                data,
                mime_type: PCM_MIME_TYPE.to_string(),
            }],
        }
    }

    pub fn media_chunks(&self) -> &[MediaChunk] {
        &self.media_chunks
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MediaChunk {
    data: Base64EncodedAudioBytes,
    mime_type: String,
}

impl MediaChunk {
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}
