use gemini_live_types::events::client::RealtimeInput;
use gemini_live_types::ClientMessage;
use gemini_live_utils::audio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use crate::client::consts::PIPE_CHUNK_SIZE;
use crate::client::ConnectionState;
use crate::error::{Error, Result};

/// Writable handle for raw little-endian 16-bit mono PCM, sent as realtime input.
#[derive(Debug, Clone)]
pub struct AudioSink {
    outbound: mpsc::Sender<Message>,
    state: watch::Receiver<ConnectionState>,
}

impl AudioSink {
    pub(crate) fn new(outbound: mpsc::Sender<Message>, state: watch::Receiver<ConnectionState>) -> Self {
        Self { outbound, state }
    }

    /// Sends one chunk. Chunks written after the connection left the ready state are dropped.
    pub async fn write(&self, chunk: &[u8]) -> Result<()> {
        let state = *self.state.borrow();
        if state != ConnectionState::Ready {
            tracing::debug!("dropping {} bytes of audio in state {:?}", chunk.len(), state);
            return Ok(());
        }

        let message = ClientMessage::RealtimeInput(RealtimeInput::pcm(audio::encode(chunk)));
        let text = serde_json::to_string(&message)?;
        self.outbound
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::Transport(format!("failed to send audio chunk: {}", e)))
    }

    /// Copies `reader` into the sink until it reaches EOF. Returns the number of bytes sent.
    pub async fn pipe_from<R>(&self, mut reader: R) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; PIPE_CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.write(&buf[..n]).await?;
            total += n as u64;
        }
        Ok(total)
    }
}
