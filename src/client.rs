use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gemini_live_types::events::client::{ClientContent, RealtimeInput};
use gemini_live_types::{ClientMessage, CloseReason, Input, Response, ServerMessage};
use gemini_live_utils::audio;
use secrecy::ExposeSecret;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;

use crate::client::config::Config;
use crate::client::consts::{ABNORMAL_CLOSURE, NO_STATUS_RECEIVED};
use crate::client::session::Session;
use crate::error::{Error, Result};

mod accumulator;
pub mod config;
mod consts;
mod session;
mod sink;
mod utils;

pub use consts::DEFAULT_SEND_TIMEOUT;
pub use session::{CloseCallback, ConnectionState, LifecycleCallback, ResponseCallback};
pub use sink::AudioSink;

/// Client for the Gemini live (bidirectional streaming) API.
///
/// Cloning is cheap; clones share the same socket and session.
#[derive(Clone)]
pub struct GeminiLive {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    started: AtomicBool,
    state: watch::Sender<ConnectionState>,
    session: Mutex<Session>,
}

impl GeminiLive {
    /// Creates a client for `api_key` with the given setup. Call [`GeminiLive::connect`] to open the socket.
    pub fn new(api_key: &str, setup: gemini_live_types::setup::Setup) -> Result<Self> {
        Self::with_config(Config::builder().with_api_key(api_key).with_setup(setup).build())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        if config.api_key().expose_secret().is_empty() {
            return Err(Error::Construction("api key must be provided".to_string()));
        }

        let (state, _) = watch::channel(ConnectionState::Connecting);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                started: AtomicBool::new(false),
                state,
                session: Mutex::new(Session::new()),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Opens the socket and sends the setup message. Returns once the setup is on the wire;
    /// the handshake completes in the background.
    pub async fn connect(&self) -> Result<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(Error::State("already connected".to_string()));
        }

        let request = match utils::build_request(&self.inner.config) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("failed to build request: {}", e);
                self.inner
                    .handle_close(CloseReason::new(ABNORMAL_CLOSURE, &e.to_string()));
                return Err(e);
            }
        };
        let (ws_stream, _) = match tokio_tungstenite::connect_async(request).await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::error!("failed to connect: {}", e);
                self.inner
                    .handle_close(CloseReason::new(ABNORMAL_CLOSURE, &e.to_string()));
                return Err(e.into());
            }
        };
        tracing::info!("connected to {}", utils::endpoint(&self.inner.config));

        let (mut write, mut read) = ws_stream.split();
        self.inner.set_state(ConnectionState::OpenUnconfigured);

        let on_open = self.inner.lock().hooks.on_open.clone();
        if let Some(on_open) = on_open {
            on_open();
        }

        let setup = ClientMessage::Setup(self.inner.config.setup().clone());
        let sent = match serde_json::to_string(&setup) {
            Ok(text) => write.send(Message::Text(text)).await.map_err(Error::from),
            Err(e) => Err(Error::from(e)),
        };
        if let Err(e) = sent {
            tracing::error!("failed to send setup: {}", e);
            self.inner
                .handle_close(CloseReason::new(ABNORMAL_CLOSURE, &e.to_string()));
            return Err(e);
        }
        self.inner.set_state(ConnectionState::HandshakePending);

        let (c_tx, mut c_rx) = mpsc::channel::<Message>(self.inner.config.capacity());
        self.inner.lock().outbound = Some(c_tx);

        tokio::spawn(async move {
            while let Some(message) = c_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = write.send(message).await {
                    tracing::error!("failed to send message: {}", e);
                }
                if closing {
                    break;
                }
            }
        });

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut reason = None;
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => inner.handle_frame(text.as_bytes()),
                    Ok(Message::Binary(bin)) => inner.handle_frame(&bin),
                    Ok(Message::Close(frame)) => {
                        reason = Some(match frame {
                            Some(frame) => CloseReason::parse(frame.code.into(), &frame.reason),
                            None => CloseReason::new(NO_STATUS_RECEIVED, ""),
                        });
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        reason = Some(CloseReason::new(ABNORMAL_CLOSURE, &e.to_string()));
                        break;
                    }
                }
            }
            inner.handle_close(reason.unwrap_or_else(|| CloseReason::new(ABNORMAL_CLOSURE, "")));
        });

        Ok(())
    }

    /// Sends `input` and waits up to [`DEFAULT_SEND_TIMEOUT`] for the completed turn.
    pub async fn send(&self, input: impl Into<Input>) -> Result<Response> {
        self.send_with_timeout(input, DEFAULT_SEND_TIMEOUT).await
    }

    /// Validates untyped input, ex: `{"prompt": "Hi"}`, before sending it.
    pub async fn send_value(&self, input: serde_json::Value, timeout: Duration) -> Result<Response> {
        let input = Input::try_from(input).map_err(Error::Validation)?;
        self.send_with_timeout(input, timeout).await
    }

    /// Sends one `client_content` message and resolves with the next completed turn.
    ///
    /// Only one send may be in flight: a second call takes over the response
    /// handlers and the first one runs into its timeout.
    pub async fn send_with_timeout(&self, input: impl Into<Input>, timeout: Duration) -> Result<Response> {
        let input = input.into();
        if timeout.is_zero() {
            return Err(Error::Validation(format!(
                "invalid timeout value: {:?}, timeout must be positive",
                timeout
            )));
        }
        let state = self.state();
        if state != ConnectionState::Ready {
            return Err(Error::NotReady(state));
        }

        let deadline = Instant::now() + timeout;
        let message = ClientMessage::ClientContent(ClientContent::new(input.into_turns()));
        let text = serde_json::to_string(&message)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let (id, outbound) = {
            let mut session = self.inner.lock();
            let outbound = session.outbound.clone();
            (session.begin_one_shot(reply_tx), outbound)
        };
        let Some(outbound) = outbound else {
            self.inner.lock().cancel_one_shot(id);
            return Err(Error::NotReady(self.state()));
        };

        match tokio::time::timeout_at(deadline, outbound.send(Message::Text(text))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.inner.lock().cancel_one_shot(id);
                return Err(Error::Transport(format!("failed to send message: {}", e)));
            }
            Err(_) => {
                self.inner.lock().cancel_one_shot(id);
                return Err(Error::Timeout(timeout));
            }
        }

        match tokio::time::timeout_at(deadline, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) if self.state() == ConnectionState::Closed => Err(Error::ConnectionClosed),
            Ok(Err(_)) => {
                // taken over by a later send or realtime stream
                tokio::time::sleep_until(deadline).await;
                Err(Error::Timeout(timeout))
            }
            Err(_) => {
                self.inner.lock().cancel_one_shot(id);
                tracing::debug!("send #{} timed out", id);
                Err(Error::Timeout(timeout))
            }
        }
    }

    /// Streams every completed turn to `on_response` until another operation takes over.
    ///
    /// When `audio_chunk` is given it is sent right away as realtime PCM input; if that
    /// fails the stream is torn down again.
    pub fn realtime<F>(&self, on_response: F, audio_chunk: Option<&[u8]>) -> Result<()>
    where
        F: Fn(Response) + Send + Sync + 'static,
    {
        let state = self.state();
        if state != ConnectionState::Ready {
            return Err(Error::NotReady(state));
        }

        let message = audio_chunk
            .map(|chunk| {
                let input = RealtimeInput::pcm(audio::encode(chunk));
                serde_json::to_string(&ClientMessage::RealtimeInput(input))
            })
            .transpose()?;

        let mut session = self.inner.lock();
        session.begin_streaming(Arc::new(on_response));

        let Some(text) = message else {
            return Ok(());
        };
        let sent = match &session.outbound {
            Some(outbound) => outbound
                .try_send(Message::Text(text))
                .map_err(|e| e.to_string()),
            None => Err("outbound channel missing".to_string()),
        };
        if let Err(e) = sent {
            session.clear();
            return Err(Error::Transport(format!("failed to send message: {}", e)));
        }
        Ok(())
    }

    /// Resolves with the audio sink once the handshake has completed.
    pub async fn writable_stream(&self) -> Result<AudioSink> {
        let mut state = self.inner.state.subscribe();
        let reached = *state
            .wait_for(|s| matches!(s, ConnectionState::Ready | ConnectionState::Closed))
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        if reached == ConnectionState::Closed {
            return Err(Error::ConnectionClosed);
        }

        let outbound = self.inner.lock().outbound.clone();
        match outbound {
            Some(outbound) => Ok(AudioSink::new(outbound, state)),
            None => Err(Error::ConnectionClosed),
        }
    }

    /// Asks the server to close the connection; the close callback fires once it has.
    pub async fn close(&self) -> Result<()> {
        let outbound = self.inner.lock().outbound.clone();
        let Some(outbound) = outbound else {
            return Err(Error::NotReady(self.state()));
        };
        outbound
            .send(Message::Close(None))
            .await
            .map_err(|e| Error::Transport(format!("failed to send close: {}", e)))
    }

    pub fn on_open<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().hooks.on_open = Some(Arc::new(callback));
        self
    }

    pub fn on_handshake<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().hooks.on_handshake = Some(Arc::new(callback));
        self
    }

    pub fn on_close<F>(&self, callback: F) -> &Self
    where
        F: Fn(CloseReason) + Send + Sync + 'static,
    {
        self.inner.lock().hooks.on_close = Some(Arc::new(callback));
        self
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: ConnectionState) {
        tracing::debug!("connection state: {:?}", state);
        self.state.send_replace(state);
    }

    fn handle_frame(&self, payload: &[u8]) {
        let message = match serde_json::from_slice::<ServerMessage>(payload) {
            Ok(message) => message,
            Err(e) => {
                let error = Error::Protocol(format!("{}, text=> {:?}", e, String::from_utf8_lossy(payload)));
                tracing::error!("failed to process message: {}", error);
                return;
            }
        };
        tracing::debug!(
            "received message: setup_complete={}, server_content={}, tool_call={}",
            message.setup_complete.is_some(),
            message.server_content.is_some(),
            message.tool_call.is_some()
        );

        if message.setup_complete.is_some() {
            self.complete_handshake();
            return;
        }

        let deliveries = self.lock().dispatch(message);
        for delivery in deliveries {
            delivery.deliver();
        }
    }

    fn complete_handshake(&self) {
        let advanced = self.state.send_if_modified(|state| {
            if *state == ConnectionState::HandshakePending {
                *state = ConnectionState::Ready;
                true
            } else {
                false
            }
        });
        if !advanced {
            tracing::warn!("ignoring setup acknowledgement in state {:?}", self.state());
            return;
        }
        tracing::info!("session setup complete");

        let on_handshake = self.lock().hooks.on_handshake.clone();
        if let Some(on_handshake) = on_handshake {
            on_handshake();
        }
    }

    fn handle_close(&self, reason: CloseReason) {
        if self.state.send_replace(ConnectionState::Closed) == ConnectionState::Closed {
            return;
        }
        tracing::info!(
            "connection closed: code={}, trace_id={:?}, reason={}",
            reason.code,
            reason.trace_id,
            reason.reason
        );

        let on_close = {
            let mut session = self.lock();
            session.clear();
            session.outbound = None;
            session.hooks.on_close.clone()
        };
        if let Some(on_close) = on_close {
            on_close(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A client that looks ready and writes into `outbound` instead of a socket.
    fn ready_client(outbound: mpsc::Sender<Message>) -> GeminiLive {
        let config = Config::builder().with_api_key("test-key").build();
        let client = GeminiLive::with_config(config).unwrap();
        client.inner.lock().outbound = Some(outbound);
        client.inner.set_state(ConnectionState::Ready);
        client
    }

    #[tokio::test]
    async fn test_realtime_rolls_back_when_writer_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let client = ready_client(tx);

        let err = client.realtime(|_| {}, Some(&[0u8, 0][..])).unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "unexpected error: {err}");
        assert!(client.inner.lock().is_idle());
    }

    #[tokio::test]
    async fn test_realtime_rolls_back_when_queue_is_full() {
        let (tx, _rx) = mpsc::channel(1);
        tx.try_send(Message::Text("queued".to_string())).unwrap();
        let client = ready_client(tx);

        let err = client.realtime(|_| {}, Some(&[0u8, 0][..])).unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "unexpected error: {err}");
        assert!(client.inner.lock().is_idle());
    }

    #[tokio::test]
    async fn test_realtime_without_chunk_keeps_stream_installed() {
        let (tx, _rx) = mpsc::channel(1);
        let client = ready_client(tx);

        client.realtime(|_| {}, None).unwrap();
        assert!(!client.inner.lock().is_idle());
    }

    #[tokio::test]
    async fn test_send_cancels_one_shot_when_writer_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let client = ready_client(tx);

        let err = client
            .send_with_timeout("hello", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "unexpected error: {err}");
        assert!(client.inner.lock().is_idle());
        assert_eq!(client.state(), ConnectionState::Ready);
    }
}
