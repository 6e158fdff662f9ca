use std::sync::Arc;

use gemini_live_types::events::server::{ServerContent, ToolCall};
use gemini_live_types::{CloseReason, Response, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use crate::client::accumulator::Accumulator;
use crate::error::{Error, Result};

pub type ResponseCallback = Arc<dyn Fn(Response) + Send + Sync>;
pub type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;
pub type CloseCallback = Arc<dyn Fn(CloseReason) + Send + Sync>;

pub(crate) type ReplyTx = oneshot::Sender<Result<Response>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, socket not open yet.
    Connecting,
    OpenUnconfigured,
    /// Setup sent, waiting for `setupComplete`.
    HandshakePending,
    Ready,
    Closed,
}

/// The operation that currently owns the frame handlers.
pub(crate) enum Operation {
    Idle,
    /// A pending `send`; cleared once its turn completes.
    OneShot {
        id: u64,
        accumulator: Accumulator,
        reply: ReplyTx,
    },
    /// A `realtime` stream; the accumulator is reset after every turn.
    Streaming {
        accumulator: Accumulator,
        on_response: ResponseCallback,
    },
}

impl Operation {
    fn accumulator(&mut self) -> Option<&mut Accumulator> {
        match self {
            Operation::Idle => None,
            Operation::OneShot { accumulator, .. } | Operation::Streaming { accumulator, .. } => {
                Some(accumulator)
            }
        }
    }
}

/// Work produced by a frame that must run after the session lock is released.
pub(crate) enum Delivery {
    Reply(ReplyTx, Result<Response>),
    Stream(ResponseCallback, Response),
}

impl Delivery {
    pub(crate) fn deliver(self) {
        match self {
            Delivery::Reply(reply, result) => {
                if reply.send(result).is_err() {
                    tracing::debug!("send caller went away before its response arrived");
                }
            }
            Delivery::Stream(on_response, response) => on_response(response),
        }
    }
}

#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) on_open: Option<LifecycleCallback>,
    pub(crate) on_handshake: Option<LifecycleCallback>,
    pub(crate) on_close: Option<CloseCallback>,
}

/// Mutable per-connection state shared by the facade and the reader task.
pub(crate) struct Session {
    pub(crate) operation: Operation,
    pub(crate) hooks: Hooks,
    pub(crate) outbound: Option<mpsc::Sender<Message>>,
    next_id: u64,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            operation: Operation::Idle,
            hooks: Hooks::default(),
            outbound: None,
            next_id: 0,
        }
    }

    /// Installs a one-shot operation, replacing whatever owned the handlers.
    pub(crate) fn begin_one_shot(&mut self, reply: ReplyTx) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if !matches!(self.operation, Operation::Idle) {
            tracing::warn!("replacing the active response handler with send #{}", id);
        }
        self.operation = Operation::OneShot {
            id,
            accumulator: Accumulator::new(),
            reply,
        };
        id
    }

    pub(crate) fn begin_streaming(&mut self, on_response: ResponseCallback) {
        if !matches!(self.operation, Operation::Idle) {
            tracing::warn!("replacing the active response handler with a realtime stream");
        }
        self.operation = Operation::Streaming {
            accumulator: Accumulator::new(),
            on_response,
        };
    }

    /// Clears the handlers if they still belong to send `id`.
    pub(crate) fn cancel_one_shot(&mut self, id: u64) -> bool {
        match self.operation {
            Operation::OneShot { id: current, .. } if current == id => {
                self.operation = Operation::Idle;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.operation = Operation::Idle;
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self.operation, Operation::Idle)
    }

    /// Routes an inbound frame to the active operation, in part order.
    pub(crate) fn dispatch(&mut self, message: ServerMessage) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        if let Some(content) = message.server_content {
            deliveries.extend(self.on_server_content(&content));
        }
        if let Some(tool_call) = message.tool_call {
            deliveries.extend(self.on_tool_call(tool_call));
        }
        deliveries
    }

    fn on_server_content(&mut self, content: &ServerContent) -> Option<Delivery> {
        let Some(accumulator) = self.operation.accumulator() else {
            tracing::debug!("dropping content frame, no active operation");
            return None;
        };
        accumulator.absorb(content);

        if !content.turn_complete {
            return None;
        }
        self.complete_turn()
    }

    fn on_tool_call(&mut self, tool_call: ToolCall) -> Option<Delivery> {
        let Some(accumulator) = self.operation.accumulator() else {
            tracing::debug!("dropping tool call frame, no active operation");
            return None;
        };

        let calls = tool_call.function_calls.len();
        let Some(call) = tool_call.function_calls.into_iter().next() else {
            tracing::warn!("tool call frame without function calls");
            return None;
        };
        if calls > 1 {
            tracing::warn!("tool call frame carried {} function calls, keeping the first", calls);
        }
        accumulator.set_function_call(call);
        self.complete_turn()
    }

    fn complete_turn(&mut self) -> Option<Delivery> {
        match std::mem::replace(&mut self.operation, Operation::Idle) {
            Operation::Idle => None,
            Operation::OneShot {
                id,
                accumulator,
                reply,
            } => {
                tracing::debug!("send #{} completed", id);
                let result = accumulator.finalize().map_err(Error::from);
                Some(Delivery::Reply(reply, result))
            }
            Operation::Streaming {
                mut accumulator,
                on_response,
            } => {
                let result = accumulator.finalize();
                accumulator.reset();
                self.operation = Operation::Streaming {
                    accumulator,
                    on_response: on_response.clone(),
                };
                match result {
                    Ok(response) => Some(Delivery::Stream(on_response, response)),
                    Err(e) => {
                        tracing::error!("dropping realtime turn: {}", e);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn frame(json: &str) -> ServerMessage {
        serde_json::from_str(json).unwrap()
    }

    fn deliver_all(deliveries: Vec<Delivery>) {
        deliveries.into_iter().for_each(Delivery::deliver);
    }

    fn streaming_session() -> (Session, Arc<Mutex<Vec<Response>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let mut session = Session::new();
        session.begin_streaming(Arc::new(move |response| sink.lock().unwrap().push(response)));
        (session, received)
    }

    #[test]
    fn test_one_shot_resolves_once_with_joined_text() {
        let mut session = Session::new();
        let (tx, mut rx) = oneshot::channel();
        session.begin_one_shot(tx);

        let first = session.dispatch(frame(r#"{"serverContent":{"modelTurn":{"parts":[{"text":"Hello "}]}}}"#));
        assert!(first.is_empty());
        assert!(rx.try_recv().is_err());

        let second = session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"world"}]},"turnComplete":true}}"#,
        ));
        assert_eq!(second.len(), 1);
        deliver_all(second);

        let response = rx.try_recv().unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"type": "text", "role": "gemini", "text": "Hello world"})
        );
        assert!(session.is_idle());
    }

    #[test]
    fn test_one_shot_audio_turn_is_wrapped_as_wav() {
        let mut session = Session::new();
        let (tx, mut rx) = oneshot::channel();
        session.begin_one_shot(tx);

        session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"inlineData":{"mimeType":"audio/pcm","data":"AAABAA=="}}]}}}"#,
        ));
        let deliveries = session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"inlineData":{"data":"AgADAA=="}}]},"turnComplete":true}}"#,
        ));
        deliver_all(deliveries);

        let response = rx.try_recv().unwrap().unwrap();
        assert_eq!(response.kind(), "audio");
        let audio = response.audio().unwrap();
        assert_eq!(audio.mime_type(), "audio/wav");
        assert!(!audio.data().is_empty());
    }

    #[test]
    fn test_tool_call_short_circuits_and_clears_handlers() {
        let mut session = Session::new();
        let (tx, mut rx) = oneshot::channel();
        session.begin_one_shot(tx);

        session.dispatch(frame(r#"{"serverContent":{"modelTurn":{"parts":[{"text":"thinking"}]}}}"#));
        let deliveries = session.dispatch(frame(
            r#"{"toolCall":{"functionCalls":[{"name":"first","args":{},"id":"1"},{"name":"second","args":{},"id":"2"}]}}"#,
        ));
        deliver_all(deliveries);

        let response = rx.try_recv().unwrap().unwrap();
        assert_eq!(response.kind(), "function");
        assert_eq!(response.function_call().map(|c| c.name()), Some("first"));
        assert!(session.is_idle());

        let late = session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"late"}]},"turnComplete":true}}"#,
        ));
        assert!(late.is_empty());
    }

    #[test]
    fn test_empty_tool_call_is_ignored() {
        let mut session = Session::new();
        let (tx, _rx) = oneshot::channel();
        session.begin_one_shot(tx);

        assert!(session.dispatch(frame(r#"{"toolCall":{"functionCalls":[]}}"#)).is_empty());
        assert!(!session.is_idle());
    }

    #[test]
    fn test_frames_without_operation_are_dropped() {
        let mut session = Session::new();
        let deliveries = session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"nobody listens"}]},"turnComplete":true}}"#,
        ));
        assert!(deliveries.is_empty());
        assert!(session.is_idle());
    }

    #[test]
    fn test_streaming_turns_do_not_leak() {
        let (mut session, received) = streaming_session();

        session.dispatch(frame(r#"{"serverContent":{"modelTurn":{"parts":[{"text":"one"}]}}}"#));
        deliver_all(session.dispatch(frame(r#"{"serverContent":{"turnComplete":true}}"#)));
        deliver_all(session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"two"}]},"turnComplete":true}}"#,
        )));

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].text(), Some("one"));
        assert_eq!(received[1].text(), Some("two"));
        assert!(!session.is_idle());
    }

    #[test]
    fn test_streaming_tool_call_resets_for_next_turn() {
        let (mut session, received) = streaming_session();

        deliver_all(session.dispatch(frame(r#"{"toolCall":{"functionCalls":[{"name":"lights","args":{}}]}}"#)));
        deliver_all(session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"done"}]},"turnComplete":true}}"#,
        )));

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].kind(), "function");
        assert_eq!(received[1].kind(), "text");
        assert_eq!(received[1].text(), Some("done"));
    }

    #[test]
    fn test_cancel_only_clears_own_operation() {
        let mut session = Session::new();
        let (first_tx, _first_rx) = oneshot::channel();
        let first = session.begin_one_shot(first_tx);
        let (second_tx, _second_rx) = oneshot::channel();
        let second = session.begin_one_shot(second_tx);

        assert!(!session.cancel_one_shot(first));
        assert!(!session.is_idle());
        assert!(session.cancel_one_shot(second));
        assert!(session.is_idle());
    }

    #[test]
    fn test_encoding_failure_is_reported_to_sender() {
        let mut session = Session::new();
        let (tx, mut rx) = oneshot::channel();
        session.begin_one_shot(tx);

        deliver_all(session.dispatch(frame(
            r#"{"serverContent":{"modelTurn":{"parts":[{"inlineData":{"mimeType":"audio/pcm","data":"AAAA"}}]},"turnComplete":true}}"#,
        )));
        assert!(matches!(rx.try_recv().unwrap(), Err(Error::Audio(_))));
    }
}
