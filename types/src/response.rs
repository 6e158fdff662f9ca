use crate::audio::{Base64EncodedAudioBytes, WAV_MIME_TYPE};
use crate::content::parts::ExecutableCode;
use crate::content::turn::Role;
use crate::tools::FunctionCall;

/// Marker the service embeds in close payloads that carry a trace id.
pub const TRACE_ID_MARKER: &str = "Request trace id:";

/// A completed model turn.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    role: Role,
    #[serde(flatten)]
    content: ResponseContent,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseContent {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Audio {
        audio: AudioPayload,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Function {
        #[serde(rename = "functionCall", default, skip_serializing_if = "Option::is_none")]
        function_call: Option<FunctionCall>,
        #[serde(rename = "executableCode", default, skip_serializing_if = "Option::is_none")]
        executable_code: Option<ExecutableCode>,
    },
}

impl Response {
    /// Responses always come from the model.
    pub fn new(content: ResponseContent) -> Self {
        Self {
            role: Role::Gemini,
            content,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &ResponseContent {
        &self.content
    }

    pub fn into_content(self) -> ResponseContent {
        self.content
    }

    /// "text", "audio" or "function"
    pub fn kind(&self) -> &'static str {
        match self.content {
            ResponseContent::Text { .. } => "text",
            ResponseContent::Audio { .. } => "audio",
            ResponseContent::Function { .. } => "function",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ResponseContent::Text { text } | ResponseContent::Audio { text, .. } => text.as_deref(),
            ResponseContent::Function { .. } => None,
        }
    }

    pub fn audio(&self) -> Option<&AudioPayload> {
        match &self.content {
            ResponseContent::Audio { audio, .. } => Some(audio),
            _ => None,
        }
    }

    pub fn function_call(&self) -> Option<&FunctionCall> {
        match &self.content {
            ResponseContent::Function { function_call, .. } => function_call.as_ref(),
            _ => None,
        }
    }

    pub fn executable_code(&self) -> Option<&ExecutableCode> {
        match &self.content {
            ResponseContent::Function { executable_code, .. } => executable_code.as_ref(),
            _ => None,
        }
    }
}

/// A base64 encoded audio container.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    mime_type: String,
    data: Base64EncodedAudioBytes,
}

impl AudioPayload {
    pub fn wav(data: Base64EncodedAudioBytes) -> Self {
        Self {
            mime_type: WAV_MIME_TYPE.to_string(),
            data,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

/// Why the connection closed, as delivered to the close callback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CloseReason {
    pub code: u16,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl CloseReason {
    pub fn new(code: u16, reason: &str) -> Self {
        Self {
            code,
            reason: reason.to_string(),
            trace_id: None,
        }
    }

    /// Splits `"Request trace id: <id>, <reason>"` payloads into trace id and reason.
    pub fn parse(code: u16, payload: &str) -> Self {
        if !payload.contains(TRACE_ID_MARKER) {
            return Self::new(code, payload);
        }

        let (trace_part, reason) = payload.split_once(", ").unwrap_or((payload, ""));
        let trace_id = trace_part
            .split_once(": ")
            .map(|(_, id)| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Self {
            code,
            reason: reason.to_string(),
            trace_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_response_serializes_with_type_and_role() {
        let response = Response::new(ResponseContent::Text {
            text: Some("Hello world".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "text", "role": "gemini", "text": "Hello world"})
        );
    }

    #[test]
    fn test_function_response_exposes_call() {
        let response = Response::new(ResponseContent::Function {
            function_call: Some(FunctionCall::new("lights_on", json!({}))),
            executable_code: None,
        });
        assert_eq!(response.kind(), "function");
        assert_eq!(response.function_call().map(|c| c.name()), Some("lights_on"));
        assert!(response.text().is_none());
    }

    #[test]
    fn test_close_reason_extracts_trace_id() {
        let reason = CloseReason::parse(1011, "Request trace id: 5f1c2a, Internal error encountered.");
        assert_eq!(reason.code, 1011);
        assert_eq!(reason.trace_id.as_deref(), Some("5f1c2a"));
        assert_eq!(reason.reason, "Internal error encountered.");
    }

    #[test]
    fn test_close_reason_keeps_full_remainder() {
        let reason = CloseReason::parse(1008, "Request trace id: abc, Quota exceeded, retry later.");
        assert_eq!(reason.reason, "Quota exceeded, retry later.");
    }

    #[test]
    fn test_close_reason_without_marker_passes_payload_through() {
        let reason = CloseReason::parse(1000, "bye");
        assert_eq!(reason, CloseReason::new(1000, "bye"));
    }
}
