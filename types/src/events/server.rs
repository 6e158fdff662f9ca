use crate::content::parts::Part;
use crate::tools::FunctionCall;

/// `serverContent` message
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<ModelTurn>,

    /// Set on the last message of a model turn
    #[serde(default)]
    pub turn_complete: bool,
}

impl ServerContent {
    pub fn parts(&self) -> &[Part] {
        self.model_turn
            .as_ref()
            .map(|turn| turn.parts.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// `toolCall` message
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub function_calls: Vec<FunctionCall>,
}

#[cfg(test)]
mod tests {
    use crate::ServerMessage;

    #[test]
    fn test_parses_content_with_mixed_parts() {
        let message: ServerMessage = serde_json::from_str(
            r#"{"serverContent":{"modelTurn":{"parts":[
                {"text":"Hi"},
                {"inlineData":{"mimeType":"audio/pcm;rate=24000","data":"AAA="}},
                {"executableCode":{"language":"PYTHON","code":"print(1)"}}
            ]},"turnComplete":true}}"#,
        )
        .unwrap();

        let content = message.server_content.unwrap();
        assert!(content.turn_complete);
        let parts = content.parts();
        assert_eq!(parts[0].text.as_deref(), Some("Hi"));
        assert_eq!(
            parts[1].inline_data.as_ref().and_then(|d| d.mime_type.as_deref()),
            Some("audio/pcm;rate=24000")
        );
        assert_eq!(parts[2].executable_code.as_ref().map(|c| c.code()), Some("print(1)"));
    }

    #[test]
    fn test_ignores_unknown_fields_and_missing_turn() {
        let message: ServerMessage =
            serde_json::from_str(r#"{"serverContent":{"turnComplete":true,"interrupted":false},"usageMetadata":{}}"#)
                .unwrap();
        let content = message.server_content.unwrap();
        assert!(content.parts().is_empty());
        assert!(message.setup_complete.is_none());
    }

    #[test]
    fn test_parses_setup_complete_and_tool_call() {
        let setup: ServerMessage = serde_json::from_str(r#"{"setupComplete":{}}"#).unwrap();
        assert!(setup.setup_complete.is_some());

        let tool: ServerMessage = serde_json::from_str(
            r#"{"toolCall":{"functionCalls":[{"name":"a","args":{},"id":"1"},{"name":"b","args":{},"id":"2"}]}}"#,
        )
        .unwrap();
        assert_eq!(tool.tool_call.unwrap().function_calls.len(), 2);
    }
}
