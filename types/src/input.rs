//! Prompt input accepted by a one-shot send, plus the pre-flight validator
//! used on untyped (JSON) input before it is put on the wire.

use serde_json::Value;

use crate::content::turn::{Role, Turn};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prompt {
    prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

impl Prompt {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    fn into_turn(self) -> Turn {
        Turn::new(&self.prompt, self.role.unwrap_or_default())
    }
}

/// A single prompt or an ordered conversation of prompts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Input {
    Single(Prompt),
    Many(Vec<Prompt>),
}

impl Input {
    /// Converts the input into wire turns, defaulting each role to `user`.
    pub fn into_turns(self) -> Vec<Turn> {
        match self {
            Input::Single(prompt) => vec![prompt.into_turn()],
            Input::Many(prompts) => prompts.into_iter().map(Prompt::into_turn).collect(),
        }
    }
}

impl From<&str> for Input {
    fn from(prompt: &str) -> Self {
        Input::Single(Prompt::new(prompt))
    }
}

impl From<String> for Input {
    fn from(prompt: String) -> Self {
        Input::Single(Prompt::new(&prompt))
    }
}

impl From<Prompt> for Input {
    fn from(prompt: Prompt) -> Self {
        Input::Single(prompt)
    }
}

impl From<Vec<Prompt>> for Input {
    fn from(prompts: Vec<Prompt>) -> Self {
        Input::Many(prompts)
    }
}

impl TryFrom<Value> for Input {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let validation = validate_input(&value);
        if let Some(error) = validation.error {
            return Err(error);
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(reason: &str) -> Self {
        Self {
            valid: false,
            error: Some(reason.to_string()),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn has_prompt(item: &serde_json::Map<String, Value>) -> bool {
    matches!(item.get("prompt"), Some(Value::String(_)))
}

fn has_valid_role(item: &serde_json::Map<String, Value>) -> bool {
    match item.get("role") {
        None | Some(Value::Null) => true,
        Some(Value::String(role)) => Role::ALL.contains(&role.as_str()),
        Some(_) => false,
    }
}

/// Checks that `input` is a prompt object or an array of prompt objects.
pub fn validate_input(input: &Value) -> Validation {
    if is_falsy(input) {
        return Validation::fail("Input cannot be null or undefined");
    }

    if let Value::Array(items) = input {
        let all_valid = items.iter().all(|item| match item {
            Value::Object(item) => has_prompt(item) && has_valid_role(item),
            _ => false,
        });
        if !all_valid {
            return Validation::fail(
                "Array input must contain objects with 'prompt' string and optional valid role",
            );
        }
        return Validation::ok();
    }

    let Value::Object(item) = input else {
        return Validation::fail("Single input must be an object");
    };

    if !has_prompt(item) {
        return Validation::fail("Single input must contain a 'prompt' string property");
    }
    if !has_valid_role(item) {
        return Validation::fail("Single input 'role' must be one of: user, gemini");
    }

    Validation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_single_and_array_prompts() {
        let valid = [
            json!({"prompt": "Hello"}),
            json!({"prompt": "Hello", "role": "gemini"}),
            json!([{"prompt": "Hi"}, {"prompt": "Hello!", "role": "gemini"}, {"prompt": "Bye", "role": "user"}]),
            json!([]),
        ];
        for input in valid {
            let validation = validate_input(&input);
            assert!(validation.valid, "{input} should be valid");
            assert!(validation.error.is_none());
        }
    }

    #[test]
    fn test_rejects_missing_input() {
        for input in [json!(null), json!(false), json!(0), json!("")] {
            let validation = validate_input(&input);
            assert!(!validation.valid);
            assert_eq!(validation.error.as_deref(), Some("Input cannot be null or undefined"));
        }
    }

    #[test]
    fn test_rejects_non_object_single_input() {
        let validation = validate_input(&json!("hello"));
        assert!(!validation.valid);
        assert_eq!(validation.error.as_deref(), Some("Single input must be an object"));
    }

    #[test]
    fn test_rejects_missing_or_non_string_prompt() {
        for input in [json!({"text": "Hello"}), json!({"prompt": 42}), json!([{"prompt": "ok"}, {"role": "user"}]), json!(["Hello"])] {
            let validation = validate_input(&input);
            assert!(!validation.valid, "{input} should be invalid");
            assert!(!validation.error.unwrap_or_default().is_empty());
        }
    }

    #[test]
    fn test_rejects_unknown_roles() {
        for input in [json!({"prompt": "Hi", "role": "system"}), json!([{"prompt": "Hi", "role": "model"}]), json!({"prompt": "Hi", "role": 1})] {
            let validation = validate_input(&input);
            assert!(!validation.valid, "{input} should be invalid");
            assert!(!validation.error.unwrap_or_default().is_empty());
        }
    }

    #[test]
    fn test_try_from_value_defaults_roles_to_user() {
        let input = Input::try_from(json!([{"prompt": "Hi"}, {"prompt": "Hello!", "role": "gemini"}])).unwrap();
        let turns = input.into_turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].parts()[0].text(), "Hi");
        assert_eq!(turns[1].role(), Role::Gemini);
    }

    #[test]
    fn test_try_from_value_reports_validation_reason() {
        let err = Input::try_from(json!({"role": "user"})).unwrap_err();
        assert_eq!(err, "Single input must contain a 'prompt' string property");
    }
}
