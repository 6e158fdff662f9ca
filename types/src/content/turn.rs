use crate::content::parts::TextPart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Gemini,
}

impl Role {
    pub const ALL: [&'static str; 2] = ["user", "gemini"];
}

/// One entry of `client_content.turns`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Turn {
    parts: Vec<TextPart>,
    role: Role,
}

impl Turn {
    pub fn new(text: &str, role: Role) -> Self {
        Self {
            parts: vec![TextPart::new(text)],
            role,
        }
    }

    pub fn parts(&self) -> &[TextPart] {
        &self.parts
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
