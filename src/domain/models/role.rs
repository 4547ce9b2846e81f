use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Who authored a message. Immutable once a message is created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name as the Gemini API expects it in a turn.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::User => return "user",
            Role::Model => return "model",
        }
    }
}
