use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
            ChatRole::System => "system",
        }
    }
}

/// One transcript entry. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: format!("{}-{}", role.as_str(), Uuid::new_v4()),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_prefixed_by_role() {
        let a = ChatMessage::new(ChatRole::User, "hi");
        let b = ChatMessage::new(ChatRole::User, "hi");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("user-"));
        assert!(ChatMessage::new(ChatRole::System, "x").id.starts_with("system-"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::new(ChatRole::Model, "ok")).unwrap();
        assert_eq!(json["role"], "model");
        assert_eq!(json["text"], "ok");
    }
}
