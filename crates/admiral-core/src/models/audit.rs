//! Audit trail domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserCreated,
    UserUpdated,
    UserDeleted,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserCreated => "USER_CREATED",
            Self::UserUpdated => "USER_UPDATED",
            Self::UserDeleted => "USER_DELETED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAuditLogEntry {
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub target_id: Uuid,
    /// Serialized to JSON text at write time; dropped if serialization fails.
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub target_id: Uuid,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuditAction::UserCreated).unwrap(),
            "\"USER_CREATED\""
        );
        assert_eq!(AuditAction::UserDeleted.as_str(), "USER_DELETED");
    }
}
