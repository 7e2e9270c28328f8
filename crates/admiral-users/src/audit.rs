//! Best-effort audit recording.
//!
//! The audit trail must never take a successful mutation down with it:
//! serialization problems drop the metadata, write failures are logged
//! at error level and swallowed.

use uuid::Uuid;

use admiral_core::models::audit::{AuditAction, NewAuditLogEntry};
use admiral_core::repository::AuditLogRepository;

pub async fn record_audit_log<A: AuditLogRepository>(
    audit: &A,
    actor_id: Uuid,
    action: AuditAction,
    target_id: Uuid,
    metadata: Option<&serde_json::Value>,
) {
    let metadata = metadata.and_then(|value| match serde_json::to_string(value) {
        Ok(text) => Some(text),
        Err(error) => {
            tracing::warn!(%actor_id, %target_id, %error, "dropping unserializable audit metadata");
            None
        }
    });

    let entry = NewAuditLogEntry {
        actor_id,
        action,
        target_id,
        metadata,
    };
    if let Err(error) = audit.append(entry).await {
        tracing::error!(
            %actor_id,
            %target_id,
            action = action.as_str(),
            %error,
            "failed to record audit log entry"
        );
    }
}
