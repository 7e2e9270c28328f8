//! The action-result envelope returned by every mutating entry point.
//!
//! Mutations never surface raw errors to the UI layer: the result is
//! always an [`ActionState`]. Validation failures carry per-field
//! messages and are not logged; unexpected failures are logged once
//! under a fresh correlation id which is returned to the caller so a
//! support request can be matched to the server log entry.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Idle,
    Success,
    Error,
}

/// Uniform `{status, message?, fieldErrors?, requestId?}` envelope.
///
/// The serialized field names match the wire shape existing dashboard
/// clients consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ActionState {
    pub fn idle() -> Self {
        Self {
            status: ActionStatus::Idle,
            message: None,
            field_errors: None,
            request_id: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: Some(message.into()),
            field_errors: None,
            request_id: None,
        }
    }

    /// Validation failure: field-level feedback, no correlation id.
    pub fn invalid(field_errors: FieldErrors) -> Self {
        Self {
            status: ActionStatus::Error,
            message: Some("Please review the form.".into()),
            field_errors: Some(field_errors),
            request_id: None,
        }
    }

    /// A recognized, user-caused failure with a fixed message: a
    /// uniqueness conflict, bad credentials, a throttled attempt. Not
    /// logged as an unexpected failure, so no correlation id.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            message: Some(message.into()),
            field_errors: None,
            request_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

/// Normalize any [`AppError`] into an error-state envelope.
///
/// Validation errors pass through with their field messages and are
/// not logged — they are expected caller mistakes, not anomalies.
/// Everything else gets a fresh correlation id and exactly one
/// error-level log entry keyed by that id and `context`; the caller
/// sees `fallback_message` unless the error is explicitly public.
pub fn handle_server_error(error: AppError, context: &str, fallback_message: &str) -> ActionState {
    if let AppError::Validation { field_errors } = error {
        return ActionState::invalid(field_errors);
    }

    let request_id = Uuid::new_v4().to_string();
    let is_public = error.is_public();

    tracing::error!(
        context,
        request_id = %request_id,
        error = %error,
        "action failed"
    );

    ActionState {
        status: ActionStatus::Error,
        message: Some(if is_public {
            error.to_string()
        } else {
            fallback_message.to_string()
        }),
        field_errors: None,
        request_id: Some(request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(field: &str, message: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        errors
    }

    #[test]
    fn validation_errors_carry_field_detail_without_request_id() {
        let state = handle_server_error(
            AppError::Validation {
                field_errors: field_errors("email", "Enter a valid email address."),
            },
            "test",
            "Unable to process your request.",
        );
        assert_eq!(state.status, ActionStatus::Error);
        assert_eq!(state.message.as_deref(), Some("Please review the form."));
        assert!(state.field_errors.is_some());
        assert!(state.request_id.is_none());
    }

    #[test]
    fn unexpected_errors_get_fallback_message_and_request_id() {
        let state = handle_server_error(
            AppError::Database("connection reset".into()),
            "test",
            "Unable to process your request.",
        );
        assert_eq!(
            state.message.as_deref(),
            Some("Unable to process your request.")
        );
        assert!(state.request_id.is_some());
        assert!(state.field_errors.is_none());
    }

    #[test]
    fn public_errors_surface_their_own_message() {
        let state = handle_server_error(
            AppError::public("Quota exceeded for this workspace."),
            "test",
            "Unable to process your request.",
        );
        assert_eq!(
            state.message.as_deref(),
            Some("Quota exceeded for this workspace.")
        );
        assert!(state.request_id.is_some());
    }

    #[test]
    fn serialized_shape_uses_wire_field_names() {
        let state = ActionState::invalid(field_errors("name", "Name is too short."));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["fieldErrors"]["name"][0], "Name is too short.");
        assert!(json.get("requestId").is_none());
    }

    #[test]
    fn success_state_has_message_only() {
        let state = ActionState::success("User created.");
        assert!(state.is_success());
        assert_eq!(state.message.as_deref(), Some("User created."));
        assert!(state.field_errors.is_none());
        assert!(state.request_id.is_none());
    }
}
