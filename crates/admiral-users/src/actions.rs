//! User mutations behind the action-result protocol.
//!
//! Every action runs the same sequence: admin gate, schema validation,
//! store mutation, best-effort audit record. Exactly one
//! [`ActionState`] comes out, whatever happens inside.

use admiral_auth::password::hash_password;
use admiral_auth::require_admin;
use admiral_core::AppError;
use admiral_core::action::{ActionState, handle_server_error};
use admiral_core::models::audit::AuditAction;
use admiral_core::models::session::Session;
use admiral_core::models::user::{NewUser, UserChanges};
use admiral_core::repository::{AuditLogRepository, UserRepository};

use crate::audit::record_audit_log;
use crate::schemas::{
    CreateUserInput, DeleteUserInput, UpdateUserInput, validate_create, validate_delete,
    validate_update,
};

const CREATE_FALLBACK: &str = "Unable to create the user.";
const UPDATE_FALLBACK: &str = "Unable to update the user.";
const DELETE_FALLBACK: &str = "Unable to delete the user.";
const EMAIL_TAKEN: &str = "Email already exists.";

pub struct UserService<R, A> {
    users: R,
    audit: A,
    pepper: Option<String>,
}

impl<R: UserRepository, A: AuditLogRepository> UserService<R, A> {
    pub fn new(users: R, audit: A) -> Self {
        Self {
            users,
            audit,
            pepper: None,
        }
    }

    pub fn with_pepper(users: R, audit: A, pepper: impl Into<String>) -> Self {
        Self {
            users,
            audit,
            pepper: Some(pepper.into()),
        }
    }

    pub async fn create_user(
        &self,
        session: Option<&Session>,
        input: CreateUserInput,
    ) -> ActionState {
        let actor = match require_admin(session) {
            Ok(principal) => principal.clone(),
            Err(error) => return handle_server_error(error, "users.create", CREATE_FALLBACK),
        };

        let valid = match validate_create(&input) {
            Ok(valid) => valid,
            Err(field_errors) => return ActionState::invalid(field_errors),
        };

        let password_hash = match hash_password(&valid.password, self.pepper.as_deref()) {
            Ok(hash) => hash,
            Err(error) => return handle_server_error(error, "users.create", CREATE_FALLBACK),
        };

        let created = self
            .users
            .create(NewUser {
                name: valid.name,
                email: valid.email,
                role: valid.role,
                password_hash,
            })
            .await;
        let user = match created {
            Ok(user) => user,
            Err(AppError::UniqueViolation { .. }) => return ActionState::rejected(EMAIL_TAKEN),
            Err(error) => return handle_server_error(error, "users.create", CREATE_FALLBACK),
        };

        let metadata = serde_json::json!({ "email": user.email, "role": user.role });
        record_audit_log(
            &self.audit,
            actor.id,
            AuditAction::UserCreated,
            user.id,
            Some(&metadata),
        )
        .await;

        ActionState::success("User created.")
    }

    pub async fn update_user(
        &self,
        session: Option<&Session>,
        input: UpdateUserInput,
    ) -> ActionState {
        let actor = match require_admin(session) {
            Ok(principal) => principal.clone(),
            Err(error) => return handle_server_error(error, "users.update", UPDATE_FALLBACK),
        };

        let valid = match validate_update(&input) {
            Ok(valid) => valid,
            Err(field_errors) => return ActionState::invalid(field_errors),
        };

        let password_hash = match &valid.password {
            Some(password) => match hash_password(password, self.pepper.as_deref()) {
                Ok(hash) => Some(hash),
                Err(error) => return handle_server_error(error, "users.update", UPDATE_FALLBACK),
            },
            None => None,
        };

        let password_changed = password_hash.is_some();
        let updated = self
            .users
            .update(
                valid.id,
                UserChanges {
                    name: Some(valid.name),
                    email: Some(valid.email),
                    role: Some(valid.role),
                    password_hash,
                },
            )
            .await;
        let user = match updated {
            Ok(user) => user,
            Err(AppError::UniqueViolation { .. }) => return ActionState::rejected(EMAIL_TAKEN),
            Err(error) => return handle_server_error(error, "users.update", UPDATE_FALLBACK),
        };

        let metadata = serde_json::json!({
            "email": user.email,
            "role": user.role,
            "passwordChanged": password_changed,
        });
        record_audit_log(
            &self.audit,
            actor.id,
            AuditAction::UserUpdated,
            user.id,
            Some(&metadata),
        )
        .await;

        ActionState::success("User updated.")
    }

    pub async fn delete_user(
        &self,
        session: Option<&Session>,
        input: DeleteUserInput,
    ) -> ActionState {
        let actor = match require_admin(session) {
            Ok(principal) => principal.clone(),
            Err(error) => return handle_server_error(error, "users.delete", DELETE_FALLBACK),
        };

        let id = match validate_delete(&input) {
            Ok(id) => id,
            Err(field_errors) => return ActionState::invalid(field_errors),
        };

        let user = match self.users.delete(id).await {
            Ok(user) => user,
            Err(error) => return handle_server_error(error, "users.delete", DELETE_FALLBACK),
        };

        let metadata = serde_json::json!({ "email": user.email });
        record_audit_log(
            &self.audit,
            actor.id,
            AuditAction::UserDeleted,
            user.id,
            Some(&metadata),
        )
        .await;

        ActionState::success("User deleted.")
    }
}
