//! Form input schemas for the user mutations.
//!
//! Inputs arrive as raw form strings and are checked field by field;
//! every problem is reported at once so the form can annotate all
//! offending inputs in a single round trip.

use uuid::Uuid;

use admiral_core::FieldErrors;
use admiral_core::models::user::Role;
use admiral_core::validation::{add_field_error, is_valid_email};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Raw create-user form submission.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

/// Raw update-user form submission. Blank password means "keep".
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteUserInput {
    pub id: String,
}

/// Validated create payload.
#[derive(Debug, Clone)]
pub struct ValidCreateUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

/// Validated update payload.
#[derive(Debug, Clone)]
pub struct ValidUpdateUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: Option<String>,
}

fn parse_role(raw: &str, errors: &mut FieldErrors) -> Option<Role> {
    match raw {
        "ADMIN" => Some(Role::Admin),
        "USER" => Some(Role::User),
        _ => {
            add_field_error(errors, "role", "Select a valid role.");
            None
        }
    }
}

fn parse_id(raw: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            add_field_error(errors, "id", "Invalid user id.");
            None
        }
    }
}

fn check_name(name: &str, errors: &mut FieldErrors) {
    if name.trim().chars().count() < MIN_NAME_LEN {
        add_field_error(errors, "name", "Name must be at least 2 characters.");
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if !is_valid_email(email.trim()) {
        add_field_error(errors, "email", "Enter a valid email address.");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.len() < MIN_PASSWORD_LEN {
        add_field_error(errors, "password", "Password must be at least 8 characters.");
    }
}

pub fn validate_create(input: &CreateUserInput) -> Result<ValidCreateUser, FieldErrors> {
    let mut errors = FieldErrors::new();
    check_name(&input.name, &mut errors);
    check_email(&input.email, &mut errors);
    let role = parse_role(&input.role, &mut errors);
    check_password(&input.password, &mut errors);

    match (errors.is_empty(), role) {
        (true, Some(role)) => Ok(ValidCreateUser {
            name: input.name.trim().to_owned(),
            email: input.email.trim().to_owned(),
            role,
            password: input.password.clone(),
        }),
        _ => Err(errors),
    }
}

pub fn validate_update(input: &UpdateUserInput) -> Result<ValidUpdateUser, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = parse_id(&input.id, &mut errors);
    check_name(&input.name, &mut errors);
    check_email(&input.email, &mut errors);
    let role = parse_role(&input.role, &mut errors);
    // Password is optional on update; validate only when supplied.
    if !input.password.is_empty() {
        check_password(&input.password, &mut errors);
    }

    match (errors.is_empty(), id, role) {
        (true, Some(id), Some(role)) => Ok(ValidUpdateUser {
            id,
            name: input.name.trim().to_owned(),
            email: input.email.trim().to_owned(),
            role,
            password: (!input.password.is_empty()).then(|| input.password.clone()),
        }),
        _ => Err(errors),
    }
}

pub fn validate_delete(input: &DeleteUserInput) -> Result<Uuid, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = parse_id(&input.id, &mut errors);
    match id {
        Some(id) if errors.is_empty() => Ok(id),
        _ => Err(errors),
    }
}
