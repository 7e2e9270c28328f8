//! The login action: validation, throttling, credential check.
//!
//! Throttling is keyed by client address plus normalized email, so one
//! attacker cannot burn a victim's budget from many addresses, and a
//! shared NAT address cannot lock out every account behind it at once.

use admiral_cache::ratelimit::{LOGIN_LIMIT, LOGIN_WINDOW, consume_rate_limit, rate_limit_key};
use admiral_cache::Cache;
use admiral_core::action::{ActionState, handle_server_error};
use admiral_core::repository::UserRepository;
use admiral_core::validation::{add_field_error, is_valid_email};
use admiral_core::{AppError, FieldErrors};

use crate::service::Authenticator;

const LOGIN_FALLBACK: &str = "Unable to sign you in.";

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Client network address, as reported by the front proxy.
    pub ip: String,
}

fn validate(input: &LoginInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(&input.email) {
        add_field_error(&mut errors, "email", "Enter a valid email address.");
    }
    if input.password.len() < 8 {
        add_field_error(&mut errors, "password", "Password must be at least 8 characters.");
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Authenticate credentials and report the outcome as an [`ActionState`].
///
/// Wrong credentials and throttled attempts are expected outcomes:
/// fixed messages, no correlation id, no error log. Only store or hash
/// failures take the logged fallback path.
pub async fn login_action<R: UserRepository>(
    authenticator: &Authenticator<R>,
    cache: &Cache,
    input: LoginInput,
) -> ActionState {
    // Every submission spends an attempt, malformed ones included, so
    // the throttle cannot be probed for free.
    let key = rate_limit_key(
        "login",
        &format!("{}:{}", input.ip, input.email.to_lowercase()),
    );
    match consume_rate_limit(cache, &key, LOGIN_LIMIT, LOGIN_WINDOW).await {
        Ok(result) if !result.success => {
            return ActionState::rejected("Too many attempts. Please try again shortly.");
        }
        Ok(_) => {}
        Err(error) => {
            return handle_server_error(
                AppError::Internal(error.to_string()),
                "auth.login",
                LOGIN_FALLBACK,
            );
        }
    }

    if let Err(field_errors) = validate(&input) {
        return ActionState::invalid(field_errors);
    }

    match authenticator.authenticate(&input.email, &input.password).await {
        Ok(Some(_principal)) => ActionState::success("Logging you in."),
        Ok(None) => ActionState::rejected("Invalid credentials."),
        Err(error) => handle_server_error(error, "auth.login", LOGIN_FALLBACK),
    }
}
