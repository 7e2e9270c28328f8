//! Permission gates for mutating entry points. Fail closed.

use admiral_core::models::session::{Principal, Session};
use admiral_core::{AppError, AppResult};

pub fn require_session(session: Option<&Session>) -> AppResult<&Principal> {
    session.map(|s| &s.user).ok_or(AppError::Unauthorized)
}

pub fn require_admin(session: Option<&Session>) -> AppResult<&Principal> {
    let principal = require_session(session)?;
    if !principal.role.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(principal)
}
