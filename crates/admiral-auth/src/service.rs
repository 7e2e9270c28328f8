//! Credential verification against the user store.

use admiral_core::AppResult;
use admiral_core::models::session::Principal;
use admiral_core::repository::UserRepository;

use crate::password;

/// Verifies credentials and yields the session principal.
///
/// Generic over the repository implementation so the auth layer has no
/// dependency on the store crate.
pub struct Authenticator<R> {
    users: R,
    pepper: Option<String>,
}

impl<R: UserRepository> Authenticator<R> {
    pub fn new(users: R) -> Self {
        Self {
            users,
            pepper: None,
        }
    }

    pub fn with_pepper(users: R, pepper: impl Into<String>) -> Self {
        Self {
            users,
            pepper: Some(pepper.into()),
        }
    }

    /// `Ok(None)` means the credentials are wrong; an unknown email and
    /// a wrong password are indistinguishable to the caller. Errors are
    /// reserved for store or hash failures.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<Principal>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        if !password::verify_password(password, &user.password_hash, self.pepper.as_deref())? {
            return Ok(None);
        }
        Ok(Some(Principal::from(&user)))
    }
}
