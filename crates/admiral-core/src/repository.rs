//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations map
//! store-level failures (unique constraint violations, missing rows)
//! to the shared [`AppError`](crate::error::AppError) variants so the
//! action layer can react uniformly.

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    audit::{AuditLogEntry, NewAuditLogEntry},
    user::{NewUser, User, UserChanges, UserListItem},
};
use crate::pagination::PageRequest;

/// Substring filter applied to user name and email.
#[derive(Debug, Clone, Default)]
pub struct UserSearchFilter {
    /// `None` matches everything.
    pub term: Option<String>,
    /// Honored only when the store supports case-insensitive matching.
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortField {
    #[default]
    CreatedAt,
    Name,
}

impl UserSortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(Self::CreatedAt),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: NewUser) -> impl Future<Output = AppResult<User>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = AppResult<Option<User>>> + Send;
    fn find_by_email(&self, email: &str) -> impl Future<Output = AppResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> impl Future<Output = AppResult<User>> + Send;
    /// Returns the deleted row so callers can audit it.
    fn delete(&self, id: Uuid) -> impl Future<Output = AppResult<User>> + Send;
    fn list(
        &self,
        filter: &UserSearchFilter,
        sort: UserSortField,
        order: SortOrder,
        page: &PageRequest,
    ) -> impl Future<Output = AppResult<Vec<UserListItem>>> + Send;
    fn count(&self, filter: &UserSearchFilter) -> impl Future<Output = AppResult<u64>> + Send;
}

pub trait AuditLogRepository: Send + Sync {
    fn append(
        &self,
        entry: NewAuditLogEntry,
    ) -> impl Future<Output = AppResult<AuditLogEntry>> + Send;
}
