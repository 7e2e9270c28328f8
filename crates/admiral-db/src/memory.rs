//! In-memory repositories backed by [`parking_lot::RwLock`].
//!
//! Handles are cheap to clone and share one store. Guards are never
//! held across an await point; every operation completes synchronously
//! under the lock.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use admiral_core::models::audit::{AuditLogEntry, NewAuditLogEntry};
use admiral_core::models::user::{NewUser, User, UserChanges, UserListItem};
use admiral_core::pagination::PageRequest;
use admiral_core::repository::{
    AuditLogRepository, SortOrder, UserRepository, UserSearchFilter, UserSortField,
};
use admiral_core::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(user: &User, filter: &UserSearchFilter) -> bool {
        let Some(term) = filter.term.as_deref() else {
            return true;
        };
        if filter.case_insensitive {
            let term = term.to_lowercase();
            user.name.to_lowercase().contains(&term)
                || user.email.to_lowercase().contains(&term)
        } else {
            user.name.contains(term) || user.email.contains(term)
        }
    }

    fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
        users.iter().any(|u| {
            Some(u.id) != except && u.email.eq_ignore_ascii_case(email)
        })
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: NewUser) -> AppResult<User> {
        let mut users = self.users.write();
        if Self::email_taken(&users, &input.email, None) {
            return Err(AppError::UniqueViolation {
                field: "email".into(),
            });
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            role: input.role,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut users = self.users.write();
        if let Some(email) = &changes.email {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(AppError::UniqueViolation {
                    field: "email".into(),
                });
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            })?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<User> {
        let mut users = self.users.write();
        let position = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            })?;
        Ok(users.remove(position))
    }

    async fn list(
        &self,
        filter: &UserSearchFilter,
        sort: UserSortField,
        order: SortOrder,
        page: &PageRequest,
    ) -> AppResult<Vec<UserListItem>> {
        let users = self.users.read();
        let mut matched: Vec<&User> = users.iter().filter(|u| Self::matches(u, filter)).collect();
        matched.sort_by(|a, b| {
            let ordering = match sort {
                UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                UserSortField::Name => a.name.cmp(&b.name),
            };
            // Stable tiebreak so pages never overlap.
            let ordering = ordering.then_with(|| a.id.cmp(&b.id));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(matched
            .into_iter()
            .skip(page.skip as usize)
            .take(page.take as usize)
            .map(|u| UserListItem::from(u.clone()))
            .collect())
    }

    async fn count(&self, filter: &UserSearchFilter) -> AppResult<u64> {
        let users = self.users.read();
        Ok(users.iter().filter(|u| Self::matches(u, filter)).count() as u64)
    }
}

#[derive(Clone, Default)]
pub struct MemoryAuditLogRepository {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl MemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().clone()
    }
}

impl AuditLogRepository for MemoryAuditLogRepository {
    async fn append(&self, entry: NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        let stored = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            action: entry.action,
            target_id: entry.target_id,
            metadata: entry.metadata,
            created_at: Utc::now(),
        };
        self.entries.write().push(stored.clone());
        Ok(stored)
    }
}
