//! Integration tests for the user mutation actions.

use admiral_auth::password::verify_password;
use admiral_core::action::ActionStatus;
use admiral_core::models::audit::{AuditAction, AuditLogEntry, NewAuditLogEntry};
use admiral_core::models::session::{Principal, Session};
use admiral_core::models::user::{NewUser, Role, User, UserChanges, UserListItem};
use admiral_core::pagination::PageRequest;
use admiral_core::repository::{
    AuditLogRepository, SortOrder, UserRepository, UserSearchFilter, UserSortField,
};
use admiral_core::{AppError, AppResult};
use admiral_db::{MemoryAuditLogRepository, MemoryUserRepository};
use admiral_users::UserService;
use admiral_users::schemas::{CreateUserInput, DeleteUserInput, UpdateUserInput};
use uuid::Uuid;

fn session(role: Role) -> Session {
    Session {
        user: Principal {
            id: Uuid::new_v4(),
            name: "Root Admin".into(),
            email: "root@example.com".into(),
            role,
        },
    }
}

fn admin() -> Session {
    session(Role::Admin)
}

fn create_input(email: &str) -> CreateUserInput {
    CreateUserInput {
        name: "Ada Lovelace".into(),
        email: email.into(),
        role: "USER".into(),
        password: "difference engine".into(),
    }
}

type Service = UserService<MemoryUserRepository, MemoryAuditLogRepository>;

fn service() -> (Service, MemoryUserRepository, MemoryAuditLogRepository) {
    let users = MemoryUserRepository::new();
    let audit = MemoryAuditLogRepository::new();
    (UserService::new(users.clone(), audit.clone()), users, audit)
}

/// A store whose every operation fails, for exercising the generic
/// error path.
#[derive(Clone)]
struct FailingUserRepository;

impl UserRepository for FailingUserRepository {
    async fn create(&self, _input: NewUser) -> AppResult<User> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn update(&self, _id: Uuid, _changes: UserChanges) -> AppResult<User> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn delete(&self, _id: Uuid) -> AppResult<User> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn list(
        &self,
        _filter: &UserSearchFilter,
        _sort: UserSortField,
        _order: SortOrder,
        _page: &PageRequest,
    ) -> AppResult<Vec<UserListItem>> {
        Err(AppError::Database("connection reset".into()))
    }
    async fn count(&self, _filter: &UserSearchFilter) -> AppResult<u64> {
        Err(AppError::Database("connection reset".into()))
    }
}

#[derive(Clone)]
struct FailingAuditRepository;

impl AuditLogRepository for FailingAuditRepository {
    async fn append(&self, _entry: NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        Err(AppError::Database("audit table unavailable".into()))
    }
}

#[tokio::test]
async fn create_succeeds_and_records_an_audit_entry() {
    let (service, users, audit) = service();

    let state = service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;
    assert!(state.is_success());
    assert_eq!(state.message.as_deref(), Some("User created."));

    let stored = users.find_by_email("ada@example.com").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "difference engine");
    assert!(verify_password("difference engine", &stored.password_hash, None).unwrap());

    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::UserCreated);
    assert_eq!(entries[0].target_id, stored.id);
    let metadata: serde_json::Value =
        serde_json::from_str(entries[0].metadata.as_deref().unwrap()).unwrap();
    assert_eq!(metadata["email"], "ada@example.com");
}

#[tokio::test]
async fn duplicate_email_reports_the_fixed_conflict_message() {
    let (service, _users, audit) = service();
    service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;

    let state = service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;

    assert_eq!(state.status, ActionStatus::Error);
    assert_eq!(state.message.as_deref(), Some("Email already exists."));
    assert!(state.request_id.is_none());
    assert!(state.field_errors.is_none());
    // The failed attempt leaves no audit trace.
    assert_eq!(audit.entries().len(), 1);
}

#[tokio::test]
async fn store_failure_returns_the_fallback_with_a_correlation_id() {
    let service = UserService::new(FailingUserRepository, MemoryAuditLogRepository::new());

    let state = service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;

    assert_eq!(state.status, ActionStatus::Error);
    assert_eq!(state.message.as_deref(), Some("Unable to create the user."));
    assert!(state.request_id.is_some());
    assert!(state.field_errors.is_none());
}

#[tokio::test]
async fn non_admins_cannot_mutate() {
    let (service, users, _audit) = service();

    for session in [None, Some(session(Role::User))] {
        let state = service
            .create_user(session.as_ref(), create_input("ada@example.com"))
            .await;
        assert_eq!(state.status, ActionStatus::Error);
        assert_eq!(state.message.as_deref(), Some("Unable to create the user."));
        assert!(state.request_id.is_some());
    }

    assert_eq!(users.count(&UserSearchFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_input_short_circuits_before_the_store() {
    let (service, users, _audit) = service();

    let state = service
        .create_user(
            Some(&admin()),
            CreateUserInput {
                name: "A".into(),
                email: "bad".into(),
                role: "USER".into(),
                password: "pw".into(),
            },
        )
        .await;

    assert_eq!(state.message.as_deref(), Some("Please review the form."));
    let field_errors = state.field_errors.unwrap();
    assert!(field_errors.contains_key("name"));
    assert!(field_errors.contains_key("email"));
    assert!(field_errors.contains_key("password"));
    assert!(state.request_id.is_none());
    assert_eq!(users.count(&UserSearchFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn update_keeps_the_password_when_left_blank() {
    let (service, users, audit) = service();
    service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;
    let before = users.find_by_email("ada@example.com").await.unwrap().unwrap();

    let state = service
        .update_user(
            Some(&admin()),
            UpdateUserInput {
                id: before.id.to_string(),
                name: "Ada King".into(),
                email: "ada@example.com".into(),
                role: "ADMIN".into(),
                password: String::new(),
            },
        )
        .await;
    assert_eq!(state.message.as_deref(), Some("User updated."));

    let after = users.find_by_id(before.id).await.unwrap().unwrap();
    assert_eq!(after.name, "Ada King");
    assert_eq!(after.role, Role::Admin);
    assert_eq!(after.password_hash, before.password_hash);

    let entries = audit.entries();
    assert_eq!(entries.last().unwrap().action, AuditAction::UserUpdated);
    let metadata: serde_json::Value =
        serde_json::from_str(entries.last().unwrap().metadata.as_deref().unwrap()).unwrap();
    assert_eq!(metadata["passwordChanged"], false);
}

#[tokio::test]
async fn update_rehashes_a_supplied_password() {
    let (service, users, _audit) = service();
    service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;
    let before = users.find_by_email("ada@example.com").await.unwrap().unwrap();

    let state = service
        .update_user(
            Some(&admin()),
            UpdateUserInput {
                id: before.id.to_string(),
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                role: "USER".into(),
                password: "analytical engine".into(),
            },
        )
        .await;
    assert!(state.is_success());

    let after = users.find_by_id(before.id).await.unwrap().unwrap();
    assert_ne!(after.password_hash, before.password_hash);
    assert!(verify_password("analytical engine", &after.password_hash, None).unwrap());
}

#[tokio::test]
async fn update_to_a_taken_email_reports_the_conflict_message() {
    let (service, users, _audit) = service();
    service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;
    service
        .create_user(Some(&admin()), create_input("grace@example.com"))
        .await;
    let grace = users.find_by_email("grace@example.com").await.unwrap().unwrap();

    let state = service
        .update_user(
            Some(&admin()),
            UpdateUserInput {
                id: grace.id.to_string(),
                name: "Grace Hopper".into(),
                email: "ada@example.com".into(),
                role: "USER".into(),
                password: String::new(),
            },
        )
        .await;

    assert_eq!(state.message.as_deref(), Some("Email already exists."));
    assert!(state.request_id.is_none());
}

#[tokio::test]
async fn delete_removes_the_user_and_audits_it() {
    let (service, users, audit) = service();
    service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;
    let user = users.find_by_email("ada@example.com").await.unwrap().unwrap();

    let state = service
        .delete_user(
            Some(&admin()),
            DeleteUserInput {
                id: user.id.to_string(),
            },
        )
        .await;

    assert_eq!(state.message.as_deref(), Some("User deleted."));
    assert!(users.find_by_id(user.id).await.unwrap().is_none());

    let entries = audit.entries();
    assert_eq!(entries.last().unwrap().action, AuditAction::UserDeleted);
    let metadata: serde_json::Value =
        serde_json::from_str(entries.last().unwrap().metadata.as_deref().unwrap()).unwrap();
    assert_eq!(metadata["email"], "ada@example.com");
}

#[tokio::test]
async fn deleting_a_missing_user_takes_the_generic_error_path() {
    let (service, _users, _audit) = service();

    let state = service
        .delete_user(
            Some(&admin()),
            DeleteUserInput {
                id: Uuid::new_v4().to_string(),
            },
        )
        .await;

    assert_eq!(state.status, ActionStatus::Error);
    assert_eq!(state.message.as_deref(), Some("Unable to delete the user."));
    assert!(state.request_id.is_some());
}

#[tokio::test]
async fn audit_failure_never_fails_the_mutation() {
    let users = MemoryUserRepository::new();
    let service = UserService::new(users.clone(), FailingAuditRepository);

    let state = service
        .create_user(Some(&admin()), create_input("ada@example.com"))
        .await;

    assert!(state.is_success());
    assert!(users.find_by_email("ada@example.com").await.unwrap().is_some());
}
