//! Listing queries: filter construction, sorting, pagination.

use admiral_auth::require_admin;
use admiral_core::AppResult;
use admiral_core::config::DatabaseProvider;
use admiral_core::models::session::Session;
use admiral_core::models::user::UserListItem;
use admiral_core::pagination::{PaginationInput, normalize_pagination, pagination_meta};
use admiral_core::repository::{SortOrder, UserRepository, UserSearchFilter, UserSortField};
use serde::Serialize;

/// Raw listing query parameters, straight from the request.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserListItem>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// Build the substring filter for a listing request.
///
/// A blank query matches everything. Case-insensitive matching is
/// requested only when the store provider can do it natively;
/// otherwise the filter degrades to case-sensitive `contains`.
pub fn build_user_search_filter(q: Option<&str>, provider: DatabaseProvider) -> UserSearchFilter {
    let term = q.map(str::trim).filter(|t| !t.is_empty());
    match term {
        Some(term) => UserSearchFilter {
            term: Some(term.to_owned()),
            case_insensitive: provider.supports_case_insensitive_filtering(),
        },
        None => UserSearchFilter::default(),
    }
}

/// List users for the dashboard table. Admin-gated; a missing or
/// under-privileged session surfaces as an error for the surrounding
/// page layer to handle, not as an action envelope.
pub async fn get_users<R: UserRepository>(
    users: &R,
    provider: DatabaseProvider,
    session: Option<&Session>,
    query: UserListQuery,
) -> AppResult<UsersResponse> {
    require_admin(session)?;

    let filter = build_user_search_filter(query.q.as_deref(), provider);
    let sort = query
        .sort
        .as_deref()
        .and_then(UserSortField::parse)
        .unwrap_or_default();
    let order = query
        .order
        .as_deref()
        .and_then(SortOrder::parse)
        .unwrap_or_default();
    let page = normalize_pagination(PaginationInput {
        page: query.page,
        page_size: query.page_size,
    });

    let (items, total) = tokio::join!(
        users.list(&filter, sort, order, &page),
        users.count(&filter)
    );
    let (items, total) = (items?, total?);

    let meta = pagination_meta(total, page.page, page.page_size);
    Ok(UsersResponse {
        items,
        total,
        page: meta.page,
        page_size: meta.page_size,
        total_pages: meta.total_pages,
    })
}
