//! Pagination normalization for listing queries.

use serde::Serialize;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 50;

/// Raw pagination input as it arrives from a listing request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationInput {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Normalized pagination: page floored at 1, page size clamped to
/// `[10, 50]`, plus the derived skip/take window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub skip: u64,
    pub take: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

pub fn normalize_pagination(input: PaginationInput) -> PageRequest {
    let page = input.page.map_or(DEFAULT_PAGE, |p| {
        p.clamp(i64::from(DEFAULT_PAGE), i64::from(u32::MAX)) as u32
    });
    let page_size = input.page_size.map_or(DEFAULT_PAGE_SIZE, |s| {
        s.clamp(i64::from(DEFAULT_PAGE_SIZE), i64::from(MAX_PAGE_SIZE)) as u32
    });

    PageRequest {
        page,
        page_size,
        skip: u64::from(page - 1) * u64::from(page_size),
        take: u64::from(page_size),
    }
}

pub fn pagination_meta(total: u64, page: u32, page_size: u32) -> PaginationMeta {
    let total_pages = total.div_ceil(u64::from(page_size)).max(1);
    PaginationMeta {
        page,
        page_size,
        total,
        total_pages,
    }
}
