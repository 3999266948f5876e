//! Shared request/response plumbing: the JSON envelope, pagination and the
//! tri-state field used by partial updates.

use axum::extract::FromRequest;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// `{"message": ..., "data": ...}` success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self { message: None, data }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self { message: Some(message.into()), data }
    }
}

/// Body for endpoints that only acknowledge an action.
pub fn message_body(message: &str) -> Value {
    json!({ "message": message })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page: page.max(1), limit: limit.clamp(1, MAX_PAGE_LIMIT) }
    }

    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1);
        let limit = limit.and_then(|l| l.trim().parse::<i64>().ok()).unwrap_or(DEFAULT_PAGE_LIMIT);
        Self::new(page, limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

/// Query string shared by the paginated catalog listings. `page`/`limit` stay
/// strings so that garbage input falls back to the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Type(String),
    Search(String),
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }

    /// `search` takes precedence over `type`; blank values are ignored.
    pub fn filter(&self) -> ListFilter {
        let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        if let Some(term) = non_blank(&self.search) {
            ListFilter::Search(term)
        } else if let Some(kind) = non_blank(&self.kind) {
            ListFilter::Type(kind)
        } else {
            ListFilter::All
        }
    }
}

/// JSON body extractor whose rejections render through [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Deserializes a field that distinguishes "absent" from "explicit null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Applies a tri-state patch to a nullable column value.
pub fn apply_patch<T>(current: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(next) = patch {
        *current = next;
    }
}
