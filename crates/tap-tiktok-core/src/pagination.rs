//! Page-token strategies.
//!
//! TikTok list endpoints report `page` and `total_page` under
//! `$.data.page_info`. A stream continues with `page + 1` while
//! `page < total_page`.

use std::fmt::Debug;

use serde_json::Value;

use crate::error::TapError;
use crate::jsonpath::{JsonPath, Segment};

pub const PAGE_PATH: JsonPath = JsonPath::new(&[
    Segment::Key("data"),
    Segment::Key("page_info"),
    Segment::Key("page"),
]);

pub const TOTAL_PAGE_PATH: JsonPath = JsonPath::new(&[
    Segment::Key("data"),
    Segment::Key("page_info"),
    Segment::Key("total_page"),
]);

/// Page position reported by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub total_page: u64,
}

impl PageInfo {
    pub const fn new(page: u64, total_page: u64) -> Self {
        Self { page, total_page }
    }

    /// Token for the following page, or `None` on the last page.
    pub const fn next_page(self) -> Option<u64> {
        if self.page < self.total_page {
            Some(self.page + 1)
        } else {
            None
        }
    }
}

/// Decides the next page token from a parsed response body.
pub trait PaginationStrategy: Debug + Send + Sync {
    fn next_page_token(&self, body: &Value) -> Result<Option<u64>, TapError>;
}

/// Missing or non-integer page fields count as 0, which ends pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultingPagination {
    page_path: JsonPath,
    total_page_path: JsonPath,
}

impl DefaultingPagination {
    pub const fn new(page_path: JsonPath, total_page_path: JsonPath) -> Self {
        Self {
            page_path,
            total_page_path,
        }
    }
}

impl Default for DefaultingPagination {
    fn default() -> Self {
        Self::new(PAGE_PATH, TOTAL_PAGE_PATH)
    }
}

impl PaginationStrategy for DefaultingPagination {
    fn next_page_token(&self, body: &Value) -> Result<Option<u64>, TapError> {
        let read = |path: &JsonPath| path.first(body).and_then(Value::as_u64).unwrap_or(0);
        Ok(PageInfo::new(read(&self.page_path), read(&self.total_page_path)).next_page())
    }
}

/// Both page fields must be present integers; anything else is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictPagination {
    page_path: JsonPath,
    total_page_path: JsonPath,
}

impl StrictPagination {
    pub const fn new(page_path: JsonPath, total_page_path: JsonPath) -> Self {
        Self {
            page_path,
            total_page_path,
        }
    }
}

impl Default for StrictPagination {
    fn default() -> Self {
        Self::new(PAGE_PATH, TOTAL_PAGE_PATH)
    }
}

impl PaginationStrategy for StrictPagination {
    fn next_page_token(&self, body: &Value) -> Result<Option<u64>, TapError> {
        let read = |path: &JsonPath| {
            path.first(body)
                .and_then(Value::as_u64)
                .ok_or_else(|| TapError::Pagination {
                    field: path.to_string(),
                })
        };
        let info = PageInfo::new(read(&self.page_path)?, read(&self.total_page_path)?);
        Ok(info.next_page())
    }
}
