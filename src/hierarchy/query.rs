//! Hierarchy request parameters: filters, sorting and pagination.
//!
//! Raw parameters are validated here, before any storage call is made.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::datetime::start_of_day;
use crate::{GroveError, Result};

use super::item::TreeItem;

/// Default page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: i64 = 100;

/// Field the roots and siblings are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for SortBy {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortBy::Name),
            "created_at" => Ok(SortBy::CreatedAt),
            "updated_at" => Ok(SortBy::UpdatedAt),
            other => Err(GroveError::InvalidSort(format!(
                "sort_by must be one of name, created_at, updated_at (got '{other}')"
            ))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Name => "name",
            SortBy::CreatedAt => "created_at",
            SortBy::UpdatedAt => "updated_at",
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(GroveError::InvalidSort(format!(
                "sort_order must be asc or desc (got '{s}')"
            ))),
        }
    }
}

/// Sort key and direction shared by root selection and child ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub by: SortBy,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }

    /// Compare two items by this key. Equal keys compare `Equal` so a stable
    /// sort keeps their original order.
    pub fn compare(&self, a: &TreeItem, b: &TreeItem) -> Ordering {
        let ordering = match self.by {
            SortBy::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
            SortBy::CreatedAt => a.created_at().cmp(b.created_at()),
            SortBy::UpdatedAt => a.updated_at().cmp(b.updated_at()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Stable in-place sort.
    pub fn sort(&self, items: &mut [TreeItem]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

/// Predicates applied to root-level folders and files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Lower bound for `updated_at`, in SQLite datetime format.
    pub updated_since: Option<String>,
}

impl RootFilter {
    /// Append ` AND ...` conditions for this filter to a query whose WHERE
    /// clause is already open.
    pub fn push_conditions(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(ref name) = self.name {
            query.push(" AND name LIKE ");
            query.push_bind(like_contains(name));
            query.push(" ESCAPE '\\'");
        }
        if let Some(ref description) = self.description {
            query.push(" AND description LIKE ");
            query.push_bind(like_contains(description));
            query.push(" ESCAPE '\\'");
        }
        if let Some(ref since) = self.updated_since {
            query.push(" AND updated_at >= ");
            query.push_bind(since.clone());
        }
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn like_contains(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Unvalidated hierarchy request parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// A validated hierarchy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: RootFilter,
    pub sort: SortSpec,
}

impl Default for HierarchyQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE as u32,
            limit: DEFAULT_LIMIT as u32,
            filter: RootFilter::default(),
            sort: SortSpec::default(),
        }
    }
}

impl HierarchyQuery {
    /// Validate raw parameters.
    ///
    /// Empty filter strings are treated as absent.
    pub fn parse(params: &HierarchyParams) -> Result<Self> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 || page > u32::MAX as i64 {
            return Err(GroveError::InvalidPagination(format!(
                "page must be at least 1 (got {page})"
            )));
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(GroveError::InvalidPagination(format!(
                "limit must be between 1 and {MAX_LIMIT} (got {limit})"
            )));
        }

        let by = match non_empty(&params.sort_by) {
            Some(s) => s.parse()?,
            None => SortBy::default(),
        };
        let order = match non_empty(&params.sort_order) {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };

        let updated_since = match non_empty(&params.date) {
            Some(date) => Some(start_of_day(date)?),
            None => None,
        };

        Ok(Self {
            page: page as u32,
            limit: limit as u32,
            filter: RootFilter {
                name: non_empty(&params.name).map(str::to_string),
                description: non_empty(&params.description).map(str::to_string),
                updated_since,
            },
            sort: SortSpec::new(by, order),
        })
    }

    /// Index of the first root on the requested page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
