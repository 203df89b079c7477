//! Pagination and sorting for listing queries.
//!
//! A [`Filter`] is untrusted request input. The only way to obtain the pieces
//! of SQL it controls (ORDER BY column and direction, LIMIT, OFFSET) is through
//! [`Filter::validate`], which checks the sort value against the caller's
//! allow-list and resolves it to a [`SortColumn`]. Only the column's static
//! name is ever written into query text.

use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::ValidationErrors;

pub const MAX_PAGE_SIZE: i64 = 100;

/// Keeps `(page - 1) * page_size` well inside `i64`
pub const MAX_PAGE: i64 = 10_000_000;

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    Author,
    CreatedAt,
}

impl SortColumn {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SortColumn::Id),
            "title" => Some(SortColumn::Title),
            "author" => Some(SortColumn::Author),
            "created_at" => Some(SortColumn::CreatedAt),
            _ => None,
        }
    }

    /// Column name as written in SQL
    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::Author => "author",
            SortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Raw pagination and sort request
#[derive(Debug, Clone)]
pub struct Filter {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filter {
    /// Check every rule and report all failures at once.
    pub fn validate(self) -> Result<ValidFilter, ValidationErrors> {
        validate_filter(&self).into_result()?;
        Ok(ValidFilter(self))
    }
}

/// Pure validation of a filter, returning every field that failed
pub fn validate_filter(filter: &Filter) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check(filter.page > 0, "page", "must be greater than zero");
    errors.check(
        filter.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    errors.check(filter.page_size > 0, "page_size", "must be greater than zero");
    errors.check(
        filter.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    errors.check(
        filter.sort_safelist.contains(&filter.sort.as_str()),
        "sort",
        "invalid sort value",
    );
    errors
}

/// A filter that passed [`Filter::validate`]
#[derive(Debug, Clone)]
pub struct ValidFilter(Filter);

impl ValidFilter {
    pub fn page(&self) -> i64 {
        self.0.page
    }

    pub fn page_size(&self) -> i64 {
        self.0.page_size
    }

    /// Column named by the sort value, without its `-` prefix.
    ///
    /// # Panics
    ///
    /// If the sort value is not in the allow-list or names an unknown column.
    /// Both mean a caller built the allow-list wrong.
    pub fn sort_column(&self) -> SortColumn {
        let sort = self.0.sort.as_str();
        if !self.0.sort_safelist.contains(&sort) {
            panic!("unsafe sort parameter: {}", sort);
        }
        let name = sort.strip_prefix('-').unwrap_or(sort);
        SortColumn::from_name(name)
            .unwrap_or_else(|| panic!("sort allow-list names unknown column: {}", name))
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.0.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.0.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.0.page - 1) * self.0.page_size
    }
}

/// Pagination details returned alongside a page of results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// All zero when nothing matched.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
