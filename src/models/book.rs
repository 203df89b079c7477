//! Book model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::filter::Filter;
use crate::validation::ValidationErrors;

/// Sort values accepted when listing books
pub const BOOK_SORT_SAFELIST: &[&str] = &[
    "id",
    "title",
    "author",
    "created_at",
    "-id",
    "-title",
    "-author",
    "-created_at",
];

pub const DEFAULT_PAGE_SIZE: i64 = 20;

const MAX_SHORT_TEXT_BYTES: usize = 500;
const MAX_DESCRIPTION_BYTES: usize = 50_000;

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub author: String,
    pub image_url: String,
    pub description: String,
    /// Optimistic-concurrency token, starts at 1
    pub version: i32,
}

impl Book {
    /// Overwrite the user-editable fields. `version` is left alone so the
    /// next update is conditioned on the version this copy was read at.
    pub fn apply(&mut self, input: BookInput) {
        self.title = input.title;
        self.author = input.author;
        self.image_url = input.image_url;
        self.description = input.description;
    }
}

/// Create / replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BookInput {
    #[validate(
        length(min = 1, message = "must be provided"),
        custom(function = "short_text")
    )]
    pub title: String,
    #[validate(
        length(min = 1, message = "must be provided"),
        custom(function = "short_text")
    )]
    pub author: String,
    #[validate(
        length(min = 1, message = "must be provided"),
        custom(function = "short_text")
    )]
    pub image_url: String,
    #[validate(
        length(min = 1, message = "must be provided"),
        custom(function = "long_text")
    )]
    pub description: String,
}

fn max_bytes(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() <= max {
        return Ok(());
    }
    let mut err = ValidationError::new("max_bytes");
    err.message = Some(Cow::Owned(format!(
        "must not be more than {} bytes long",
        max
    )));
    Err(err)
}

fn short_text(value: &str) -> Result<(), ValidationError> {
    max_bytes(value, MAX_SHORT_TEXT_BYTES)
}

fn long_text(value: &str) -> Result<(), ValidationError> {
    max_bytes(value, MAX_DESCRIPTION_BYTES)
}

/// Field validation for a book payload
pub fn validate_book(input: &BookInput) -> ValidationErrors {
    match input.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Full-text match on title (empty matches everything)
    pub title: Option<String>,
    /// Full-text match on author (empty matches everything)
    pub author: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// One of id, title, author, created_at; prefix with `-` for descending
    pub sort: Option<String>,
}

impl BookQuery {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or("")
    }

    pub fn filter(&self) -> Filter {
        Filter {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort: self.sort.clone().unwrap_or_else(|| "id".to_string()),
            sort_safelist: BOOK_SORT_SAFELIST,
        }
    }
}
