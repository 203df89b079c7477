//! Repository layer for database operations

pub mod books;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookInput},
        filter::ValidFilter,
    },
};

/// Persistent storage for books.
///
/// Coordination between concurrent writers happens entirely in the store:
/// `update` is a compare-and-swap on `version`, and `delete` checks the
/// affected row count. Implementations take no in-process locks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book; the store assigns `id`, `created_at` and `version = 1`.
    async fn insert(&self, input: &BookInput) -> AppResult<Book>;

    /// Fetch one book. Ids below 1 are `NotFound` without a round trip.
    async fn get(&self, id: i64) -> AppResult<Book>;

    /// Write `book` if the stored version still equals `book.version`.
    ///
    /// On success `book.version` is refreshed to the new stored value. When no
    /// row matches the id and version, fails with `EditConflict`.
    async fn update(&self, book: &mut Book) -> AppResult<()>;

    /// Hard delete. Ids below 1 and ids matching no row are `NotFound`.
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// One page of books matching the title and author text queries, plus the
    /// total number of matches. Empty queries match everything.
    async fn get_all(
        &self,
        title: &str,
        author: &str,
        filter: &ValidFilter,
    ) -> AppResult<(Vec<Book>, i64)>;

    /// Round trip to the store, for readiness checks.
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the per-table repositories
#[derive(Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool),
        }
    }
}
