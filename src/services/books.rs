//! Books service
//!
//! Validates requests before they reach the store and drives the
//! read-modify-write cycle of an update. Conflicts are never retried here;
//! the caller re-reads and resubmits.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{validate_book, Book, BookInput, BookQuery},
        filter::Metadata,
    },
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        validate_book(&input).into_result()?;
        self.store.insert(&input).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.store.get(id).await
    }

    /// Replace the editable fields of book `id`.
    ///
    /// `expected_version`, when given, must equal the version read just now or
    /// the update is rejected before any write. The store's own
    /// compare-and-swap still applies to the version that was read.
    pub async fn update_book(
        &self,
        id: i64,
        expected_version: Option<i32>,
        input: BookInput,
    ) -> AppResult<Book> {
        validate_book(&input).into_result()?;

        let mut book = self.store.get(id).await?;

        if let Some(expected) = expected_version {
            if expected != book.version {
                tracing::debug!(
                    book_id = id,
                    expected,
                    current = book.version,
                    "expected version is stale"
                );
                return Err(AppError::EditConflict);
            }
        }

        book.apply(input);
        self.store.update(&mut book).await?;

        tracing::info!(book_id = book.id, version = book.version, "book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.store.delete(id).await
    }

    /// Search and page through books
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, Metadata)> {
        let filter = query.filter().validate()?;

        let (books, total) = self
            .store
            .get_all(query.title(), query.author(), &filter)
            .await?;

        let metadata = Metadata::calculate(total, filter.page(), filter.page_size());
        Ok((books, metadata))
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
