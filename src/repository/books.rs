//! Books repository (PostgreSQL)

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres, Row};

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput},
        filter::ValidFilter,
    },
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

/// Title and author match, `$1` and `$2`. An empty query matches everything.
const SEARCH_PREDICATE: &str = r#"
        (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
          AND (to_tsvector('simple', author) @@ plainto_tsquery('simple', $2) OR $2 = '')
"#;

/// Listing query for a validated filter.
///
/// Only the resolved column and direction are written into the text; the
/// search terms, limit and offset are bound as `$1..$4`. `id ASC` always
/// follows the chosen column so pages never overlap or skip rows.
fn list_query(filter: &ValidFilter) -> String {
    format!(
        r#"
        SELECT count(*) OVER() AS total,
               id, created_at, title, author, image_url, description, version
        FROM books
        WHERE {}
        ORDER BY {} {}, id ASC
        LIMIT $3 OFFSET $4
        "#,
        SEARCH_PREDICATE,
        filter.sort_column().as_sql(),
        filter.sort_direction().as_sql()
    )
}

fn count_query() -> String {
    format!("SELECT count(*) FROM books WHERE {}", SEARCH_PREDICATE)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn insert(&self, input: &BookInput) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, image_url, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, title, author, image_url, description, version
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.image_url)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(book_id = book.id, "book created");
        Ok(book)
    }

    async fn get(&self, id: i64) -> AppResult<Book> {
        if id < 1 {
            return Err(not_found(id));
        }

        sqlx::query_as::<_, Book>(
            r#"
            SELECT id, created_at, title, author, image_url, description, version
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn update(&self, book: &mut Book) -> AppResult<()> {
        let new_version = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books
            SET title = $1, author = $2, image_url = $3, description = $4,
                version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING version
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.image_url)
        .bind(&book.description)
        .bind(book.id)
        .bind(book.version)
        .fetch_optional(&self.pool)
        .await?;

        match new_version {
            Some(version) => {
                book.version = version;
                Ok(())
            }
            None => {
                tracing::debug!(
                    book_id = book.id,
                    version = book.version,
                    "update matched no row at this version"
                );
                Err(AppError::EditConflict)
            }
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        if id < 1 {
            return Err(not_found(id));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    async fn get_all(
        &self,
        title: &str,
        author: &str,
        filter: &ValidFilter,
    ) -> AppResult<(Vec<Book>, i64)> {
        let query = list_query(filter);

        let rows = sqlx::query(&query)
            .bind(title)
            .bind(author)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut total = 0;
        let mut books = Vec::with_capacity(rows.len());
        for row in &rows {
            total = row.try_get("total")?;
            books.push(Book::from_row(row)?);
        }

        // past the last page the window count has no row to ride on
        if books.is_empty() && filter.offset() > 0 {
            total = sqlx::query_scalar::<_, i64>(&count_query())
                .bind(title)
                .bind(author)
                .fetch_one(&self.pool)
                .await?;
        }

        Ok((books, total))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
