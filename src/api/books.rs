//! Book endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::LOCATION, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookQuery},
        filter::Metadata,
    },
    AppState,
};

/// Optional header carrying the version the client last saw
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// One page of books
#[derive(Serialize, ToSchema)]
pub struct BookList {
    pub books: Vec<Book>,
    pub metadata: Metadata,
}

/// Unparsable ids can never match a row.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("Book {} not found", raw)))
}

fn expected_version(headers: &HeaderMap) -> AppResult<Option<i32>> {
    let Some(value) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("{} must be an integer", EXPECTED_VERSION_HEADER)))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{} must be an integer", EXPECTED_VERSION_HEADER)))
}

/// List books with search, sorting and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books", body = BookList),
        (status = 422, description = "Invalid page, page_size or sort", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<BookList>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (books, metadata) = state.services.books.list_books(&query).await?;
    Ok(Json(BookList { books, metadata }))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let id = parse_id(&id)?;

    let book = state.services.books.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Malformed body", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<(StatusCode, [(axum::http::HeaderName, String); 1], Json<Book>)> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let created = state.services.books.create_book(input).await?;
    let location = format!("/api/v1/books/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

/// Replace a book's fields.
///
/// The write is conditioned on the version read at the start of the request;
/// a concurrent update in between yields 409. Sending `X-Expected-Version`
/// additionally pins the version the client last saw.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("X-Expected-Version" = Option<i32>, Header, description = "Reject unless the stored version equals this")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Edit conflict", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let id = parse_id(&id)?;
    let expected = expected_version(&headers)?;
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let updated = state.services.books.update_book(id, expected, input).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;

    state.services.books.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
