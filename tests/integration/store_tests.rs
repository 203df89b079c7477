//! Book store tests against PostgreSQL

use std::collections::HashSet;

use bookwise_server::{
    error::AppError,
    models::{
        book::{BookInput, BOOK_SORT_SAFELIST},
        filter::{Filter, ValidFilter},
    },
    repository::{books::BooksRepository, BookStore},
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

async fn repository() -> BooksRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    BooksRepository::new(pool)
}

/// A single search token no other test will use
fn unique_token(prefix: &str) -> String {
    format!(
        "{}{}",
        prefix,
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn input(title: &str) -> BookInput {
    BookInput {
        title: title.to_string(),
        author: "Octavia Butler".to_string(),
        image_url: "https://example.org/kindred.jpg".to_string(),
        description: "Dana is pulled back in time.".to_string(),
    }
}

fn page(page: i64, page_size: i64, sort: &str) -> ValidFilter {
    Filter {
        page,
        page_size,
        sort: sort.to_string(),
        sort_safelist: BOOK_SORT_SAFELIST,
    }
    .validate()
    .expect("filter should be valid")
}

#[tokio::test]
#[ignore]
async fn insert_assigns_version_one_and_fresh_ids() {
    let repo = repository().await;

    let a = repo.insert(&input("Kindred")).await.expect("insert a");
    let b = repo.insert(&input("Kindred")).await.expect("insert b");

    assert_eq!(a.version, 1);
    assert_eq!(b.version, 1);
    assert!(a.id >= 1);
    assert!(b.id > a.id);
}

#[tokio::test]
#[ignore]
async fn concurrent_writers_on_the_same_version() {
    let repo = repository().await;
    let created = repo.insert(&input("X")).await.expect("insert");

    let mut first = repo.get(created.id).await.expect("get");
    let mut second = first.clone();

    first.title = "Y".to_string();
    repo.update(&mut first).await.expect("first writer wins");
    assert_eq!(first.version, 2);

    second.title = "Z".to_string();
    for _ in 0..3 {
        let err = repo.update(&mut second).await.unwrap_err();
        assert!(matches!(err, AppError::EditConflict));
        assert_eq!(second.version, 1);
    }

    let stored = repo.get(created.id).await.expect("get after");
    assert_eq!(stored.title, "Y");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
#[ignore]
async fn versions_increase_by_one_per_update() {
    let repo = repository().await;
    let mut book = repo.insert(&input("Parable of the Sower")).await.expect("insert");

    for expected in 2..=5 {
        book.description = format!("revision {}", expected);
        repo.update(&mut book).await.expect("update");
        assert_eq!(book.version, expected);
    }
    assert_eq!(repo.get(book.id).await.expect("get").version, 5);
}

#[tokio::test]
#[ignore]
async fn update_of_deleted_book_is_a_conflict() {
    let repo = repository().await;
    let mut book = repo.insert(&input("Fledgling")).await.expect("insert");

    repo.delete(book.id).await.expect("delete");
    let err = repo.update(&mut book).await.unwrap_err();
    assert!(matches!(err, AppError::EditConflict));
}

#[tokio::test]
#[ignore]
async fn delete_missing_and_invalid_ids() {
    let repo = repository().await;

    assert!(matches!(repo.delete(999_999_999).await, Err(AppError::NotFound(_))));
    assert!(matches!(repo.delete(-1).await, Err(AppError::NotFound(_))));
    assert!(matches!(repo.get(0).await, Err(AppError::NotFound(_))));

    let book = repo.insert(&input("Wild Seed")).await.expect("insert");
    repo.delete(book.id).await.expect("delete");
    assert!(matches!(repo.delete(book.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(repo.get(book.id).await, Err(AppError::NotFound(_))));

    // ids are never handed out again
    let next = repo.insert(&input("Wild Seed")).await.expect("insert again");
    assert!(next.id > book.id);
}

#[tokio::test]
#[ignore]
async fn search_is_case_and_order_insensitive() {
    let repo = repository().await;
    let token = unique_token("dawn");
    let title = format!("Lilith {} Xenogenesis", token);
    let created = repo.insert(&input(&title)).await.expect("insert");

    let query = format!("XENOGENESIS {}", token.to_uppercase());
    let (books, total) = repo
        .get_all(&query, "butler octavia", &page(1, 20, "id"))
        .await
        .expect("get_all");

    assert_eq!(total, 1);
    assert_eq!(books[0].id, created.id);
}

#[tokio::test]
#[ignore]
async fn no_match_is_an_empty_page() {
    let repo = repository().await;
    let token = unique_token("nothing");

    let (books, total) = repo
        .get_all(&token, "", &page(1, 20, "-created_at"))
        .await
        .expect("get_all");
    assert!(books.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
#[ignore]
async fn pages_cover_every_match_exactly_once() {
    let repo = repository().await;
    let token = unique_token("imago");

    // identical titles and authors force the id tie-break
    let mut inserted = Vec::new();
    for _ in 0..7 {
        let book = repo
            .insert(&input(&format!("Imago {}", token)))
            .await
            .expect("insert");
        inserted.push(book.id);
    }

    let mut seen = Vec::new();
    for n in 1..=4 {
        let (books, total) = repo
            .get_all(&token, "", &page(n, 2, "-title"))
            .await
            .expect("get_all");
        assert_eq!(total, 7);
        seen.extend(books.iter().map(|b| b.id));
    }

    assert_eq!(seen, inserted);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 7);

    let (again, _) = repo
        .get_all(&token, "", &page(2, 2, "-title"))
        .await
        .expect("get_all");
    assert_eq!(again.iter().map(|b| b.id).collect::<Vec<_>>(), seen[2..4].to_vec());
}

#[tokio::test]
#[ignore]
async fn page_past_the_end_still_reports_the_total() {
    let repo = repository().await;
    let token = unique_token("lilith");

    for _ in 0..3 {
        repo.insert(&input(&format!("Dawn {}", token)))
            .await
            .expect("insert");
    }

    let (books, total) = repo
        .get_all(&token, "", &page(5, 2, "id"))
        .await
        .expect("get_all");
    assert!(books.is_empty());
    assert_eq!(total, 3);
}
