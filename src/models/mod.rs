//! Data models for Bookwise

pub mod book;
pub mod filter;

// Re-export commonly used types
pub use book::{Book, BookInput, BookQuery};
pub use filter::{Filter, Metadata, ValidFilter};
