//! # homelab-store
//!
//! Durable storage for the blog and portfolio sites, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for comments, comment
//! likes and the post registry. Like counts are aggregated inside the same
//! query that reads a post's comments.

pub mod comments;
pub mod database;
pub mod likes;
pub mod migrations;
pub mod models;
pub mod posts;

mod error;
mod timestamp;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
