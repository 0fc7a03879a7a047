//! Types, validation and tree assembly shared by the store, server and client.

pub mod comment;
pub mod constants;
pub mod error;
pub mod tree;
pub mod types;
pub mod wire;

pub use comment::{Comment, CommentNode, CommentRecord, Forest};
pub use error::ValidationError;
pub use types::{CommentId, PostSlug, ViewerId};
