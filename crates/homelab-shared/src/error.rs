use thiserror::Error;

/// Rejections for user-supplied values before they reach storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Comment body is empty")]
    EmptyBody,

    #[error("Comment body too long: {len} characters (max {max})")]
    BodyTooLong { len: usize, max: usize },

    #[error("Invalid post slug: {0}")]
    InvalidSlug(String),

    #[error("Viewer identity is empty")]
    EmptyViewer,
}
