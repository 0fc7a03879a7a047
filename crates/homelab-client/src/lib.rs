//! Client side of the comment section: the reqwest API client and the pure
//! tree patches that keep a rendered tree current without refetching it.

pub mod api;
pub mod error;
pub mod events;
pub mod patch;
pub mod state;

pub use api::{CommentsApi, Viewer};
pub use error::ClientError;
pub use events::CommentEvent;
pub use state::CommentSection;
