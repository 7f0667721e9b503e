mod comments;
mod error;
mod role;
mod store;

pub use comments::{CommentLimits, CommentService};
pub use error::{Error, Result};
pub use role::Viewer;
pub use store::CommentStore;
