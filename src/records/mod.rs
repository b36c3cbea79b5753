//! Records produced by a harvest run
//!
//! # Components
//!
//! - `Post`: one wall item authored by the group itself
//! - `Comment`: one comment under a post, joined with its author's profile
//! - `Sex`: tri-state author sex as reported by the profile

mod comment;
mod post;

pub use comment::{Comment, Sex};
pub use post::Post;
