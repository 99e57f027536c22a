//! Common types used throughout `wren`.
//!
//! This crate provides the core entity and engagement types shared by the
//! Wren client crates: post/poll identifiers, engagement kinds (like,
//! bookmark, repost) and the per-post engagement status snapshot consumed
//! by feed views.

mod engagement;
mod post;

pub use engagement::{EngagementKind, EngagementStatus};
pub use post::{PollId, PostId};
