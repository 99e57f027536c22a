//! # API Types
//!
//! Types for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::optimistic::ToggleReceipt;

/// Response after toggling a like.
///
/// The backend always reports the resulting flag; the counter is only
/// echoed by newer node versions, so it is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    /// Whether the post is now liked by the current user.
    pub liked: bool,
    /// The post's like count after the toggle, when echoed.
    #[serde(default)]
    pub likes: Option<u64>,
}

impl From<LikeResponse> for ToggleReceipt {
    fn from(res: LikeResponse) -> Self {
        Self {
            active: res.liked,
            count: res.likes,
        }
    }
}

/// Response after toggling a bookmark.
///
/// Bookmarks are private, so no public counter is echoed.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkResponse {
    /// Whether the post is now bookmarked by the current user.
    pub bookmarked: bool,
}

impl From<BookmarkResponse> for ToggleReceipt {
    fn from(res: BookmarkResponse) -> Self {
        Self {
            active: res.bookmarked,
            count: None,
        }
    }
}

/// Response after toggling a repost.
#[derive(Debug, Clone, Deserialize)]
pub struct RepostResponse {
    /// Whether the post is now reposted by the current user.
    pub reposted: bool,
    /// The post's repost count after the toggle, when echoed.
    #[serde(default)]
    pub reposts: Option<u64>,
}

impl From<RepostResponse> for ToggleReceipt {
    fn from(res: RepostResponse) -> Self {
        Self {
            active: res.reposted,
            count: res.reposts,
        }
    }
}

/// Request to cast a poll vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteRequest {
    /// Zero-based index of the chosen option.
    pub option: usize,
}

/// Response after casting a poll vote.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteResponse {
    /// Whether the vote was recorded.
    pub voted: bool,
    /// Per-option vote totals after the cast, when echoed.
    #[serde(default)]
    pub totals: Option<Vec<u64>>,
}

/// Status probe response for a like.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeStatusResponse {
    /// Whether the current user has liked the post.
    pub liked: bool,
}

/// Status probe response for a bookmark.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkStatusResponse {
    /// Whether the current user has bookmarked the post.
    pub bookmarked: bool,
}
