//! Engagement kinds and per-post status snapshots.

use crate::post::PostId;
use serde::{Deserialize, Serialize};

/// A toggle-style engagement a user can have with a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    /// The post is liked by the current user.
    Like,
    /// The post is bookmarked by the current user.
    Bookmark,
    /// The post is reposted by the current user.
    Repost,
}

impl EngagementKind {
    /// Returns the kind as a lowercase string slug.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementKind::Like => "like",
            EngagementKind::Bookmark => "bookmark",
            EngagementKind::Repost => "repost",
        }
    }

    /// Builds the cache key for a status probe of this kind.
    ///
    /// Keys follow the `<kind>-status-<post id>` convention, e.g.
    /// `like-status-42`, so that repeated probes for the same post
    /// collapse onto the same cache entry.
    #[must_use]
    pub fn status_key(&self, post: PostId) -> String {
        format!("{}-status-{}", self.as_str(), post)
    }
}

/// Snapshot of the current user's engagement with a single post.
///
/// This is what feed views render next to each post. The default
/// (everything `false`) is the state shown before any probe completes,
/// and the state a post falls back to when its probe fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementStatus {
    /// Whether the current user has liked the post.
    #[serde(default)]
    pub liked: bool,
    /// Whether the current user has bookmarked the post.
    #[serde(default)]
    pub bookmarked: bool,
    /// Whether the current user has reposted the post.
    #[serde(default)]
    pub reposted: bool,
}
