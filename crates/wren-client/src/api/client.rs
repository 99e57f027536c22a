//! # API Client
//!
//! HTTP client for communicating with a `wren-node`.

use reqwest::{Client, RequestBuilder};
use wren_types::{PollId, PostId};

use super::types::{
    BookmarkResponse, BookmarkStatusResponse, LikeResponse, LikeStatusResponse, RepostResponse,
    VoteRequest, VoteResponse,
};
use crate::error::{ClientError, ClientResult};

/// HTTP client for the Wren node API.
///
/// Provides the engagement endpoints the orchestration layer fronts:
/// like/bookmark/repost toggles, poll votes and per-post status probes.
/// The client is cheaply cloneable and can be shared across components.
///
/// # Examples
///
/// ```rust,ignore
/// use wren_client::api::WrenClient;
/// use wren_types::PostId;
///
/// let client = WrenClient::new("http://127.0.0.1:8080");
/// let liked = client.like_status(PostId::new(42)).await?;
/// ```
#[derive(Clone)]
pub struct WrenClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl WrenClient {
    /// Creates a new client connected to the specified node URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to create HTTP client"),
        }
    }

    /// Creates a client that authenticates with a bearer token.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.into());
        client
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Checks if the node is reachable and healthy.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the request fails.
    pub async fn health(&self) -> ClientResult<bool> {
        let res = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(res.status().is_success())
    }

    // ==================== Engagement Mutations ====================

    /// Toggles the current user's like on a post.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Node rejected the toggle (401, 404, 429, ...)
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn like(&self, post: PostId) -> ClientResult<LikeResponse> {
        let res = self
            .authorized(
                self.http
                    .post(format!("{}/api/posts/{}/like", self.base_url, post)),
            )
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        res.json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Toggles the current user's bookmark on a post.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Node rejected the toggle
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn bookmark(&self, post: PostId) -> ClientResult<BookmarkResponse> {
        let res = self
            .authorized(
                self.http
                    .post(format!("{}/api/posts/{}/bookmark", self.base_url, post)),
            )
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        res.json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Toggles the current user's repost of a post.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Node rejected the toggle
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn repost(&self, post: PostId) -> ClientResult<RepostResponse> {
        let res = self
            .authorized(
                self.http
                    .post(format!("{}/api/posts/{}/repost", self.base_url, post)),
            )
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        res.json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Casts a vote for an option of a poll.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Poll closed (409) or option out of range (422)
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn vote(&self, poll: PollId, option: usize) -> ClientResult<VoteResponse> {
        let req = VoteRequest { option };

        let res = self
            .authorized(
                self.http
                    .post(format!("{}/api/polls/{}/vote", self.base_url, poll)),
            )
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        res.json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ==================== Status Probes ====================

    /// Probes whether the current user has liked a post.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Probe rejected (a 429 here is the signal
    ///   the orchestration layer exists to avoid; callers keep last-known
    ///   state instead of failing)
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn like_status(&self, post: PostId) -> ClientResult<bool> {
        let res = self
            .authorized(
                self.http
                    .get(format!("{}/api/posts/{}/like", self.base_url, post)),
            )
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        let body: LikeStatusResponse = res
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.liked)
    }

    /// Probes whether the current user has bookmarked a post.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Network`] - Network request failed
    /// * [`ClientError::Api`] - Probe rejected
    /// * [`ClientError::InvalidResponse`] - Response could not be parsed
    pub async fn bookmark_status(&self, post: PostId) -> ClientResult<bool> {
        let res = self
            .authorized(
                self.http
                    .get(format!("{}/api/posts/{}/bookmark", self.base_url, post)),
            )
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::Api {
                status: res.status().as_u16(),
                message: res.text().await.unwrap_or_default(),
            });
        }

        let body: BookmarkStatusResponse = res
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.bookmarked)
    }
}
