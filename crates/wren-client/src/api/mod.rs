//! # API Client
//!
//! HTTP client for communicating with a `wren-node`.
//!
//! This module provides the [`WrenClient`] for the engagement endpoints
//! the orchestration layer fronts. The scheduler, cache and batch layers
//! are transport-agnostic; this is the one concrete transport they wrap
//! in practice.

mod client;
mod types;

pub use client::WrenClient;
pub use types::{
    BookmarkResponse, BookmarkStatusResponse, LikeResponse, LikeStatusResponse, RepostResponse,
    VoteRequest, VoteResponse,
};
