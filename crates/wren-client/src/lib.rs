//! # Wren Client
//!
//! Request orchestration and API client for the Wren social platform.
//!
//! The interesting part of a feed client is not any single request, it is
//! keeping hundreds of small requests (per-post like/bookmark probes,
//! toggle mutations) from hammering the backend while the UI stays
//! instant. This crate provides that layer:
//!
//! - **Request scheduling**: [`RequestScheduler`] serializes outbound
//!   requests with a minimum gap between dispatch starts.
//! - **Response caching**: [`ResponseCache`] collapses repeated probes
//!   within a freshness window, single-flighting concurrent misses.
//! - **Batching**: [`BatchCoordinator`] fans per-post lookups out in
//!   fixed-size chunks with idle time in between.
//! - **Optimistic mutations**: [`OptimisticToggle`] flips like/bookmark/
//!   repost controls instantly and reconciles with (or rolls back to)
//!   server truth when the call settles.
//! - **API client**: [`api::WrenClient`] is the concrete HTTP transport
//!   the layers above wrap; [`StatusService`] is the composition of all
//!   of them for feed-wide status sweeps.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wren_client::{api::WrenClient, Config, StatusService};
//! use wren_types::PostId;
//!
//! let config = Config::default();
//! let service = StatusService::new(WrenClient::new("http://127.0.0.1:8080"), &config);
//!
//! // Cached, throttled and chunked in one call.
//! let statuses = service
//!     .engagement_for(&[PostId::new(1), PostId::new(2)])
//!     .await?;
//! ```

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod optimistic;
pub mod scheduler;
pub mod status;

pub use batch::BatchCoordinator;
pub use cache::ResponseCache;
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use optimistic::{MutationOutcome, Optimistic, OptimisticToggle, ToggleReceipt, ToggleState};
pub use scheduler::RequestScheduler;
pub use status::StatusService;
