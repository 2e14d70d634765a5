//! # tap-tiktok core
//!
//! Extraction core for the TikTok Business API tap.
//!
//! ## Overview
//!
//! - **Configuration** loaded from a Singer-style JSON file
//! - **Advertiser resolution** from `advertiser_ids` / `advertiser_id`
//! - **Paginated streams** that walk every page for every advertiser
//! - **Strategies** for pagination and record extraction, composed per stream
//! - **Record messages** written as newline-delimited JSON
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Tap configuration |
//! | [`error`] | Core error type |
//! | [`extract`] | Record extraction strategies |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`jsonpath`] | Fixed JSON path selectors |
//! | [`message`] | Singer record messages |
//! | [`pagination`] | Page-token strategies |
//! | [`retry`] | Retry policy |
//! | [`stream`] | Paginated per-advertiser stream |
//! | [`streams`] | Stream catalogue |
//! | [`tenant`] | Advertiser resolution and request context |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI            │
//! └────────┬────────┘
//!          │ StreamDefinition (catalogue)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PagedTenant     │────▶│ HTTP Client      │
//! │ Stream          │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │ per page
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Record          │     │ Pagination       │
//! │ Extractor       │     │ Strategy         │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tap_tiktok_core::{streams, PagedTenantStream, ReqwestHttpClient, TapConfig};
//!
//! let config = Arc::new(TapConfig::from_path("config.json")?);
//! let client = Arc::new(ReqwestHttpClient::new());
//! for definition in streams::all_definitions(&config) {
//!     let stream = PagedTenantStream::new(definition, config.clone(), client.clone());
//!     let mut cursor = stream.records(None);
//!     while let Some(record) = cursor.next_record().await {
//!         let record = record?;
//!         // ...
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod jsonpath;
pub mod message;
pub mod pagination;
pub mod retry;
pub mod stream;
pub mod streams;
pub mod tenant;

pub use config::TapConfig;
pub use error::TapError;
pub use extract::{FlattenReportExtractor, ListExtractor, Record, RecordExtractor};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use message::{MessageWriter, RecordMessage};
pub use pagination::{DefaultingPagination, PageInfo, PaginationStrategy, StrictPagination};
pub use retry::{Backoff, RetryConfig};
pub use stream::{Page, PagedTenantStream, RecordCursor, StreamDefinition, PAGE_SIZE};
pub use tenant::{resolve_advertiser_ids, RequestContext};
