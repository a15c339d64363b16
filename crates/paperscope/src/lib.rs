//! Paperscope
//!
//! A research-paper discovery core over the OpenAlex academic graph.
//! Translates user intent (query text + filter selections) into upstream
//! query parameters, reshapes works into a local paper model, and owns a
//! persisted pinned-paper collection with named groups and drag-reorder.
//!
//! # Features
//!
//! - **Query composition**: keyword search with journal/author/topic/
//!   institution filters, plus citing, referenced-by, and set-intersection
//!   citation modes
//! - **Pin store**: write-through persisted collection with groups and
//!   ordering, refreshed against the graph without losing local structure
//! - **Async-first**: built on Tokio; intersection legs run concurrently
//! - **Cached**: 5-minute TTL response cache keeps the polite pool happy
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use paperscope::{client::OpenAlexClient, config::Config, query::QueryComposer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let client = Arc::new(OpenAlexClient::new(&config)?);
//!     let composer = QueryComposer::new(client);
//!
//!     let refs = composer.referenced_by("W2741809807", 1).await;
//!     println!("{} references", refs.total);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod query;
pub mod server;
pub mod store;

pub use client::OpenAlexClient;
pub use config::Config;
pub use error::{CapacityError, ClientError};
pub use query::QueryComposer;
pub use store::PinStore;
