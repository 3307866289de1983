//! # Shaderhub
//!
//! A shader-sharing server, usable both as a standalone binary and as a library.
//!
//! The heart of the crate is [`store::MemoryStore`]: an in-memory record store
//! for users, shaders and tags with owner/tag/username indexes, multi-filter
//! search and a snapshot file rewritten atomically after every mutation.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Duration;
//! use shaderhub::auth::SessionStore;
//! use shaderhub::server::{AppState, create_router};
//! use shaderhub::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::open("./data/shaderhub.json").unwrap());
//! let state = Arc::new(AppState::new(store, SessionStore::new(Duration::hours(24))));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `shaderhub` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
