//! # leaply-admin
//!
//! Client library for the Leaply study-abroad admin panel.
//!
//! ## Overview
//!
//! - [`ApiClient`] talks to the Leaply REST API with the session's bearer
//!   token and normalizes failures into [`AdminError`].
//! - [`Session`] holds the auth token and persists it through a [`TokenStore`].
//! - [`EntityCache`] keeps fetched lists keyed by [`QueryKey`], shares
//!   concurrent fetches and invalidates by entity kind after mutations.
//! - [`forms`] validates entered text into payloads and submits them.
//! - [`views`] lists, filters and deletes rows; [`shell`] is navigation.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leaply_admin::{AdminContext, ApiClient, ClientConfig, EntityCache, Session};
//! use leaply_admin::session::FileTokenStore;
//! use leaply_admin::views::ListView;
//! use leaply_admin::model::University;
//!
//! let session = Session::restore(Arc::new(FileTokenStore::for_profile("default")?))?;
//! let client = ApiClient::new(ClientConfig::new("https://api.leaply.dev/api")?, session)?;
//! let ctx = AdminContext::new(client, EntityCache::default());
//!
//! let mut view = ListView::<University>::new(ctx);
//! view.set_search("tokyo");
//! let rows = view.rows().await?;
//! ```

pub mod cache;
pub mod client;
mod context;
mod error;
pub mod forms;
pub mod model;
pub mod session;
pub mod shell;
pub mod views;

pub use cache::{CacheConfig, CacheEvent, EntityCache, QueryKey};
pub use client::{ApiClient, ClientConfig};
pub use context::{AdminContext, UNIVERSITY_FILTER_PARAM};
pub use error::{AdminError, ErrorCategory, Result};
pub use model::{Entity, EntityKind};
pub use session::{Session, TokenStore};
pub use shell::Route;
