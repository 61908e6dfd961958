//! randwiki Core Library
//!
//! This crate provides the core functionality for randwiki, a tool that
//! surfaces a random Wikipedia article from the "Vital articles" and
//! "Good articles" lists and keeps a personal reading log, saved links,
//! link lists, presets and a currently-reading queue.
//!
//! # Architecture
//!
//! - **Local-first**: every collection lives in device-local storage while
//!   the user is anonymous.
//! - **Remote-backed**: once authenticated, collections are served from an
//!   in-memory cache and written behind to the account backend.
//!
//! The [`Session`] decides which of the two applies, based on one auth flag.
//!
//! # Quick Start
//!
//! ```text
//! let mut session = Session::open(&config);
//! session.probe().await;
//!
//! session.add_user_links("example.org/a", &[]);
//! let links = session.user_links();
//!
//! session.flush().await;
//! ```
//!
//! # Modules
//!
//! - `session`: auth state, caches, login/logout and first-time migration
//! - `store`: per-collection operations (main entry point for edits)
//! - `moves`: cross-collection move operations
//! - `wiki`: MediaWiki article-list client with per-category cache
//! - `selector`: random selection over categories and personal links
//! - `storage`: device-local storage
//! - `remote`: account backend client
//! - `config`: application configuration

pub mod categories;
pub mod collections;
pub mod config;
pub mod keyed;
pub mod models;
pub mod moves;
pub mod remote;
pub mod selector;
pub mod session;
pub mod storage;
pub mod store;
pub mod urls;
pub mod wiki;

pub use config::Config;
pub use models::{ArticleReference, LinkList, LogEntry, Preset, ReadingEntry, UserLink};
pub use remote::{ApiClient, AuthError, AuthService, RemoteSync, SyncError};
pub use selector::{Pick, SelectError, Selection, Source};
pub use session::{AuthState, RegisterOutcome, Session};
pub use storage::{LocalStorage, StorageError};
pub use store::InputError;
pub use wiki::ArticleSource;
