//! Forum thread filter
//!
//! Classifies the threads of a forum listing page, reorders the list so that
//! favorites and highlighted threads stay on top, moves hidden threads into a
//! separate sublist and offers a debounced quick filter over the titles.
//!
//! # Overview
//!
//! - **Patterns**: comma-separated literal lists or raw regular expressions,
//!   compiled once per page load
//! - **Classification**: first-match hide/favorite rules plus independent
//!   keyword highlighting
//! - **Ordering**: incremental placement into favorite and highlighted
//!   partitions without re-sorting
//! - **State**: favorites, hidden threads and preferences persisted in a
//!   namespaced key-value store
//!
//! # Example Usage
//!
//! ```no_run
//! use forum_thread_filter::{
//!     config::Config, FilterState, JsonFileStore, LogPresenter, PageSnapshot, StateStore,
//!     ThreadFilter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let store = JsonFileStore::load(&config.store.path).await?;
//!     let state = FilterState::load(StateStore::new(store, &config.store.module_id), None);
//!
//!     let mut filter = ThreadFilter::new(state, LogPresenter::new(), &config.quick_filter);
//!     let snapshot: PageSnapshot = serde_json::from_str(r#"{"rows": []}"#)?;
//!     let summary = filter.load(&snapshot);
//!     println!("{} threads", summary.threads);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`pattern`] - Rule text to compiled matcher
//! - [`matcher`] - Match testing and hit markup
//! - [`classifier`] - Per-thread classification
//! - [`ordering`] - Main list and hidden sublist order
//! - [`session`] - Page lifecycle and toggle operations
//! - [`quick_filter`] - Debounced title filter
//! - [`state`] / [`store`] - Persistence
//! - [`preferences`] - User preferences and their defaults
//! - [`presentation`] - Rendering callbacks
//! - [`config`] - Configuration management
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types and result aliases

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod ordering;
pub mod pattern;
pub mod preferences;
pub mod presentation;
pub mod quick_filter;
pub mod session;
pub mod state;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{FilterError, Result};

// Core data models
pub use models::{HideReason, PageKind, PageSnapshot, ScrapedRow, Thread, ThreadId, ThreadStatus};

// Pattern and matching
pub use matcher::{MatchResult, Matcher};
pub use pattern::{compile_pattern, PatternOptions};

// Classification and ordering
pub use classifier::{ClassificationResult, RuleSet, ThreadClassifier};
pub use ordering::{ListOrderer, Partition, Placement};

// Page session
pub use presentation::{LogPresenter, Presenter};
pub use quick_filter::{FilterKey, KeyOutcome, QuickFilter};
pub use session::{LoadSummary, MenuActions, ThreadFilter};

// State management
pub use preferences::{FilterPreferences, StylePreferences};
pub use state::{FilterState, StateStore};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

// Config types
pub use config::{Config, QuickFilterConfig, StoreConfig};
