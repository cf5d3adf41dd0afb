//! roster-core library.
//!
//! The filtering-and-derived-state engine behind the `roster` directory
//! viewer: a [`store::DirectoryStore`] fed once from a
//! [`source::DataSource`], debounced name/city criteria, and the
//! oldest-per-city highlight derivation.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod model;
pub mod oldest;
pub mod source;
pub mod store;

// Conventions
//
// - Errors: `thiserror` enums for library failures, `anyhow::Result` for config loading.
// - Logging: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub use crate::error::{DataAccessError, ErrorCode, StoreError};
pub use crate::model::person::PersonRecord;
pub use crate::oldest::{HighlightMap, compute_oldest_by_city};
pub use crate::source::DataSource;
pub use crate::store::{DirectoryStore, DirectoryView, LoadState};
