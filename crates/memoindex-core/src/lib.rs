//! # memoindex core
//!
//! Core data models, error types, and configuration for the note indexing subsystem.
//! This crate defines the canonical types that the parser, filter and batch crates share.
//!
//! ## Core Modules
//!
//! - [`models`] - Content payload, property flags, note records
//! - [`error`] - Error type and Result alias
//! - [`config`] - Parser and rebuild configuration
//!
//! ## Usage Examples
//!
//! ```
//! use memoindex_core::prelude::*;
//!
//! let mut property = MemoProperty::default();
//! property.mark_task(false);
//!
//! let payload = ContentPayload::new(["work", "work", "home"], property);
//! assert_eq!(payload.tags(), ["work", "home"]);
//! assert!(payload.property().has_task_list());
//! ```
//!
//! ### Error Handling
//!
//! ```
//! use memoindex_core::prelude::*;
//!
//! fn check(kind: &str) -> Result<()> {
//!     Err(Error::invalid_match_kind(kind))
//! }
//! assert!(check("regex").is_err());
//! ```

pub mod config;
pub mod error;
pub mod models;

pub use config::{DEFAULT_MAX_TAG_LENGTH, IndexConfig, IndexConfigBuilder, ParserConfig, RebuildConfig};
pub use error::{Error, Result};
pub use models::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{IndexConfig, ParserConfig, RebuildConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        ContentPayload, MemoProperty, NoteRecord, RowStatus, Visibility, tag_ancestors,
    };
}
