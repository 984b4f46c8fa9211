//! # memoindex batch
//!
//! Bulk maintenance of stored payloads.
//!
//! - [`NoteStore`] is the storage seam the driver talks to
//! - [`RebuildExecutor`] re-extracts every note and writes back changed payloads
//! - [`MemoryNoteStore`] is an in-memory store with a normalized tag dictionary
//!
//! ```
//! use std::sync::Arc;
//! use memoindex_batch::{MemoryNoteStore, RebuildExecutor};
//! use memoindex_core::{NoteRecord, RebuildConfig};
//! use memoindex_parser::Extractor;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! runtime.block_on(async {
//!     let store = MemoryNoteStore::new();
//!     store.insert(NoteRecord::new(1, 1, "hello #world")).await;
//!
//!     let executor = RebuildExecutor::new(Arc::new(Extractor::default()), RebuildConfig::default());
//!     let report = executor.run(&store).await.unwrap();
//!
//!     assert_eq!(report.updated, 1);
//!     assert_eq!(store.tags_for_creator(1).await, vec!["world"]);
//! });
//! ```

pub mod rebuild;
pub mod store;

pub use rebuild::{RebuildExecutor, RebuildRecord, RebuildReport, RebuildStatus, rebuild_payloads};
pub use store::{MemoryNoteStore, NoteStore};
