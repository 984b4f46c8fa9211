//! Payload rebuild driver.
//!
//! Re-extracts every stored note and writes back the new payload. Extraction is
//! CPU-bound and runs on the blocking pool, several notes at a time; writes go
//! through the store one at a time, in note order.
//!
//! A write only lands while the note still holds the content it was extracted
//! from. Notes edited mid-run are reported as stale and left to the next run.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use memoindex_core::{ContentPayload, Error, NoteRecord, RebuildConfig, Result};
use memoindex_parser::Extractor;

use crate::store::NoteStore;

/// What happened to one note during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebuildStatus {
    /// Payload changed and was written
    Updated,
    /// Payload already matched the content; nothing written
    Unchanged,
    /// Content changed after listing; the write was skipped
    Stale,
    /// Extraction or the write failed; the stored payload was left as-is
    Failed,
}

/// Per-note record of a rebuild run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildRecord {
    pub note_id: i32,
    pub status: RebuildStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a rebuild run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildReport {
    /// Unique id for log correlation
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    /// Notes listed by the store
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub stale: usize,
    pub failed: usize,
    /// True when `stop_on_error` cut the run short
    pub stopped_early: bool,
    /// One record per processed note, in note order
    pub records: Vec<RebuildRecord>,
    pub duration_ms: u64,
}

impl RebuildReport {
    /// Every listed note was processed without failure
    pub fn success(&self) -> bool {
        self.failed == 0 && !self.stopped_early
    }

    /// Ids of notes whose rebuild failed
    pub fn failed_ids(&self) -> Vec<i32> {
        self.records
            .iter()
            .filter(|record| record.status == RebuildStatus::Failed)
            .map(|record| record.note_id)
            .collect()
    }
}

/// One note after the blocking extraction step.
struct Extraction {
    note_id: i32,
    /// Content the payload was extracted from
    content: String,
    previous: ContentPayload,
    extracted: Result<ContentPayload>,
}

/// Runs payload rebuilds against a [`NoteStore`].
#[derive(Debug, Clone)]
pub struct RebuildExecutor {
    extractor: Arc<Extractor>,
    config: RebuildConfig,
}

impl RebuildExecutor {
    pub fn new(extractor: Arc<Extractor>, config: RebuildConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &RebuildConfig {
        &self.config
    }

    /// Rebuild every note in `store`.
    ///
    /// Only a failure to list notes fails the run as a whole. Per-note failures
    /// are recorded in the report.
    pub async fn run<S>(&self, store: &S) -> Result<RebuildReport>
    where
        S: NoteStore + ?Sized,
    {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let clock = Instant::now();

        let notes = store.list_notes().await?;
        let total = notes.len();
        log::info!(
            "Rebuild {} started: {} notes, concurrency {}",
            run_id,
            total,
            self.config.concurrency
        );

        let mut report = RebuildReport {
            run_id,
            started_at,
            total,
            updated: 0,
            unchanged: 0,
            stale: 0,
            failed: 0,
            stopped_early: false,
            records: Vec::with_capacity(total),
            duration_ms: 0,
        };

        let mut extractions = stream::iter(notes.into_iter().map(|note| self.extract(note)))
            .buffered(self.config.concurrency.max(1));

        while let Some(extraction) = extractions.next().await {
            let Extraction {
                note_id,
                content,
                previous,
                extracted,
            } = extraction;

            let outcome = match extracted {
                Ok(payload) if payload == previous => Ok(RebuildStatus::Unchanged),
                Ok(payload) => store
                    .update_payload(note_id, &content, payload)
                    .await
                    .map(|written| {
                        if written {
                            RebuildStatus::Updated
                        } else {
                            RebuildStatus::Stale
                        }
                    }),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(status) => {
                    match status {
                        RebuildStatus::Updated => report.updated += 1,
                        RebuildStatus::Stale => {
                            log::debug!("Note {} changed during rebuild; skipped", note_id);
                            report.stale += 1;
                        }
                        _ => report.unchanged += 1,
                    }
                    report.records.push(RebuildRecord {
                        note_id,
                        status,
                        error: None,
                    });
                }
                Err(e) => {
                    log::warn!("Rebuild of note {} failed: {}", note_id, e);
                    report.failed += 1;
                    report.records.push(RebuildRecord {
                        note_id,
                        status: RebuildStatus::Failed,
                        error: Some(e.to_string()),
                    });
                    if self.config.stop_on_error {
                        report.stopped_early = report.records.len() < total;
                        break;
                    }
                }
            }
        }

        report.duration_ms = clock.elapsed().as_millis() as u64;
        log::info!(
            "Rebuild {} finished in {}ms: {} updated, {} unchanged, {} stale, {} failed",
            report.run_id,
            report.duration_ms,
            report.updated,
            report.unchanged,
            report.stale,
            report.failed
        );
        Ok(report)
    }

    async fn extract(&self, note: NoteRecord) -> Extraction {
        let NoteRecord {
            id,
            content,
            payload: previous,
            ..
        } = note;
        let extractor = Arc::clone(&self.extractor);
        let source = content.clone();

        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&source))
            .await
            .unwrap_or_else(|e| Err(Error::other(format!("extraction task failed: {}", e))));

        Extraction {
            note_id: id,
            content,
            previous,
            extracted,
        }
    }
}

/// Rebuild every note in `store` with the given extractor and settings.
pub async fn rebuild_payloads<S>(
    store: &S,
    extractor: Arc<Extractor>,
    config: &RebuildConfig,
) -> Result<RebuildReport>
where
    S: NoteStore + ?Sized,
{
    RebuildExecutor::new(extractor, config.clone()).run(store).await
}
