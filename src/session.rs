//! Run-scoped crawl session.
//!
//! A [`CrawlSession`] owns the two pieces of mutable state a run
//! accumulates: the ordered record sequence and the registry of scratch
//! directories allocated for archive extraction. The session is opened at
//! walk start and consumed when the records are drained for export;
//! dropping it — on any exit path, normal or error — removes every
//! scratch directory via the [`tempfile::TempDir`] guards it holds.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::models::DocumentRecord;

pub struct CrawlSession {
    records: Vec<DocumentRecord>,
    scratch: ScratchSpace,
}

impl CrawlSession {
    pub fn open() -> Self {
        Self {
            records: Vec::new(),
            scratch: ScratchSpace::default(),
        }
    }

    /// Id for the next record: the count produced so far, plus one.
    pub fn next_id(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    /// Append a record. Records are never mutated or reordered afterwards.
    pub fn push(&mut self, record: DocumentRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn scratch_mut(&mut self) -> &mut ScratchSpace {
        &mut self.scratch
    }

    /// Drain the session: the record sequence moves out and every scratch
    /// directory allocated during the run is released.
    pub fn into_records(self) -> Vec<DocumentRecord> {
        self.records
    }
}

/// Registry of temporary extraction directories, one per archive
/// invocation. Directories must outlive the whole walk: the unpacker's
/// worklist can hand a member found in an early scratch directory to a
/// much later iteration.
#[derive(Default)]
pub struct ScratchSpace {
    dirs: Vec<TempDir>,
}

impl ScratchSpace {
    /// Allocate one fresh scratch directory and register it for
    /// end-of-session release.
    pub fn allocate(&mut self) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix("crawler_")
            .tempdir()
            .context("Failed to allocate scratch directory")?;
        let path = dir.path().to_path_buf();
        self.dirs.push(dir);
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }
}
