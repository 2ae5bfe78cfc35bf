//! Crawl orchestration.
//!
//! Walks the storage tree, classifies each file, routes archives to the
//! unpacker and leaf documents to the extractor, and assembles the run's
//! ordered record sequence. Nothing below this layer aborts the run; the
//! only fatal condition is a missing storage root, and even that yields
//! an empty record set rather than an error.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::warn;
use std::path::Path;
use walkdir::WalkDir;

use crate::archive::ReaderRegistry;
use crate::config::Config;
use crate::extract::extract_content;
use crate::identity;
use crate::models::{classify, DocFormat, DocumentRecord, FileClass};
use crate::progress::{CrawlProgressEvent, CrawlProgressReporter};
use crate::session::CrawlSession;
use crate::unpack::unpack_archive;

/// Everything a finished walk hands back to the caller. Scratch space is
/// already released by the time this exists.
pub struct CrawlOutcome {
    pub records: Vec<DocumentRecord>,
    /// Regular files seen during the walk, whether or not they produced
    /// a record.
    pub files_seen: u64,
    /// Top-level archives routed to the unpacker.
    pub archives_seen: u64,
    /// Scratch directories allocated (and released) during the run.
    pub scratch_released: usize,
}

pub fn run_crawl(config: &Config, progress: &dyn CrawlProgressReporter) -> Result<CrawlOutcome> {
    let root = &config.storage.root;
    if !root.exists() {
        warn!(
            "Storage root {} does not exist; nothing to crawl",
            root.display()
        );
        return Ok(CrawlOutcome {
            records: Vec::new(),
            files_seen: 0,
            archives_seen: 0,
            scratch_released: 0,
        });
    }

    let registry = ReaderRegistry::detect();
    let exclude = build_globset(&config.crawl.exclude_globs)?;

    let mut session = CrawlSession::open();
    let mut files_seen = 0u64;
    let mut archives_seen = 0u64;

    let walker = WalkDir::new(root)
        .follow_links(config.crawl.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Walk error under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_match(relative) {
            continue;
        }
        files_seen += 1;
        progress.report(CrawlProgressEvent::Found {
            name: entry.file_name().to_string_lossy().into_owned(),
        });

        match classify(path) {
            FileClass::Archive(_) => {
                archives_seen += 1;
                unpack_archive(&mut session, &registry, path, progress);
            }
            FileClass::Document(format) => {
                process_file(&mut session, path, "", format, progress);
            }
            FileClass::Unsupported => {}
        }
    }

    let scratch_released = session.scratch_mut().len();
    let records = session.into_records();
    Ok(CrawlOutcome {
        records,
        files_seen,
        archives_seen,
        scratch_released,
    })
}

/// Assemble one record for a leaf file. Identity (size, hash, timestamp)
/// is collected before and independently of extraction; a parse failure
/// still produces a record, only a vanished file does not.
pub(crate) fn process_file(
    session: &mut CrawlSession,
    path: &Path,
    archive_chain: &str,
    format: DocFormat,
    progress: &dyn CrawlProgressReporter,
) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    progress.report(CrawlProgressEvent::Processing {
        name: file_name.clone(),
    });

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            warn!("Skipping {}: cannot read metadata: {}", path.display(), e);
            return;
        }
    };
    let content_hash = match identity::file_hash(path) {
        Ok(h) => h,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return;
        }
    };

    let content = extract_content(path, format);

    let record = DocumentRecord {
        id: session.next_id(),
        file_path: path.to_string_lossy().into_owned(),
        file_name,
        file_type: format.file_type(),
        file_size: metadata.len(),
        content,
        archive_path: archive_chain.to_string(),
        created_date: identity::created_date(&metadata),
        content_hash,
    };
    session.push(record);
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
