//! Recursive archive unpacking.
//!
//! An explicit worklist replaces call-stack recursion: pending entries
//! carry the provenance chain of their container, archives push their
//! members back onto the stack, and leaves go straight to the content
//! extractor. Pushing members in reverse listing order makes the LIFO
//! stack visit them depth-first, preorder — an inner archive's subtree is
//! fully cataloged before its later siblings.
//!
//! No depth or extracted-volume bound is enforced; a deeply nested or
//! inflating archive can exhaust time or disk. Hardening would be a local
//! change here: cap stack depth or cumulative member bytes.

use log::warn;
use std::path::{Path, PathBuf};

use crate::archive::ReaderRegistry;
use crate::crawl::process_file;
use crate::models::{classify, FileClass};
use crate::progress::{CrawlProgressEvent, CrawlProgressReporter};
use crate::session::CrawlSession;

struct PendingEntry {
    path: PathBuf,
    /// Provenance chain of this entry's container: empty for a top-level
    /// archive, otherwise outer-to-inner archive names joined with "/".
    chain: String,
}

/// Catalog everything transitively contained in `archive`, appending one
/// record per supported leaf to the session in depth-first preorder. A
/// failed or unsupported archive empties its own subtree only.
pub fn unpack_archive(
    session: &mut CrawlSession,
    registry: &ReaderRegistry,
    archive: &Path,
    progress: &dyn CrawlProgressReporter,
) {
    let mut stack = vec![PendingEntry {
        path: archive.to_path_buf(),
        chain: String::new(),
    }];

    while let Some(entry) = stack.pop() {
        match classify(&entry.path) {
            FileClass::Archive(format) => {
                let name = file_name(&entry.path);
                let chain = if entry.chain.is_empty() {
                    name
                } else {
                    format!("{}/{}", entry.chain, name)
                };
                progress.report(CrawlProgressEvent::Extracting {
                    chain: chain.clone(),
                });

                let Some(reader) = registry.reader_for(format) else {
                    warn!(
                        "No {} reader available, skipping {}",
                        format.name(),
                        chain
                    );
                    continue;
                };
                let dest = match session.scratch_mut().allocate() {
                    Ok(dir) => dir,
                    Err(e) => {
                        warn!("Skipping {}: {}", chain, e);
                        continue;
                    }
                };
                match reader.unpack(&entry.path, &dest) {
                    Ok(members) => {
                        for member in members.into_iter().rev() {
                            stack.push(PendingEntry {
                                path: member,
                                chain: chain.clone(),
                            });
                        }
                    }
                    Err(e) => warn!("Error extracting {}: {}", chain, e),
                }
            }
            FileClass::Document(format) => {
                // Found physically inside the container whose chain this
                // entry carries; the chain is not extended further.
                process_file(session, &entry.path, &entry.chain, format, progress);
            }
            FileClass::Unsupported => {}
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
