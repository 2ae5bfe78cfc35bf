//! Archive reader strategies.
//!
//! One reader per container format behind a common trait. Zip support is
//! always compiled in; 7z and RAR are optional capabilities resolved once
//! at registry construction — an absent capability is logged there and
//! archives of that format later yield zero records instead of errors.
//!
//! Member paths coming out of an archive are untrusted: every reader
//! sanitizes them to plain relative components before writing into the
//! scratch directory.

use log::warn;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use crate::models::ArchiveFormat;

/// Archive-level failure. One failed archive empties that subtree only;
/// the walk continues.
#[derive(Debug)]
pub enum UnpackError {
    Archive(String),
    Io(std::io::Error),
}

impl std::fmt::Display for UnpackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnpackError::Archive(e) => write!(f, "archive extraction failed: {}", e),
            UnpackError::Io(e) => write!(f, "I/O error during extraction: {}", e),
        }
    }
}

impl std::error::Error for UnpackError {}

/// Strategy interface: populate `dest` with the archive's member files
/// and return their paths in archive-listing order.
pub trait ArchiveReader {
    fn format(&self) -> ArchiveFormat;
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, UnpackError>;
}

/// Keep only `Component::Normal` parts of a member path, dropping parent
/// references, roots, and drive prefixes. `None` if nothing remains.
fn sanitize_path(path: &Path) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

pub struct ZipReader;

impl ArchiveReader for ZipReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, UnpackError> {
        let file = File::open(archive).map_err(UnpackError::Io)?;
        let mut zip = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| UnpackError::Archive(e.to_string()))?;
        let mut members = Vec::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| UnpackError::Archive(e.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let Some(rel) = entry.enclosed_name() else {
                warn!(
                    "Skipping invalid member path in {}: {}",
                    archive.display(),
                    entry.name()
                );
                continue;
            };
            let target = dest.join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(UnpackError::Io)?;
            }
            let mut out = File::create(&target).map_err(UnpackError::Io)?;
            std::io::copy(&mut entry, &mut out).map_err(UnpackError::Io)?;
            members.push(target);
        }
        Ok(members)
    }
}

#[cfg(feature = "archive-7z")]
pub struct SevenZipReader;

#[cfg(feature = "archive-7z")]
impl ArchiveReader for SevenZipReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::SevenZ
    }

    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, UnpackError> {
        use sevenz_rust::{Password, SevenZReader};

        let file = File::open(archive).map_err(UnpackError::Io)?;
        let len = file.metadata().map_err(UnpackError::Io)?.len();
        let mut reader = SevenZReader::new(BufReader::new(file), len, Password::empty())
            .map_err(|e| UnpackError::Archive(e.to_string()))?;

        let mut members = Vec::new();
        reader
            .for_each_entries(|entry, data| {
                if entry.is_directory() {
                    return Ok(true);
                }
                let raw = entry.name().to_string();
                let Some(rel) = sanitize_path(Path::new(&raw)) else {
                    warn!("Skipping invalid member path in 7z: {}", raw);
                    return Ok(true);
                };
                let target = dest.join(rel);
                if let Some(parent) = target.parent() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        warn!("Failed to extract {} from 7z: {}", raw, e);
                        return Ok(true);
                    }
                }
                match File::create(&target) {
                    Ok(mut out) => match std::io::copy(data, &mut out) {
                        Ok(_) => members.push(target),
                        Err(e) => warn!("Failed to extract {} from 7z: {}", raw, e),
                    },
                    Err(e) => warn!("Failed to extract {} from 7z: {}", raw, e),
                }
                Ok(true)
            })
            .map_err(|e| UnpackError::Archive(e.to_string()))?;
        Ok(members)
    }
}

/// RAR capability via the external `unar` tool, same strategy surface as
/// the in-process readers. `new` probes the tool once; construction fails
/// quietly when it is absent so the registry can report the gap.
#[cfg(feature = "archive-rar")]
pub struct RarReader;

#[cfg(feature = "archive-rar")]
impl RarReader {
    pub fn new() -> Option<Self> {
        let probe = std::process::Command::new("unar")
            .arg("-v")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if probe {
            Some(RarReader)
        } else {
            None
        }
    }
}

#[cfg(feature = "archive-rar")]
impl ArchiveReader for RarReader {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Rar
    }

    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, UnpackError> {
        let output = std::process::Command::new("unar")
            .arg("-o")
            .arg(dest)
            .arg("-D")
            .arg("-f")
            .arg(archive)
            .output()
            .map_err(UnpackError::Io)?;
        if !output.status.success() {
            return Err(UnpackError::Archive(format!(
                "unar extraction failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let mut members = Vec::new();
        collect_files(dest, &mut members)?;
        Ok(members)
    }
}

/// Recursively list extracted files in name order, so member ordering is
/// deterministic for tools that cannot report their own listing order.
#[cfg(feature = "archive-rar")]
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), UnpackError> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(UnpackError::Io)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(UnpackError::Io)?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// The capability set for a run, resolved once at startup. Missing
/// capabilities are warned about here, once, and are simply absent from
/// the registry afterwards.
pub struct ReaderRegistry {
    readers: Vec<Box<dyn ArchiveReader>>,
}

impl ReaderRegistry {
    pub fn detect() -> Self {
        let mut readers: Vec<Box<dyn ArchiveReader>> = vec![Box::new(ZipReader)];

        #[cfg(feature = "archive-7z")]
        readers.push(Box::new(SevenZipReader));
        #[cfg(not(feature = "archive-7z"))]
        warn!("7z support not compiled in; 7z archives will not be processed");

        #[cfg(feature = "archive-rar")]
        match RarReader::new() {
            Some(rar) => readers.push(Box::new(rar)),
            None => warn!("unar not found on PATH; RAR archives will not be processed"),
        }
        #[cfg(not(feature = "archive-rar"))]
        warn!("RAR support not compiled in; RAR archives will not be processed");

        Self { readers }
    }

    pub fn reader_for(&self, format: ArchiveFormat) -> Option<&dyn ArchiveReader> {
        self.readers
            .iter()
            .find(|r| r.format() == format)
            .map(|r| r.as_ref())
    }

    pub fn has(&self, format: ArchiveFormat) -> bool {
        self.reader_for(format).is_some()
    }
}
