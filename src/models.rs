//! Core data models used throughout the crawler.
//!
//! These types represent the records emitted for discovered documents and
//! the extension-based classification that routes files through the
//! pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// One record per discovered leaf document. Field order matches the CSV
/// column order of the catalog sink.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    /// Sequential id, unique within a run, assigned in discovery order.
    pub id: u64,
    pub file_path: String,
    pub file_name: String,
    pub file_type: FileType,
    pub file_size: u64,
    /// Normalized extracted text, or an in-band error placeholder.
    pub content: String,
    /// Slash-joined chain of container archive names, outer to inner.
    /// Empty iff the file was found directly under the storage root.
    pub archive_path: String,
    pub created_date: DateTime<Utc>,
    /// Hex SHA-256 of the raw bytes, independent of path and name.
    pub content_hash: String,
}

/// Coarse record category derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Spreadsheet,
}

/// Supported leaf document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Docx,
    Doc,
    Pdf,
    Xlsx,
    Xls,
}

impl DocFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "docx" => Some(DocFormat::Docx),
            "doc" => Some(DocFormat::Doc),
            "pdf" => Some(DocFormat::Pdf),
            "xlsx" => Some(DocFormat::Xlsx),
            "xls" => Some(DocFormat::Xls),
            _ => None,
        }
    }

    pub fn file_type(self) -> FileType {
        match self {
            DocFormat::Docx | DocFormat::Doc | DocFormat::Pdf => FileType::Document,
            DocFormat::Xlsx | DocFormat::Xls => FileType::Spreadsheet,
        }
    }
}

/// Supported archive container formats. Zip support is always present;
/// the other two are optional capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZ,
    Rar,
}

impl ArchiveFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "zip" => Some(ArchiveFormat::Zip),
            "7z" => Some(ArchiveFormat::SevenZ),
            "rar" => Some(ArchiveFormat::Rar),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Rar => "rar",
        }
    }
}

/// How a discovered file is routed: unpacked, extracted, or ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Document(DocFormat),
    Archive(ArchiveFormat),
    Unsupported,
}

/// Classify a path by its lowercased extension. Files with no extension
/// or an unrecognized one are unsupported and produce no record.
pub fn classify(path: &Path) -> FileClass {
    let ext = match path.extension() {
        Some(e) => e.to_string_lossy().to_lowercase(),
        None => return FileClass::Unsupported,
    };
    if let Some(fmt) = ArchiveFormat::from_extension(&ext) {
        return FileClass::Archive(fmt);
    }
    if let Some(fmt) = DocFormat::from_extension(&ext) {
        return FileClass::Document(fmt);
    }
    FileClass::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_lowercased_extension() {
        assert_eq!(
            classify(Path::new("a/report.DOCX")),
            FileClass::Document(DocFormat::Docx)
        );
        assert_eq!(
            classify(Path::new("bundle.Zip")),
            FileClass::Archive(ArchiveFormat::Zip)
        );
        assert_eq!(classify(Path::new("notes.txt")), FileClass::Unsupported);
        assert_eq!(classify(Path::new("no_extension")), FileClass::Unsupported);
    }

    #[test]
    fn doc_formats_map_to_record_types() {
        assert_eq!(DocFormat::Pdf.file_type(), FileType::Document);
        assert_eq!(DocFormat::Doc.file_type(), FileType::Document);
        assert_eq!(DocFormat::Xls.file_type(), FileType::Spreadsheet);
        assert_eq!(DocFormat::Xlsx.file_type(), FileType::Spreadsheet);
    }
}
