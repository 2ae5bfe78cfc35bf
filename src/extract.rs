//! Multi-format text extraction for leaf documents (DOCX, XLSX, XLS, PDF).
//!
//! Dispatch is extension-driven and happens after classification, so only
//! supported formats reach this module. Nothing here raises past the
//! boundary: a reader failure becomes a bracketed placeholder string in
//! the record's content, and the record is still produced so operators can
//! see which files failed and why.

use calamine::{open_workbook, Data, Reader, Xls, Xlsx};
use log::warn;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::models::DocFormat;

/// Primary PDF output shorter than this many characters triggers the
/// secondary reader.
const PDF_FALLBACK_MIN_CHARS: usize = 50;

/// Fixed sentinel stored when neither PDF strategy yields any text.
pub const PDF_EMPTY_SENTINEL: &str = "[No text could be extracted from PDF]";

/// Extraction error. Rendered into an in-band placeholder, never
/// propagated past this module.
#[derive(Debug)]
pub enum ExtractError {
    Ooxml(String),
    Workbook(String),
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Ooxml(e) => write!(f, "OOXML extraction failed: {}", e),
            ExtractError::Workbook(e) => write!(f, "workbook extraction failed: {}", e),
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract normalized text from a leaf file. Never fails: parse failures
/// come back as descriptive placeholder strings.
pub fn extract_content(path: &Path, format: DocFormat) -> String {
    match format {
        // Legacy .doc routes through the same reader; genuine OLE
        // binaries fail the container open and get the placeholder.
        DocFormat::Docx | DocFormat::Doc => read_docx(path),
        DocFormat::Xlsx => read_xlsx(path),
        DocFormat::Xls => read_xls(path),
        DocFormat::Pdf => read_pdf(path),
    }
}

/// Collapse every whitespace run (newlines included) to a single space,
/// trim the ends, and strip NUL bytes. Idempotent; the result never
/// contains a raw newline or tab.
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| *c != '\0').collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn read_docx(path: &Path) -> String {
    match docx_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error parsing DOCX {}: {}", path.display(), e);
            format!("[Error parsing DOCX: {}]", e)
        }
    }
}

/// Paragraphs in document order (blanks skipped), then all table rows
/// (cells joined with " | ", empty cells and empty rows dropped). Tables
/// always emit after the paragraphs regardless of where they sit in the
/// document; this ordering is a reproducible contract.
fn docx_text(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let mut doc_xml = Vec::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;

    // No trim_text: leading/trailing spaces inside w:t are significant
    // when a paragraph is split across runs.
    let mut reader = quick_xml::Reader::from_reader(doc_xml.as_slice());
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut rows: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut para_buf = String::new();
    let mut cell_buf = String::new();
    let mut row_cells: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => para_buf.clear(),
                b"tr" if table_depth == 1 => row_cells.clear(),
                b"tc" if table_depth == 1 => cell_buf.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(t)) if in_text => {
                let text = t.unescape().unwrap_or_default();
                if table_depth == 0 {
                    para_buf.push_str(&text);
                } else {
                    cell_buf.push_str(&text);
                }
            }
            // Explicit tabs and line breaks separate words
            Ok(quick_xml::events::Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" | b"br" | b"cr" => {
                    if table_depth == 0 {
                        para_buf.push(' ');
                    } else {
                        cell_buf.push(' ');
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => {
                    let para = para_buf.trim();
                    if !para.is_empty() {
                        paragraphs.push(para.to_string());
                    }
                    para_buf.clear();
                }
                b"tc" if table_depth == 1 => {
                    let cell = cell_buf.trim();
                    if !cell.is_empty() {
                        row_cells.push(cell.to_string());
                    }
                    cell_buf.clear();
                }
                b"tr" if table_depth == 1 => {
                    if !row_cells.is_empty() {
                        rows.push(row_cells.join(" | "));
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    paragraphs.extend(rows);
    Ok(normalize_text(&paragraphs.join("\n")))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{:?}", e),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn read_xlsx(path: &Path) -> String {
    match xlsx_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error parsing XLSX {}: {}", path.display(), e);
            format!("[Error parsing XLSX: {}]", e)
        }
    }
}

/// Modern workbook reader: absent cells are dropped, and rows with no
/// remaining cells are omitted entirely.
fn xlsx_text(path: &Path) -> Result<String, ExtractError> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook::<Xlsx<BufReader<File>>, _>(path)
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
    let mut parts: Vec<String> = Vec::new();
    for name in workbook.sheet_names().to_owned() {
        parts.push(format!("[Sheet: {}]", name));
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
        for row in range.rows() {
            let values: Vec<String> = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(cell_to_string)
                .collect();
            if !values.is_empty() {
                parts.push(values.join(" | "));
            }
        }
    }
    Ok(normalize_text(&parts.join("\n")))
}

fn read_xls(path: &Path) -> String {
    match xls_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error parsing XLS {}: {}", path.display(), e);
            format!("[Error parsing XLS: {}]", e)
        }
    }
}

/// Legacy workbook reader: every cell in the used range is stringified
/// unconditionally, so absent cells are retained as empty strings where
/// the modern path would have dropped them. The asymmetry matches the
/// two underlying readers and is kept per format.
fn xls_text(path: &Path) -> Result<String, ExtractError> {
    let mut workbook: Xls<BufReader<File>> =
        open_workbook::<Xls<BufReader<File>>, _>(path)
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
    let mut parts: Vec<String> = Vec::new();
    for name in workbook.sheet_names().to_owned() {
        parts.push(format!("[Sheet: {}]", name));
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
        for row in range.rows() {
            let values: Vec<String> = row.iter().map(cell_to_string).collect();
            if !values.is_empty() {
                parts.push(values.join(" | "));
            }
        }
    }
    Ok(normalize_text(&parts.join("\n")))
}

/// Dual-strategy PDF reader: per-page primary, secondary tried when the
/// primary result is shorter than the threshold and kept only if strictly
/// longer. Reader failures count as empty output; if both strategies
/// yield nothing the content is the fixed sentinel.
fn read_pdf(path: &Path) -> String {
    let mut text = match pdf_primary(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("Primary PDF reader failed for {}: {}", path.display(), e);
            String::new()
        }
    };
    if text.len() < PDF_FALLBACK_MIN_CHARS {
        match pdf_fallback(path) {
            Ok(backup) if backup.len() > text.len() => text = backup,
            Ok(_) => {}
            Err(e) => warn!("Fallback PDF reader failed for {}: {}", path.display(), e),
        }
    }
    if text.is_empty() {
        PDF_EMPTY_SENTINEL.to_string()
    } else {
        text
    }
}

fn pdf_primary(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(join_pages(pages.iter().map(|p| p.as_str())))
}

fn pdf_fallback(path: &Path) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let mut pages: Vec<String> = Vec::new();
    for (number, _) in doc.get_pages() {
        let text = doc
            .extract_text(&[number])
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        pages.push(text);
    }
    Ok(join_pages(pages.iter().map(|p| p.as_str())))
}

/// Prefix each non-blank page with a 1-based `[Page N]` marker. Page
/// numbers follow physical position, so skipped blank pages leave gaps.
fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (idx, page) in pages.enumerate() {
        if !page.trim().is_empty() {
            parts.push(format!("[Page {}]", idx + 1));
            parts.push(page.to_string());
        }
    }
    normalize_text(&parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_docx(dir: &Path, name: &str, body_xml: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
            body_xml
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    fn write_xlsx(dir: &Path, name: &str, sheet_name: &str, sheet_data: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let opts = zip::write::SimpleFileOptions::default();
        let workbook = format!(
            "<?xml version=\"1.0\"?><workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets><sheet name=\"{}\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>",
            sheet_name
        );
        let sheet = format!(
            "<?xml version=\"1.0\"?><worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>{}</sheetData></worksheet>",
            sheet_data
        );
        let parts: [(&str, &str); 5] = [
            ("[Content_Types].xml", "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/><Default Extension=\"xml\" ContentType=\"application/xml\"/><Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/><Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/></Types>"),
            ("_rels/.rels", "<?xml version=\"1.0\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/></Relationships>"),
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", "<?xml version=\"1.0\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/></Relationships>"),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ];
        for (entry_name, body) in parts {
            zip.start_file(entry_name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn normalize_collapses_whitespace_and_strips_nul() {
        assert_eq!(normalize_text("  a\t\tb\n\nc \0d  "), "a b cd");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_text("x\n y\t z");
        assert_eq!(normalize_text(&once), once);
        assert!(!once.contains('\n'));
        assert!(!once.contains('\t'));
    }

    #[test]
    fn docx_paragraphs_then_tables() {
        let dir = tempfile::tempdir().unwrap();
        // Table sits between the two paragraphs but must emit after both.
        let body = "<w:p><w:r><w:t>First</w:t></w:r></w:p>\
                    <w:tbl><w:tr>\
                      <w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>\
                      <w:tc><w:p><w:r><w:t></w:t></w:r></w:p></w:tc>\
                      <w:tc><w:p><w:r><w:t>C1</w:t></w:r></w:p></w:tc>\
                    </w:tr><w:tr>\
                      <w:tc><w:p></w:p></w:tc>\
                    </w:tr></w:tbl>\
                    <w:p></w:p>\
                    <w:p><w:r><w:t>Second</w:t></w:r></w:p>";
        let path = write_docx(dir.path(), "t.docx", body);
        let text = extract_content(&path, DocFormat::Docx);
        assert_eq!(text, "First Second A1 | C1");
    }

    #[test]
    fn docx_split_runs_join_within_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let body = "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t> world</w:t></w:r></w:p>";
        let path = write_docx(dir.path(), "runs.docx", body);
        assert_eq!(extract_content(&path, DocFormat::Docx), "Hello world");
    }

    #[test]
    fn invalid_docx_yields_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.docx");
        std::fs::write(&path, b"not a zip at all").unwrap();
        let text = extract_content(&path, DocFormat::Docx);
        assert!(text.starts_with("[Error parsing DOCX:"), "got: {}", text);
    }

    #[test]
    fn legacy_doc_binary_yields_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.doc");
        // OLE compound-file magic, not a zip container
        std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]).unwrap();
        let text = extract_content(&path, DocFormat::Doc);
        assert!(text.starts_with("[Error parsing DOCX:"), "got: {}", text);
    }

    #[test]
    fn xlsx_sheet_marker_and_row_values() {
        let dir = tempfile::tempdir().unwrap();
        let sheet_data = "<row r=\"1\">\
             <c r=\"A1\" t=\"inlineStr\"><is><t>A</t></is></c>\
             <c r=\"B1\" t=\"inlineStr\"><is><t>B</t></is></c>\
           </row>";
        let path = write_xlsx(dir.path(), "data.xlsx", "Data", sheet_data);
        assert_eq!(extract_content(&path, DocFormat::Xlsx), "[Sheet: Data] A | B");
    }

    #[test]
    fn xlsx_absent_cells_and_empty_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let sheet_data = "<row r=\"1\">\
             <c r=\"A1\"/>\
             <c r=\"B1\" t=\"inlineStr\"><is><t>only</t></is></c>\
           </row>\
           <row r=\"2\"><c r=\"A2\"/><c r=\"B2\"/></row>\
           <row r=\"3\"><c r=\"A3\" t=\"inlineStr\"><is><t>tail</t></is></c></row>";
        let path = write_xlsx(dir.path(), "sparse.xlsx", "S", sheet_data);
        // The all-empty second row is omitted entirely
        assert_eq!(extract_content(&path, DocFormat::Xlsx), "[Sheet: S] only tail");
    }

    #[test]
    fn invalid_xlsx_yields_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        let text = extract_content(&path, DocFormat::Xlsx);
        assert!(text.starts_with("[Error parsing XLSX:"), "got: {}", text);
    }

    #[test]
    fn invalid_xls_yields_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xls");
        std::fs::write(&path, b"not a workbook").unwrap();
        let text = extract_content(&path, DocFormat::Xls);
        assert!(text.starts_with("[Error parsing XLS:"), "got: {}", text);
    }

    #[test]
    fn corrupt_pdf_yields_sentinel_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated garbage").unwrap();
        assert_eq!(extract_content(&path, DocFormat::Pdf), PDF_EMPTY_SENTINEL);
    }

    #[test]
    fn page_markers_are_one_based_and_skip_blank_pages() {
        let joined = join_pages(vec!["alpha", "   ", "gamma"].into_iter());
        assert_eq!(joined, "[Page 1] alpha [Page 3] gamma");
    }
}
