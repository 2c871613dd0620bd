//! Paragraph extraction from PDF, DOCX and plain-text files.
//!
//! Each format has its own segmentation rule:
//!
//! | Format | Unit | Rule |
//! |--------|------|------|
//! | PDF    | page text | split on `"\n\n"`, trim, drop empties, pages in order |
//! | DOCX   | structural paragraph | trim, drop empties, no further splitting |
//! | TXT    | whole file | trim, split on `"\n\n"`, trim, drop empties |
//!
//! Everything here is blocking file I/O; async callers go through
//! `spawn_blocking` in [`crate::generate`].

use crate::error::{ExtractionError, JobAdError};
use crate::output::{Document, ExtractionBatch};
use crate::progress::PipelineProgressCallback;
use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, Run, RunContent};
use docx_rust::DocxFile;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Paragraph separator for PDF page text and plain-text files.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A supported source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
    Txt,
}

impl FileFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(FileFormat::Pdf),
            "docx" => Ok(FileFormat::Docx),
            "txt" => Ok(FileFormat::Txt),
            _ => Err(ExtractionError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if ext.is_empty() {
                    String::new()
                } else {
                    format!(".{ext}")
                },
            }),
        }
    }

    /// Whether a folder scan should attempt this file at all.
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// Split raw text on blank-line boundaries into trimmed, non-empty paragraphs.
///
/// Only the literal `"\n\n"` separates paragraphs; single newlines stay
/// inside the paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract one file, dispatching on its extension.
///
/// # Errors
/// - [`ExtractionError::UnsupportedFormat`] for anything but `.pdf`, `.docx`, `.txt`
/// - [`ExtractionError::FileNotFound`] if the path does not exist
/// - a format-specific error if the file cannot be read or parsed
pub fn extract_file(path: impl AsRef<Path>) -> Result<Document, ExtractionError> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    if !path.exists() {
        return Err(ExtractionError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let paragraphs = match format {
        FileFormat::Pdf => extract_pdf(path)?,
        FileFormat::Docx => extract_docx(path)?,
        FileFormat::Txt => extract_txt(path)?,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!("Extracted {} paragraphs from {}", paragraphs.len(), path.display());

    Ok(Document {
        file_name,
        paragraphs,
    })
}

/// Recursively extract every supported file under `dir`.
///
/// Files with other extensions are ignored without being opened. A file
/// that fails extraction is logged, reported to `progress`, and skipped.
/// Within each directory files are visited in name order, then
/// subdirectories in name order.
pub fn extract_folder(
    dir: impl AsRef<Path>,
    progress: Option<&dyn PipelineProgressCallback>,
) -> Result<ExtractionBatch, JobAdError> {
    let dir = dir.as_ref();
    let mut documents = Vec::new();

    let (files, subdirs) = list_dir(dir).map_err(|e| JobAdError::InputReadFailed {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    })?;
    visit(files, subdirs, progress, &mut documents);

    info!(
        "Extracted {} documents from folder {}",
        documents.len(),
        dir.display()
    );
    Ok(ExtractionBatch::new(documents))
}

fn visit(
    files: Vec<PathBuf>,
    subdirs: Vec<PathBuf>,
    progress: Option<&dyn PipelineProgressCallback>,
    documents: &mut Vec<Document>,
) {
    for path in files {
        if !FileFormat::is_supported(&path) {
            continue;
        }
        match extract_file(&path) {
            Ok(doc) => {
                if let Some(cb) = progress {
                    cb.on_file_extracted(&doc.file_name, doc.paragraphs.len());
                }
                documents.push(doc);
            }
            Err(e) => {
                warn!("Error extracting {}: {}", e.path().display(), e);
                if let Some(cb) = progress {
                    let name = e
                        .path()
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    cb.on_file_skipped(&name, &e.to_string());
                }
            }
        }
    }

    for sub in subdirs {
        match list_dir(&sub) {
            Ok((files, dirs)) => visit(files, dirs, progress, documents),
            Err(e) => warn!("Skipping unreadable directory {}: {}", sub.display(), e),
        }
    }
}

/// List a directory's regular files and subdirectories, each sorted by name.
///
/// Only failing to open `dir` is an error; entries that cannot be read are
/// skipped with a warning.
fn list_dir(dir: &Path) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        match classify_entry(entry) {
            Some(DirEntryKind::File(path)) => files.push(path),
            Some(DirEntryKind::Dir(path)) => dirs.push(path),
            None => {}
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

#[derive(Debug, PartialEq, Eq)]
enum DirEntryKind {
    File(PathBuf),
    Dir(PathBuf),
}

fn classify_entry(entry: std::io::Result<std::fs::DirEntry>) -> Option<DirEntryKind> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Skipping unreadable directory entry: {}", e);
            return None;
        }
    };
    let path = entry.path();
    match entry.file_type() {
        Ok(kind) if kind.is_dir() => Some(DirEntryKind::Dir(path)),
        // Follows symlinks, so a link to a file counts and a dangling one does not.
        Ok(_) if path.is_file() => Some(DirEntryKind::File(path)),
        Ok(_) => None,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// Extract an in-memory upload by staging it in a temp file.
///
/// The temp file keeps the upload's extension so dispatch works, and the
/// returned [`Document`] carries `file_name` rather than the temp name.
pub fn extract_upload(file_name: &str, bytes: &[u8]) -> Result<Document, ExtractionError> {
    let upload_path = Path::new(file_name);
    FileFormat::from_path(upload_path)?;

    let suffix = upload_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let io_err = |source| ExtractionError::Io {
        path: upload_path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix("jobad-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;

    // `tmp` is deleted when it drops at the end of this function.
    let mut doc = extract_file(tmp.path())?;
    doc.file_name = upload_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    Ok(doc)
}

// ── Format-specific segmenters ───────────────────────────────────────────

/// PDF: per-page text in page order, each page split on blank lines.
pub fn extract_pdf(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let pdf_err = |detail: String| ExtractionError::Pdf {
        path: path.to_path_buf(),
        detail,
    };

    let document = lopdf::Document::load(path).map_err(|e| pdf_err(e.to_string()))?;

    let mut paragraphs = Vec::new();
    // get_pages() is keyed by 1-based page number, so iteration is page order.
    for (page_num, page_id) in document.get_pages() {
        let text =
            page_text(&document, page_id).map_err(|e| pdf_err(format!("page {page_num}: {e}")))?;
        paragraphs.extend(split_paragraphs(&text));
    }

    Ok(paragraphs)
}

/// Rebuild a page's raw text from its content stream.
///
/// Line moves (`Td`, `TD`, `T*`, `'`, `"`) become `"\n"` and each new text
/// object (`BT` after an `ET`) starts after a blank line, so separate text
/// blocks come out as separate paragraphs.
fn page_text(document: &lopdf::Document, page_id: lopdf::ObjectId) -> lopdf::Result<String> {
    let encodings: BTreeMap<Vec<u8>, lopdf::Encoding> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("No usable encoding for font {}: {}", String::from_utf8_lossy(&name), e);
                None
            }
        })
        .collect();
    let content = document.get_and_decode_page_content(page_id)?;

    let mut text = String::new();
    let mut encoding = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "BT" => {
                if !text.trim().is_empty() && !text.ends_with(PARAGRAPH_SEPARATOR) {
                    text.push_str(if text.ends_with('\n') { "\n" } else { PARAGRAPH_SEPARATOR });
                }
            }
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|font| encodings.get(font));
            }
            "Td" | "TD" | "T*" => push_line_break(&mut text),
            "'" | "\"" => {
                push_line_break(&mut text);
                if let Some(shown) = operation.operands.last() {
                    push_shown_text(&mut text, encoding, shown);
                }
            }
            "Tj" | "TJ" => {
                for shown in &operation.operands {
                    push_shown_text(&mut text, encoding, shown);
                }
            }
            _ => {}
        }
    }
    Ok(text)
}

fn push_line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

/// Append the text of a `Tj` string or `TJ` array.
fn push_shown_text(text: &mut String, encoding: Option<&lopdf::Encoding>, shown: &lopdf::Object) {
    match shown {
        lopdf::Object::String(bytes, _) => text.push_str(&decode_pdf_string(encoding, bytes)),
        lopdf::Object::Array(items) => {
            for item in items {
                push_shown_text(text, encoding, item);
            }
        }
        // Large negative kerning in a TJ array is a word gap.
        lopdf::Object::Integer(kern) if *kern < -100 => text.push(' '),
        lopdf::Object::Real(kern) if *kern < -100.0 => text.push(' '),
        _ => {}
    }
}

fn decode_pdf_string(encoding: Option<&lopdf::Encoding>, bytes: &[u8]) -> String {
    match encoding {
        // One-byte maps drop control codes, so line breaks inside a literal
        // are split out before decoding.
        Some(lopdf::Encoding::OneByteEncoding(_)) | None => bytes
            .split(|&b| b == b'\n')
            .map(|line| decode_bytes(encoding, line.strip_suffix(b"\r").unwrap_or(line)))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(encoding) => decode_bytes(Some(encoding), bytes),
    }
}

fn decode_bytes(encoding: Option<&lopdf::Encoding>, bytes: &[u8]) -> String {
    match encoding {
        Some(encoding) => lopdf::Document::decode_text(encoding, bytes)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// DOCX: one paragraph per top-level body paragraph, trimmed, empties dropped.
pub fn extract_docx(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let docx_err = |detail: String| ExtractionError::Docx {
        path: path.to_path_buf(),
        detail,
    };

    let file = DocxFile::from_file(path).map_err(|e| docx_err(e.to_string()))?;
    let docx = file.parse().map_err(|e| docx_err(e.to_string()))?;

    let paragraphs = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    Ok(paragraphs)
}

/// TXT: the whole file as UTF-8, split on blank lines.
pub fn extract_txt(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_paragraphs(content.trim()))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for content in &para.content {
        match content {
            ParagraphContent::Run(run) => push_run_text(run, &mut text),
            ParagraphContent::Link(link) => {
                if let Some(ref run) = link.content {
                    push_run_text(run, &mut text);
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &Run, out: &mut String) {
    for content in &run.content {
        match content {
            RunContent::Text(t) => out.push_str(&t.text),
            RunContent::Break(_) => out.push('\n'),
            RunContent::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_double_newline() {
        assert_eq!(split_paragraphs("A\n\nB\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn single_newlines_do_not_split() {
        let text = "Line one\nLine two\nLine three";
        assert_eq!(split_paragraphs(text), vec![text]);
    }

    #[test]
    fn fragments_are_trimmed_and_empties_dropped() {
        let text = "  A  \n\n\n\n   \n\n\tB\n\n";
        assert_eq!(split_paragraphs(text), vec!["A", "B"]);
    }

    #[test]
    fn triple_newline_leaves_no_leading_newline() {
        // "A\n\n\nB" splits into "A" and "\nB"; trimming removes the newline.
        assert_eq!(split_paragraphs("A\n\n\nB"), vec!["A", "B"]);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(split_paragraphs(" \n\n \t ").is_empty());
        assert!(split_paragraphs("").is_empty());
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(FileFormat::from_path(Path::new("a.PDF")).unwrap(), FileFormat::Pdf);
        assert_eq!(FileFormat::from_path(Path::new("b.DocX")).unwrap(), FileFormat::Docx);
        assert_eq!(FileFormat::from_path(Path::new("c.Txt")).unwrap(), FileFormat::Txt);
    }

    #[test]
    fn unsupported_extension_is_named() {
        let err = FileFormat::from_path(Path::new("sheet.CSV")).unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat { extension, .. } => assert_eq!(extension, ".csv"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!FileFormat::is_supported(Path::new("README")));
        assert!(!FileFormat::is_supported(Path::new("legacy.doc")));
    }

    #[test]
    fn txt_file_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd.txt");
        std::fs::write(&path, "\n  TXT Paragraph 1\n\nTXT Paragraph 2  \n").unwrap();

        let doc = extract_file(&path).unwrap();
        assert_eq!(doc.file_name, "jd.txt");
        assert_eq!(doc.paragraphs, vec!["TXT Paragraph 1", "TXT Paragraph 2"]);
    }

    #[test]
    fn non_utf8_txt_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

        let err = extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn unsupported_file_fails_single_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b,c").unwrap();

        let err = extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_supported_file_is_not_found() {
        let err = extract_file("/no/such/dir/jd.txt").unwrap_err();
        assert!(matches!(err, ExtractionError::FileNotFound { .. }));
    }

    #[test]
    fn corrupt_pdf_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { .. }), "got {err:?}");
    }

    /// One-page PDF whose content stream is `operations`.
    fn pdf_with_operations(dir: &Path, operations: Vec<lopdf::content::Operation>) -> PathBuf {
        use lopdf::{dictionary, Object, Stream};

        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = lopdf::content::Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = dir.join("page.pdf");
        doc.save(&path).unwrap();
        path
    }

    fn text_block(lines: &[&str]) -> Vec<lopdf::content::Operation> {
        use lopdf::content::Operation;

        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("T*", vec![]));
            }
            ops.push(Operation::new("Tj", vec![lopdf::Object::string_literal(*line)]));
        }
        ops.push(Operation::new("ET", vec![]));
        ops
    }

    #[test]
    fn pdf_text_objects_on_one_page_are_separate_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let mut ops = text_block(&["Para one"]);
        ops.extend(text_block(&["Para two"]));
        let path = pdf_with_operations(dir.path(), ops);

        assert_eq!(extract_pdf(&path).unwrap(), vec!["Para one", "Para two"]);
    }

    #[test]
    fn pdf_line_moves_stay_in_one_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_with_operations(dir.path(), text_block(&["Line one", "Line two"]));

        assert_eq!(extract_pdf(&path).unwrap(), vec!["Line one\nLine two"]);
    }

    #[test]
    fn pdf_blank_line_inside_a_string_splits() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_with_operations(dir.path(), text_block(&["First\n\nSecond"]));

        assert_eq!(extract_pdf(&path).unwrap(), vec!["First", "Second"]);
    }

    #[test]
    fn pdf_tj_kerning_gap_is_a_space() {
        use lopdf::content::Operation;
        use lopdf::Object;

        let dir = tempfile::tempdir().unwrap();
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Senior"),
                    Object::Integer(-250),
                    Object::string_literal("Engineer"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let path = pdf_with_operations(dir.path(), ops);

        assert_eq!(extract_pdf(&path).unwrap(), vec!["Senior Engineer"]);
    }

    #[test]
    fn corrupt_docx_is_docx_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx { .. }), "got {err:?}");
    }

    #[test]
    fn folder_scan_skips_failures_and_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "B1\n\nB2").unwrap();
        std::fs::write(dir.path().join("a.TXT"), "A1").unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"garbage").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("c.txt"), "C1").unwrap();

        let batch = extract_folder(dir.path(), None).unwrap();
        let names: Vec<&str> = batch.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.TXT", "b.txt", "c.txt"]);
        assert_eq!(batch.paragraph_count(), 4);
    }

    #[test]
    fn unreadable_entry_is_skipped() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(classify_entry(Err(err)), None);
    }

    #[test]
    fn entries_are_classified_by_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "A").unwrap();

        let mut kinds: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(classify_entry)
            .collect();
        kinds.sort_by_key(|k| format!("{k:?}"));
        assert_eq!(
            kinds,
            vec![
                DirEntryKind::Dir(dir.path().join("sub")),
                DirEntryKind::File(dir.path().join("a.txt")),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_does_not_abort_folder_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Kept").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("b.txt")).unwrap();

        let batch = extract_folder(dir.path(), None).unwrap();
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].file_name, "a.txt");
    }

    #[test]
    fn upload_keeps_original_name() {
        let doc = extract_upload("Job Posting.txt", b"Role\n\nPerks").unwrap();
        assert_eq!(doc.file_name, "Job Posting.txt");
        assert_eq!(doc.paragraphs, vec!["Role", "Perks"]);
    }

    #[test]
    fn upload_with_unsupported_extension_fails() {
        let err = extract_upload("photo.png", b"\x89PNG").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat { .. }));
    }
}
