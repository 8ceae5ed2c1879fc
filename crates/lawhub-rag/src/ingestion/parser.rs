//! Page-aware document loading for PDF and plain-text sources

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::Page;

/// Page separator used by plain-text exports of paginated documents
const FORM_FEED: char = '\u{000C}';

/// Upper bound on whole-document PDF extraction
const PDF_EXTRACT_TIMEOUT_SECS: u64 = 60;

fn horizontal_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid whitespace regex"))
}

/// Clean up extracted text: drop NULs, expand ligatures, collapse runs of
/// horizontal whitespace and trim each line. Line structure is kept since
/// the relevance filter works line by line.
fn cleanup_text(text: &str) -> String {
    let text = text
        .replace('\0', "")
        .replace('\r', "")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    text.lines()
        .map(|line| horizontal_whitespace().replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Loads a source document into pages
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load pages from a file on disk.
    ///
    /// Fails with [`Error::DocumentNotFound`] when the path is not a
    /// readable file.
    pub fn load(path: &Path) -> Result<Vec<Page>> {
        if !path.is_file() {
            return Err(Error::DocumentNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)
            .map_err(|e| Error::DocumentNotFound(format!("{}: {}", path.display(), e)))?;

        let source_id = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let pages = match extension.as_str() {
            "pdf" => Self::parse_pdf(&data, &source_id)?,
            _ => Self::parse_text(&data, &source_id),
        };

        tracing::info!("Loaded {} pages from {}", pages.len(), source_id);
        Ok(pages)
    }

    /// Split plain text into pages on form feeds
    pub fn parse_text(data: &[u8], source_id: &str) -> Vec<Page> {
        let content = String::from_utf8_lossy(data);
        Self::paginate(&content, source_id)
    }

    fn paginate(content: &str, source_id: &str) -> Vec<Page> {
        content
            .split(FORM_FEED)
            .enumerate()
            .filter_map(|(i, raw)| {
                let text = cleanup_text(raw);
                (!text.is_empty()).then(|| Page::new(text, i as u32 + 1, source_id))
            })
            .collect()
    }

    /// Parse a PDF page by page with lopdf, falling back to whole-document
    /// extraction when no page yields text
    fn parse_pdf(data: &[u8], source_id: &str) -> Result<Vec<Page>> {
        let mut pages = Vec::new();

        match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                for page_number in doc.get_pages().into_keys() {
                    match doc.extract_text(&[page_number]) {
                        Ok(raw) => {
                            let text = cleanup_text(&raw);
                            if !text.is_empty() {
                                pages.push(Page::new(text, page_number, source_id));
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Could not extract page {}: {}", page_number, e);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("lopdf failed to load {}: {}, trying pdf-extract", source_id, e);
            }
        }

        if !pages.is_empty() {
            return Ok(pages);
        }

        let text = Self::extract_pdf_with_timeout(data)?;
        let pages = Self::paginate(&text, source_id);
        if pages.is_empty() {
            return Err(Error::index_build(format!(
                "No text content could be extracted from {}",
                source_id
            )));
        }
        Ok(pages)
    }

    /// Whole-document extraction with a timeout to avoid hangs on
    /// problematic fonts
    fn extract_pdf_with_timeout(data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(PDF_EXTRACT_TIMEOUT_SECS)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::index_build(format!("PDF extraction failed: {}", e))),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "PDF extraction timeout after {}s",
                    PDF_EXTRACT_TIMEOUT_SECS
                );
                Err(Error::index_build("PDF extraction timed out"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Error::index_build("PDF extraction thread crashed"))
            }
        }
    }
}
