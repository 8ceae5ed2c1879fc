//! Source references and answer footers

use crate::retrieval::RetrievedChunk;
use crate::types::SourceRef;

/// Footer appended to every retrieval-grounded answer
pub const LEGAL_DISCLAIMER: &str = "⚖️ Legal Disclaimer: This information is based on constitutional provisions. For specific legal advice, consult a qualified lawyer.";

/// Source references for the cited chunks, in retrieval order
pub fn collect_sources(chunks: &[RetrievedChunk]) -> Vec<SourceRef> {
    chunks
        .iter()
        .map(|retrieved| SourceRef::from_chunk(&retrieved.chunk))
        .collect()
}

/// Page numbers with duplicates removed, first occurrence kept
pub fn unique_pages(sources: &[SourceRef]) -> Vec<u32> {
    let mut pages: Vec<u32> = Vec::with_capacity(sources.len());
    for source in sources {
        if !pages.contains(&source.page) {
            pages.push(source.page);
        }
    }
    pages
}

/// `📚 Sources: <title> (pages: 3, 7)` footer
pub fn sources_footer(document_title: &str, sources: &[SourceRef]) -> String {
    let pages = unique_pages(sources)
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    if pages.is_empty() {
        format!("📚 Sources: {}", document_title)
    } else {
        format!("📚 Sources: {} (pages: {})", document_title, pages)
    }
}

/// Append the sources and disclaimer footers to an answer body
pub fn with_footers(body: &str, document_title: &str, sources: &[SourceRef]) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        body.trim_end(),
        sources_footer(document_title, sources),
        LEGAL_DISCLAIMER
    )
}
