use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;

use crate::error::ParseError;
use crate::extractor::{Extractor, SourceBlob};
use crate::limits::Limits;
use crate::transcript::{RenderedBlock, Transcript, TranscriptAssembler, UnitOutcome};

/// PDF backends, tried in order until one can open the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBackend {
    Lopdf,
    PdfExtract, // Fallback
}

impl PdfBackend {
    /// Backends in order of preference
    pub fn available() -> [PdfBackend; 2] {
        [PdfBackend::Lopdf, PdfBackend::PdfExtract]
    }

    pub fn description(&self) -> &'static str {
        match self {
            PdfBackend::Lopdf => "lopdf (page by page)",
            PdfBackend::PdfExtract => "pdf-extract (whole document, fallback)",
        }
    }
}

/// One page of a document: 1-based index and its text, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUnit {
    pub index: usize,
    pub text: Option<String>,
}

impl PageUnit {
    /// Whitespace-only text counts as no text. Leading whitespace is kept,
    /// trailing line breaks are dropped.
    pub fn new(index: usize, text: Option<String>) -> Self {
        let text = text
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim_end().to_string());
        Self { index, text }
    }
}

/// A container one of the backends managed to open
enum OpenedPdf {
    Lopdf(Document),
    PdfExtract(Vec<String>),
}

impl OpenedPdf {
    fn open(bytes: &[u8], backend: PdfBackend) -> Result<Self, ParseError> {
        match backend {
            PdfBackend::Lopdf => Ok(OpenedPdf::Lopdf(Document::load_mem(bytes)?)),
            PdfBackend::PdfExtract => {
                // pdf-extract panics on some malformed input
                let pages = panic::catch_unwind(AssertUnwindSafe(|| {
                    pdf_extract::extract_text_from_mem_by_pages(bytes)
                }))
                .map_err(|_| ParseError::DocumentParse("pdf-extract panicked".to_string()))?
                .map_err(|e| ParseError::DocumentParse(e.to_string()))?;
                Ok(OpenedPdf::PdfExtract(pages))
            }
        }
    }

    /// Hand each page to `visit` in document order, one at a time
    fn for_each_page<F>(self, mut visit: F)
    where
        F: FnMut(PageUnit),
    {
        match self {
            OpenedPdf::Lopdf(document) => {
                for page_number in document.get_pages().into_keys() {
                    let text = match document.extract_text(&[page_number]) {
                        Ok(text) => Some(text),
                        Err(e) => {
                            log::warn!("Failed to extract text from page {}: {}", page_number, e);
                            None
                        }
                    };
                    visit(PageUnit::new(page_number as usize, text));
                }
            }
            OpenedPdf::PdfExtract(pages) => {
                for (i, text) in pages.into_iter().enumerate() {
                    visit(PageUnit::new(i + 1, Some(text)));
                }
            }
        }
    }
}

/// Paginated-document backend
pub struct DocumentExtractor;

impl DocumentExtractor {
    fn open_with_fallback(bytes: &[u8]) -> Result<OpenedPdf, ParseError> {
        let mut failures = Vec::new();

        for backend in PdfBackend::available() {
            match OpenedPdf::open(bytes, backend) {
                Ok(pdf) => {
                    log::debug!("Opened PDF with {}", backend.description());
                    return Ok(pdf);
                }
                Err(e) => {
                    log::warn!("Backend {:?} failed: {}", backend, e);
                    failures.push(format!("{:?}: {}", backend, e));
                }
            }
        }

        Err(ParseError::DocumentParse(failures.join("; ")))
    }

    fn assemble(pdf: OpenedPdf) -> Transcript {
        let mut assembler = TranscriptAssembler::new();

        pdf.for_each_page(|page| {
            assembler.record_page();
            match page.text {
                Some(text) => assembler.absorb(UnitOutcome {
                    name: None,
                    block: RenderedBlock::page(page.index, text),
                    truncated: false,
                }),
                None => log::debug!("Page {} has no extractable text, skipping", page.index),
            }
        });

        assembler.finish()
    }
}

impl Extractor for DocumentExtractor {
    fn extract(&self, blob: &SourceBlob, _limits: &Limits) -> Result<Transcript, ParseError> {
        let pdf = Self::open_with_fallback(blob.bytes())?;
        Ok(Self::assemble(pdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_order() {
        let backends = PdfBackend::available();
        assert_eq!(backends[0], PdfBackend::Lopdf);
        // pdf-extract is always the last resort
        assert_eq!(backends[backends.len() - 1], PdfBackend::PdfExtract);
    }

    #[test]
    fn test_page_unit_normalizes_text() {
        assert_eq!(PageUnit::new(1, None).text, None);
        assert_eq!(PageUnit::new(2, Some("   \n\t".into())).text, None);
        assert_eq!(PageUnit::new(3, Some("hello \n".into())).text, Some("hello".into()));
        assert_eq!(
            PageUnit::new(5, Some("    indented\nbody\n\n".into())).text,
            Some("    indented\nbody".into())
        );
        assert_eq!(PageUnit::new(4, Some("a\n  b".into())).index, 4);
    }

    #[test]
    fn test_fallback_pages_are_numbered_from_one() {
        let pdf = OpenedPdf::PdfExtract(vec!["a".into(), " \n".into(), "c\n".into()]);
        let transcript = DocumentExtractor::assemble(pdf);

        assert_eq!(transcript.text, "=== Page: 1 ===\na\n\n=== Page: 3 ===\nc");
        assert_eq!(transcript.page_count, Some(3));
        assert_eq!(transcript.unit_count, 2);
        assert!(!transcript.truncated);
    }

    #[test]
    fn test_page_indentation_survives() {
        let pdf = OpenedPdf::PdfExtract(vec!["  Title\n  body".into(), "    next".into()]);
        let transcript = DocumentExtractor::assemble(pdf);

        assert_eq!(
            transcript.text,
            "=== Page: 1 ===\n  Title\n  body\n\n=== Page: 2 ===\n    next"
        );
    }

    #[test]
    fn test_corrupt_pdf_is_document_error() {
        let blob = SourceBlob::new(b"%PDF-1.4 this is not really a pdf".to_vec(), "broken.pdf");
        let result = DocumentExtractor.extract(&blob, &Limits::default());
        match result {
            Err(ParseError::DocumentParse(message)) => {
                assert!(message.contains("Lopdf"));
                assert!(message.contains("PdfExtract"));
            }
            other => panic!("expected DocumentParse, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_document_error() {
        let blob = SourceBlob::new(Vec::new(), "empty.pdf");
        assert!(matches!(
            DocumentExtractor.extract(&blob, &Limits::default()),
            Err(ParseError::DocumentParse(_))
        ));
    }
}
