use crate::error::ParseError;
use crate::limits::Limits;
use crate::pdf_extractor::DocumentExtractor;
use crate::shared_utils::FileFormat;
use crate::tabular_extractor::{DelimitedTextExtractor, SpreadsheetExtractor};
use crate::transcript::Transcript;

/// Uploaded bytes together with the name they were declared under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlob {
    bytes: Vec<u8>,
    file_name: String,
}

impl SourceBlob {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A format backend: turns a blob into a transcript under the given limits
pub trait Extractor {
    fn extract(&self, blob: &SourceBlob, limits: &Limits) -> Result<Transcript, ParseError>;
}

impl FileFormat {
    /// Backend responsible for this format
    pub fn extractor(&self) -> &'static dyn Extractor {
        match self {
            FileFormat::Spreadsheet => &SpreadsheetExtractor,
            FileFormat::DelimitedText => &DelimitedTextExtractor,
            FileFormat::PaginatedDocument => &DocumentExtractor,
        }
    }
}
