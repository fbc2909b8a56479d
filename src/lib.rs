//! Nexaris File Parser - converts Excel, CSV and PDF uploads into a single
//! fixed-structure text transcript under strict size and memory limits

pub mod document_parser;
pub mod error;
pub mod extractor;
pub mod limits;
pub mod logging;
pub mod mcp_handler;
pub mod pdf_extractor;
pub mod shared_utils;
pub mod table_renderer;
pub mod tabular_extractor;
pub mod transcript;

/// Re-export the MCP server for direct usage
pub use mcp_handler::{FileParserServer, ParseFileInput, handle_parse_request, start_server};

/// Re-export main functionality
pub use document_parser::{ErrorResponse, ParseResponse, ParseResult, parse_blob, parse_upload};
pub use error::ParseError;
pub use extractor::{Extractor, SourceBlob};
pub use limits::Limits;

/// Re-export format backends
pub use pdf_extractor::{DocumentExtractor, PageUnit, PdfBackend};
pub use tabular_extractor::{DelimitedTextExtractor, SpreadsheetExtractor};

/// Re-export shared utilities
pub use shared_utils::{FileFormat, check_file_size, detect_format};
pub use table_renderer::{CellValue, TabularUnit};
pub use transcript::{RenderedBlock, Transcript, TranscriptAssembler, UnitOutcome};
