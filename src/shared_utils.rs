use std::path::Path;

use crate::error::ParseError;

/// The three backends a file can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Spreadsheet,
    DelimitedText,
    PaginatedDocument,
}

impl FileFormat {
    /// Value reported as `fileType` in the parse result
    pub fn file_type(&self) -> &'static str {
        match self {
            FileFormat::Spreadsheet => "excel",
            FileFormat::DelimitedText => "csv",
            FileFormat::PaginatedDocument => "pdf",
        }
    }
}

/// Reject a blob larger than the configured limit.
///
/// Must run before any decoding so an oversized upload never reaches a parser.
pub fn check_file_size(actual: u64, limit: u64) -> Result<(), ParseError> {
    if actual > limit {
        return Err(ParseError::FileTooLarge { actual, limit });
    }
    Ok(())
}

/// Pick a backend from the file name's extension (case-insensitive).
///
/// The extension is authoritative: file content is never inspected.
pub fn detect_format(file_name: &str) -> Result<FileFormat, ParseError> {
    let extension = file_extension(file_name).unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(FileFormat::Spreadsheet),
        "csv" => Ok(FileFormat::DelimitedText),
        "pdf" => Ok(FileFormat::PaginatedDocument),
        _ => Err(ParseError::UnsupportedFormat(extension)),
    }
}

/// Lowercased extension of a file name, if it has one
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Name of the single implicit unit of a delimited-text file
pub fn implicit_unit_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Sheet1".to_string())
}

/// Header line for a sheet block
pub fn sheet_header(name: &str) -> String {
    format!("=== Sheet: {} ===", name)
}

/// Header line for a page block
pub fn page_header(page_number: usize) -> String {
    format!("=== Page: {} ===", page_number)
}
