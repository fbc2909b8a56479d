use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::extractor::SourceBlob;
use crate::limits::Limits;
use crate::shared_utils::{FileFormat, check_file_size, detect_format};

/// Successful result of parsing one upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    pub text: String,
    pub file_name: String,
    pub file_type: String,
    pub unit_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pages: Option<usize>,
    pub truncated: bool,
}

/// Uniform failure object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl From<ParseError> for ErrorResponse {
    fn from(err: ParseError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

/// Either a complete result or a single error, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParseResponse {
    Success(ParseResult),
    Failure(ErrorResponse),
}

impl ParseResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResponse::Success(_))
    }
}

/// Parse one blob: size check, format detection, extraction.
///
/// The blob is consumed; nothing of it outlives this call.
pub fn parse_blob(blob: SourceBlob, limits: &Limits) -> Result<ParseResult, ParseError> {
    check_file_size(blob.len(), limits.max_file_size_bytes)?;
    let format = detect_format(blob.file_name())?;

    log::info!(
        "Parsing {} ({} bytes) as {}",
        blob.file_name(),
        blob.len(),
        format.file_type()
    );

    let transcript = format.extractor().extract(&blob, limits)?;

    log::info!(
        "Parsed {}: {} units, {} chars, truncated: {}",
        blob.file_name(),
        transcript.unit_count,
        transcript.text.len(),
        transcript.truncated
    );

    let pages = match format {
        FileFormat::PaginatedDocument => Some(transcript.page_count.unwrap_or(0)),
        _ => None,
    };

    Ok(ParseResult {
        success: true,
        text: transcript.text,
        file_name: blob.file_name().to_string(),
        file_type: format.file_type().to_string(),
        unit_names: transcript.unit_names,
        pages,
        truncated: transcript.truncated,
    })
}

/// Boundary of a parse operation.
///
/// Every failure, a panic included, comes back as `ParseResponse::Failure`.
pub fn parse_upload(
    file_bytes: Option<Vec<u8>>,
    file_name: Option<String>,
    limits: &Limits,
) -> ParseResponse {
    let (bytes, name) = match (file_bytes, file_name) {
        (Some(bytes), Some(name)) if !name.trim().is_empty() => (bytes, name),
        _ => return ParseResponse::Failure(ParseError::MissingInput.into()),
    };
    let blob = SourceBlob::new(bytes, name);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| parse_blob(blob, limits)))
        .unwrap_or_else(|payload| Err(ParseError::Internal(panic_message(payload.as_ref()))));

    match outcome {
        Ok(result) => ParseResponse::Success(result),
        Err(e) => {
            log::warn!("Parse failed ({}): {}", e.kind(), e);
            ParseResponse::Failure(e.into())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic during parsing".to_string()
    }
}
