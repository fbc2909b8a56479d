use thiserror::Error;

/// Every way a single parse can fail.
///
/// Each variant is converted into the uniform `{error, kind}` object at the
/// parse boundary, so callers never see a half-built transcript.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No file content was supplied
    #[error("No file provided")]
    MissingInput,

    /// The blob is larger than `Limits::max_file_size_bytes`
    #[error("File too large: {actual} bytes exceeds the limit of {limit} bytes")]
    FileTooLarge { actual: u64, limit: u64 },

    /// The file name does not carry a supported extension
    #[error("Unsupported file type: {0}. Use Excel, PDF, or CSV.")]
    UnsupportedFormat(String),

    /// The spreadsheet or CSV container is malformed
    #[error("Failed to parse tabular file: {0}")]
    TabularParse(String),

    /// The PDF container cannot be opened
    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    /// Anything unexpected, including a panic inside a parser backend
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Stable snake_case tag for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MissingInput => "missing_input",
            ParseError::FileTooLarge { .. } => "file_too_large",
            ParseError::UnsupportedFormat(_) => "unsupported_format",
            ParseError::TabularParse(_) => "tabular_parse_error",
            ParseError::DocumentParse(_) => "document_parse_error",
            ParseError::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure is caused by the request rather than the parser.
    ///
    /// A transport layer maps `true` to a 4xx status and `false` to a 5xx one.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ParseError::MissingInput | ParseError::FileTooLarge { .. } | ParseError::UnsupportedFormat(_)
        )
    }
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::TabularParse(err.to_string())
    }
}

impl From<calamine::XlsxError> for ParseError {
    fn from(err: calamine::XlsxError) -> Self {
        ParseError::TabularParse(err.to_string())
    }
}

impl From<calamine::XlsbError> for ParseError {
    fn from(err: calamine::XlsbError) -> Self {
        ParseError::TabularParse(err.to_string())
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::TabularParse(err.to_string())
    }
}

impl From<lopdf::Error> for ParseError {
    fn from(err: lopdf::Error) -> Self {
        ParseError::DocumentParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ParseError::MissingInput.kind(), "missing_input");
        assert_eq!(
            ParseError::FileTooLarge { actual: 11, limit: 10 }.kind(),
            "file_too_large"
        );
        assert_eq!(ParseError::UnsupportedFormat("txt".into()).kind(), "unsupported_format");
        assert_eq!(ParseError::TabularParse("bad".into()).kind(), "tabular_parse_error");
        assert_eq!(ParseError::DocumentParse("bad".into()).kind(), "document_parse_error");
        assert_eq!(ParseError::Internal("boom".into()).kind(), "internal_error");
    }

    #[test]
    fn test_client_errors() {
        assert!(ParseError::MissingInput.is_client_error());
        assert!(ParseError::UnsupportedFormat("doc".into()).is_client_error());
        assert!(!ParseError::DocumentParse("corrupt".into()).is_client_error());
        assert!(!ParseError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_error_messages() {
        let err = ParseError::FileTooLarge { actual: 2048, limit: 1024 };
        assert_eq!(
            err.to_string(),
            "File too large: 2048 bytes exceeds the limit of 1024 bytes"
        );
        let err = ParseError::UnsupportedFormat("txt".into());
        assert_eq!(err.to_string(), "Unsupported file type: txt. Use Excel, PDF, or CSV.");
    }
}
