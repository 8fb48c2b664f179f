//! Fatal errors and non-fatal extraction warnings.
//!
//! Extraction aborts only on [`PdfError`]. Anything the interpreter can step
//! over (an unknown font, a dangling `Do`, a truncated span) becomes an
//! [`ExtractWarning`] carried next to the text in an [`ExtractResult`].

use std::fmt;

/// Reasons a document or page could not be extracted at all.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The bytes are not a readable PDF, or a page or its tree is broken.
    ParseError(String),
    /// The file could not be read.
    IoError(String),
    /// Form XObjects recurse into themselves or nest too deeply.
    InterpreterError(String),
    /// Input is larger than an [`ExtractOptions`](crate::ExtractOptions) limit allows.
    ResourceLimitExceeded {
        /// Option name, e.g. `max_stream_bytes`.
        limit_name: String,
        limit_value: usize,
        actual_value: usize,
    },
    /// The document is encrypted.
    PasswordRequired,
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "unreadable PDF: {msg}"),
            PdfError::IoError(msg) => write!(f, "cannot read file: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "content stream aborted: {msg}"),
            PdfError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "{limit_name} exceeded: {actual_value} > {limit_value}"
            ),
            PdfError::PasswordRequired => f.write_str("document is encrypted (password required)"),
            PdfError::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Category of an [`ExtractWarning`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// `Tf` named a font absent from the resources.
    MissingFont,
    /// `Do` named an XObject absent from the resources.
    MissingXObject,
    /// The tokenizer gave up before the end of a span.
    MalformedContent,
    /// `max_spans` cut the page short.
    ResourceLimitReached,
    Other(String),
}

impl ExtractWarningCode {
    /// Stable upper-case tag, as printed in log lines.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingFont => "MISSING_FONT",
            Self::MissingXObject => "MISSING_XOBJECT",
            Self::MalformedContent => "MALFORMED_CONTENT",
            Self::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            Self::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the interpreter stepped over while extracting a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    pub code: ExtractWarningCode,
    pub description: String,
    /// 0-indexed page, set by the document facade.
    pub page: Option<usize>,
    /// Position of the offending token within its span.
    pub operator_index: Option<usize>,
    /// Resource name of the font involved.
    pub font_name: Option<String>,
}

impl ExtractWarning {
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
            font_name: None,
        }
    }

    pub fn at_operator(self, operator_index: usize) -> Self {
        Self {
            operator_index: Some(operator_index),
            ..self
        }
    }

    pub fn for_font(self, font_name: impl Into<String>) -> Self {
        Self {
            font_name: Some(font_name.into()),
            ..self
        }
    }

    pub fn on_page(self, page: usize) -> Self {
        Self {
            page: Some(page),
            ..self
        }
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)?;
        let mut context = Vec::new();
        if let Some(page) = self.page {
            context.push(format!("page {page}"));
        }
        if let Some(font) = &self.font_name {
            context.push(format!("font /{font}"));
        }
        if let Some(index) = self.operator_index {
            context.push(format!("token {index}"));
        }
        if !context.is_empty() {
            write!(f, " ({})", context.join(", "))?;
        }
        Ok(())
    }
}

/// Extracted value plus the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    pub value: T,
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    pub fn new(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    /// `true` when nothing was stepped over.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<ExtractWarning>) {
        (self.value, self.warnings)
    }
}
