//! Errors raised while loading a document or interpreting its content.

use pdftext_core::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// lopdf could not load the document, or a page object is missing.
    #[error("malformed PDF: {0}")]
    Parse(String),

    /// Form XObject nesting passed `max_recursion_depth`.
    #[error("{0}")]
    Interpreter(String),

    /// A Form XObject invoked itself, directly or through other forms.
    #[error("Form XObject cycle detected at /{name}")]
    XObjectCycle { name: String },

    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            err @ BackendError::XObjectCycle { .. } => {
                PdfError::InterpreterError(err.to_string())
            }
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_keeps_form_name() {
        let err = BackendError::XObjectCycle {
            name: "Fm1".to_string(),
        };
        assert_eq!(err.to_string(), "Form XObject cycle detected at /Fm1");
        assert_eq!(
            PdfError::from(err),
            PdfError::InterpreterError("Form XObject cycle detected at /Fm1".to_string())
        );
    }

    #[test]
    fn variants_map_onto_pdf_error() {
        assert_eq!(
            PdfError::from(BackendError::Parse("bad xref".to_string())),
            PdfError::ParseError("bad xref".to_string())
        );
        assert_eq!(
            PdfError::from(BackendError::Interpreter("too deep".to_string())),
            PdfError::InterpreterError("too deep".to_string())
        );
    }

    #[test]
    fn core_errors_pass_through() {
        let limit = PdfError::ResourceLimitExceeded {
            limit_name: "max_stream_bytes".to_string(),
            limit_value: 10,
            actual_value: 14,
        };
        assert_eq!(PdfError::from(BackendError::Core(limit.clone())), limit);
        assert_eq!(
            PdfError::from(BackendError::from(PdfError::PasswordRequired)),
            PdfError::PasswordRequired
        );
    }

    #[test]
    fn parse_message_is_prefixed() {
        let err: Box<dyn std::error::Error> = Box::new(BackendError::Parse("eof".to_string()));
        assert_eq!(err.to_string(), "malformed PDF: eof");
    }
}
