//! pdftext-parse: content stream scanning and text-state interpretation.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`mask`] blanks out string, array, hex, inline-image and marked-content
//!    payloads without moving any byte offsets.
//! 2. [`span::extract_spans`] finds `BT … ET` text objects and `/Name Do`
//!    invocations in the masked copy and slices the original at the same
//!    offsets.
//! 3. [`tokenizer::tokenize`] turns each span into operator/operand tokens.
//! 4. [`interpreter::extract_text`] tracks the text cursor, decodes glyph runs
//!    through a [`FontDecoder`] and lays them out in a
//!    [`LineBuffer`](pdftext_core::LineBuffer).
//!
//! [`lopdf_backend`] provides lopdf-backed [`PageResources`].

pub mod error;
pub mod interpreter;
pub mod lopdf_backend;
pub mod mask;
pub mod resources;
pub mod span;
pub mod standard_font;
pub mod text_state;
pub mod tokenizer;

pub use error::BackendError;
pub use interpreter::extract_text;
pub use lopdf_backend::{LopdfDocument, LopdfResources};
pub use mask::{mask, mask_with};
pub use pdftext_core;
pub use resources::{
    FontDecoder, FormXObject, InMemoryResources, PageResources, ShowTextItem, XObject, XObjectId,
};
pub use span::{Span, SpanKind, extract_spans};
pub use standard_font::{SimpleEncoding, StandardFont};
pub use tokenizer::{Payload, Token, TokenKind, tokenize};
