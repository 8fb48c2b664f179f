//! pdftext: reading-order text extraction from PDF page content streams.
//!
//! This is the public API facade. It re-exports the types of
//! [`pdftext_core`] and uses [`pdftext_parse`] to load documents and
//! interpret content streams.
//!
//! # Architecture
//!
//! - **pdftext-core**: backend-independent types, options and line assembly
//! - **pdftext-parse**: masking, span extraction, tokenizing, interpretation
//!   and lopdf-backed resources
//! - **pdftext** (this crate): opens documents and extracts page text
//!
//! For a content stream that is already decoded, call [`extract_text`]
//! directly with any [`PageResources`].

mod page;
mod pdf;

pub use page::Page;
pub use pdf::{PagesIter, Pdf};

pub use pdftext_core;
pub use pdftext_core::{
    Band, ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, LayoutParams,
    PdfError, Point,
};
pub use pdftext_parse;
pub use pdftext_parse::{
    FontDecoder, InMemoryResources, PageResources, ShowTextItem, StandardFont, extract_text,
};
