//! pdftext-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types ([`Point`], [`ObjectKind`],
//! [`LineBuffer`]) and the row-assembly algorithm used by pdftext to turn
//! positioned glyph runs into reading-order text. It has no required external
//! dependencies; `serde` support is behind the `serde` feature.

pub mod error;
pub mod geometry;
pub mod line_buffer;
pub mod object_kind;
pub mod options;

pub use error::{ExtractResult, ExtractWarning, ExtractWarningCode, PdfError};
pub use geometry::Point;
pub use line_buffer::{LineBuffer, LineEntry};
pub use object_kind::{FontSubtype, ObjectKind};
pub use options::{Band, ExtractOptions, LayoutParams};
