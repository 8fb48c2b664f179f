//! Text cursor state for one level of content stream interpretation.
//!
//! A fresh [`CursorState`] is created for a page and for every nested form;
//! it is dropped when that level's spans are exhausted.

use pdftext_core::{LayoutParams, Point};

use crate::resources::FontDecoder;

/// Cursor, font and leading state tracked across text operators.
pub struct CursorState<'r> {
    /// Font selected by the last `Tf`, if it resolved.
    pub font: Option<&'r dyn FontDecoder>,
    /// Resource name given to the last `Tf`.
    pub font_name: Option<String>,
    /// Running text-line position, moved by `Tm`, `TD`, `T*` and breaking `Td`s.
    pub text_line: Point,
    /// Operands of the previous `Td`, with `y` truncated to two decimals.
    pub prior_line_position: Option<Point>,
    pub font_size: f64,
    pub previous_font_size: f64,
    /// `previous_font_size - font_size` at the last `Tf`.
    pub pending_font_size_delta: f64,
    /// Positive `y` of the last `TD`, cleared by other positioning operators.
    pub pending_leading_delta: f64,
    /// Baseline change computed by the last `Tm`.
    pub last_y_delta: f64,
}

impl std::fmt::Debug for CursorState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorState")
            .field("font_name", &self.font_name)
            .field("font_resolved", &self.font.is_some())
            .field("text_line", &self.text_line)
            .field("prior_line_position", &self.prior_line_position)
            .field("font_size", &self.font_size)
            .field("pending_font_size_delta", &self.pending_font_size_delta)
            .field("pending_leading_delta", &self.pending_leading_delta)
            .field("last_y_delta", &self.last_y_delta)
            .finish()
    }
}

impl Default for CursorState<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> CursorState<'r> {
    pub fn new() -> Self {
        Self {
            font: None,
            font_name: None,
            text_line: Point::origin(),
            prior_line_position: None,
            font_size: 0.0,
            previous_font_size: 0.0,
            pending_font_size_delta: 0.0,
            pending_leading_delta: 0.0,
            last_y_delta: 0.0,
        }
    }

    /// Record a `Tf` size change.
    pub fn set_font_size(&mut self, size: f64) {
        self.previous_font_size = self.font_size;
        self.font_size = size;
        self.pending_font_size_delta = self.previous_font_size - self.font_size;
    }

    /// Whether the last size drop falls in the superscript band.
    pub fn font_shrank_for_superscript(&self, layout: &LayoutParams) -> bool {
        layout
            .superscript_size_band
            .contains(self.pending_font_size_delta)
    }

    /// Whether the current glyph run should be marked as a superscript.
    pub fn superscript_active(&self, layout: &LayoutParams) -> bool {
        self.font_shrank_for_superscript(layout)
            && (layout.superscript_rise_band.contains(self.last_y_delta)
                || layout
                    .superscript_rise_band
                    .contains(self.pending_leading_delta))
    }
}

/// Truncate towards zero at two decimals.
pub fn truncate_hundredths(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}
