//! Extraction options and layout heuristics.
//!
//! [`ExtractOptions`] bounds the work done for one content stream, and
//! [`LayoutParams`] holds the empirically tuned constants used by the
//! text-state interpreter and the row assembler.

/// Vertical drop applied by a `Td` that forces a line break.
pub const DEFAULT_TD_LINE_HEIGHT: f64 = 11.0;
/// Vertical drop applied by `T*` and `Tz`.
pub const DEFAULT_NEXT_LINE_HEIGHT: f64 = 16.0;
/// Maximum distance below a row's anchor that still joins the row.
pub const DEFAULT_ROW_THRESHOLD: f64 = 10.0;
/// Step used to nudge a colliding line key downwards.
pub const DEFAULT_KEY_EPSILON: f64 = 0.001;
/// Font-size drop that signals a superscript.
pub const DEFAULT_SUPERSCRIPT_SIZE_BAND: Band = Band::new(3.0, 8.0);
/// Baseline rise that signals a superscript.
pub const DEFAULT_SUPERSCRIPT_RISE_BAND: Band = Band::new(4.0, 8.0);
pub const DEFAULT_SUPERSCRIPT_OPEN: &str = "<sup>";
pub const DEFAULT_SUPERSCRIPT_CLOSE: &str = "</sup>";

/// An open interval `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if `value` lies strictly between `min` and `max`.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

/// Heuristic constants for line breaking, row clustering and superscript
/// detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutParams {
    /// Drop applied by a line-breaking `Td` (default: 11).
    pub td_line_height: f64,
    /// Drop applied by `T*` / `Tz` (default: 16).
    pub next_line_height: f64,
    /// Row clustering threshold (default: 10).
    pub row_threshold: f64,
    /// Collision nudge for line keys (default: 0.001).
    pub key_epsilon: f64,
    /// Font-size delta band for superscripts (default: (3, 8)).
    pub superscript_size_band: Band,
    /// Baseline delta band for superscripts (default: (4, 8)).
    pub superscript_rise_band: Band,
    pub superscript_open: String,
    pub superscript_close: String,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            td_line_height: DEFAULT_TD_LINE_HEIGHT,
            next_line_height: DEFAULT_NEXT_LINE_HEIGHT,
            row_threshold: DEFAULT_ROW_THRESHOLD,
            key_epsilon: DEFAULT_KEY_EPSILON,
            superscript_size_band: DEFAULT_SUPERSCRIPT_SIZE_BAND,
            superscript_rise_band: DEFAULT_SUPERSCRIPT_RISE_BAND,
            superscript_open: DEFAULT_SUPERSCRIPT_OPEN.to_string(),
            superscript_close: DEFAULT_SUPERSCRIPT_CLOSE.to_string(),
        }
    }
}

impl LayoutParams {
    /// Wrap `text` in the configured superscript markers.
    pub fn wrap_superscript(&self, text: &str) -> String {
        format!("{}{}{}", self.superscript_open, text, self.superscript_close)
    }
}

/// Options controlling extraction behavior and resource limits.
///
/// Resource limits keep pathological content streams (deeply nested or
/// cyclic forms, huge streams) from running away.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum nesting depth for Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum number of spans interpreted per content stream (default: None = no limit).
    pub max_spans: Option<usize>,
    /// Maximum content stream bytes to process (default: 100 MB).
    pub max_stream_bytes: usize,
    /// Whether to collect warnings during extraction (default: true).
    pub collect_warnings: bool,
    /// Layout heuristics.
    pub layout: LayoutParams,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_spans: None,
            max_stream_bytes: 100 * 1024 * 1024,
            collect_warnings: true,
            layout: LayoutParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Band ---

    #[test]
    fn band_is_exclusive() {
        let band = Band::new(3.0, 8.0);
        assert!(band.contains(5.0));
        assert!(band.contains(3.5));
        assert!(!band.contains(3.0));
        assert!(!band.contains(8.0));
        assert!(!band.contains(1.0));
        assert!(!band.contains(-5.0));
    }

    // --- LayoutParams ---

    #[test]
    fn layout_defaults() {
        let params = LayoutParams::default();
        assert_eq!(params.td_line_height, 11.0);
        assert_eq!(params.next_line_height, 16.0);
        assert_eq!(params.row_threshold, 10.0);
        assert_eq!(params.key_epsilon, 0.001);
        assert_eq!(params.superscript_size_band, Band::new(3.0, 8.0));
        assert_eq!(params.superscript_rise_band, Band::new(4.0, 8.0));
        assert_eq!(params.superscript_open, "<sup>");
        assert_eq!(params.superscript_close, "</sup>");
    }

    #[test]
    fn wrap_superscript_uses_markers() {
        let mut params = LayoutParams::default();
        assert_eq!(params.wrap_superscript("2"), "<sup>2</sup>");
        params.superscript_open = "^(".to_string();
        params.superscript_close = ")".to_string();
        assert_eq!(params.wrap_superscript("2"), "^(2)");
    }

    // --- ExtractOptions ---

    #[test]
    fn extract_options_defaults() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.max_recursion_depth, 10);
        assert_eq!(opts.max_spans, None);
        assert_eq!(opts.max_stream_bytes, 100 * 1024 * 1024);
        assert!(opts.collect_warnings);
        assert_eq!(opts.layout, LayoutParams::default());
    }

    #[test]
    fn extract_options_struct_update() {
        let opts = ExtractOptions {
            max_spans: Some(4),
            ..ExtractOptions::default()
        };
        assert_eq!(opts.max_spans, Some(4));
        assert_eq!(opts.max_recursion_depth, 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn layout_params_round_trip_through_json() {
        let params = LayoutParams {
            row_threshold: 4.5,
            superscript_rise_band: Band::new(2.0, 6.0),
            superscript_open: "^(".to_string(),
            ..LayoutParams::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["row_threshold"], 4.5);
        assert_eq!(json["superscript_rise_band"]["min"], 2.0);
        assert_eq!(json["superscript_open"], "^(");

        let back: LayoutParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }
}
