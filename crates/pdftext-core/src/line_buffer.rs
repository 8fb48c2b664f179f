//! Positioned text runs and their assembly into reading-order text.
//!
//! The interpreter opens a line for every positioning jump and appends
//! decoded glyph runs to the most recently opened one. [`LineBuffer::assemble`]
//! then clusters lines into visual rows by vertical proximity, orders each
//! row left to right, and joins rows top to bottom.

use std::collections::HashSet;

use crate::geometry::Point;
use crate::options::DEFAULT_KEY_EPSILON;

/// One accumulating text run.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    /// Vertical key, unique within its buffer.
    pub y: f64,
    pub x: f64,
    pub text: String,
}

/// Mapping from unique vertical keys to text runs, kept in insertion order.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    entries: Vec<LineEntry>,
    keys: HashSet<u64>,
    key_epsilon: f64,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_EPSILON)
    }
}

impl LineBuffer {
    /// Create an empty buffer that resolves key collisions with `key_epsilon`.
    pub fn new(key_epsilon: f64) -> Self {
        // A zero or negative step would never resolve a collision.
        let key_epsilon = if key_epsilon > 0.0 {
            key_epsilon
        } else {
            DEFAULT_KEY_EPSILON
        };
        Self {
            entries: Vec::new(),
            keys: HashSet::new(),
            key_epsilon,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LineEntry] {
        &self.entries
    }

    /// Open a new line holding `text` at `at`.
    ///
    /// If `at.y` is already a key it is nudged downwards by the epsilon until
    /// unique. Where the epsilon is below the float spacing of `y`, the nudge
    /// is one representable value instead. Returns the key actually used.
    pub fn new_line(&mut self, text: impl Into<String>, at: Point) -> f64 {
        let mut y = key_of(at.y);
        while self.keys.contains(&y.to_bits()) {
            let next = step_down(y, self.key_epsilon);
            if next == y {
                break;
            }
            y = next;
        }
        self.keys.insert(y.to_bits());
        self.entries.push(LineEntry {
            y,
            x: at.x,
            text: text.into(),
        });
        y
    }

    /// Append `text` to the most recently opened line.
    ///
    /// An empty buffer has no line to extend, so one is opened at `fallback`.
    pub fn append_to_line(&mut self, text: &str, fallback: Point) {
        match self.entries.last_mut() {
            Some(entry) => entry.text.push_str(text),
            None => {
                self.new_line(text, fallback);
            }
        }
    }

    /// Cluster lines into rows and join them into the final text.
    ///
    /// Lines are visited from the highest key down. A line joins the current
    /// row while `anchor - row_threshold < y`, where the anchor is the first
    /// line of the row. Rows are separated by `\n`; a row is only preceded by
    /// a separator once some text has been emitted.
    pub fn assemble(self, row_threshold: f64) -> String {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.y.total_cmp(&a.y));

        let mut out = String::new();
        let mut row: Vec<LineEntry> = Vec::new();
        let mut anchor: Option<f64> = None;

        for entry in entries {
            match anchor {
                Some(top) if top - row_threshold < entry.y => row.push(entry),
                Some(_) => {
                    flush_row(&mut out, std::mem::take(&mut row));
                    anchor = Some(entry.y);
                    row.push(entry);
                }
                None => {
                    anchor = Some(entry.y);
                    row.push(entry);
                }
            }
        }
        flush_row(&mut out, row);
        out
    }
}

/// Normalize a coordinate for use as a key: `-0.0` collides with `0.0` and
/// NaN reads as `0.0`.
fn key_of(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v + 0.0 }
}

/// `v - step`, or the next representable value below `v` when the
/// subtraction rounds back to `v`. Stays at `-inf`.
fn step_down(v: f64, step: f64) -> f64 {
    let stepped = v - step;
    if stepped < v || v == f64::NEG_INFINITY {
        return stepped;
    }
    if v == 0.0 {
        return -f64::from_bits(1);
    }
    let bits = v.to_bits();
    f64::from_bits(if v > 0.0 { bits - 1 } else { bits + 1 })
}

/// Mirror of [`step_down`]. Stays at `+inf`.
fn step_up(v: f64, step: f64) -> f64 {
    -step_down(-v, step)
}

/// Order one row left to right and append it to `out`.
fn flush_row(out: &mut String, row: Vec<LineEntry>) {
    if row.is_empty() {
        return;
    }
    let mut taken: HashSet<u64> = HashSet::new();
    let mut placed: Vec<(f64, String)> = Vec::with_capacity(row.len());
    for entry in row {
        let mut x = key_of(entry.x);
        while taken.contains(&x.to_bits()) {
            let next = step_up(x, 1.0);
            if next == x {
                break;
            }
            x = next;
        }
        taken.insert(x.to_bits());
        placed.push((x, entry.text));
    }
    placed.sort_by(|a, b| a.0.total_cmp(&b.0));

    if !out.is_empty() {
        out.push('\n');
    }
    for (_, text) in placed {
        out.push_str(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::options::DEFAULT_ROW_THRESHOLD;

    fn buffer() -> LineBuffer {
        LineBuffer::default()
    }

    fn text(buf: LineBuffer) -> String {
        buf.assemble(DEFAULT_ROW_THRESHOLD)
    }

    // --- new_line / append_to_line ---

    #[test]
    fn new_line_inserts_at_key() {
        let mut buf = buffer();
        let key = buf.new_line("Hello", Point::new(100.0, 700.0));
        assert_eq!(key, 700.0);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.entries().last().map(|e| e.y), Some(700.0));
    }

    #[test]
    fn colliding_keys_stay_unique() {
        let mut buf = buffer();
        for i in 0..25 {
            buf.new_line(format!("run{i}"), Point::new(i as f64, 500.0));
        }
        assert_eq!(buf.len(), 25);
        let keys: HashSet<u64> = buf.entries().iter().map(|e| e.y.to_bits()).collect();
        assert_eq!(keys.len(), 25);
        // Every nudge moves downwards.
        assert!(buf.entries().iter().all(|e| e.y <= 500.0));
        assert!(buf.entries()[1].y < buf.entries()[0].y);
    }

    #[test]
    fn negative_zero_collides_with_zero() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, 0.0));
        let key = buf.new_line("b", Point::new(0.0, -0.0));
        assert!(key < 0.0);
    }

    #[test]
    fn append_targets_last_inserted_not_lowest() {
        let mut buf = buffer();
        buf.new_line("low", Point::new(0.0, 100.0));
        buf.new_line("high", Point::new(0.0, 700.0));
        buf.append_to_line("er", Point::origin());
        assert_eq!(buf.entries()[1].text, "higher");
        assert_eq!(buf.entries()[0].text, "low");
    }

    #[test]
    fn append_on_empty_opens_line_at_fallback() {
        let mut buf = buffer();
        buf.append_to_line("first", Point::new(12.0, 34.0));
        assert_eq!(buf.len(), 1);
        assert_eq!(
            buf.entries()[0],
            LineEntry {
                y: 34.0,
                x: 12.0,
                text: "first".to_string()
            }
        );
    }

    #[test]
    fn non_positive_epsilon_falls_back_to_default() {
        let mut buf = LineBuffer::new(0.0);
        buf.new_line("a", Point::new(0.0, 1.0));
        let key = buf.new_line("b", Point::new(0.0, 1.0));
        assert!((key - (1.0 - DEFAULT_KEY_EPSILON)).abs() < 1e-12);
    }

    // --- assemble ---

    #[test]
    fn empty_buffer_assembles_to_empty_string() {
        assert_eq!(text(buffer()), "");
    }

    #[test]
    fn rows_are_emitted_top_to_bottom() {
        let mut buf = buffer();
        buf.new_line("World", Point::new(100.0, 650.0));
        buf.new_line("Hello", Point::new(100.0, 700.0));
        assert_eq!(text(buf), "Hello\nWorld");
    }

    #[test]
    fn entries_within_threshold_share_a_row() {
        let mut buf = buffer();
        buf.new_line("right", Point::new(200.0, 700.0));
        buf.new_line("left ", Point::new(50.0, 691.0));
        buf.new_line("below", Point::new(50.0, 689.0));
        assert_eq!(text(buf), "left right\nbelow");
    }

    #[test]
    fn row_anchor_does_not_drift() {
        // 700 anchors the row; 692 joins it, 685 is more than 10 below the
        // anchor even though it is within 10 of 692.
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, 700.0));
        buf.new_line("b", Point::new(10.0, 692.0));
        buf.new_line("c", Point::new(0.0, 685.0));
        assert_eq!(text(buf), "ab\nc");
    }

    #[test]
    fn exactly_threshold_below_starts_new_row() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, 700.0));
        buf.new_line("b", Point::new(0.0, 690.0));
        assert_eq!(text(buf), "a\nb");
    }

    #[test]
    fn colliding_x_keeps_both_runs_in_row_order() {
        let mut buf = buffer();
        buf.new_line("first", Point::new(0.0, 700.0));
        buf.new_line("second", Point::new(0.0, 698.0));
        buf.new_line("third", Point::new(0.5, 699.0));
        // Visit order is 700, 699, 698: first@0, third@0.5, second@0 -> 1.
        assert_eq!(text(buf), "firstthirdsecond");
    }

    #[test]
    fn leading_empty_rows_add_no_separator() {
        let mut buf = buffer();
        buf.new_line("", Point::new(0.0, 800.0));
        buf.new_line("text", Point::new(0.0, 700.0));
        buf.new_line("", Point::new(0.0, 600.0));
        buf.new_line("more", Point::new(0.0, 500.0));
        assert_eq!(text(buf), "text\n\nmore");
    }

    #[test]
    fn custom_threshold() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, 700.0));
        buf.new_line("b", Point::new(5.0, 680.0));
        assert_eq!(buf.clone().assemble(10.0), "a\nb");
        assert_eq!(buf.assemble(25.0), "ab");
    }

    // --- extreme coordinates ---

    #[test]
    fn colliding_huge_keys_step_to_adjacent_floats() {
        let mut buf = buffer();
        let first = buf.new_line("a", Point::new(0.0, 1e20));
        let second = buf.new_line("b", Point::new(0.0, 1e20));
        let third = buf.new_line("c", Point::new(0.0, 1e20));
        assert_eq!(first, 1e20);
        assert!(second < first);
        assert!(third < second);
        assert_eq!(second.to_bits(), first.to_bits() - 1);
        assert_eq!(text(buf), "abc");
    }

    #[test]
    fn colliding_huge_negative_keys_step_down() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, -1e20));
        let key = buf.new_line("b", Point::new(0.0, -1e20));
        assert!(key < -1e20);
    }

    #[test]
    fn colliding_huge_x_in_one_row() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(1e20, 700.0));
        buf.new_line("b", Point::new(1e20, 701.0));
        buf.new_line("c", Point::new(1e20, 699.0));
        // Visit order 701, 700, 699 keeps each later run to the right.
        assert_eq!(text(buf), "bac");
    }

    #[test]
    fn non_finite_keys_terminate() {
        let mut buf = buffer();
        buf.new_line("a", Point::new(0.0, f64::NEG_INFINITY));
        buf.new_line("b", Point::new(0.0, f64::NEG_INFINITY));
        buf.new_line("c", Point::new(f64::INFINITY, f64::NAN));
        buf.new_line("d", Point::new(f64::INFINITY, 0.0));
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.entries()[2].y, 0.0);
        assert!(buf.entries()[3].y < 0.0);
        let text = text(buf);
        assert!(text.starts_with("cd
"));
    }

    #[test]
    fn stepping_crosses_zero() {
        assert_eq!(step_down(0.0, 0.0), -f64::from_bits(1));
        assert_eq!(step_up(0.0, 0.0), f64::from_bits(1));
        assert_eq!(step_down(1.0, 0.5), 0.5);
        assert_eq!(step_up(1e20, 1.0).to_bits(), 1e20f64.to_bits() + 1);
    }
}
