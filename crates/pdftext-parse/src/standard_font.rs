//! Default decoder for simple (single-byte) fonts.

use encoding_rs::{Encoding, MACINTOSH, UTF_16BE, WINDOWS_1252};

use crate::resources::{FontDecoder, ShowTextItem};

/// Kerning (in thousandths of an em) beyond which a gap reads as a space.
pub const DEFAULT_WORD_GAP: f64 = 100.0;

/// Base encoding of a simple font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleEncoding {
    #[default]
    WinAnsi,
    MacRoman,
    /// Adobe standard encoding, read as WinAnsi.
    Standard,
}

impl SimpleEncoding {
    /// Map an `/Encoding` or `/BaseEncoding` name. Unknown names read as
    /// WinAnsi.
    pub fn from_name(name: &str) -> Self {
        match name {
            "MacRomanEncoding" => SimpleEncoding::MacRoman,
            "StandardEncoding" => SimpleEncoding::Standard,
            _ => SimpleEncoding::WinAnsi,
        }
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            SimpleEncoding::WinAnsi | SimpleEncoding::Standard => WINDOWS_1252,
            SimpleEncoding::MacRoman => MACINTOSH,
        }
    }
}

/// A [`FontDecoder`] that maps bytes through a [`SimpleEncoding`].
///
/// Strings that start with a UTF-16BE byte order mark are decoded as
/// UTF-16BE regardless of the encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardFont {
    encoding: SimpleEncoding,
    word_gap: f64,
}

impl Default for StandardFont {
    fn default() -> Self {
        Self::new(SimpleEncoding::default())
    }
}

impl StandardFont {
    pub fn new(encoding: SimpleEncoding) -> Self {
        Self {
            encoding,
            word_gap: DEFAULT_WORD_GAP,
        }
    }

    /// Set the kerning threshold that inserts a space.
    pub fn with_word_gap(mut self, word_gap: f64) -> Self {
        self.word_gap = word_gap;
        self
    }

    pub fn encoding(&self) -> SimpleEncoding {
        self.encoding
    }

    fn decode_bytes(&self, bytes: &[u8]) -> String {
        if let [0xFE, 0xFF, rest @ ..] = bytes {
            return UTF_16BE.decode_without_bom_handling(rest).0.into_owned();
        }
        self.encoding
            .encoding()
            .decode_without_bom_handling(bytes)
            .0
            .into_owned()
    }
}

impl FontDecoder for StandardFont {
    fn decode_text(&self, run: &[ShowTextItem<'_>]) -> String {
        let mut out = String::new();
        for item in run {
            match item {
                ShowTextItem::Literal(raw) => {
                    out.push_str(&self.decode_bytes(&unescape_literal(raw)));
                }
                ShowTextItem::Hex(raw) => {
                    out.push_str(&self.decode_bytes(&decode_hex(raw)));
                }
                ShowTextItem::Adjustment(amount) => {
                    if *amount < -self.word_gap && !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
            }
        }
        out
    }
}

/// Resolve the escape sequences of a literal string body.
pub fn unescape_literal(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut pos = 0;

    while pos < raw.len() {
        let b = raw[pos];
        if b != b'\\' {
            result.push(b);
            pos += 1;
            continue;
        }

        pos += 1;
        let Some(&escaped) = raw.get(pos) else {
            break;
        };
        match escaped {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(0x08),
            b'f' => result.push(0x0C),
            b'\r' => {
                // Line continuation, CR or CRLF
                pos += 1;
                if raw.get(pos) == Some(&b'\n') {
                    pos += 1;
                }
                continue;
            }
            b'\n' => {
                pos += 1;
                continue;
            }
            b'0'..=b'7' => {
                let mut val: u32 = u32::from(escaped - b'0');
                for _ in 0..2 {
                    match raw.get(pos + 1) {
                        Some(&d @ b'0'..=b'7') => {
                            pos += 1;
                            val = val * 8 + u32::from(d - b'0');
                        }
                        _ => break,
                    }
                }
                // High-order overflow is ignored.
                result.push((val & 0xFF) as u8);
            }
            // `\(`, `\)`, `\\` and unknown escapes keep the character.
            other => result.push(other),
        }
        pos += 1;
    }

    result
}

/// Decode a hex string body. Whitespace and non-hex bytes are skipped; an
/// odd trailing digit is padded with `0`.
pub fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|&b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(font: &StandardFont, run: &[ShowTextItem<'_>]) -> String {
        font.decode_text(run)
    }

    // --- unescape_literal ---

    #[test]
    fn unescape_simple_escapes() {
        assert_eq!(unescape_literal(br"a\nb\tc\\d\(e\)"), b"a\nb\tc\\d(e)");
        assert_eq!(unescape_literal(br"\b\f\r"), b"\x08\x0C\r");
    }

    #[test]
    fn unescape_octal() {
        assert_eq!(unescape_literal(br"\101\60\7"), b"A0\x07");
        assert_eq!(unescape_literal(br"\0053"), b"\x053");
    }

    #[test]
    fn unescape_line_continuation() {
        assert_eq!(unescape_literal(b"ab\\\ncd"), b"abcd");
        assert_eq!(unescape_literal(b"ab\\\r\ncd"), b"abcd");
    }

    #[test]
    fn unescape_unknown_and_trailing() {
        assert_eq!(unescape_literal(br"\q"), b"q");
        assert_eq!(unescape_literal(b"end\\"), b"end");
    }

    // --- decode_hex ---

    #[test]
    fn hex_decoding() {
        assert_eq!(decode_hex(b"48656C6c6F"), b"Hello");
        assert_eq!(decode_hex(b"48 65\n6C"), b"Hel");
        assert_eq!(decode_hex(b"4"), vec![0x40]);
        assert_eq!(decode_hex(b"4z1"), vec![0x41]);
        assert!(decode_hex(b"").is_empty());
    }

    // --- encodings ---

    #[test]
    fn encoding_from_name() {
        assert_eq!(
            SimpleEncoding::from_name("MacRomanEncoding"),
            SimpleEncoding::MacRoman
        );
        assert_eq!(
            SimpleEncoding::from_name("StandardEncoding"),
            SimpleEncoding::Standard
        );
        assert_eq!(
            SimpleEncoding::from_name("WinAnsiEncoding"),
            SimpleEncoding::WinAnsi
        );
        assert_eq!(SimpleEncoding::from_name("Custom"), SimpleEncoding::WinAnsi);
    }

    #[test]
    fn winansi_maps_smart_quotes() {
        let font = StandardFont::default();
        assert_eq!(
            decode(&font, &[ShowTextItem::Literal(br"\223hi\224")]),
            "\u{201C}hi\u{201D}"
        );
    }

    #[test]
    fn macroman_maps_accents() {
        let font = StandardFont::new(SimpleEncoding::MacRoman);
        assert_eq!(decode(&font, &[ShowTextItem::Hex(b"8E")]), "\u{e9}");
    }

    #[test]
    fn utf16_bom_overrides_encoding() {
        let font = StandardFont::new(SimpleEncoding::MacRoman);
        assert_eq!(decode(&font, &[ShowTextItem::Hex(b"FEFF00480069")]), "Hi");
    }

    // --- runs ---

    #[test]
    fn wide_kerning_inserts_space() {
        let font = StandardFont::default();
        let run = [
            ShowTextItem::Literal(b"Hello"),
            ShowTextItem::Adjustment(-250.0),
            ShowTextItem::Literal(b"World"),
        ];
        assert_eq!(decode(&font, &run), "Hello World");
    }

    #[test]
    fn narrow_kerning_joins() {
        let font = StandardFont::default();
        let run = [
            ShowTextItem::Literal(b"Hel"),
            ShowTextItem::Adjustment(-50.0),
            ShowTextItem::Literal(b"lo"),
            ShowTextItem::Adjustment(120.0),
        ];
        assert_eq!(decode(&font, &run), "Hello");
    }

    #[test]
    fn leading_kerning_adds_nothing() {
        let font = StandardFont::default().with_word_gap(10.0);
        let run = [ShowTextItem::Adjustment(-500.0), ShowTextItem::Literal(b"x")];
        assert_eq!(decode(&font, &run), "x");
    }
}
