//! Markup masking pre-pass.
//!
//! Produces a same-length copy of a content stream in which every payload
//! that could disguise an operator or a delimiter is overwritten with a
//! filler byte: escaped parentheses, inline image data, array interiors,
//! literal string interiors, hex strings and dictionaries, and marked-content
//! brackets. Offsets are preserved, so a region located in the masked copy
//! can be sliced out of the original.
//!
//! Unterminated constructs are left as they are.

use std::sync::LazyLock;

use regex::bytes::Regex;

/// Filler byte used by [`mask`].
pub const DEFAULT_FILLER: u8 = b'_';

static INLINE_IMAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s-u)(?:^|\s)(BI\s.*?\sID\s.*?\sEI)(?:\s|$)").ok());

/// Mask `content` with [`DEFAULT_FILLER`].
pub fn mask(content: &[u8]) -> Vec<u8> {
    mask_with(content, DEFAULT_FILLER)
}

/// Mask `content` with `filler`.
///
/// `filler` should be a regular character (not whitespace and not one of
/// `()<>[]{}/%`), otherwise masked regions may be read back as structure.
pub fn mask_with(content: &[u8], filler: u8) -> Vec<u8> {
    let mut out = content.to_vec();
    mask_escapes(&mut out, filler);
    mask_inline_images(&mut out, filler);
    mask_arrays(&mut out, filler);
    mask_strings(&mut out, filler);
    mask_angle_brackets(&mut out, filler);
    mask_marked_content(&mut out, filler);
    debug_assert_eq!(out.len(), content.len());
    out
}

fn fill(buf: &mut [u8], start: usize, end: usize, filler: u8) {
    for b in &mut buf[start..end] {
        *b = filler;
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// `\\`, then `\)`, then `\(`, each pass over the whole buffer.
fn mask_escapes(buf: &mut [u8], filler: u8) {
    for pair in [b"\\\\", b"\\)", b"\\("] {
        let mut i = 0;
        while i + 1 < buf.len() {
            if buf[i] == pair[0] && buf[i + 1] == pair[1] {
                fill(buf, i, i + 2, filler);
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

fn mask_inline_images(buf: &mut [u8], filler: u8) {
    let Some(re) = INLINE_IMAGE.as_ref() else {
        return;
    };
    let ranges: Vec<(usize, usize)> = re
        .captures_iter(buf)
        .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.end())))
        .collect();
    for (start, end) in ranges {
        fill(buf, start, end, filler);
    }
}

/// Index just past the `)` that balances the `(` at `open`, if any.
fn balanced_paren_end(buf: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in buf.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn mask_arrays(buf: &mut [u8], filler: u8) {
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            // Brackets inside a string outside any array are not structure.
            b'(' => match balanced_paren_end(buf, i) {
                Some(end) => i = end,
                None => return,
            },
            b'[' => {
                let mut j = i + 1;
                let mut close = None;
                while j < buf.len() {
                    match buf[j] {
                        b']' => {
                            close = Some(j);
                            break;
                        }
                        b'(' => match balanced_paren_end(buf, j) {
                            Some(end) => j = end,
                            None => break,
                        },
                        _ => j += 1,
                    }
                }
                match close {
                    Some(close) => {
                        fill(buf, i + 1, close, filler);
                        i = close + 1;
                    }
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }
}

fn mask_strings(buf: &mut [u8], filler: u8) {
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'(' {
            match balanced_paren_end(buf, i) {
                Some(end) => {
                    fill(buf, i + 1, end - 1, filler);
                    i = end;
                }
                None => return,
            }
        } else {
            i += 1;
        }
    }
}

/// Hex strings and dictionaries, delimiters included.
fn mask_angle_brackets(buf: &mut [u8], filler: u8) {
    let mut depth = 0usize;
    for b in buf.iter_mut() {
        match *b {
            b'<' => {
                depth += 1;
                *b = filler;
            }
            b'>' if depth > 0 => {
                depth -= 1;
                *b = filler;
            }
            _ if depth > 0 => *b = filler,
            _ => {}
        }
    }
}

fn is_keyword_at(buf: &[u8], at: usize, keyword: &[u8]) -> bool {
    buf[at..].starts_with(keyword)
        && buf
            .get(at + keyword.len())
            .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
}

/// `/Name … BDC` openers and whitespace-delimited `EMC` closers.
fn mask_marked_content(buf: &mut [u8], filler: u8) {
    let mut i = 0;
    while i + 3 <= buf.len() {
        if is_keyword_at(buf, i, b"BDC") {
            if let Some(start) = marked_content_name_start(buf, i, filler) {
                fill(buf, start, i + 3, filler);
            }
            i += 3;
        } else if is_keyword_at(buf, i, b"EMC") && (i == 0 || is_whitespace(buf[i - 1])) {
            fill(buf, i, i + 3, filler);
            i += 3;
        } else {
            i += 1;
        }
    }
}

/// Walk back from a `BDC` keyword over whitespace and filler to the `/` of
/// its tag name.
fn marked_content_name_start(buf: &[u8], keyword: usize, filler: u8) -> Option<usize> {
    let mut k = keyword;
    while k > 0 && (is_whitespace(buf[k - 1]) || buf[k - 1] == filler) {
        k -= 1;
    }
    while k > 0 && (buf[k - 1].is_ascii_alphanumeric() || buf[k - 1] == b'_') {
        k -= 1;
    }
    (k > 0 && buf[k - 1] == b'/').then(|| k - 1)
}
