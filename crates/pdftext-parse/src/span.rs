//! Text-object and XObject-invocation span extraction.

use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;

static MARKED_CONTENT_WRAPPER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s-u)(/[A-Za-z0-9]+\s*<<.*?)(>>\s*BDC)(.*?)(EMC\s+)").ok()
});

/// What a [`Span`] was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// The body of a `BT … ET` text object.
    TextObject,
    /// A `/Name Do` invocation.
    XObjectInvocation,
}

/// A region of the original content stream to be tokenized.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub kind: SpanKind,
    /// Bytes of the original stream, with marked-content wrappers removed
    /// from text objects.
    pub raw: Vec<u8>,
    /// Location of the region in the original stream.
    pub range: Range<usize>,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b)
        && !matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
}

fn is_xobject_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_')
}

/// Next run of regular characters at or after `pos`.
fn next_word(masked: &[u8], pos: &mut usize) -> Option<Range<usize>> {
    while *pos < masked.len() && !is_regular(masked[*pos]) {
        *pos += 1;
    }
    if *pos >= masked.len() {
        return None;
    }
    let start = *pos;
    while *pos < masked.len() && is_regular(masked[*pos]) {
        *pos += 1;
    }
    Some(start..*pos)
}

/// Start of the `/Name` operand directly preceding the word at `word`, if
/// only whitespace separates them.
fn preceding_name(masked: &[u8], prev: &Range<usize>, word: &Range<usize>) -> Option<usize> {
    if prev.start == 0 || masked[prev.start - 1] != b'/' {
        return None;
    }
    if !masked[prev.clone()].iter().all(|&b| is_xobject_name_byte(b)) {
        return None;
    }
    if !masked[prev.end..word.start].iter().all(|&b| is_whitespace(b)) {
        return None;
    }
    Some(prev.start - 1)
}

/// Locate text objects and XObject invocations in `masked` and cut the
/// matching regions out of `original`.
///
/// `masked` must be the output of [`mask`](crate::mask::mask) for
/// `original`. Spans come out in document order. A `BT` without a closing
/// `ET` ends the scan. `Do` invocations inside a text object stay part of that
/// object's span.
pub fn extract_spans(original: &[u8], masked: &[u8]) -> Vec<Span> {
    debug_assert_eq!(original.len(), masked.len());
    let len = original.len().min(masked.len());
    let masked = &masked[..len];

    let mut spans = Vec::new();
    let mut pos = 0;
    let mut prev: Option<Range<usize>> = None;

    while let Some(word) = next_word(masked, &mut pos) {
        match &masked[word.clone()] {
            b"BT" => {
                let body_start = word.end;
                let mut close = None;
                while let Some(inner) = next_word(masked, &mut pos) {
                    if &masked[inner.clone()] == b"ET" {
                        close = Some(inner);
                        break;
                    }
                }
                let Some(close) = close else {
                    break;
                };
                if let Some(span) = text_object(original, body_start..close.start) {
                    spans.push(span);
                }
                prev = None;
                continue;
            }
            b"Do" => {
                if let Some(start) = prev
                    .as_ref()
                    .and_then(|prev| preceding_name(masked, prev, &word))
                {
                    spans.push(Span {
                        kind: SpanKind::XObjectInvocation,
                        raw: original[start..word.end].to_vec(),
                        range: start..word.end,
                    });
                }
            }
            _ => {}
        }
        prev = Some(word);
    }

    spans
}

fn text_object(original: &[u8], range: Range<usize>) -> Option<Span> {
    let body = &original[range.clone()];
    if body.iter().all(|&b| is_whitespace(b)) {
        return None;
    }
    Some(Span {
        kind: SpanKind::TextObject,
        raw: strip_marked_content(body),
        range,
    })
}

/// Keep only the content between `/Tag <<…>> BDC` and `EMC`.
fn strip_marked_content(body: &[u8]) -> Vec<u8> {
    let Some(re) = MARKED_CONTENT_WRAPPER.as_ref() else {
        return body.to_vec();
    };
    let mut padded = body.to_vec();
    padded.push(b' ');
    re.replace_all(&padded, &b"$3"[..]).into_owned()
}
