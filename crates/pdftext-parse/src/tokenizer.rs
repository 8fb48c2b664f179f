//! Content stream tokenizer for text extraction.
//!
//! Turns one span of raw content stream bytes into [`Token`]s, each pairing
//! an operator (possibly empty) with the operand text or nested array that
//! preceded it. Arrays are scanned recursively over one shared [`Cursor`], so
//! no byte is read twice.
//!
//! Tokenizing never fails: when no pattern matches, scanning stops and the
//! tokens found so far are returned.

use std::ops::Range;

/// Arrays nested deeper than this stop the scan.
pub const MAX_ARRAY_DEPTH: usize = 32;

/// Syntactic class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `/Name`, optionally followed by a number and an operator.
    Name,
    /// `[ … ]`, optionally followed by an operator.
    Array,
    /// `<< … >>`, optionally followed by an operator.
    Dict,
    /// `( … )`, optionally followed by an operator.
    StringLiteral,
    /// `< … >`, optionally followed by an operator.
    HexString,
    /// A run of numbers, optionally followed by an operator.
    Number,
    /// An operator with no operands.
    BareOperator,
}

/// Operand data of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw operand bytes. String payloads keep their escapes.
    Text(Vec<u8>),
    /// Elements of an array.
    Array(Vec<Token>),
}

/// One operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Operator name, empty for bare operands.
    pub operator: String,
    pub payload: Payload,
    /// Source bytes of this token, including surrounding whitespace.
    pub range: Range<usize>,
}

impl Token {
    /// Raw text payload, or an empty slice for arrays.
    pub fn text(&self) -> &[u8] {
        match &self.payload {
            Payload::Text(bytes) => bytes,
            Payload::Array(_) => &[],
        }
    }

    /// Array elements, or an empty slice for text payloads.
    pub fn items(&self) -> &[Token] {
        match &self.payload {
            Payload::Array(items) => items,
            Payload::Text(_) => &[],
        }
    }

    /// Whitespace-separated words of the text payload.
    pub fn operands(&self) -> Vec<&[u8]> {
        self.text()
            .split(|&b| is_whitespace(b))
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Operands read as numbers; unparsable operands read as `0`.
    pub fn numbers(&self) -> Vec<f64> {
        self.operands().into_iter().map(parse_number).collect()
    }

    /// The last two operands as `(x, y)`.
    pub fn trailing_pair(&self) -> Option<(f64, f64)> {
        let numbers = self.numbers();
        match numbers.as_slice() {
            [.., x, y] => Some((*x, *y)),
            _ => None,
        }
    }

    /// The bytes this token was read from.
    pub fn source<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.range.clone()]
    }
}

/// Read a PDF number from its longest well-formed prefix: an optional sign,
/// digits, and at most one `.` followed by digits.
///
/// Returns `0.0` when there is no such prefix or it overflows.
pub fn parse_number(bytes: &[u8]) -> f64 {
    let digits_from = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }

    std::str::from_utf8(&bytes[..end])
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Scan position over one span, shared by nested array scans.
struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    /// Set once a scan level gives up; every level then unwinds.
    halted: bool,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            halted: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Skip whitespace, returning how many bytes were skipped.
    fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn at_boundary(&self) -> bool {
        self.peek().is_none_or(|b| is_whitespace(b) || is_delimiter(b))
    }

    fn at_keyword(&self, keyword: &[u8]) -> bool {
        self.input[self.pos..].starts_with(keyword)
            && self
                .input
                .get(self.pos + keyword.len())
                .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
    }

    /// Read a keyword of `1..=max_len` bytes ending at a boundary. On failure
    /// the cursor is left where it was.
    fn keyword(
        &mut self,
        max_len: usize,
        first: impl Fn(u8) -> bool,
        rest: impl Fn(u8) -> bool,
    ) -> Option<String> {
        let save = self.pos;
        if !self.peek().is_some_and(&first) {
            return None;
        }
        self.pos += 1;
        self.take_while(&rest);
        let word = &self.input[save..self.pos];
        if word.len() > max_len || !self.at_boundary() {
            self.pos = save;
            return None;
        }
        Some(String::from_utf8_lossy(word).into_owned())
    }

    /// An operator after optional whitespace. On failure the cursor is left
    /// where it was.
    fn trailing_operator(
        &mut self,
        max_len: usize,
        require_space: bool,
        first: impl Fn(u8) -> bool,
        rest: impl Fn(u8) -> bool,
    ) -> Option<String> {
        let save = self.pos;
        let skipped = self.skip_whitespace();
        if require_space && skipped == 0 {
            self.pos = save;
            return None;
        }
        match self.keyword(max_len, first, rest) {
            Some(op) => Some(op),
            None => {
                self.pos = save;
                None
            }
        }
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

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn is_numeric(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-')
}

fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_show_operator_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'\'' | b'"')
}

fn is_bare_operator_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'*' | b'\'' | b'"')
}

/// Tokenize one span.
pub fn tokenize(input: &[u8]) -> Vec<Token> {
    let mut cursor = Cursor::new(input);
    scan_sequence(&mut cursor, 0)
}

/// Scan tokens until the input ends, a `]` closes the current array, or no
/// pattern matches.
fn scan_sequence(cursor: &mut Cursor<'_>, depth: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    while !cursor.halted {
        let start = cursor.pos;
        cursor.skip_whitespace();
        let Some(b) = cursor.peek() else {
            break;
        };

        let scanned = match b {
            b'/' => scan_name(cursor),
            b'[' => scan_array(cursor, depth),
            b']' => {
                cursor.pos += 1;
                if depth == 0 {
                    cursor.halted = true;
                }
                break;
            }
            b'<' if cursor.peek_at(1) == Some(b'<') => scan_dict(cursor),
            b'<' => scan_hex(cursor),
            b'(' => scan_string(cursor),
            _ => scan_operands(cursor),
        };

        match scanned {
            Some(mut token) => {
                cursor.skip_whitespace();
                token.range = start..cursor.pos;
                tokens.push(token);
            }
            None => {
                cursor.halted = true;
            }
        }
    }
    tokens
}

fn token(kind: TokenKind, operator: String, payload: Payload) -> Token {
    Token {
        kind,
        operator,
        payload,
        range: 0..0,
    }
}

/// `/Name number op`, `/Name op`, or a bare `/Name`.
fn scan_name(cursor: &mut Cursor<'_>) -> Option<Token> {
    cursor.pos += 1;
    let name = cursor.take_while(is_regular);
    if name.is_empty() {
        return None;
    }
    let after_name = cursor.pos;

    if cursor.skip_whitespace() > 0 {
        let number = cursor.take_while(is_numeric);
        if !number.is_empty() && cursor.at_boundary() {
            if let Some(op) = cursor.trailing_operator(usize::MAX, true, is_letter, is_letter) {
                let mut payload = name.to_vec();
                payload.push(b' ');
                payload.extend_from_slice(number);
                return Some(token(TokenKind::Name, op, Payload::Text(payload)));
            }
        }
    }

    cursor.pos = after_name;
    let op = cursor
        .trailing_operator(usize::MAX, true, is_letter, is_letter)
        .unwrap_or_default();
    Some(token(TokenKind::Name, op, Payload::Text(name.to_vec())))
}

fn scan_array(cursor: &mut Cursor<'_>, depth: usize) -> Option<Token> {
    if depth >= MAX_ARRAY_DEPTH {
        return None;
    }
    cursor.pos += 1;
    let items = scan_sequence(cursor, depth + 1);
    let op = if cursor.halted {
        String::new()
    } else {
        cursor
            .trailing_operator(2, false, is_letter, is_letter)
            .unwrap_or_default()
    };
    Some(token(TokenKind::Array, op, Payload::Array(items)))
}

/// `<< … >>` with nesting. Hex strings and literal strings inside are
/// skipped whole.
fn scan_dict(cursor: &mut Cursor<'_>) -> Option<Token> {
    let input = cursor.input;
    let body_start = cursor.pos + 2;
    let mut i = body_start;
    let mut depth = 1usize;
    let mut body_end = None;

    while i < input.len() {
        match input[i] {
            b'<' if input.get(i + 1) == Some(&b'<') => {
                depth += 1;
                i += 2;
            }
            b'<' => {
                i = input[i..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(input.len(), |p| i + p + 1);
            }
            b'>' if input.get(i + 1) == Some(&b'>') => {
                depth -= 1;
                if depth == 0 {
                    body_end = Some(i);
                    break;
                }
                i += 2;
            }
            b'(' => i = literal_string_end(input, i).map_or(input.len(), |(_, end)| end),
            _ => i += 1,
        }
    }

    let Some(body_end) = body_end else {
        cursor.pos = input.len();
        return Some(token(
            TokenKind::Dict,
            String::new(),
            Payload::Text(input[body_start.min(input.len())..].to_vec()),
        ));
    };
    cursor.pos = body_end + 2;
    let op = cursor
        .trailing_operator(3, false, is_letter, is_letter)
        .unwrap_or_default();
    Some(token(
        TokenKind::Dict,
        op,
        Payload::Text(input[body_start..body_end].to_vec()),
    ))
}

fn scan_hex(cursor: &mut Cursor<'_>) -> Option<Token> {
    let input = cursor.input;
    let body_start = cursor.pos + 1;
    match input[body_start..].iter().position(|&b| b == b'>') {
        Some(p) => {
            let body_end = body_start + p;
            cursor.pos = body_end + 1;
            let op = cursor
                .trailing_operator(2, false, is_letter, is_letter)
                .unwrap_or_default();
            Some(token(
                TokenKind::HexString,
                op,
                Payload::Text(input[body_start..body_end].to_vec()),
            ))
        }
        None => {
            cursor.pos = input.len();
            Some(token(
                TokenKind::HexString,
                String::new(),
                Payload::Text(input[body_start..].to_vec()),
            ))
        }
    }
}

/// Body range end and index past the closing `)` of the literal string
/// opening at `open`. Backslash escapes the following byte.
fn literal_string_end(input: &[u8], open: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = open + 1;
    while i < input.len() {
        match input[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((i, i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn scan_string(cursor: &mut Cursor<'_>) -> Option<Token> {
    let input = cursor.input;
    let body_start = cursor.pos + 1;
    match literal_string_end(input, cursor.pos) {
        Some((body_end, next)) => {
            cursor.pos = next;
            let op = cursor
                .trailing_operator(2, false, is_show_operator_byte, is_show_operator_byte)
                .unwrap_or_default();
            Some(token(
                TokenKind::StringLiteral,
                op,
                Payload::Text(input[body_start..body_end].to_vec()),
            ))
        }
        None => {
            cursor.pos = input.len();
            Some(token(
                TokenKind::StringLiteral,
                String::new(),
                Payload::Text(input[body_start..].to_vec()),
            ))
        }
    }
}

/// `N N N op`, a bare numeric run, or a bare operator.
fn scan_operands(cursor: &mut Cursor<'_>) -> Option<Token> {
    if cursor.at_keyword(b"ET") {
        return None;
    }

    if cursor.peek().is_some_and(is_numeric) {
        let start = cursor.pos;
        let mut end;
        loop {
            cursor.take_while(is_numeric);
            end = cursor.pos;
            if cursor.skip_whitespace() > 0 && cursor.peek().is_some_and(is_numeric) {
                continue;
            }
            cursor.pos = end;
            break;
        }
        let data = cursor.input[start..end].to_vec();
        let op = cursor
            .trailing_operator(
                3,
                true,
                is_letter,
                |b: u8| b.is_ascii_alphanumeric() || b == b'*',
            )
            .unwrap_or_default();
        return Some(token(TokenKind::Number, op, Payload::Text(data)));
    }

    let op = cursor.keyword(usize::MAX, is_bare_operator_byte, is_bare_operator_byte)?;
    Some(token(TokenKind::BareOperator, op, Payload::Text(Vec::new())))
}
