//! Text-state interpreter.
//!
//! Drives the whole pipeline for one content stream: masks it, extracts
//! spans, tokenizes each span and applies the text operators to a
//! [`CursorState`], laying decoded glyph runs out in a [`LineBuffer`]. Form
//! XObjects invoked with `Do` are interpreted recursively with a fresh state;
//! the form's text lands as its own line entry at the current text-line
//! point and is ordered by row assembly like any other entry.
//!
//! Operators other than the text positioning and showing operators (color,
//! clipping, graphics state, marked content) are ignored.

use pdftext_core::{
    ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, LineBuffer, PdfError, Point,
};
use tracing::{debug, trace};

use crate::error::BackendError;
use crate::mask::mask;
use crate::resources::{FormXObject, PageResources, ShowTextItem, XObject, XObjectId};
use crate::span::extract_spans;
use crate::text_state::{CursorState, truncate_hundredths};
use crate::tokenizer::{Token, TokenKind, parse_number, tokenize};

/// Extract reading-order text from one decoded content stream.
///
/// Lines are separated by `\n`; runs detected as superscripts are wrapped in
/// the configured markers (`<sup>…</sup>` by default).
///
/// # Errors
///
/// Fails only when interpretation cannot terminate or exceeds a hard limit:
/// a Form XObject cycle, form nesting deeper than
/// [`ExtractOptions::max_recursion_depth`], or a stream larger than
/// [`ExtractOptions::max_stream_bytes`]. Malformed content, missing fonts and
/// missing XObjects produce warnings instead.
pub fn extract_text(
    content: &[u8],
    resources: &dyn PageResources,
    options: &ExtractOptions,
) -> Result<ExtractResult<String>, BackendError> {
    let mut interpreter = Interpreter::new(options);
    let text = interpreter.run(content, resources)?;
    Ok(ExtractResult::new(text, interpreter.warnings))
}

struct Interpreter<'o> {
    options: &'o ExtractOptions,
    warnings: Vec<ExtractWarning>,
    /// Forms currently being interpreted, outermost first.
    form_stack: Vec<XObjectId>,
    spans_seen: usize,
    span_limit_hit: bool,
}

impl<'o> Interpreter<'o> {
    fn new(options: &'o ExtractOptions) -> Self {
        Self {
            options,
            warnings: Vec::new(),
            form_stack: Vec::new(),
            spans_seen: 0,
            span_limit_hit: false,
        }
    }

    fn warn(&mut self, warning: ExtractWarning) {
        if self.options.collect_warnings {
            self.warnings.push(warning);
        }
    }

    /// Interpret one content stream at the current nesting level.
    fn run(&mut self, content: &[u8], resources: &dyn PageResources) -> Result<String, BackendError> {
        if content.len() > self.options.max_stream_bytes {
            debug!(
                len = content.len(),
                limit = self.options.max_stream_bytes,
                "content stream exceeds max_stream_bytes"
            );
            return Err(BackendError::Core(PdfError::ResourceLimitExceeded {
                limit_name: "max_stream_bytes".to_string(),
                limit_value: self.options.max_stream_bytes,
                actual_value: content.len(),
            }));
        }

        let masked = mask(content);
        let spans = extract_spans(content, &masked);
        trace!(
            spans = spans.len(),
            depth = self.form_stack.len(),
            "extracted spans"
        );

        let options = self.options;
        let mut state = CursorState::new();
        let mut lines = LineBuffer::new(options.layout.key_epsilon);

        for span in &spans {
            if let Some(max) = options.max_spans {
                if self.spans_seen >= max {
                    if !self.span_limit_hit {
                        self.span_limit_hit = true;
                        debug!(limit = max, "max_spans reached, skipping remaining spans");
                        self.warn(ExtractWarning::with_code(
                            ExtractWarningCode::ResourceLimitReached,
                            format!("span limit of {max} reached, remaining content skipped"),
                        ));
                    }
                    break;
                }
            }
            self.spans_seen += 1;

            let tokens = tokenize(&span.raw);
            if tokens.last().is_some_and(|t| t.range.end < span.raw.len())
                || (tokens.is_empty() && !span.raw.iter().all(u8::is_ascii_whitespace))
            {
                self.warn(ExtractWarning::with_code(
                    ExtractWarningCode::MalformedContent,
                    format!(
                        "unparsable content at offset {} skipped",
                        span.range.start + tokens.last().map_or(0, |t| t.range.end)
                    ),
                ));
            }
            for (index, token) in tokens.iter().enumerate() {
                self.apply(token, index, &mut state, &mut lines, resources)?;
            }
        }

        Ok(lines.assemble(options.layout.row_threshold))
    }

    fn apply<'r>(
        &mut self,
        token: &Token,
        index: usize,
        state: &mut CursorState<'r>,
        lines: &mut LineBuffer,
        resources: &'r dyn PageResources,
    ) -> Result<(), BackendError> {
        let options = self.options;
        let layout = &options.layout;
        match token.operator.as_str() {
            "Tf" => self.set_font(token, index, state, resources),
            "Td" => {
                let Some((x, y)) = token.trailing_pair() else {
                    return Ok(());
                };
                let y = truncate_hundredths(y);
                let breaks = x <= 0.0 || state.prior_line_position.is_some_and(|p| y < p.y);
                if breaks {
                    state.text_line = Point::new(0.0, state.text_line.y - layout.td_line_height);
                    trace!(y = state.text_line.y, "Td line break");
                    lines.new_line("", state.text_line);
                }
                state.prior_line_position = Some(Point::new(x, y));
                state.pending_leading_delta = 0.0;
            }
            "TD" => {
                let Some((x, y)) = token.trailing_pair() else {
                    return Ok(());
                };
                if lines.is_empty() {
                    state.text_line = Point::new(x, y);
                    lines.new_line("", state.text_line);
                }
                state.pending_leading_delta = if y > 0.0 { y } else { 0.0 };
                if y < 0.0 {
                    state.text_line = state.text_line.offset(x, y);
                    lines.new_line("", state.text_line);
                } else if x <= 0.0 {
                    lines.append_to_line(" ", state.text_line);
                }
            }
            "Tm" => {
                let Some((x, y)) = token.trailing_pair() else {
                    return Ok(());
                };
                let y_delta = y - state.text_line.y;
                state.last_y_delta = y_delta;
                if state.font_shrank_for_superscript(layout)
                    && layout.superscript_rise_band.contains(y_delta)
                {
                    trace!(y_delta, "superscript shift, staying on line");
                } else {
                    lines.new_line("", Point::new(x, y));
                }
                state.text_line = Point::new(x, y);
                state.pending_leading_delta = 0.0;
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let items = show_text_items(token);
                let text = match state.font {
                    Some(font) => font.decode_text(&items),
                    None => raw_text(&items),
                };
                let text = if !text.trim().is_empty() && state.superscript_active(layout) {
                    trace!(text = %text, "superscript run");
                    layout.wrap_superscript(&text)
                } else {
                    text
                };
                lines.append_to_line(&text, state.text_line);
            }
            "TL" => lines.append_to_line(" ", state.text_line),
            "Tz" | "T*" => {
                state.text_line.y -= layout.next_line_height;
                lines.new_line("", Point::new(0.0, state.text_line.y));
                state.pending_leading_delta = 0.0;
            }
            "Do" => {
                let Some(name) = resource_name(token) else {
                    return Ok(());
                };
                match resources.xobject(&name) {
                    Some(XObject::Form(form)) => {
                        let text = self.run_form(&name, form, resources)?;
                        if !text.is_empty() {
                            lines.new_line(text, state.text_line);
                        }
                    }
                    Some(XObject::Image) => {}
                    None => {
                        debug!(name = %name, "XObject not found in resources");
                        self.warn(
                            ExtractWarning::with_code(
                                ExtractWarningCode::MissingXObject,
                                format!("XObject /{name} not found"),
                            )
                            .at_operator(index),
                        );
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn set_font<'r>(
        &mut self,
        token: &Token,
        index: usize,
        state: &mut CursorState<'r>,
        resources: &'r dyn PageResources,
    ) {
        let operands = token.operands();
        let size_operand = match token.kind {
            TokenKind::Name => operands.get(1),
            _ => operands.last(),
        };
        let size = size_operand.map_or(state.font_size, |s| parse_number(s));
        state.set_font_size(size);

        let Some(name) = resource_name(token) else {
            return;
        };
        state.font = resources.font(&name);
        if state.font.is_none() {
            debug!(font = %name, "font not found in resources");
            self.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::MissingFont,
                    format!("font /{name} not found, showing raw text"),
                )
                .at_operator(index)
                .for_font(name.clone()),
            );
        }
        state.font_name = Some(name);
    }

    fn run_form(
        &mut self,
        name: &str,
        form: FormXObject<'_>,
        resources: &dyn PageResources,
    ) -> Result<String, BackendError> {
        if self.form_stack.contains(&form.id) {
            debug!(name, "Form XObject cycle");
            return Err(BackendError::XObjectCycle {
                name: name.to_string(),
            });
        }
        let max = self.options.max_recursion_depth;
        if self.form_stack.len() >= max {
            debug!(name, limit = max, "Form XObject nesting too deep");
            return Err(BackendError::Interpreter(format!(
                "Form XObject recursion depth {} exceeds limit {}",
                self.form_stack.len() + 1,
                max
            )));
        }

        let inner: &dyn PageResources = match &form.resources {
            Some(own) => own.as_ref(),
            None => resources,
        };
        self.form_stack.push(form.id);
        let result = self.run(&form.content, inner);
        self.form_stack.pop();
        result
    }
}

/// The resource name operand of a `/Name … op` token.
fn resource_name(token: &Token) -> Option<String> {
    if token.kind != TokenKind::Name {
        return None;
    }
    token
        .operands()
        .first()
        .map(|name| String::from_utf8_lossy(name).into_owned())
}

fn show_text_items(token: &Token) -> Vec<ShowTextItem<'_>> {
    let mut items = Vec::new();
    push_show_items(token, &mut items);
    if token.kind == TokenKind::Array {
        items.clear();
        for element in token.items() {
            push_show_items(element, &mut items);
        }
    }
    items
}

fn push_show_items<'t>(token: &'t Token, items: &mut Vec<ShowTextItem<'t>>) {
    match token.kind {
        TokenKind::StringLiteral => items.push(ShowTextItem::Literal(token.text())),
        TokenKind::HexString => items.push(ShowTextItem::Hex(token.text())),
        TokenKind::Number => items.extend(token.numbers().into_iter().map(ShowTextItem::Adjustment)),
        _ => {}
    }
}

/// Undecoded string payloads, used when no font is selected.
fn raw_text(items: &[ShowTextItem<'_>]) -> String {
    let mut bytes = Vec::new();
    for item in items {
        if let ShowTextItem::Literal(raw) | ShowTextItem::Hex(raw) = item {
            bytes.extend_from_slice(raw);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
