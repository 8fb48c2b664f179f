use std::path::Path;

use pdftext::pdftext_parse::{LopdfDocument, Payload, SpanKind, Token, extract_spans, mask, tokenize};

use crate::shared::{read_pdf_bytes, resolve_pages};

pub fn run(file: &Path, pages: Option<&str>) -> Result<(), i32> {
    let bytes = read_pdf_bytes(file)?;
    let doc = LopdfDocument::load(&bytes).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })?;
    let page_indices = resolve_pages(pages, doc.page_count())?;

    for idx in page_indices {
        let content = doc.page_content(idx).map_err(|e| {
            eprintln!("Error reading page {}: {e}", idx + 1);
            1
        })?;
        println!("--- Page {} ---", idx + 1);

        let masked = mask(&content);
        for span in extract_spans(&content, &masked) {
            let kind = match span.kind {
                SpanKind::TextObject => "text",
                SpanKind::XObjectInvocation => "xobject",
            };
            println!("{kind} {}..{}", span.range.start, span.range.end);
            for token in tokenize(&span.raw) {
                print_token(&token, 1);
            }
        }
    }
    Ok(())
}

fn print_token(token: &Token, depth: usize) {
    let indent = "  ".repeat(depth);
    let operator = if token.operator.is_empty() {
        "-"
    } else {
        token.operator.as_str()
    };
    match &token.payload {
        Payload::Text(text) => {
            println!(
                "{indent}{:?} {operator} {}",
                token.kind,
                String::from_utf8_lossy(text).trim()
            );
        }
        Payload::Array(items) => {
            println!("{indent}{:?} {operator} [{}]", token.kind, items.len());
            for item in items {
                print_token(item, depth + 1);
            }
        }
    }
}
