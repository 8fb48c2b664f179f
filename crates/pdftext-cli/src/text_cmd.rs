use std::path::Path;

use pdftext::ExtractOptions;

use crate::cli::TextFormat;
use crate::shared::{ProgressReporter, open_pdf, resolve_pages};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    format: &TextFormat,
    max_depth: usize,
    max_spans: Option<usize>,
) -> Result<(), i32> {
    let options = ExtractOptions {
        max_recursion_depth: max_depth,
        max_spans,
        ..ExtractOptions::default()
    };
    let pdf = open_pdf(file, options)?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;
    let progress = ProgressReporter::new(page_indices.len());

    for (i, &idx) in page_indices.iter().enumerate() {
        progress.report(i + 1);

        let page = pdf.page(idx).map_err(|e| {
            progress.finish();
            eprintln!("Error reading page {}: {e}", idx + 1);
            1
        })?;

        match format {
            TextFormat::Text => {
                println!("--- Page {} ---", idx + 1);
                println!("{}", page.text());
            }
            TextFormat::Json => {
                let obj = serde_json::json!({
                    "page": idx + 1,
                    "text": page.text(),
                    "warnings": page.warnings(),
                });
                println!("{obj}");
            }
        }
    }

    progress.finish();
    Ok(())
}
