use std::io::{self, IsTerminal, Write};
use std::path::Path;

use pdftext::{ExtractOptions, Pdf};

use crate::page_range::parse_page_range;

/// Read a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing or
/// unreadable.
pub fn read_pdf_bytes(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })
}

/// Open a PDF file for text extraction.
pub fn open_pdf(file: &Path, options: ExtractOptions) -> Result<Pdf, i32> {
    let bytes = read_pdf_bytes(file)?;
    Pdf::open(&bytes, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// If `pages` is `None`, returns all pages (0..page_count).
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Prints "Processing page N/M..." to stderr, only when stderr is a terminal.
pub struct ProgressReporter {
    total: usize,
    is_tty: bool,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Report progress for page `current` (1-indexed).
    pub fn report(&self, current: usize) {
        if self.is_tty {
            eprint!("\rProcessing page {}/{}...", current, self.total);
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line.
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(40));
            let _ = io::stderr().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_file_fails_with_code_1() {
        let result = read_pdf_bytes(Path::new("/nonexistent/file.pdf"));
        assert_eq!(result.unwrap_err(), 1);
    }

    #[test]
    fn open_non_pdf_fails_with_code_1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert_eq!(open_pdf(&path, ExtractOptions::default()).unwrap_err(), 1);
    }

    #[test]
    fn resolve_pages_none_returns_all() {
        assert_eq!(resolve_pages(None, 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn resolve_pages_with_range() {
        assert_eq!(resolve_pages(Some("1,3"), 5).unwrap(), vec![0, 2]);
    }

    #[test]
    fn resolve_pages_invalid_range() {
        assert_eq!(resolve_pages(Some("0"), 5).unwrap_err(), 1);
    }

    #[test]
    fn progress_reporter_creation() {
        let reporter = ProgressReporter::new(10);
        assert_eq!(reporter.total, 10);
    }
}
