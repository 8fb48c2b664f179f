//! Page type holding the extracted text of one PDF page.

use pdftext_core::ExtractWarning;

/// Text and warnings extracted from a single page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Page {
    /// Page index (0-based).
    index: usize,
    text: String,
    warnings: Vec<ExtractWarning>,
}

impl Page {
    pub fn new(index: usize, text: String, warnings: Vec<ExtractWarning>) -> Self {
        Self {
            index,
            text,
            warnings,
        }
    }

    /// Page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Reading-order text, rows separated by `\n`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Non-fatal problems met while extracting this page.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdftext_core::ExtractWarningCode;

    #[test]
    fn accessors() {
        let warning = ExtractWarning::with_code(ExtractWarningCode::MissingFont, "font /F2");
        let page = Page::new(2, "a\nb".to_string(), vec![warning.clone()]);
        assert_eq!(page.index(), 2);
        assert_eq!(page.text(), "a\nb");
        assert_eq!(page.warnings(), &[warning]);
    }
}
