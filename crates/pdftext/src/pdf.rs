//! Top-level PDF document type for opening documents and extracting page text.

use pdftext_core::{ExtractOptions, PdfError};
use pdftext_parse::{LopdfDocument, extract_text};
use tracing::debug;

use crate::Page;

/// Iterator over pages of a PDF document, extracting each page on demand.
///
/// Created by [`Pdf::pages_iter()`]. Pages are not retained after being
/// yielded.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    current: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<Page, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let result = self.pdf.page(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A PDF document opened for text extraction.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(&bytes, None)?;
/// for page in pdf.pages_iter() {
///     let page = page?;
///     println!("{}", page.text());
/// }
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("page_count", &self.page_count())
            .field("options", &self.options)
            .finish()
    }
}

impl Pdf {
    /// Read the file at `path` and open it as a PDF.
    ///
    /// Convenience wrapper around [`Pdf::open`] that reads the file into
    /// memory first.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read, otherwise
    /// the errors of [`Pdf::open`].
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes, options)
    }

    /// Open an in-memory PDF.
    ///
    /// `options` bounds the work done per page; `None` uses the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PasswordRequired`] if the PDF is encrypted, and
    /// [`PdfError::ParseError`] if the bytes are not a readable PDF.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let doc = LopdfDocument::load(bytes)?;
        debug!(pages = doc.page_count(), "opened PDF");
        Ok(Self {
            doc,
            options: options.unwrap_or_default(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the text of a page by 0-based index.
    ///
    /// Warnings are tagged with the page index.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the index is out of range, a Form XObject
    /// cycle or the recursion limit is hit, or the content stream exceeds
    /// [`ExtractOptions::max_stream_bytes`].
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        let content = self.doc.page_content(index)?;
        let resources = self.doc.page_resources(index)?;
        let result = extract_text(&content, &resources, &self.options)?;
        let warnings = result
            .warnings
            .into_iter()
            .map(|w| w.on_page(index))
            .collect();
        Ok(Page::new(index, result.value, warnings))
    }

    /// Iterate over all pages in order.
    pub fn pages_iter(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            current: 0,
            count: self.page_count(),
        }
    }

    /// Extract all pages in parallel using rayon, ordered by page index.
    #[cfg(feature = "parallel")]
    pub fn pages_parallel(&self) -> Vec<Result<Page, PdfError>> {
        use rayon::prelude::*;

        (0..self.page_count())
            .into_par_iter()
            .map(|i| self.page(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Object, Stream, dictionary};

    fn single_page(content: &[u8]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    #[test]
    fn open_and_extract() {
        let pdf = Pdf::open(&single_page(b"BT /F1 12 Tf 72 700 Td (Hi) Tj ET"), None).unwrap();
        assert_eq!(pdf.page_count(), 1);
        let page = pdf.page(0).unwrap();
        assert_eq!(page.text(), "Hi");
        assert_eq!(page.index(), 0);
    }

    #[test]
    fn open_invalid_bytes() {
        let err = Pdf::open(b"garbage", None).unwrap_err();
        assert!(matches!(err, PdfError::ParseError(_)));
    }

    #[test]
    fn page_out_of_range() {
        let pdf = Pdf::open(&single_page(b""), None).unwrap();
        assert!(matches!(pdf.page(3), Err(PdfError::ParseError(_))));
    }

    #[test]
    fn warnings_carry_page_index() {
        let pdf = Pdf::open(&single_page(b"BT /F7 12 Tf (x) Tj ET"), None).unwrap();
        let page = pdf.page(0).unwrap();
        assert_eq!(page.warnings().len(), 1);
        assert_eq!(page.warnings()[0].page, Some(0));
    }

    #[test]
    fn options_are_applied() {
        let options = ExtractOptions {
            max_stream_bytes: 4,
            ..ExtractOptions::default()
        };
        let pdf = Pdf::open(&single_page(b"BT (long) Tj ET"), Some(options)).unwrap();
        assert_eq!(pdf.options().max_stream_bytes, 4);
        assert!(matches!(
            pdf.page(0),
            Err(PdfError::ResourceLimitExceeded { .. })
        ));
    }

    #[test]
    fn pages_iter_is_exact_size() {
        let pdf = Pdf::open(&single_page(b"BT (a) Tj ET"), None).unwrap();
        let mut iter = pdf.pages_iter();
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next().unwrap().unwrap().text(), "a");
        assert!(iter.next().is_none());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let pdf = Pdf::open(&single_page(b"BT /F1 12 Tf (par) Tj ET"), None).unwrap();
        let parallel = pdf.pages_parallel();
        assert_eq!(parallel.len(), 1);
        assert_eq!(parallel[0].as_ref().unwrap(), &pdf.page(0).unwrap());
    }
}
