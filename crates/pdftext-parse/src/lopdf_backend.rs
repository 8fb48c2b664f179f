//! lopdf-based document access.
//!
//! [`LopdfDocument`] loads a PDF with [lopdf](https://crates.io/crates/lopdf)
//! and hands out each page's decoded content stream and a [`LopdfResources`]
//! view of its resource dictionary.

use std::borrow::Cow;
use std::collections::HashMap;

use pdftext_core::{FontSubtype, ObjectKind, PdfError};
use tracing::debug;

use crate::error::BackendError;
use crate::resources::{FontDecoder, FormXObject, PageResources, XObject, XObjectId};
use crate::standard_font::{SimpleEncoding, StandardFont};

/// A loaded document with its page objects listed in page-tree order.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object ids in page order.
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse a document from memory.
    ///
    /// # Errors
    ///
    /// [`BackendError::Parse`] if lopdf cannot read the bytes, and
    /// [`PdfError::PasswordRequired`] if the document is encrypted.
    pub fn load(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(PdfError::PasswordRequired));
        }

        let page_ids = inner.get_pages().values().copied().collect();
        Ok(LopdfDocument { inner, page_ids })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    /// Decoded `/Contents` of a page. Multiple streams are joined with a
    /// space; a page without contents yields no bytes.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let dict = self
            .inner
            .get_object(self.page_id(index)?)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        Ok(content_stream_bytes(&self.inner, dict).unwrap_or_default())
    }

    /// Resources of a page, inherited from the page tree if the page has
    /// none of its own.
    pub fn page_resources(&self, index: usize) -> Result<LopdfResources<'_>, BackendError> {
        let dict = resolve_inherited(&self.inner, self.page_id(index)?, b"Resources")?
            .map(|obj| resolve_ref(&self.inner, obj))
            .and_then(|obj| obj.as_dict().ok());
        Ok(LopdfResources::new(&self.inner, dict))
    }
}

/// [`PageResources`] over a lopdf resource dictionary.
///
/// Every `/Font` entry is decoded with a [`StandardFont`] using the font's
/// declared simple encoding.
pub struct LopdfResources<'a> {
    doc: &'a lopdf::Document,
    dict: Option<&'a lopdf::Dictionary>,
    fonts: HashMap<String, StandardFont>,
}

impl std::fmt::Debug for LopdfResources<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fonts: Vec<&String> = self.fonts.keys().collect();
        fonts.sort();
        f.debug_struct("LopdfResources")
            .field("fonts", &fonts)
            .field("has_dict", &self.dict.is_some())
            .finish()
    }
}

impl<'a> LopdfResources<'a> {
    pub fn new(doc: &'a lopdf::Document, dict: Option<&'a lopdf::Dictionary>) -> Self {
        let fonts = dict.map(|d| load_fonts(doc, d)).unwrap_or_default();
        Self { doc, dict, fonts }
    }

    /// A named subdictionary such as `/Font` or `/XObject`.
    fn category(&self, key: &[u8]) -> Option<&'a lopdf::Dictionary> {
        let obj = self.dict?.get(key).ok()?;
        resolve_ref(self.doc, obj).as_dict().ok()
    }
}

impl PageResources for LopdfResources<'_> {
    fn font(&self, name: &str) -> Option<&dyn FontDecoder> {
        self.fonts.get(name).map(|f| f as &dyn FontDecoder)
    }

    fn xobject(&self, name: &str) -> Option<XObject<'_>> {
        let doc = self.doc;
        let entry = self.category(b"XObject")?.get(name.as_bytes()).ok()?;
        let id = entry.as_reference().ok()?;
        let stream = doc.get_object(id).and_then(|o| o.as_stream()).ok()?;

        let type_name = name_str(stream.dict.get(b"Type").ok()).unwrap_or("XObject");
        let subtype = name_str(stream.dict.get(b"Subtype").ok());
        match ObjectKind::classify(Some(type_name), subtype) {
            ObjectKind::XObjectForm => {
                let resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve_ref(doc, obj).as_dict().ok())
                    .map(|d| {
                        Box::new(LopdfResources::new(doc, Some(d))) as Box<dyn PageResources + '_>
                    });
                Some(XObject::Form(FormXObject {
                    id: XObjectId::from(id),
                    content: Cow::Owned(stream_bytes(stream).unwrap_or_default()),
                    resources,
                }))
            }
            ObjectKind::XObjectImage => Some(XObject::Image),
            kind => {
                debug!(name, ?kind, "Do target is not a form or image");
                None
            }
        }
    }
}

fn load_fonts(
    doc: &lopdf::Document,
    resources: &lopdf::Dictionary,
) -> HashMap<String, StandardFont> {
    let mut fonts = HashMap::new();
    let Some(font_dict) = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve_ref(doc, obj).as_dict().ok())
    else {
        return fonts;
    };

    for (name, obj) in font_dict.iter() {
        let Ok(dict) = resolve_ref(doc, obj).as_dict() else {
            continue;
        };
        let name = String::from_utf8_lossy(name).into_owned();
        let subtype = FontSubtype::from_name(name_str(dict.get(b"Subtype").ok()));
        if !subtype.is_simple() {
            debug!(font = %name, ?subtype, "non-simple font read as single-byte");
        }
        fonts.insert(name, StandardFont::new(font_encoding(doc, dict)));
    }
    fonts
}

/// `/Encoding` of a font dictionary: a name, or an encoding dictionary's
/// `/BaseEncoding`.
fn font_encoding(doc: &lopdf::Document, font: &lopdf::Dictionary) -> SimpleEncoding {
    let Ok(obj) = font.get(b"Encoding") else {
        return SimpleEncoding::default();
    };
    let obj = resolve_ref(doc, obj);
    let name = match obj.as_dict() {
        Ok(dict) => name_str(dict.get(b"BaseEncoding").ok()),
        Err(_) => name_str(Some(obj)),
    };
    name.map(SimpleEncoding::from_name).unwrap_or_default()
}

fn name_str(obj: Option<&lopdf::Object>) -> Option<&str> {
    obj.and_then(|o| o.as_name().ok())
        .and_then(|n| std::str::from_utf8(n).ok())
}

/// Value of `key` on the page, or on the nearest `/Parent` that has it
/// (`/Resources` is inheritable).
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    loop {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page tree node: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decompressed stream content, falling back to the raw bytes.
fn stream_bytes(stream: &lopdf::Stream) -> Option<Vec<u8>> {
    stream
        .decompressed_content()
        .ok()
        .or_else(|| Some(stream.content.clone()))
        .filter(|b| !b.is_empty())
}

fn content_stream_bytes(doc: &lopdf::Document, page: &lopdf::Dictionary) -> Option<Vec<u8>> {
    let contents = resolve_ref(doc, page.get(b"Contents").ok()?);

    match contents {
        lopdf::Object::Stream(stream) => stream_bytes(stream),
        lopdf::Object::Array(parts) => {
            let mut joined = Vec::new();
            for part in parts {
                if let Some(bytes) = resolve_ref(doc, part).as_stream().ok().and_then(stream_bytes) {
                    joined.extend_from_slice(&bytes);
                    joined.push(b' ');
                }
            }
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}
