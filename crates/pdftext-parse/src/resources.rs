//! Lookup services the interpreter needs from the surrounding document.
//!
//! [`PageResources`] resolves the resource names used by `Tf` and `Do`;
//! [`FontDecoder`] turns raw show-text operands into Unicode.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// One element of a show-text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShowTextItem<'a> {
    /// Literal string payload, escapes still in place.
    Literal(&'a [u8]),
    /// Hex string payload, digits still encoded.
    Hex(&'a [u8]),
    /// Kerning adjustment in thousandths of an em.
    Adjustment(f64),
}

/// Glyph-run decoding for one font resource.
///
/// Implementations must not fail on malformed bytes.
pub trait FontDecoder {
    fn decode_text(&self, run: &[ShowTextItem<'_>]) -> String;
}

/// Identity of an XObject, used to detect form cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XObjectId(pub u64);

impl From<(u32, u16)> for XObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        XObjectId((u64::from(number) << 16) | u64::from(generation))
    }
}

/// A resolved Form XObject.
pub struct FormXObject<'a> {
    pub id: XObjectId,
    /// Decoded content stream of the form.
    pub content: Cow<'a, [u8]>,
    /// The form's own resources; `None` inherits the invoking resources.
    pub resources: Option<Box<dyn PageResources + 'a>>,
}

impl std::fmt::Debug for FormXObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormXObject")
            .field("id", &self.id)
            .field("content_len", &self.content.len())
            .field("has_resources", &self.resources.is_some())
            .finish()
    }
}

/// A resolved XObject.
#[derive(Debug)]
pub enum XObject<'a> {
    Form(FormXObject<'a>),
    /// Images carry no text.
    Image,
}

/// Resource-name lookups for one content stream.
pub trait PageResources {
    /// Font registered under `name` in `/Font`.
    fn font(&self, name: &str) -> Option<&dyn FontDecoder>;

    /// XObject registered under `name` in `/XObject`.
    fn xobject(&self, name: &str) -> Option<XObject<'_>>;
}

impl<T: PageResources + ?Sized> PageResources for &T {
    fn font(&self, name: &str) -> Option<&dyn FontDecoder> {
        (**self).font(name)
    }

    fn xobject(&self, name: &str) -> Option<XObject<'_>> {
        (**self).xobject(name)
    }
}

struct InMemoryForm {
    id: XObjectId,
    content: Vec<u8>,
    resources: Option<InMemoryResources>,
}

/// A [`PageResources`] built in memory.
///
/// ```
/// use pdftext_parse::{InMemoryResources, StandardFont};
///
/// let resources = InMemoryResources::new()
///     .with_font("F1", StandardFont::default())
///     .with_form("Fm1", 7, b"BT /F1 12 Tf (Nested) Tj ET".to_vec())
///     .with_image("Im1");
/// ```
#[derive(Default)]
pub struct InMemoryResources {
    fonts: HashMap<String, Box<dyn FontDecoder>>,
    forms: HashMap<String, InMemoryForm>,
    images: HashSet<String>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, name: impl Into<String>, font: impl FontDecoder + 'static) -> Self {
        self.fonts.insert(name.into(), Box::new(font));
        self
    }

    /// Register a form that inherits the invoking resources.
    pub fn with_form(mut self, name: impl Into<String>, id: u64, content: Vec<u8>) -> Self {
        self.forms.insert(
            name.into(),
            InMemoryForm {
                id: XObjectId(id),
                content,
                resources: None,
            },
        );
        self
    }

    /// Register a form with resources of its own.
    pub fn with_form_resources(
        mut self,
        name: impl Into<String>,
        id: u64,
        content: Vec<u8>,
        resources: InMemoryResources,
    ) -> Self {
        self.forms.insert(
            name.into(),
            InMemoryForm {
                id: XObjectId(id),
                content,
                resources: Some(resources),
            },
        );
        self
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.images.insert(name.into());
        self
    }
}

impl PageResources for InMemoryResources {
    fn font(&self, name: &str) -> Option<&dyn FontDecoder> {
        self.fonts.get(name).map(|f| f.as_ref())
    }

    fn xobject(&self, name: &str) -> Option<XObject<'_>> {
        if let Some(form) = self.forms.get(name) {
            return Some(XObject::Form(FormXObject {
                id: form.id,
                content: Cow::Borrowed(&form.content),
                resources: form
                    .resources
                    .as_ref()
                    .map(|r| Box::new(r) as Box<dyn PageResources + '_>),
            }));
        }
        self.images.contains(name).then_some(XObject::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl FontDecoder for Upper {
        fn decode_text(&self, run: &[ShowTextItem<'_>]) -> String {
            run.iter()
                .filter_map(|item| match item {
                    ShowTextItem::Literal(bytes) => {
                        Some(String::from_utf8_lossy(bytes).to_uppercase())
                    }
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn xobject_id_from_object_id() {
        assert_eq!(XObjectId::from((1, 0)), XObjectId(1 << 16));
        assert_ne!(XObjectId::from((1, 0)), XObjectId::from((1, 1)));
    }

    #[test]
    fn font_lookup() {
        let res = InMemoryResources::new().with_font("F1", Upper);
        let font = res.font("F1").unwrap();
        assert_eq!(font.decode_text(&[ShowTextItem::Literal(b"ab")]), "AB");
        assert!(res.font("F2").is_none());
    }

    #[test]
    fn xobject_lookup() {
        let res = InMemoryResources::new()
            .with_form("Fm1", 3, b"BT (x) Tj ET".to_vec())
            .with_form_resources(
                "Fm2",
                4,
                b"BT /F9 1 Tf (y) Tj ET".to_vec(),
                InMemoryResources::new().with_font("F9", Upper),
            )
            .with_image("Im1");

        match res.xobject("Fm1") {
            Some(XObject::Form(form)) => {
                assert_eq!(form.id, XObjectId(3));
                assert_eq!(&*form.content, b"BT (x) Tj ET");
                assert!(form.resources.is_none());
            }
            other => panic!("expected form, got {other:?}"),
        }
        match res.xobject("Fm2") {
            Some(XObject::Form(form)) => {
                let inner = form.resources.unwrap();
                assert!(inner.font("F9").is_some());
            }
            other => panic!("expected form, got {other:?}"),
        }
        assert!(matches!(res.xobject("Im1"), Some(XObject::Image)));
        assert!(res.xobject("Nope").is_none());
    }

    #[test]
    fn reference_forwards_lookups() {
        let res = InMemoryResources::new().with_font("F1", Upper);
        let by_ref: &dyn PageResources = &&res;
        assert!(by_ref.font("F1").is_some());
    }
}
