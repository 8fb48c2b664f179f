//! Classification of PDF objects by their `/Type` and `/Subtype` names.

/// Font program flavour declared by a font dictionary's `/Subtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontSubtype {
    Type0,
    Type1,
    MmType1,
    Type3,
    TrueType,
    CidFontType0,
    CidFontType2,
    /// Missing or unrecognized subtype.
    Other,
}

impl FontSubtype {
    /// Map a `/Subtype` name to a font subtype.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("Type0") => FontSubtype::Type0,
            Some("Type1") => FontSubtype::Type1,
            Some("MMType1") => FontSubtype::MmType1,
            Some("Type3") => FontSubtype::Type3,
            Some("TrueType") => FontSubtype::TrueType,
            Some("CIDFontType0") => FontSubtype::CidFontType0,
            Some("CIDFontType2") => FontSubtype::CidFontType2,
            _ => FontSubtype::Other,
        }
    }

    /// Whether glyph codes of this font are single bytes.
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            FontSubtype::Type1 | FontSubtype::MmType1 | FontSubtype::Type3 | FontSubtype::TrueType
        )
    }
}

/// The kind of a PDF object, selected from its declared type names.
///
/// Unknown types fall back to [`ObjectKind::Generic`]; an XObject whose
/// subtype is neither `Form` nor `Image` is also `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectKind {
    Page,
    Pages,
    Font(FontSubtype),
    XObjectForm,
    XObjectImage,
    Encoding,
    Generic,
}

impl ObjectKind {
    /// Classify an object from its `/Type` and `/Subtype` names.
    pub fn classify(type_name: Option<&str>, subtype: Option<&str>) -> Self {
        match type_name {
            Some("XObject") => match subtype {
                Some("Form") => ObjectKind::XObjectForm,
                Some("Image") => ObjectKind::XObjectImage,
                _ => ObjectKind::Generic,
            },
            Some("Pages") => ObjectKind::Pages,
            Some("Page") => ObjectKind::Page,
            Some("Encoding") => ObjectKind::Encoding,
            Some("Font") => ObjectKind::Font(FontSubtype::from_name(subtype)),
            _ => ObjectKind::Generic,
        }
    }
}
