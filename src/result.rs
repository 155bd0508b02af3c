//! Output types for parsed microformats.
//!
//! This module defines the structures produced by a parse: the overall
//! [`Data`] record, individual [`Microformat`] items, the polymorphic
//! [`PropertyValue`] sum, and [`RelUrl`] link metadata. The serde
//! attributes reproduce the canonical microformats2 JSON shape, omitting
//! empty optional fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single microformat object and its properties. It may represent a
/// person, an address, a blog post, etc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Microformat {
    /// DOM id of the root element, when present (microformats2 roots only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Embedded value, set when this item is itself a property value of an
    /// enclosing item.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    /// Embedded HTML, set when this item was emitted through an `e-*`
    /// property.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html: String,

    /// Root type names (`h-*`). Never empty; sorted lexicographically for
    /// microformats2 roots.
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Property name (without prefix) to the ordered values contributed by
    /// descendant elements.
    pub properties: HashMap<String, Vec<PropertyValue>>,

    /// `shape` attribute, for items rooted on an `<area>` element.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shape: String,

    /// `coords` attribute, for items rooted on an `<area>` element.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub coords: String,

    /// Nested items that contributed no property to this item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Microformat>,
}

impl Microformat {
    /// First value of the named property when it is a plain string.
    #[must_use]
    pub fn first_plain(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)?.first()? {
            PropertyValue::Plain(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this item carries the given `h-*` type.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }
}

/// One value of a property. Encoded flatly in JSON: a bare string, a
/// `{value, html}` / `{value, alt}` object, or a nested item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A nested microformat emitted as a property value.
    Item(Microformat),
    /// A structured `{value, html}` or `{value, alt}` object.
    Object(ValueObject),
    /// A plain string (including resolved URL strings).
    Plain(String),
}

impl PropertyValue {
    /// The plain string carried by this value, if it is one.
    #[must_use]
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            PropertyValue::Plain(s) => Some(s),
            _ => None,
        }
    }
}

/// Structured property value: `e-*` properties pair the text rendering
/// with serialised HTML; `u-*` image properties pair the URL with the
/// image's alt text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueObject {
    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt: String,
}

/// The attributes of a URL discovered through a `rel` link. The URL value
/// itself is the map key in [`Data::rel_urls`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelUrl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rels: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hreflang: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,
}

/// Everything parsed from a single HTML page: top-level items plus the
/// page's `rel` catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    /// Top-level microformat items in document order.
    pub items: Vec<Microformat>,

    /// Rel token to the resolved URLs that carry it. Each (token, URL)
    /// pair appears at most once.
    pub rels: HashMap<String, Vec<String>>,

    /// Resolved URL to the metadata captured the first time it was seen.
    #[serde(rename = "rel-urls")]
    pub rel_urls: HashMap<String, RelUrl>,
}
