//! # rs-microformats
//!
//! Rust port of go-microformats - a microformats2 parser.
//!
//! This library extracts structured data encoded in HTML with the
//! microformats2 class vocabulary (and, in backcompat mode, the earlier
//! microformats1 vocabulary), producing a tree of items plus the page's
//! `rel` link catalogue.
//!
//! ## Quick Start
//!
//! ```rust
//! use url::Url;
//!
//! let html = r#"<div class="h-card"><a class="p-name u-url" href="/jane">Jane Doe</a></div>"#;
//! let base = Url::parse("http://example.com/").ok();
//!
//! let data = rs_microformats::parse(html, base.as_ref());
//! assert_eq!(data.items[0].types, vec!["h-card"]);
//! assert_eq!(data.items[0].first_plain("name"), Some("Jane Doe"));
//! assert_eq!(data.items[0].first_plain("url"), Some("http://example.com/jane"));
//! ```
//!
//! ## Features
//!
//! - **microformats2**: root (`h-*`) and property (`p-*`, `u-*`, `dt-*`,
//!   `e-*`) class parsing with implied name/photo/url inference
//! - **microformats1 backcompat**: `vcard`, `hentry`, `hreview`, ... roots
//!   with scoped property translation and the include pattern
//! - **Value-class pattern**: `value` / `value-title` fragments, including
//!   scattered date/time assembly
//! - **Rel catalogue**: deduplicated `rels` plus first-seen `rel-urls`
//!   metadata
//!
//! Parsing never fails: malformed URLs, dates and markup degrade to
//! whatever could be recognised.

mod backcompat;
mod datetime;
mod parse;
mod patterns;
mod result;
mod value;

/// Element helpers over `dom_query` nodes.
pub mod dom;

/// Character encoding detection and transcoding for byte input.
pub mod encoding;

/// Post Type Discovery over parsed items.
pub mod ptd;

/// Representative h-card selection.
pub mod rhc;

/// URL resolution utilities.
pub mod url_utils;

use dom_query::Document;
use url::Url;

// Public API - re-exports
pub use parse::parse_node;
pub use result::{Data, Microformat, PropertyValue, RelUrl, ValueObject};

/// Parse the microformats found in an HTML document.
///
/// `base_url` is the URL the document was retrieved from; it seeds
/// relative URL resolution and may be `None`, in which case resolution
/// is the identity function.
#[must_use]
pub fn parse(html: &str, base_url: Option<&Url>) -> Data {
    let doc = Document::from(html);
    parse_document(&doc, base_url)
}

/// Parse the microformats found in an already-parsed document.
#[must_use]
pub fn parse_document(doc: &Document, base_url: Option<&Url>) -> Data {
    let data = parse::parse_node(&doc.root(), base_url);
    if cfg!(debug_assertions) {
        eprintln!(
            "DEBUG: parsed {} top-level item(s), {} rel token(s)",
            data.items.len(),
            data.rels.len()
        );
    }
    data
}

/// Parse the microformats found in raw HTML bytes, detecting the
/// character encoding from meta tags and converting to UTF-8 first.
#[must_use]
pub fn parse_bytes(html: &[u8], base_url: Option<&Url>) -> Data {
    let html = encoding::transcode_to_utf8(html);
    parse(&html, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bytes_decodes_before_parsing() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>\
                     <div class=\"h-card\">Ren\xE9e</div></body></html>";
        let data = parse_bytes(html, None);
        assert_eq!(data.items[0].first_plain("name"), Some("Ren\u{e9}e"));
    }

    #[test]
    fn parse_without_base_keeps_relative_urls() {
        let data = parse(r#"<a class="h-card" href="/jane">Jane</a>"#, None);
        assert_eq!(data.items[0].first_plain("url"), Some("/jane"));
    }
}
