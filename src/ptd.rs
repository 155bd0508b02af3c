//! Post Type Discovery.
//!
//! Classifies a parsed item as an event, RSVP, repost, like, reply,
//! video, photo, note or article, following the W3C Post Type Discovery
//! algorithm. See <https://www.w3.org/TR/post-type-discovery/>.

use url::Url;

use crate::result::{Microformat, PropertyValue};

/// Determine the type of a post using the Post Type Algorithm.
#[must_use]
pub fn post_type(item: &Microformat) -> String {
    if item.has_type("h-event") {
        return "event".to_string();
    }

    let response = response_type(item);
    if response != "mention" {
        return response;
    }

    if property_holds_url(item, "video") {
        return "video".to_string();
    }
    if property_holds_url(item, "photo") {
        return "photo".to_string();
    }

    // Compare content and name to decide between note and article.
    let content = first_nonempty_plain(item, "content")
        .or_else(|| first_nonempty_plain(item, "summary"));
    let Some(content) = content else {
        return "note".to_string();
    };
    let Some(name) = first_nonempty_plain(item, "name") else {
        return "note".to_string();
    };

    let name = normalize_whitespace(name);
    let content = normalize_whitespace(content);
    if content.starts_with(&name) {
        "note".to_string()
    } else {
        "article".to_string()
    }
}

/// Determine the type of a response post using the Response Type
/// Algorithm: rsvp, repost, like, reply, or the fallback "mention".
#[must_use]
pub fn response_type(item: &Microformat) -> String {
    let rsvp = item
        .properties
        .get("rsvp")
        .into_iter()
        .flatten()
        .filter_map(PropertyValue::as_plain)
        .any(|v| matches!(v, "yes" | "no" | "maybe" | "interested"));
    if rsvp {
        return "rsvp".to_string();
    }

    if property_holds_url(item, "repost-of") {
        return "repost".to_string();
    }
    if property_holds_url(item, "like-of") {
        return "like".to_string();
    }
    if property_holds_url(item, "in-reply-to") {
        return "reply".to_string();
    }

    "mention".to_string()
}

/// Whether the first plain value of the property is a non-empty, valid
/// URL reference.
fn property_holds_url(item: &Microformat, name: &str) -> bool {
    let Some(values) = item.properties.get(name) else {
        return false;
    };
    for value in values {
        if let Some(s) = value.as_plain() {
            if s.is_empty() {
                continue;
            }
            return is_url_reference(s);
        }
    }
    false
}

fn is_url_reference(s: &str) -> bool {
    match Url::parse(s) {
        Ok(_) => true,
        // Relative references count; only outright malformed strings do not.
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

fn first_nonempty_plain<'a>(item: &'a Microformat, name: &str) -> Option<&'a str> {
    item.properties
        .get(name)?
        .iter()
        .filter_map(PropertyValue::as_plain)
        .find(|s| !s.is_empty())
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
