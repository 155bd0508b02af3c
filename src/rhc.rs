//! Representative h-card parsing.
//!
//! Finds the h-card that represents the page itself, per
//! <http://microformats.org/wiki/representative-h-card-parsing>.

use url::Url;

use crate::result::{Data, Microformat, PropertyValue};

/// The representative h-card for `data` parsed from `src_url`, if any.
///
/// In order: an h-card whose `uid` and `url` both match the page URL;
/// an h-card whose `url` also carries a `rel=me` relation; a lone
/// h-card whose `url` matches the page URL.
#[must_use]
pub fn representative_hcard<'a>(data: &'a Data, src_url: &str) -> Option<&'a Microformat> {
    if data.items.is_empty() || src_url.is_empty() {
        return None;
    }

    let hcards = find_by_type(&data.items, "h-card");
    let rel_me = data.rels.get("me").map(Vec::as_slice).unwrap_or_default();

    let mut rel_me_card = None;
    let mut url_match_card = None;

    for &card in &hcards {
        if has_url_value(card, "url", src_url) {
            if has_url_value(card, "uid", src_url) {
                return Some(card);
            }
            if url_match_card.is_none() {
                url_match_card = Some(card);
            }
        }

        if rel_me_card.is_none() {
            let matches_rel_me = plain_values(card, "url")
                .any(|u| rel_me.iter().any(|r| url_match(u, r)));
            if matches_rel_me {
                rel_me_card = Some(card);
            }
        }
    }

    if rel_me_card.is_some() {
        return rel_me_card;
    }
    if hcards.len() == 1 {
        return url_match_card;
    }
    None
}

/// Collect every item of the given type, recursing through property
/// values and children.
fn find_by_type<'a>(items: &'a [Microformat], type_name: &str) -> Vec<&'a Microformat> {
    let mut out = Vec::new();
    for item in items {
        collect_by_type(item, type_name, &mut out);
    }
    out
}

fn collect_by_type<'a>(item: &'a Microformat, type_name: &str, out: &mut Vec<&'a Microformat>) {
    if item.has_type(type_name) {
        out.push(item);
    }
    for values in item.properties.values() {
        for value in values {
            if let PropertyValue::Item(nested) = value {
                collect_by_type(nested, type_name, out);
            }
        }
    }
    for child in &item.children {
        collect_by_type(child, type_name, out);
    }
}

fn plain_values<'a>(
    item: &'a Microformat,
    name: &str,
) -> impl Iterator<Item = &'a str> {
    item.properties
        .get(name)
        .into_iter()
        .flatten()
        .filter_map(PropertyValue::as_plain)
}

fn has_url_value(item: &Microformat, name: &str, target: &str) -> bool {
    plain_values(item, name).any(|v| url_match(v, target))
}

/// URL equality with an empty path treated as `/`.
fn url_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (Ok(mut ua), Ok(mut ub)) = (Url::parse(a), Url::parse(b)) else {
        return false;
    };
    if ua.path().is_empty() {
        ua.set_path("/");
    }
    if ub.path().is_empty() {
        ub.set_path("/");
    }
    ua == ub
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn hcard(props: &[(&str, &str)]) -> Microformat {
        let mut properties: HashMap<String, Vec<PropertyValue>> = HashMap::new();
        for (name, value) in props {
            properties
                .entry((*name).to_string())
                .or_default()
                .push(PropertyValue::Plain((*value).to_string()));
        }
        Microformat {
            types: vec!["h-card".to_string()],
            properties,
            ..Microformat::default()
        }
    }

    const PAGE: &str = "http://jane.example.com/";

    #[test]
    fn uid_and_url_match_wins() {
        let data = Data {
            items: vec![
                hcard(&[("url", PAGE)]),
                hcard(&[("url", PAGE), ("uid", PAGE), ("name", "Jane")]),
            ],
            ..Data::default()
        };
        let card = representative_hcard(&data, PAGE).unwrap();
        assert_eq!(card.first_plain("name"), Some("Jane"));
    }

    #[test]
    fn rel_me_match_wins_next() {
        let data = Data {
            items: vec![
                hcard(&[("url", "http://other.example.com/")]),
                hcard(&[("url", "http://jane.example.com/me"), ("name", "Jane")]),
            ],
            rels: HashMap::from([(
                "me".to_string(),
                vec!["http://jane.example.com/me".to_string()],
            )]),
            ..Data::default()
        };
        let card = representative_hcard(&data, PAGE).unwrap();
        assert_eq!(card.first_plain("name"), Some("Jane"));
    }

    #[test]
    fn lone_hcard_with_matching_url() {
        let data = Data {
            items: vec![hcard(&[("url", PAGE), ("name", "Jane")])],
            ..Data::default()
        };
        let card = representative_hcard(&data, PAGE).unwrap();
        assert_eq!(card.first_plain("name"), Some("Jane"));
    }

    #[test]
    fn two_url_matches_without_uid_is_ambiguous() {
        let data = Data {
            items: vec![hcard(&[("url", PAGE)]), hcard(&[("url", PAGE)])],
            ..Data::default()
        };
        assert!(representative_hcard(&data, PAGE).is_none());
    }

    #[test]
    fn nested_hcards_are_considered() {
        let author = hcard(&[("url", PAGE), ("uid", PAGE), ("name", "Jane")]);
        let entry = Microformat {
            types: vec!["h-entry".to_string()],
            properties: HashMap::from([(
                "author".to_string(),
                vec![PropertyValue::Item(author)],
            )]),
            ..Microformat::default()
        };
        let data = Data {
            items: vec![entry],
            ..Data::default()
        };
        let card = representative_hcard(&data, PAGE).unwrap();
        assert_eq!(card.first_plain("name"), Some("Jane"));
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        assert!(representative_hcard(&Data::default(), PAGE).is_none());
        let data = Data {
            items: vec![hcard(&[("url", PAGE)])],
            ..Data::default()
        };
        assert!(representative_hcard(&data, "").is_none());
    }

    #[test]
    fn url_match_normalizes_empty_paths() {
        assert!(url_match("http://example.com", "http://example.com/"));
        assert!(!url_match("http://example.com/a", "http://example.com/b"));
        assert!(!url_match("", "http://example.com/"));
    }
}
