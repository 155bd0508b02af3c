//! Backwards compatibility support for microformats v1.
//!
//! The v1 vocabulary used bare class names (`vcard`, `fn`, `bday`, ...)
//! whose meaning depends on the enclosing root type. These closed tables
//! translate v1 roots, properties and `rel` values into the prefixed v2
//! vocabulary the walker understands.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use dom_query::NodeRef;
use url::Url;

use crate::dom;

static ROOT_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("adr", "h-adr"),
        ("geo", "h-geo"),
        ("hentry", "h-entry"),
        ("hfeed", "h-feed"),
        ("hnews", "h-news"),
        ("hproduct", "h-product"),
        ("hrecipe", "h-recipe"),
        ("hresume", "h-resume"),
        ("hreview", "h-review"),
        ("hreview-aggregate", "h-review-aggregate"),
        ("vcard", "h-card"),
        ("vevent", "h-event"),
    ])
});

/// Generic property translations, applied when no type-specific rule
/// matches.
static PROPERTY_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("author", "p-author"),
        ("description", "p-description"),
        ("job-title", "p-job-title"),
        ("organization-name", "p-organization-name"),
        ("organization-unit", "p-organization-unit"),
        ("published", "dt-published"),
        ("summary", "p-summary"),
        ("title", "p-title"),
        ("worst", "p-worst"),
    ])
});

/// Per-root-type property translations.
static PROPERTY_OVERRIDE_MAP: LazyLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                "h-adr",
                HashMap::from([
                    ("country-name", "p-country-name"),
                    ("extended-address", "p-extended-address"),
                    ("locality", "p-locality"),
                    ("post-office-box", "p-post-office-box"),
                    ("postal-code", "p-postal-code"),
                    ("region", "p-region"),
                    ("street-address", "p-street-address"),
                ]),
            ),
            (
                "h-card",
                HashMap::from([
                    ("additional-name", "p-additional-name"),
                    ("adr", "p-adr"),
                    ("agent", "p-agent"),
                    ("bday", "dt-bday"),
                    ("category", "p-category"),
                    ("class", "p-class"),
                    ("email", "u-email"),
                    ("family-name", "p-family-name"),
                    ("fn", "p-name"),
                    ("geo", "p-geo"),
                    ("given-name", "p-given-name"),
                    ("honorific-prefix", "p-honorific-prefix"),
                    ("honorific-suffix", "p-honorific-suffix"),
                    ("key", "u-key"),
                    ("label", "p-label"),
                    ("logo", "u-logo"),
                    ("mailer", "p-mailer"),
                    ("nickname", "p-nickname"),
                    ("note", "p-note"),
                    ("org", "p-org"),
                    ("photo", "u-photo"),
                    ("rev", "dt-rev"),
                    ("role", "p-role"),
                    ("sort-string", "p-sort-string"),
                    ("sound", "u-sound"),
                    ("tel", "p-tel"),
                    ("title", "p-job-title"),
                    ("tz", "dt-tz"),
                    ("uid", "u-uid"),
                    ("url", "u-url"),
                ]),
            ),
            (
                "h-entry",
                HashMap::from([
                    ("author", "p-author"),
                    ("entry-content", "e-content"),
                    ("entry-summary", "p-summary"),
                    ("entry-title", "p-name"),
                    ("published", "dt-published"),
                    ("summary", "p-summary"),
                    ("updated", "dt-updated"),
                ]),
            ),
            (
                "h-event",
                HashMap::from([
                    ("attendee", "p-attendee"),
                    ("category", "p-category"),
                    ("description", "p-description"),
                    ("dtend", "dt-end"),
                    ("dtstart", "dt-start"),
                    ("duration", "dt-duration"),
                    ("location", "p-location"),
                    ("summary", "p-name"),
                    ("url", "u-url"),
                ]),
            ),
            (
                "h-feed",
                HashMap::from([
                    ("author", "p-author"),
                    ("entry", "p-entry"),
                    ("photo", "u-photo"),
                    ("url", "u-url"),
                ]),
            ),
            (
                "h-geo",
                HashMap::from([("latitude", "p-latitude"), ("longitude", "p-longitude")]),
            ),
            (
                "h-news",
                HashMap::from([
                    ("dateline", "p-dateline"),
                    ("entry", "p-entry"),
                    ("geo", "p-geo"),
                    ("source-org", "p-source-org"),
                ]),
            ),
            (
                "h-product",
                HashMap::from([
                    ("brand", "p-brand"),
                    ("category", "p-category"),
                    ("description", "p-description"),
                    ("fn", "p-name"),
                    ("listing", "p-listing"),
                    ("photo", "u-photo"),
                    ("price", "p-price"),
                    ("review", "p-review"),
                    ("url", "u-url"),
                ]),
            ),
            (
                "h-resume",
                HashMap::from([
                    ("affiliation", "p-affiliation"),
                    ("contact", "p-contact"),
                    ("education", "p-education"),
                    ("experience", "p-experience"),
                    ("publications", "p-publications"),
                    ("skill", "p-skill"),
                    ("summary", "p-summary"),
                ]),
            ),
            (
                "h-review",
                HashMap::from([
                    ("description", "e-content"),
                    ("dtreviewed", "dt-reviewed"),
                    ("item", "p-item"),
                    ("rating", "p-rating"),
                    ("reviewer", "p-author"),
                    ("summary", "p-name"),
                ]),
            ),
            (
                "h-review-aggregate",
                HashMap::from([
                    ("average", "p-average"),
                    ("best", "p-best"),
                    ("count", "p-count"),
                    ("item", "p-item"),
                    ("rating", "p-rating"),
                    ("summary", "p-name"),
                    ("votes", "p-votes"),
                ]),
            ),
        ])
    });

/// `rel` values that imply a property inside certain v1 roots.
static REL_MAP: LazyLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        HashMap::from([
            ("h-entry", HashMap::from([("bookmark", "u-url")])),
            ("h-feed", HashMap::from([("tag", "u-category")])),
            ("h-news", HashMap::from([("principles", "u-principles")])),
            (
                "h-review",
                HashMap::from([("bookmark", "u-url"), ("tag", "u-category")]),
            ),
        ])
    });

/// Translate v1 root classes into their v2 equivalents, in class order.
#[must_use]
pub(crate) fn root_classes(classes: &[String]) -> Vec<String> {
    classes
        .iter()
        .filter_map(|c| ROOT_MAP.get(c.as_str()))
        .map(|c| (*c).to_string())
        .collect()
}

/// Translate v1 property classes and `rel` values into prefixed v2
/// property classes, scoped by the enclosing item's types. Type-specific
/// rules shadow the generic table; results are deduplicated by target
/// property name, first match winning, in class order.
#[must_use]
pub(crate) fn property_classes(
    classes: &[String],
    rels: &[String],
    context: &[String],
) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut insert = |translated: &'static str| {
        let name = translated.split_once('-').map_or(translated, |(_, n)| n);
        if seen.insert(name) {
            out.push(translated.to_string());
        }
    };

    for class in classes {
        let mut matched = false;
        for ctx in context {
            if let Some(translated) = PROPERTY_OVERRIDE_MAP
                .get(ctx.as_str())
                .and_then(|m| m.get(class.as_str()))
            {
                insert(translated);
                matched = true;
            }
        }
        if !matched {
            if let Some(translated) = PROPERTY_MAP.get(class.as_str()) {
                insert(translated);
            }
        }
    }

    for rel in rels {
        for ctx in context {
            if let Some(translated) = REL_MAP
                .get(ctx.as_str())
                .and_then(|m| m.get(rel.as_str()))
            {
                insert(translated);
            }
        }
    }

    out
}

/// Strip a `rel=tag` URL down to its final path segment to serve as a
/// category value. Unparseable strings are returned unchanged.
#[must_use]
pub(crate) fn url_category(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    match Url::parse(s) {
        Ok(u) => path_base(u.path()),
        Err(_) => s.to_string(),
    }
}

fn path_base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// Resolve the include-pattern target for a node:
/// `<object class="include" data="#id">` or `<a class="include" href="#id">`.
/// Targets that do not exist, or that would recurse (the node itself or
/// an ancestor), yield `None`.
#[must_use]
pub(crate) fn include_target<'a>(node: &NodeRef<'a>, root: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !dom::classes(node).iter().any(|c| c == "include") {
        return None;
    }
    let href = if dom::is_tag(node, &["object"]) {
        dom::attr(node, "data")
    } else if dom::is_tag(node, &["a"]) {
        dom::attr(node, "href")
    } else {
        None
    }?;
    resolve_fragment_ref(&href, node, root)
}

/// Resolve `itemref="id1 id2"` references on a node, in attribute order,
/// skipping missing targets and cycles.
#[must_use]
pub(crate) fn itemref_targets<'a>(node: &NodeRef<'a>, root: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let Some(refs) = dom::attr(node, "itemref") else {
        return Vec::new();
    };
    refs.split_ascii_whitespace()
        .filter_map(|id| {
            let target = dom::find_by_id(root, id)?;
            (!dom::is_ancestor_or_self(&target, node)).then_some(target)
        })
        .collect()
}

fn resolve_fragment_ref<'a>(
    href: &str,
    node: &NodeRef<'a>,
    root: &NodeRef<'a>,
) -> Option<NodeRef<'a>> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    let target = dom::find_by_id(root, id)?;
    if dom::is_ancestor_or_self(&target, node) {
        return None;
    }
    Some(target)
}
