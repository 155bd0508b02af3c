//! URL resolution utilities.
//!
//! Resolution is deliberately forgiving: a string that does not resolve
//! against the base (or a parse with no base at all) is returned
//! untouched, so extraction never fails on malformed URLs.

use dom_query::{Document, NodeRef};
use url::Url;

/// Attributes rewritten to absolute URLs inside `e-*` HTML output.
const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "data",
    "cite",
    "formaction",
    "action",
    "ping",
    "poster",
];

/// Resolve `r` against `base`. Returns `r` unchanged when no base is set
/// or the reference does not resolve.
#[must_use]
pub fn expand_url(r: &str, base: Option<&Url>) -> String {
    let Some(base) = base else {
        return r.to_string();
    };
    match base.join(r) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => r.to_string(),
    }
}

/// Serialise the children of an `e-*` element with URL-bearing attributes
/// rewritten to absolute form.
///
/// Rewriting happens on a fragment re-parsed from `inner` so the input
/// tree is never mutated. Without a base URL the serialisation is passed
/// through untouched (resolution is the identity function).
#[must_use]
pub fn absolutize_html(inner: &str, base: Option<&Url>) -> String {
    let serialized = match base {
        Some(base) => {
            let fragment = Document::from(inner);
            rewrite_url_attrs(&fragment.root(), base);
            fragment.select("body").inner_html().to_string()
        }
        None => inner.to_string(),
    };
    normalize_rendered(&serialized)
}

fn rewrite_url_attrs(node: &NodeRef, base: &Url) {
    if node.is_element() {
        let rewrites: Vec<(String, String)> = node
            .attrs()
            .iter()
            .filter(|a| {
                URL_ATTRIBUTES
                    .iter()
                    .any(|u| a.name.local.as_ref().eq_ignore_ascii_case(u))
            })
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect();
        for (name, value) in rewrites {
            node.set_attr(&name, &expand_url(&value, Some(base)));
        }
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        let next = c.next_sibling();
        rewrite_url_attrs(&c, base);
        child = next;
    }
}

/// Normalise serialised HTML: trim, collapse self-closing `/>` to `>`,
/// and decode `&#39;` back to a literal apostrophe.
fn normalize_rendered(s: &str) -> String {
    s.trim().replace("/>", ">").replace("&#39;", "'")
}
