//! Property value extraction.
//!
//! Each property prefix (`p`, `u`, `e`, `dt`) extracts its value through a
//! ladder of candidates tried in a fixed order on the element carrying
//! the property class. The value-class pattern and the implied
//! name/photo/url scans live here too, since they share the ladders'
//! vocabulary.

use dom_query::NodeRef;
use url::Url;

use crate::datetime::Datetime;
use crate::dom;
use crate::patterns::ROOT_CLASS;
use crate::url_utils;

/// Extract a `p-*` (plain text) value.
#[must_use]
pub(crate) fn p_value(node: &NodeRef, base: Option<&Url>) -> String {
    if let Some(v) = value_class_pattern(node) {
        return v;
    }
    if dom::is_tag(node, &["abbr", "link"]) {
        if let Some(title) = dom::attr(node, "title") {
            return title;
        }
    }
    if dom::is_tag(node, &["data", "input"]) {
        if let Some(value) = dom::attr(node, "value") {
            return value;
        }
    }
    if dom::is_tag(node, &["img", "area"]) {
        if let Some(alt) = dom::attr(node, "alt") {
            return alt;
        }
    }
    let img_fn = |img: &NodeRef| image_alt_or_src(img, base);
    dom::text_content(node, Some(&img_fn)).trim().to_string()
}

/// Extract a `u-*` (URL) value, resolved against the base and trimmed.
/// The second element carries the image `alt` text when the value came
/// from an `<img src>` with a non-empty `alt`.
#[must_use]
pub(crate) fn u_value(node: &NodeRef, base: Option<&Url>) -> (String, Option<String>) {
    let mut alt = None;
    let mut value = None;
    if dom::is_tag(node, &["a", "area", "link"]) {
        value = dom::attr(node, "href");
    }
    if value.is_none() && dom::is_tag(node, &["img"]) {
        value = dom::attr(node, "src");
        if value.is_some() {
            alt = dom::attr(node, "alt").filter(|a| !a.is_empty());
        }
    }
    if value.is_none() && dom::is_tag(node, &["audio", "video", "source"]) {
        value = dom::attr(node, "src");
    }
    if value.is_none() && dom::is_tag(node, &["object"]) {
        value = dom::attr(node, "data");
    }
    if value.is_none() && dom::is_tag(node, &["video"]) {
        value = dom::attr(node, "poster");
    }
    if value.is_none() {
        value = value_class_pattern(node);
    }
    if value.is_none() && dom::is_tag(node, &["abbr"]) {
        value = dom::attr(node, "title");
    }
    if value.is_none() && dom::is_tag(node, &["data", "input"]) {
        value = dom::attr(node, "value");
    }
    let raw = value.unwrap_or_else(|| dom::text_content(node, None));
    let resolved = url_utils::expand_url(raw.trim(), base).trim().to_string();
    (resolved, alt)
}

/// Extract an `e-*` value: the plain-text rendering of the subtree and
/// the serialised HTML of its children with URLs absolutised.
#[must_use]
pub(crate) fn e_value(node: &NodeRef, base: Option<&Url>) -> (String, String) {
    let img_fn = |img: &NodeRef| image_alt_or_src(img, base);
    let text = dom::text_content(node, Some(&img_fn)).trim().to_string();
    let html = url_utils::absolutize_html(&node.inner_html(), base);
    (text, html)
}

/// Extract a `dt-*` (date/time) value.
#[must_use]
pub(crate) fn dt_value(node: &NodeRef) -> String {
    if let Some(v) = datetime_value(node) {
        return v;
    }
    if dom::is_tag(node, &["time", "ins", "del"]) {
        if let Some(v) = dom::attr(node, "datetime") {
            return v;
        }
    }
    if dom::is_tag(node, &["abbr"]) {
        if let Some(v) = dom::attr(node, "title") {
            return v;
        }
    }
    if dom::is_tag(node, &["data", "input"]) {
        if let Some(v) = dom::attr(node, "value") {
            return v;
        }
    }
    dom::text_content(node, None).trim().to_string()
}

/// The value-class pattern: fragments contributed by direct children
/// with class `value` or `value-title`, concatenated with no separator.
#[must_use]
pub(crate) fn value_class_pattern(node: &NodeRef) -> Option<String> {
    let values = collect_value_class(node, false);
    (!values.is_empty()).then(|| values.concat())
}

/// The value-class pattern in date-time mode: fragments are fed to a
/// [`Datetime`] accumulator and its canonical string is the value.
/// Absent when no fragments were found or no date was ever set.
#[must_use]
pub(crate) fn datetime_value(node: &NodeRef) -> Option<String> {
    let values = collect_value_class(node, true);
    if values.is_empty() {
        return None;
    }
    let mut d = Datetime::default();
    for v in &values {
        d.parse(v);
    }
    let s = d.to_string();
    (!s.is_empty()).then_some(s)
}

fn collect_value_class(node: &NodeRef, date_mode: bool) -> Vec<String> {
    let mut values = Vec::new();
    let mut child = node.first_child();
    while let Some(c) = child {
        let next = c.next_sibling();
        if c.is_element() {
            let classes = dom::classes(&c);
            if classes.iter().any(|cl| cl == "value-title") {
                values.push(dom::attr_or_empty(&c, "title"));
            } else if classes.iter().any(|cl| cl == "value") {
                values.push(value_contribution(&c, date_mode));
            }
        }
        child = next;
    }
    values
}

fn value_contribution(c: &NodeRef, date_mode: bool) -> String {
    if dom::is_tag(c, &["img", "area"]) {
        if let Some(alt) = dom::attr(c, "alt") {
            return alt;
        }
    }
    if dom::is_tag(c, &["data"]) {
        if let Some(v) = dom::attr(c, "value") {
            return v;
        }
    }
    if dom::is_tag(c, &["abbr"]) {
        if let Some(title) = dom::attr(c, "title") {
            return title;
        }
    }
    if date_mode && dom::is_tag(c, &["del", "ins", "time"]) {
        if let Some(dt) = dom::attr(c, "datetime") {
            return dt;
        }
    }
    dom::text_content(c, None).trim().to_string()
}

/// Image substitution for `p-*`/`e-*` text: the `alt` text when the
/// attribute is present, otherwise the resolved `src` wrapped in spaces.
#[must_use]
pub(crate) fn image_alt_or_src(img: &NodeRef, base: Option<&Url>) -> String {
    if let Some(alt) = dom::attr(img, "alt") {
        return alt;
    }
    if let Some(src) = dom::attr(img, "src") {
        return format!(" {} ", url_utils::expand_url(&src, base));
    }
    String::new()
}

fn has_root_class(node: &NodeRef) -> bool {
    dom::classes(node).iter().any(|c| ROOT_CLASS.is_match(c))
}

/// Implied `name`: the node's own alt/title, the sole child's, the sole
/// grandchild's, or the text content with image-alt substitution.
/// Children that are themselves microformat roots are skipped.
#[must_use]
pub(crate) fn implied_name(node: &NodeRef) -> String {
    let name = implied_name_attr(node).unwrap_or_else(|| {
        let img_fn = |img: &NodeRef| dom::attr_or_empty(img, "alt");
        dom::text_content(node, Some(&img_fn))
    });
    name.trim().to_string()
}

const NAME_SOURCES: [(&str, &str); 3] = [("img", "alt"), ("area", "alt"), ("abbr", "title")];

fn implied_name_attr(node: &NodeRef) -> Option<String> {
    for (tag, attr_name) in NAME_SOURCES {
        if dom::is_tag(node, &[tag]) {
            if let Some(v) = dom::attr(node, attr_name) {
                return Some(v);
            }
        }
    }

    let child = dom::only_child(node)?;
    if has_root_class(&child) {
        return None;
    }
    for (tag, attr_name) in NAME_SOURCES {
        if dom::is_tag(&child, &[tag]) {
            if let Some(v) = dom::attr(&child, attr_name) {
                return Some(v);
            }
        }
    }

    let grandchild = dom::only_child(&child)?;
    if has_root_class(&grandchild) {
        return None;
    }
    for (tag, attr_name) in NAME_SOURCES {
        if dom::is_tag(&grandchild, &[tag]) {
            if let Some(v) = dom::attr(&grandchild, attr_name) {
                return Some(v);
            }
        }
    }
    None
}

/// Implied `photo`: an image `src` or object `data` found on the node,
/// its sole matching child, or its sole matching grandchild. The second
/// element carries the image's non-empty `alt`, when present.
#[must_use]
pub(crate) fn implied_photo(node: &NodeRef, base: Option<&Url>) -> Option<(String, Option<String>)> {
    if dom::is_tag(node, &["img"]) {
        if let Some(src) = dom::attr(node, "src") {
            return Some(resolved_image(&src, node, base));
        }
    }
    if dom::is_tag(node, &["object"]) {
        if let Some(data) = dom::attr(node, "data") {
            return Some((url_utils::expand_url(&data, base), None));
        }
    }

    if let Some(child) = dom::only_child_tag_with_attr(node, "img", "src") {
        if !has_root_class(&child) {
            let src = dom::attr_or_empty(&child, "src");
            return Some(resolved_image(&src, &child, base));
        }
    }
    if let Some(child) = dom::only_child_tag_with_attr(node, "object", "data") {
        if !has_root_class(&child) {
            return Some((
                url_utils::expand_url(&dom::attr_or_empty(&child, "data"), base),
                None,
            ));
        }
    }

    let child = dom::only_child(node)?;
    if has_root_class(&child) {
        return None;
    }
    if let Some(grandchild) = dom::only_child_tag_with_attr(&child, "img", "src") {
        if !has_root_class(&grandchild) {
            let src = dom::attr_or_empty(&grandchild, "src");
            return Some(resolved_image(&src, &grandchild, base));
        }
    }
    if let Some(grandchild) = dom::only_child_tag_with_attr(&child, "object", "data") {
        if !has_root_class(&grandchild) {
            return Some((
                url_utils::expand_url(&dom::attr_or_empty(&grandchild, "data"), base),
                None,
            ));
        }
    }
    None
}

fn resolved_image(src: &str, img: &NodeRef, base: Option<&Url>) -> (String, Option<String>) {
    let alt = dom::attr(img, "alt").filter(|a| !a.is_empty());
    (url_utils::expand_url(src, base), alt)
}

/// Implied `url`: an `href` found on the node, its sole matching child,
/// or its sole matching grandchild, resolved against the base.
#[must_use]
pub(crate) fn implied_url(node: &NodeRef, base: Option<&Url>) -> Option<String> {
    if dom::is_tag(node, &["a", "area"]) {
        if let Some(href) = dom::attr(node, "href") {
            return Some(url_utils::expand_url(&href, base));
        }
    }

    for tag in ["a", "area"] {
        if let Some(child) = dom::only_child_tag_with_attr(node, tag, "href") {
            if !has_root_class(&child) {
                return Some(url_utils::expand_url(&dom::attr_or_empty(&child, "href"), base));
            }
        }
    }

    let child = dom::only_child(node)?;
    if has_root_class(&child) {
        return None;
    }
    for tag in ["a", "area"] {
        if let Some(grandchild) = dom::only_child_tag_with_attr(&child, tag, "href") {
            if !has_root_class(&grandchild) {
                return Some(url_utils::expand_url(
                    &dom::attr_or_empty(&grandchild, "href"),
                    base,
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_query::Document;

    fn first<'a>(doc: &'a Document, selector: &str) -> NodeRef<'a> {
        doc.select(selector).nodes().first().unwrap().clone()
    }

    fn base() -> Url {
        Url::parse("http://example.com/").unwrap()
    }

    #[test]
    fn p_value_prefers_value_class() {
        let doc = Document::from(
            r#"<p class="p-name"><span class="value">Jane</span> <span>ignored</span></p>"#,
        );
        assert_eq!(p_value(&first(&doc, "p"), None), "Jane");
    }

    #[test]
    fn p_value_attribute_ladder() {
        let doc = Document::from(r#"<abbr class="p-name" title="Jane Doe">JD</abbr>"#);
        assert_eq!(p_value(&first(&doc, "abbr"), None), "Jane Doe");

        let doc = Document::from(r#"<data class="p-rating" value="5">five</data>"#);
        assert_eq!(p_value(&first(&doc, "data"), None), "5");

        let doc = Document::from(r#"<img class="p-name" alt="Jane" src="j.png">"#);
        assert_eq!(p_value(&first(&doc, "img"), None), "Jane");
    }

    #[test]
    fn p_value_text_substitutes_images() {
        let doc = Document::from(r#"<span class="p-name">Jane <img alt="Doe"></span>"#);
        assert_eq!(p_value(&first(&doc, "span"), None), "Jane Doe");

        let doc = Document::from(r#"<span class="p-name">Jane <img src="/d.png"></span>"#);
        assert_eq!(
            p_value(&first(&doc, "span"), Some(&base())),
            "Jane  http://example.com/d.png"
        );
    }

    #[test]
    fn u_value_ladder_and_resolution() {
        let b = base();
        let doc = Document::from(r#"<a class="u-url" href="/about">About</a>"#);
        assert_eq!(
            u_value(&first(&doc, "a"), Some(&b)),
            ("http://example.com/about".to_string(), None)
        );

        let doc = Document::from(r#"<object class="u-content" data="/movie.swf"></object>"#);
        assert_eq!(
            u_value(&first(&doc, "object"), Some(&b)).0,
            "http://example.com/movie.swf"
        );

        let doc = Document::from(r#"<video class="u-video" poster="/p.jpg"></video>"#);
        assert_eq!(
            u_value(&first(&doc, "video"), Some(&b)).0,
            "http://example.com/p.jpg"
        );

        let doc = Document::from(r#"<span class="u-url">http://example.com/x</span>"#);
        assert_eq!(
            u_value(&first(&doc, "span"), Some(&b)).0,
            "http://example.com/x"
        );
    }

    #[test]
    fn u_value_collects_img_alt() {
        let b = base();
        let doc = Document::from(r#"<img class="u-photo" src="/p.jpg" alt="A photo">"#);
        assert_eq!(
            u_value(&first(&doc, "img"), Some(&b)),
            (
                "http://example.com/p.jpg".to_string(),
                Some("A photo".to_string())
            )
        );

        let doc = Document::from(r#"<img class="u-photo" src="/p.jpg" alt="">"#);
        assert_eq!(u_value(&first(&doc, "img"), Some(&b)).1, None);
    }

    #[test]
    fn e_value_returns_text_and_html() {
        let doc = Document::from(r#"<div class="e-content"><p>Hello <b>world</b></p></div>"#);
        let (text, html) = e_value(&first(&doc, "div"), None);
        assert_eq!(text, "Hello world");
        assert_eq!(html, "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn e_value_absolutizes_urls() {
        let doc = Document::from(r#"<div class="e-content"><a href="/x">x</a></div>"#);
        let (_, html) = e_value(&first(&doc, "div"), Some(&base()));
        assert!(html.contains(r#"href="http://example.com/x""#), "{html}");
    }

    #[test]
    fn dt_value_ladder() {
        let doc = Document::from(r#"<time class="dt-published" datetime="2024-01-05">then</time>"#);
        assert_eq!(dt_value(&first(&doc, "time")), "2024-01-05");

        let doc = Document::from(r#"<span class="dt-published"> 2024-01-05 </span>"#);
        assert_eq!(dt_value(&first(&doc, "span")), "2024-01-05");
    }

    #[test]
    fn dt_value_assembles_fragments() {
        let doc = Document::from(
            r#"<p class="dt-start"><time class="value" datetime="2015-02-03"></time>
               <time class="value" datetime="21:15:00"></time>
               <time class="value" datetime="-08:00"></time></p>"#,
        );
        assert_eq!(dt_value(&first(&doc, "p")), "2015-02-03 21:15:00-0800");
    }

    #[test]
    fn value_title_contributes_title_attribute() {
        let doc = Document::from(
            r#"<p class="dt-start"><span class="value-title" title="2015-02-03">then</span></p>"#,
        );
        assert_eq!(dt_value(&first(&doc, "p")), "2015-02-03");
    }

    #[test]
    fn value_class_concatenates_in_order() {
        let doc = Document::from(
            r#"<span class="p-tel"><span class="value">+44</span> <span class="value">1234</span></span>"#,
        );
        assert_eq!(value_class_pattern(&first(&doc, "span")), Some("+441234".to_string()));
    }

    #[test]
    fn implied_name_from_own_attributes() {
        let doc = Document::from(r#"<img class="h-card" alt="Jane" src="j.png">"#);
        assert_eq!(implied_name(&first(&doc, "img")), "Jane");

        let doc = Document::from(r#"<abbr class="h-card" title="Jane Doe">JD</abbr>"#);
        assert_eq!(implied_name(&first(&doc, "abbr")), "Jane Doe");
    }

    #[test]
    fn implied_name_from_sole_child_and_grandchild() {
        let doc = Document::from(r#"<div class="h-card"><img alt="Jane" src="j.png"></div>"#);
        assert_eq!(implied_name(&first(&doc, "div")), "Jane");

        let doc = Document::from(
            r#"<div class="h-card"><span><img alt="Jane" src="j.png"></span></div>"#,
        );
        assert_eq!(implied_name(&first(&doc, "div")), "Jane");
    }

    #[test]
    fn implied_name_skips_rooted_children() {
        // The sole-child attribute path must not draw from a child that is
        // itself a root; the text fallback still renders the whole subtree.
        let doc = Document::from(
            r#"<div class="h-card"><img class="h-card" alt="Inner" src="j.png">Outer</div>"#,
        );
        assert_eq!(implied_name(&first(&doc, "div")), "InnerOuter");
    }

    #[test]
    fn implied_name_falls_back_to_text() {
        let doc = Document::from(r#"<div class="h-card">  Jane Doe  </div>"#);
        assert_eq!(implied_name(&first(&doc, "div")), "Jane Doe");
    }

    #[test]
    fn implied_photo_sources() {
        let b = base();
        let doc = Document::from(r#"<img class="h-card" src="/me.jpg" alt="Me">"#);
        assert_eq!(
            implied_photo(&first(&doc, "img"), Some(&b)),
            Some((
                "http://example.com/me.jpg".to_string(),
                Some("Me".to_string())
            ))
        );

        let doc = Document::from(
            r#"<div class="h-card"><span><img src="/me.jpg"></span></div>"#,
        );
        assert_eq!(
            implied_photo(&first(&doc, "div"), Some(&b)),
            Some(("http://example.com/me.jpg".to_string(), None))
        );
    }

    #[test]
    fn implied_photo_ignores_multiple_candidates() {
        let doc = Document::from(
            r#"<div class="h-card"><img src="/a.jpg"><img src="/b.jpg"></div>"#,
        );
        assert_eq!(implied_photo(&first(&doc, "div"), None), None);
    }

    #[test]
    fn implied_url_sources() {
        let b = base();
        let doc = Document::from(r#"<a class="h-card" href="/jane">Jane</a>"#);
        assert_eq!(
            implied_url(&first(&doc, "a"), Some(&b)),
            Some("http://example.com/jane".to_string())
        );

        let doc = Document::from(r#"<div class="h-card"><a href="/jane">Jane</a></div>"#);
        assert_eq!(
            implied_url(&first(&doc, "div"), Some(&b)),
            Some("http://example.com/jane".to_string())
        );

        let doc = Document::from(r#"<div class="h-card"><span>no link</span></div>"#);
        assert_eq!(implied_url(&first(&doc, "div"), None), None);
    }
}
