//! The walker: a single depth-first traversal that turns class-annotated
//! DOM subtrees into microformat items.
//!
//! At each node the walker decides whether the node opens a new item,
//! records `rel` metadata, and — after its children return — runs the
//! implied-property passes and decides whether the node contributes
//! property values to the nearest enclosing item. Open items live on an
//! explicit stack because one node can simultaneously be a root (its own
//! item) and a property (a value of the enclosing item).

use dom_query::NodeRef;
use url::Url;

use crate::backcompat;
use crate::datetime;
use crate::dom;
use crate::patterns::{PROPERTY_CLASS, ROOT_CLASS};
use crate::result::{Data, Microformat, PropertyValue, RelUrl, ValueObject};
use crate::url_utils;
use crate::value;

/// One open item on the walk stack, with the bookkeeping the implied
/// property pass reads when the item is finalised.
struct Frame {
    item: Microformat,
    backcompat: bool,
    has_nested: bool,
    has_p: bool,
    has_u: bool,
    has_e: bool,
}

impl Frame {
    fn new(item: Microformat, backcompat: bool) -> Self {
        Frame {
            item,
            backcompat,
            has_nested: false,
            has_p: false,
            has_u: false,
            has_e: false,
        }
    }
}

/// Parse the microformats found in the subtree rooted at `node`.
/// `base_url` seeds relative URL resolution; the first `<base href>` in
/// the subtree replaces it for the remainder of the walk.
#[must_use]
pub fn parse_node(node: &NodeRef, base_url: Option<&Url>) -> Data {
    let mut walker = Walker {
        data: Data::default(),
        stack: Vec::new(),
        base: base_url.cloned(),
        base_found: false,
        root: node.clone(),
    };
    walker.walk(node);
    walker.data
}

struct Walker<'a> {
    data: Data,
    stack: Vec<Frame>,
    base: Option<Url>,
    base_found: bool,
    root: NodeRef<'a>,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, node: &NodeRef<'a>) {
        if dom::is_tag(node, &["template"]) {
            return;
        }

        let classes = dom::classes(node);
        let mut root_classes: Vec<String> = classes
            .iter()
            .filter(|c| ROOT_CLASS.is_match(c))
            .cloned()
            .collect();
        let mut backcompat_root = false;
        if root_classes.is_empty() {
            root_classes = backcompat::root_classes(&classes);
            backcompat_root = !root_classes.is_empty();
        }

        let opened = !root_classes.is_empty();
        if opened {
            if !backcompat_root {
                root_classes.sort();
            }
            let mut item = Microformat {
                types: root_classes,
                ..Microformat::default()
            };
            if !backcompat_root {
                item.id = dom::attr_or_empty(node, "id");
            }
            if dom::is_tag(node, &["area"]) {
                item.shape = dom::attr_or_empty(node, "shape");
                item.coords = dom::attr_or_empty(node, "coords");
            }
            if let Some(parent) = self.stack.last_mut() {
                parent.has_nested = true;
            }
            self.stack.push(Frame::new(item, backcompat_root));
        }

        if !self.base_found && dom::is_tag(node, &["base"]) {
            self.adopt_base(node);
        }

        let in_backcompat = self.stack.last().is_some_and(|f| f.backcompat);

        // The include pattern substitutes the target subtree for this
        // node wholesale.
        if in_backcompat && !opened {
            if let Some(target) = backcompat::include_target(node, &self.root) {
                self.walk(&target);
                return;
            }
        }

        if dom::is_tag(node, &["a", "link"]) {
            self.record_rel(node);
        }

        let mut child = node.first_child();
        while let Some(c) = child {
            let next = c.next_sibling();
            self.walk(&c);
            child = next;
        }

        if in_backcompat {
            for target in backcompat::itemref_targets(node, &self.root) {
                self.walk(&target);
            }
        }

        let finished = if opened {
            self.stack.pop().map(|frame| self.finalize(frame, node))
        } else {
            None
        };

        let enclosing_backcompat = self.stack.last().is_some_and(|f| f.backcompat);
        let property_classes: Vec<String> = if enclosing_backcompat {
            let rels = rel_tokens(node);
            let context = self
                .stack
                .last()
                .map(|f| f.item.types.clone())
                .unwrap_or_default();
            backcompat::property_classes(&classes, &rels, &context)
        } else {
            classes
                .iter()
                .filter(|c| PROPERTY_CLASS.is_match(c))
                .cloned()
                .collect()
        };

        if !property_classes.is_empty() && !self.stack.is_empty() {
            for prop in &property_classes {
                self.emit_property(node, prop, finished.as_ref(), enclosing_backcompat);
            }
        } else if let Some(item) = finished {
            if let Some(parent) = self.stack.last_mut() {
                parent.item.children.push(item);
                parent.has_nested = true;
            } else {
                self.data.items.push(item);
            }
        }
    }

    /// Honour the first `<base href>`: resolve it against the current
    /// base (or adopt it outright when none is set).
    fn adopt_base(&mut self, node: &NodeRef<'a>) {
        let Some(href) = dom::attr(node, "href") else {
            return;
        };
        if href.is_empty() {
            return;
        }
        let resolved = match &self.base {
            Some(base) => base.join(&href).ok(),
            None => Url::parse(&href).ok(),
        };
        if let Some(new_base) = resolved {
            self.base = Some(new_base);
            self.base_found = true;
        }
    }

    fn record_rel(&mut self, node: &NodeRef<'a>) {
        let Some(rel) = dom::attr(node, "rel") else {
            return;
        };
        let tokens: Vec<String> = rel.split_ascii_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return;
        }
        let href = dom::attr_or_empty(node, "href");
        let resolved = url_utils::expand_url(&href, self.base.as_ref());

        for token in &tokens {
            let urls = self.data.rels.entry(token.clone()).or_default();
            if !urls.iter().any(|u| u == &resolved) {
                urls.push(resolved.clone());
            }
        }

        self.data.rel_urls.entry(resolved).or_insert_with(|| RelUrl {
            rels: tokens,
            text: dom::text_content(node, None),
            media: dom::attr_or_empty(node, "media"),
            hreflang: dom::attr_or_empty(node, "hreflang"),
            title: dom::attr_or_empty(node, "title"),
            media_type: dom::attr_or_empty(node, "type"),
        });
    }

    /// Run the end-of-item passes: imputed end dates always, implied
    /// properties for microformats2 roots only.
    fn finalize(&self, mut frame: Frame, node: &NodeRef<'a>) -> Microformat {
        datetime::imply_end_date(&mut frame.item);
        if !frame.backcompat {
            self.apply_implied(&mut frame, node);
        }
        frame.item
    }

    fn apply_implied(&self, frame: &mut Frame, node: &NodeRef<'a>) {
        let base = self.base.as_ref();
        let item = &mut frame.item;

        if !item.properties.contains_key("name")
            && !frame.has_nested
            && !frame.has_p
            && !frame.has_e
        {
            let name = value::implied_name(node);
            if !name.is_empty() {
                item.properties
                    .insert("name".to_string(), vec![PropertyValue::Plain(name)]);
            }
        }

        if !item.properties.contains_key("photo") && !frame.has_nested && !frame.has_u {
            if let Some((photo, alt)) = value::implied_photo(node, base) {
                if !photo.is_empty() {
                    let emitted = match alt {
                        Some(alt) => PropertyValue::Object(ValueObject {
                            value: photo,
                            html: String::new(),
                            alt,
                        }),
                        None => PropertyValue::Plain(photo),
                    };
                    item.properties.insert("photo".to_string(), vec![emitted]);
                }
            }
        }

        if !item.properties.contains_key("url") && !frame.has_nested && !frame.has_u {
            if let Some(url) = value::implied_url(node, base) {
                if !url.is_empty() {
                    item.properties
                        .insert("url".to_string(), vec![PropertyValue::Plain(url)]);
                }
            }
        }
    }

    /// Extract one property value from `node` and append it to the
    /// enclosing item. When the node itself opened `child`, the emitted
    /// value is the child item in embedded form.
    fn emit_property(
        &mut self,
        node: &NodeRef<'a>,
        prop: &str,
        child: Option<&Microformat>,
        backcompat_ctx: bool,
    ) {
        let Some((prefix, name)) = prop.split_once('-') else {
            return;
        };

        let mut html_body = String::new();
        let mut alt = None;
        let value = match prefix {
            "p" => value::p_value(node, self.base.as_ref()),
            "u" => {
                let (v, img_alt) = value::u_value(node, self.base.as_ref());
                alt = img_alt;
                if backcompat_ctx && name == "category" {
                    backcompat::url_category(&v)
                } else {
                    v
                }
            }
            "e" => {
                let (text, html) = value::e_value(node, self.base.as_ref());
                html_body = html;
                text
            }
            "dt" => value::dt_value(node),
            _ => return,
        };

        let Some(top) = self.stack.last_mut() else {
            return;
        };
        match prefix {
            "p" => top.has_p = true,
            "u" => top.has_u = true,
            "e" => top.has_e = true,
            _ => {}
        }

        let emitted = if let Some(child) = child {
            let embed_value = match prefix {
                "p" => child.first_plain("name").map(str::to_string),
                "u" => child.first_plain("url").map(str::to_string),
                _ => None,
            }
            .unwrap_or_else(|| value.clone());
            PropertyValue::Item(Microformat {
                id: child.id.clone(),
                value: embed_value,
                html: html_body,
                types: child.types.clone(),
                properties: child.properties.clone(),
                shape: child.shape.clone(),
                coords: child.coords.clone(),
                children: Vec::new(),
            })
        } else if !html_body.is_empty() {
            PropertyValue::Object(ValueObject {
                value,
                html: html_body,
                alt: String::new(),
            })
        } else if let Some(alt) = alt {
            PropertyValue::Object(ValueObject {
                value,
                html: String::new(),
                alt,
            })
        } else {
            PropertyValue::Plain(value)
        };

        top.item
            .properties
            .entry(name.to_string())
            .or_default()
            .push(emitted);
    }
}

fn rel_tokens(node: &NodeRef) -> Vec<String> {
    dom::attr(node, "rel")
        .map(|rel| rel.split_ascii_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
