//! Element helpers over `dom_query` nodes.
//!
//! The walker operates on raw [`NodeRef`]s rather than CSS selections, so
//! this module provides the small vocabulary it needs: attribute lookup,
//! class lists, tag predicates, text accumulation and single-child
//! selection. Attribute lookup is case-insensitive by scanning the
//! attribute list directly — input HTML may carry uppercase attribute
//! names that the host parser preserves (foreign content, broken markup).

use dom_query::NodeRef;

/// Look up an attribute by name, case-insensitively. The first attribute
/// with a matching name wins when duplicates appear. Returns `None` when
/// the attribute is missing (as opposed to present but empty).
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.attrs()
        .iter()
        .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
        .map(|a| a.value.to_string())
}

/// Like [`attr`], defaulting to the empty string.
#[must_use]
pub fn attr_or_empty(node: &NodeRef, name: &str) -> String {
    attr(node, name).unwrap_or_default()
}

/// The node's class list: the `class` attribute split on ASCII
/// whitespace, empty when absent.
#[must_use]
pub fn classes(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Whether the node is an element with one of the given (lowercase) tag
/// names.
#[must_use]
pub fn is_tag(node: &NodeRef, names: &[&str]) -> bool {
    node.node_name()
        .is_some_and(|n| names.iter().any(|t| n.eq_ignore_ascii_case(t)))
}

/// Concatenated text of the node's descendants in document order,
/// skipping `<script>`, `<style>` and `<template>` subtrees. Each `<img>`
/// subtree is replaced by `img_fn(img)`; without a handler, images
/// contribute nothing.
#[must_use]
pub fn text_content(node: &NodeRef, img_fn: Option<&dyn Fn(&NodeRef) -> String>) -> String {
    let mut out = String::new();
    collect_text(node, img_fn, &mut out);
    out
}

fn collect_text(node: &NodeRef, img_fn: Option<&dyn Fn(&NodeRef) -> String>, out: &mut String) {
    if is_tag(node, &["script", "style", "template"]) {
        return;
    }
    if let Some(f) = img_fn {
        if is_tag(node, &["img"]) {
            out.push_str(&f(node));
            return;
        }
    }
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        let next = c.next_sibling();
        collect_text(&c, img_fn, out);
        child = next;
    }
}

/// The sole element child of the node. `None` when the node has zero or
/// more than one element child.
#[must_use]
pub fn only_child<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    only_child_by(node, |_| true)
}

/// The sole element child with the given tag name.
#[must_use]
pub fn only_child_tag<'a>(node: &NodeRef<'a>, tag: &str) -> Option<NodeRef<'a>> {
    only_child_by(node, |c| is_tag(c, &[tag]))
}

/// The sole element child with the given tag name that also carries the
/// given attribute.
#[must_use]
pub fn only_child_tag_with_attr<'a>(
    node: &NodeRef<'a>,
    tag: &str,
    attr_name: &str,
) -> Option<NodeRef<'a>> {
    only_child_by(node, |c| is_tag(c, &[tag]) && attr(c, attr_name).is_some())
}

fn only_child_by<'a>(
    node: &NodeRef<'a>,
    matches: impl Fn(&NodeRef<'a>) -> bool,
) -> Option<NodeRef<'a>> {
    let mut found: Option<NodeRef<'a>> = None;
    let mut child = node.first_child();
    while let Some(c) = child {
        let next = c.next_sibling();
        if c.is_element() && matches(&c) {
            if found.is_some() {
                return None;
            }
            found = Some(c);
        }
        child = next;
    }
    found
}

/// Depth-first search for the element with the given DOM id.
#[must_use]
pub fn find_by_id<'a>(root: &NodeRef<'a>, id: &str) -> Option<NodeRef<'a>> {
    if root.is_element() && attr(root, "id").as_deref() == Some(id) {
        return Some(root.clone());
    }
    let mut child = root.first_child();
    while let Some(c) = child {
        let next = c.next_sibling();
        if let Some(found) = find_by_id(&c, id) {
            return Some(found);
        }
        child = next;
    }
    None
}

/// Whether `candidate` is `node` itself or one of its ancestors.
#[must_use]
pub fn is_ancestor_or_self(candidate: &NodeRef, node: &NodeRef) -> bool {
    let mut cursor = Some(node.clone());
    while let Some(n) = cursor {
        if n.id == candidate.id {
            return true;
        }
        cursor = n.parent();
    }
    false
}
