/// Content-side context extraction from the DOM
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAnchorElement, Node, Selection, SvgaElement};

use crate::context::{ContextDescriptor, collapse_whitespace};

/// The node the user acted on: the selection if there is one, else the
/// focused element
pub fn active_node(document: &Document, selection: Option<&Selection>) -> Option<Node> {
    if let Some(sel) = selection.filter(|sel| !sel.is_collapsed()) {
        let anchor = sel.anchor_node();
        let focus = sel.focus_node();
        match anchor {
            Some(anchor) if anchor.is_same_node(focus.as_ref()) => {
                if anchor.node_type() == Node::ELEMENT_NODE {
                    return Some(anchor);
                }
                if let Some(parent) = anchor.parent_node() {
                    return Some(parent);
                }
            }
            _ if sel.range_count() == 1 => {
                if let Ok(node) = sel.get_range_at(0).and_then(|r| r.common_ancestor_container()) {
                    return Some(node);
                }
            }
            _ => {}
        }
    }
    document.active_element().map(Node::from)
}

/// Nearest `<a>` at or above `node`, not looking past the children of the
/// root element
pub fn find_anchor(document: &Document, node: Node) -> Option<Element> {
    let root: Option<Node> = document.document_element().map(Node::from);
    let mut current = node;
    loop {
        let parent = current.parent_node()?;
        if root.as_ref().map_or(false, |r| r.is_same_node(Some(&parent))) {
            return None;
        }
        if let Some(elm) = current.dyn_ref::<Element>() {
            if elm.local_name() == "a" {
                return Some(elm.clone());
            }
        }
        current = parent;
    }
}

fn anchor_href(anchor: &Element) -> Option<String> {
    let href = if let Some(a) = anchor.dyn_ref::<HtmlAnchorElement>() {
        a.href()
    } else if let Some(a) = anchor.dyn_ref::<SvgaElement>() {
        a.href().base_val()
    } else {
        anchor.get_attribute("href")?
    };
    if href.is_empty() { None } else { Some(href) }
}

/// Resolve a canonical href against the document's origin
pub fn resolve_canonical(doc_url: &str, href: &str) -> Option<String> {
    let origin = Url::parse(doc_url).ok()?.origin();
    if !origin.is_tuple() {
        return None;
    }
    let base = Url::parse(&origin.ascii_serialization()).ok()?;
    base.join(href).ok().map(String::from)
}

pub fn canonical_url(document: &Document) -> Option<String> {
    let link = document
        .query_selector("link[rel=canonical][href]")
        .ok()
        .flatten()?;
    let href = link.get_attribute("href")?;
    resolve_canonical(&document.url().ok()?, &href)
}

/// Build the descriptor for the current DOM state. Reads only.
pub fn extract(document: &Document, selection: Option<&Selection>) -> ContextDescriptor {
    let mut info = ContextDescriptor {
        page_url: document.url().unwrap_or_default(),
        page_title: document.title(),
        selection_text: selection
            .map(|sel| collapse_whitespace(&String::from(sel.to_string())))
            .unwrap_or_default(),
        canonical_url: canonical_url(document),
        ..Default::default()
    };

    let node = active_node(document, selection).map(|node| match node.node_type() {
        Node::ELEMENT_NODE => Some(node),
        _ => node.parent_node(),
    });
    let Some(anchor) = node.flatten().and_then(|n| find_anchor(document, n)) else {
        return info;
    };
    let Some(href) = anchor_href(&anchor) else {
        return info;
    };

    let content = collapse_whitespace(&anchor.text_content().unwrap_or_default())
        .trim()
        .to_string();
    let link_text = if content.is_empty() {
        anchor.get_attribute("title").unwrap_or_default()
    } else {
        content
    };
    info.is_link = true;
    info.link_url = Some(href);
    info.link_text = Some(link_text);
    info
}

/// Extract from the window this script runs in
pub fn extract_from_window() -> Option<ContextDescriptor> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let selection = window.get_selection().ok().flatten();
    Some(extract(&document, selection.as_ref()))
}
