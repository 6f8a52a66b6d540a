//! Render output tree.
//!
//! Rendering produces a framework-neutral element tree. A host maps
//! elements to its own UI primitives; tests and the demo inspect the tree
//! directly.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// One node of rendered output.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    /// Renders nothing.
    #[default]
    Empty,
    Text { text: String },
    Element(Element),
}

/// A tagged element with attributes and children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute. `null` values are dropped.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.attrs.insert(key.into(), value);
        }
        self
    }

    /// Append a child. [`RenderNode::Empty`] children are skipped.
    #[must_use]
    pub fn child(mut self, node: impl Into<RenderNode>) -> Self {
        let node = node.into();
        if !node.is_empty() {
            self.children.push(node);
        }
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children
            .extend(nodes.into_iter().filter(|n| !n.is_empty()));
        self
    }

    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }
}

impl From<Element> for RenderNode {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl RenderNode {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Depth-first search for the first element matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        let el = self.as_element()?;
        if pred(el) {
            return Some(el);
        }
        el.children.iter().find_map(|c| c.find(pred))
    }

    /// All elements matching `pred`, in document order.
    #[must_use]
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(pred, &mut out);
        out
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if let Self::Element(el) = self {
            if pred(el) {
                out.push(el);
            }
            for c in &el.children {
                c.collect(pred, out);
            }
        }
    }

    /// First element with `tag` whose `name` attribute equals `name`.
    #[must_use]
    pub fn find_named(&self, tag: &str, name: &str) -> Option<&Element> {
        self.find(&|el| el.tag == tag && el.get_attr("name").and_then(Value::as_str) == Some(name))
    }

    /// Concatenated text content, depth first.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Empty => {}
            Self::Text { text } => out.push_str(text),
            Self::Element(el) => el.children.iter().for_each(|c| c.push_text(out)),
        }
    }

    /// Indented outline, one element per line. Used by the demo and in
    /// test failure messages.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.push_outline(0, &mut out);
        out
    }

    fn push_outline(&self, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        match self {
            Self::Empty => {}
            Self::Text { text } => {
                out.push_str(&pad);
                out.push_str(&format!("{text:?}\n"));
            }
            Self::Element(el) => {
                out.push_str(&pad);
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attrs {
                    out.push_str(&format!(" {k}={v}"));
                }
                out.push_str(">\n");
                for c in &el.children {
                    c.push_outline(depth + 1, out);
                }
            }
        }
    }
}
