//! Parsed document tree for the Wombat renderer.
//!
//! This crate defines the input side of the render pipeline: the immutable
//! tree produced by a parser and read by the render-tree builder. It follows
//! the shape of the [DOM Living Standard](https://dom.spec.whatwg.org/) only
//! as far as the builder needs: elements with a tag name, an ordered
//! attribute list, and ordered text/element children.
//!
//! # Design
//!
//! Unlike an arena DOM, a [`ParsedNode`] owns its children directly. The tree
//! is built once and never mutated, so there are no parent pointers and no
//! shared ownership to manage.

use std::fmt::Write as _;

use serde::Serialize;

/// Ordered list of attribute names and values for an element.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
///
/// "An element has an associated attribute list"
///
/// Insertion order is preserved. Setting an existing name replaces its value
/// in place. Equality and hashing are structural, so two maps with the same
/// entries in the same order are interchangeable as cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributesMap(Vec<(String, String)>);

impl AttributesMap {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Set `name` to `value`, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributesMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A child of a [`ParsedNode`].
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "A node has an associated list of children"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsedChild {
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// Character data. A line break (`<br>`) arrives as the text `"\n"`.
    Text(String),
    /// A nested element.
    Node(ParsedNode),
}

/// An element of the parsed document.
///
/// Immutable once built. The render-tree builder only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedNode {
    /// Lowercase local name, e.g. `"p"`.
    pub tag: String,
    /// Attributes in source order.
    pub attributes: AttributesMap,
    /// Children in source order.
    pub children: Vec<ParsedChild>,
}

impl ParsedNode {
    /// Create an element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: AttributesMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Builder: append a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ParsedChild::Text(text.into()));
        self
    }

    /// Builder: append an element child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(ParsedChild::Node(child));
        self
    }

    /// Value of attribute `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Element children in order, skipping text.
    pub fn element_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            ParsedChild::Node(node) => Some(node),
            ParsedChild::Text(_) => None,
        })
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-descendant-text-content)
    ///
    /// "The descendant text content of a node node is the concatenation of
    /// the data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.append_text_content(&mut out);
        out
    }

    /// Append the descendant text content to `out`.
    pub fn append_text_content(&self, out: &mut String) {
        for child in &self.children {
            match child {
                ParsedChild::Text(text) => out.push_str(text),
                ParsedChild::Node(node) => node.append_text_content(out),
            }
        }
    }

    /// Total number of elements in this subtree, including `self`.
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self.element_children().map(Self::element_count).sum::<usize>()
    }
}

/// Render the tree in an indented, human-readable form.
#[must_use]
pub fn print_tree(node: &ParsedNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &ParsedNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}<{}", node.tag);
    for (name, value) in node.attributes.iter() {
        let _ = write!(out, " {name}=\"{value}\"");
    }
    out.push_str(">\n");
    for child in &node.children {
        match child {
            ParsedChild::Text(text) => {
                let _ = writeln!(out, "{indent}  \"{}\"", text.escape_debug());
            }
            ParsedChild::Node(child) => write_node(out, child, depth + 1),
        }
    }
}
