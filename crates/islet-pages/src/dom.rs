//! DOM abstraction layer
//!
//! The hydration scheduler never touches a concrete DOM type directly. It works
//! against [`IslandElement`], a small handle trait implemented by the in-memory
//! [`Element`] tree in this module (native targets and tests) and by
//! `web_sys::Element` on WASM (see `platform::web`).
//!
//! ## Dormant content
//!
//! Dormant content is held inside `<template>` elements. The HTML parser puts a
//! template's children into a separate, inert content fragment, so nothing in
//! it is rendered or executed until the template is replaced by that content.
//! [`Element`] mirrors this: children appended to a `template` element go to its
//! content list, and tree queries never descend into it.
//!
//! ```text
//! <mini-island client:visible>
//!   <template data-island>      <- marker node
//!     <button>Buy</button>      <- inert until promoted
//!   </template>
//! </mini-island>
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use thiserror::Error;

/// Tag name of the element that holds dormant content.
pub const TEMPLATE_TAG: &str = "template";

/// Errors raised while promoting a single dormant fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
	/// The marked node is not a `<template>` element.
	#[error("marked node <{0}> is not a template")]
	NotTemplate(String),
	/// The fragment has no parent to be replaced in.
	#[error("dormant fragment is detached from the tree")]
	Detached,
	/// The host platform rejected the replacement.
	#[error("platform rejected fragment replacement: {0}")]
	Platform(String),
}

/// Handle to a node in the host UI tree.
///
/// Equality is node identity: two handles compare equal iff they refer to the
/// same node.
pub trait IslandElement: Clone + PartialEq + 'static {
	/// Lower-case tag name.
	fn tag_name(&self) -> String;

	/// Returns the attribute value, `Some("")` for a valueless attribute and
	/// `None` when the attribute is absent.
	fn get_attribute(&self, name: &str) -> Option<String>;

	/// Returns true if the attribute is present.
	fn has_attribute(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	/// Every `<template>` descendant carrying `marker`, in document order.
	///
	/// Fragments inside a nested element tagged `island_tag` belong to that
	/// island and are not returned.
	fn dormant_fragments(&self, marker: &str, island_tag: &str) -> Vec<Self>;

	/// Replaces this template with the content it holds, at the same position.
	fn promote_fragment(&self) -> Result<(), PromotionError>;

	/// Every descendant element with the given tag, in document order.
	fn descendants_with_tag(&self, tag: &str) -> Vec<Self>;
}

/// A node in the in-memory tree.
#[derive(Clone, PartialEq)]
pub enum Node {
	/// An element node.
	Element(Element),
	/// A text node.
	Text(String),
}

impl Node {
	/// Returns the element if this is an element node.
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Node::Element(el) => Some(el),
			Node::Text(_) => None,
		}
	}

	fn write_html(&self, out: &mut String) {
		match self {
			Node::Element(el) => el.write_outer_html(out),
			Node::Text(text) => out.push_str(&html_escape_text(text)),
		}
	}

	fn collect_text(&self, out: &mut String) {
		match self {
			Node::Element(el) => {
				for child in el.data.borrow().children.iter() {
					child.collect_text(out);
				}
			}
			Node::Text(text) => out.push_str(text),
		}
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Node::Element(el) => el.fmt(f),
			Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
		}
	}
}

impl From<Element> for Node {
	fn from(el: Element) -> Self {
		Node::Element(el)
	}
}

impl From<&str> for Node {
	fn from(text: &str) -> Self {
		Node::Text(text.to_string())
	}
}

impl From<String> for Node {
	fn from(text: String) -> Self {
		Node::Text(text)
	}
}

#[derive(Default)]
struct ElementData {
	tag: String,
	attributes: Vec<(String, String)>,
	children: Vec<Node>,
	// Inert content of a `<template>`; always empty for other tags.
	content: Vec<Node>,
	parent: Weak<RefCell<ElementData>>,
}

/// Reference-counted in-memory element.
///
/// Cloning an `Element` clones the handle, not the node.
#[derive(Clone)]
pub struct Element {
	data: Rc<RefCell<ElementData>>,
}

impl Element {
	/// Creates a detached element.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			data: Rc::new(RefCell::new(ElementData {
				tag: tag.into().to_ascii_lowercase(),
				..ElementData::default()
			})),
		}
	}

	/// Adds an attribute (builder style).
	pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Adds a valueless attribute (builder style).
	pub fn flag(self, name: impl Into<String>) -> Self {
		self.set_attribute(name, "");
		self
	}

	/// Appends a child node (builder style).
	pub fn child(self, node: impl Into<Node>) -> Self {
		self.append_child(node);
		self
	}

	/// Sets or replaces an attribute.
	pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		let mut data = self.data.borrow_mut();
		match data.attributes.iter_mut().find(|(k, _)| *k == name) {
			Some((_, v)) => *v = value,
			None => data.attributes.push((name, value)),
		}
	}

	/// Removes an attribute if present.
	pub fn remove_attribute(&self, name: &str) {
		self.data.borrow_mut().attributes.retain(|(k, _)| k != name);
	}

	/// Appends a child node.
	///
	/// For `template` elements the node goes into the inert content instead.
	/// An element that already has a parent is moved.
	pub fn append_child(&self, node: impl Into<Node>) {
		let node = node.into();
		if let Node::Element(el) = &node {
			el.detach();
			if !self.is_template() {
				el.data.borrow_mut().parent = Rc::downgrade(&self.data);
			}
		}
		let mut data = self.data.borrow_mut();
		if data.tag == TEMPLATE_TAG {
			data.content.push(node);
		} else {
			data.children.push(node);
		}
	}

	/// Returns true for `<template>` elements.
	pub fn is_template(&self) -> bool {
		self.data.borrow().tag == TEMPLATE_TAG
	}

	/// Parent element, if attached.
	pub fn parent(&self) -> Option<Element> {
		self.data
			.borrow()
			.parent
			.upgrade()
			.map(|data| Element { data })
	}

	/// All child nodes.
	pub fn child_nodes(&self) -> Vec<Node> {
		self.data.borrow().children.clone()
	}

	/// Child elements only.
	pub fn children(&self) -> Vec<Element> {
		self.data
			.borrow()
			.children
			.iter()
			.filter_map(|n| n.as_element().cloned())
			.collect()
	}

	/// Inert content of a template (empty for other elements).
	pub fn template_content(&self) -> Vec<Node> {
		self.data.borrow().content.clone()
	}

	/// Concatenated text of the live subtree. Template content is excluded.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		Node::Element(self.clone()).collect_text(&mut out);
		out
	}

	/// Serialized children.
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		let data = self.data.borrow();
		let nodes = if data.tag == TEMPLATE_TAG {
			&data.content
		} else {
			&data.children
		};
		for node in nodes {
			node.write_html(&mut out);
		}
		out
	}

	/// Serialized element including its own tag.
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_outer_html(&mut out);
		out
	}

	/// Descendant elements matching `predicate` in document order.
	///
	/// Template content is not searched.
	pub fn find_all(&self, predicate: impl Fn(&Element) -> bool) -> Vec<Element> {
		let mut found = Vec::new();
		self.collect_matching(&predicate, &mut found);
		found
	}

	fn collect_matching(&self, predicate: &dyn Fn(&Element) -> bool, found: &mut Vec<Element>) {
		for child in self.children() {
			if predicate(&child) {
				found.push(child.clone());
			}
			child.collect_matching(predicate, found);
		}
	}

	fn collect_fragments(&self, marker: &str, island_tag: &str, found: &mut Vec<Element>) {
		for child in self.children() {
			if child.is_template() {
				if child.has_attribute(marker) {
					found.push(child);
				}
			} else if child.data.borrow().tag != island_tag {
				child.collect_fragments(marker, island_tag, found);
			}
		}
	}

	fn detach(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		parent
			.data
			.borrow_mut()
			.children
			.retain(|n| n.as_element() != Some(self));
		self.data.borrow_mut().parent = Weak::new();
	}

	fn write_outer_html(&self, out: &mut String) {
		let data = self.data.borrow();
		out.push('<');
		out.push_str(&data.tag);
		for (name, value) in &data.attributes {
			out.push(' ');
			out.push_str(name);
			if !value.is_empty() {
				out.push_str("=\"");
				out.push_str(&html_escape_attr(value));
				out.push('"');
			}
		}
		out.push('>');
		drop(data);
		out.push_str(&self.inner_html());
		out.push_str("</");
		out.push_str(&self.data.borrow().tag);
		out.push('>');
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.data, &other.data)
	}
}

impl Eq for Element {}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.data.borrow();
		f.debug_struct("Element")
			.field("tag", &data.tag)
			.field("attributes", &data.attributes)
			.field("children", &data.children.len())
			.finish()
	}
}

impl IslandElement for Element {
	fn tag_name(&self) -> String {
		self.data.borrow().tag.clone()
	}

	fn get_attribute(&self, name: &str) -> Option<String> {
		self.data
			.borrow()
			.attributes
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.clone())
	}

	fn dormant_fragments(&self, marker: &str, island_tag: &str) -> Vec<Self> {
		let island_tag = island_tag.to_ascii_lowercase();
		let mut found = Vec::new();
		self.collect_fragments(marker, &island_tag, &mut found);
		found
	}

	fn promote_fragment(&self) -> Result<(), PromotionError> {
		if !self.is_template() {
			return Err(PromotionError::NotTemplate(self.tag_name()));
		}
		let parent = self.parent().ok_or(PromotionError::Detached)?;
		let position = parent
			.data
			.borrow()
			.children
			.iter()
			.position(|n| n.as_element() == Some(self))
			.ok_or(PromotionError::Detached)?;

		let content = std::mem::take(&mut self.data.borrow_mut().content);
		for node in &content {
			if let Node::Element(el) = node {
				el.data.borrow_mut().parent = Rc::downgrade(&parent.data);
			}
		}
		parent
			.data
			.borrow_mut()
			.children
			.splice(position..=position, content);

		self.data.borrow_mut().parent = Weak::new();
		Ok(())
	}

	fn descendants_with_tag(&self, tag: &str) -> Vec<Self> {
		let tag = tag.to_ascii_lowercase();
		self.find_all(|el| el.data.borrow().tag == tag)
	}
}

/// Escapes a string for use in an HTML attribute value.
fn html_escape_attr(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('"', "&quot;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

fn html_escape_text(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}
