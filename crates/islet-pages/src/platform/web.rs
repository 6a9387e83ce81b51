//! Browser platform
//!
//! Capabilities are detected once, when [`WebPlatform::new`] runs, by checking
//! for the corresponding property on `window`.
//!
//! Element registration does not create a JavaScript class. Defining the
//! island tag connects every instance in the document once it has been parsed,
//! then a `MutationObserver` connects every instance inserted afterwards.

use std::cell::RefCell;
use std::collections::HashSet;

use futures::future::LocalBoxFuture;
use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Document, HtmlTemplateElement, IntersectionObserverEntry,
	MediaQueryListEvent, MutationObserverInit, MutationRecord, Window,
};

use super::{
	Callback, ConnectedCallback, DocumentLifecycle, ElementRegistry, IdleScheduler,
	IntersectionCallback, IntersectionEntry, IntersectionObserver, MediaQueries, MediaQueryList,
	ObserverAction, Platform,
};
use crate::dom::{IslandElement, PromotionError, TEMPLATE_TAG};
use crate::hydration::IslandError;
use crate::{debug_log, warn_log};

impl IslandElement for web_sys::Element {
	fn tag_name(&self) -> String {
		web_sys::Element::tag_name(self).to_ascii_lowercase()
	}

	fn get_attribute(&self, name: &str) -> Option<String> {
		web_sys::Element::get_attribute(self, name)
	}

	fn has_attribute(&self, name: &str) -> bool {
		web_sys::Element::has_attribute(self, name)
	}

	fn dormant_fragments(&self, marker: &str, island_tag: &str) -> Vec<Self> {
		let selector = format!("{}[{}]", TEMPLATE_TAG, escape_attribute_name(marker));
		query_all(self, &selector)
			.into_iter()
			.filter(|template| {
				// Owned by the nearest enclosing island only.
				matches!(template.closest(island_tag), Ok(Some(owner)) if owner == *self)
			})
			.collect()
	}

	fn promote_fragment(&self) -> Result<(), PromotionError> {
		let template = self
			.dyn_ref::<HtmlTemplateElement>()
			.ok_or_else(|| PromotionError::NotTemplate(IslandElement::tag_name(self)))?;
		if self.parent_node().is_none() {
			return Err(PromotionError::Detached);
		}
		self.replace_with_with_node_1(&template.content())
			.map_err(|e| PromotionError::Platform(format!("{:?}", e)))
	}

	fn descendants_with_tag(&self, tag: &str) -> Vec<Self> {
		query_all(self, tag)
	}
}

fn query_all(root: &web_sys::Element, selector: &str) -> Vec<web_sys::Element> {
	let Ok(node_list) = root.query_selector_all(selector) else {
		return Vec::new();
	};
	(0..node_list.length())
		.filter_map(|i| node_list.item(i))
		.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
		.collect()
}

// `client:idle` is not a valid CSS identifier without escaping the colon.
fn escape_attribute_name(name: &str) -> String {
	name.replace(':', "\\:")
}

fn has_property(target: &JsValue, name: &str) -> bool {
	Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

/// `document.readyState` and the window `load` event.
pub struct WebDocument {
	window: Window,
	document: Document,
}

impl DocumentLifecycle for WebDocument {
	fn is_load_complete(&self) -> bool {
		self.document.ready_state() == "complete"
	}

	fn on_load(&self, callback: Callback) {
		let options = AddEventListenerOptions::new();
		options.set_once(true);
		let listener = Closure::once_into_js(move || callback());
		if let Err(e) = self
			.window
			.add_event_listener_with_callback_and_add_event_listener_options(
				"load",
				listener.unchecked_ref(),
				&options,
			) {
			warn_log!("failed to listen for window load: {:?}", e);
		}
	}
}

/// `window.requestIdleCallback`.
pub struct WebIdle {
	window: Window,
}

impl IdleScheduler for WebIdle {
	fn request_idle_callback(&self, callback: Callback) {
		let callback = Closure::once_into_js(move || callback());
		if let Err(e) = self.window.request_idle_callback(callback.unchecked_ref()) {
			warn_log!("requestIdleCallback failed: {:?}", e);
		}
	}
}

/// `IntersectionObserver`, one observer per observed element.
pub struct WebIntersection;

impl IntersectionObserver<web_sys::Element> for WebIntersection {
	fn observe(&self, target: &web_sys::Element, mut callback: IntersectionCallback<web_sys::Element>) {
		let on_entries = Closure::<dyn FnMut(Array, web_sys::IntersectionObserver)>::new(
			move |entries: Array, observer: web_sys::IntersectionObserver| {
				for entry in entries.iter() {
					let entry: IntersectionObserverEntry = entry.unchecked_into();
					let target = entry.target();
					let action = callback(&IntersectionEntry {
						target: target.clone(),
						is_intersecting: entry.is_intersecting(),
					});
					if action == ObserverAction::Unobserve {
						observer.unobserve(&target);
						break;
					}
				}
			},
		);

		match web_sys::IntersectionObserver::new(on_entries.as_ref().unchecked_ref()) {
			Ok(observer) => {
				observer.observe(target);
				// The observer owns the callback from here on.
				on_entries.forget();
			}
			Err(e) => warn_log!("failed to create IntersectionObserver: {:?}", e),
		}
	}
}

/// `window.matchMedia`.
pub struct WebMedia {
	window: Window,
}

impl MediaQueries for WebMedia {
	fn match_media(&self, query: &str) -> Box<dyn MediaQueryList> {
		match self.window.match_media(query) {
			Ok(Some(list)) => Box::new(WebMediaQueryList { list }),
			_ => {
				debug_log!("matchMedia returned nothing for '{}', treating as matching", query);
				Box::new(AlwaysMatches)
			}
		}
	}
}

struct WebMediaQueryList {
	list: web_sys::MediaQueryList,
}

impl MediaQueryList for WebMediaQueryList {
	fn matches(&self) -> bool {
		self.list.matches()
	}

	fn on_change(&self, mut listener: Box<dyn FnMut(bool) + 'static>) {
		let on_change = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
			move |event: MediaQueryListEvent| listener(event.matches()),
		);
		match self
			.list
			.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
		{
			Ok(()) => on_change.forget(),
			Err(e) => warn_log!("failed to listen for media changes: {:?}", e),
		}
	}
}

struct AlwaysMatches;

impl MediaQueryList for AlwaysMatches {
	fn matches(&self) -> bool {
		true
	}

	fn on_change(&self, _listener: Box<dyn FnMut(bool) + 'static>) {}
}

/// `window.customElements`, emulated with a document scan and a
/// `MutationObserver`.
pub struct WebRegistry {
	document: Document,
	defined: RefCell<HashSet<String>>,
}

impl ElementRegistry<web_sys::Element> for WebRegistry {
	fn define(
		&self,
		tag: &str,
		on_connected: ConnectedCallback<web_sys::Element>,
	) -> Result<(), IslandError> {
		if !self.defined.borrow_mut().insert(tag.to_string()) {
			return Err(IslandError::DefinitionFailed {
				tag: tag.to_string(),
				reason: "this name has already been used with this registry".to_string(),
			});
		}

		let island_tag = tag.to_ascii_lowercase();
		let document = self.document.clone();
		let start = move || {
			if let Some(root) = document.document_element() {
				connect_within(&root, &island_tag, &on_connected);
			}
			if let Err(e) = watch_insertions(&document, island_tag, on_connected) {
				warn_log!("failed to observe document insertions: {:?}", e);
			}
		};

		if self.document.ready_state() != "loading" {
			start();
			return Ok(());
		}

		// Islands are connected once their content has been parsed.
		let options = AddEventListenerOptions::new();
		options.set_once(true);
		let listener = Closure::once_into_js(start);
		self.document
			.add_event_listener_with_callback_and_add_event_listener_options(
				"DOMContentLoaded",
				listener.unchecked_ref(),
				&options,
			)
			.map_err(|e| IslandError::DefinitionFailed {
				tag: tag.to_string(),
				reason: format!("{:?}", e),
			})
	}
}

fn connect_within(
	root: &web_sys::Element,
	tag: &str,
	on_connected: &ConnectedCallback<web_sys::Element>,
) {
	if IslandElement::tag_name(root) == tag {
		on_connected(root.clone());
	}
	for element in query_all(root, tag) {
		on_connected(element);
	}
}

fn watch_insertions(
	document: &Document,
	tag: String,
	on_connected: ConnectedCallback<web_sys::Element>,
) -> Result<(), JsValue> {
	let on_mutations = Closure::<dyn FnMut(Array, web_sys::MutationObserver)>::new(
		move |records: Array, _observer: web_sys::MutationObserver| {
			for record in records.iter() {
				let record: MutationRecord = record.unchecked_into();
				let added = record.added_nodes();
				for i in 0..added.length() {
					let Some(element) = added
						.item(i)
						.and_then(|node| node.dyn_into::<web_sys::Element>().ok())
					else {
						continue;
					};
					connect_within(&element, &tag, &on_connected);
				}
			}
		},
	);

	let observer = web_sys::MutationObserver::new(on_mutations.as_ref().unchecked_ref())?;
	let options = MutationObserverInit::new();
	options.set_child_list(true);
	options.set_subtree(true);
	observer.observe_with_options(document, &options)?;
	// The observer lives as long as the page.
	on_mutations.forget();
	Ok(())
}

/// Platform backed by the browser window.
pub struct WebPlatform {
	document: WebDocument,
	idle: Option<WebIdle>,
	intersection: Option<WebIntersection>,
	media: Option<WebMedia>,
	registry: Option<WebRegistry>,
}

impl WebPlatform {
	/// Detects the capabilities of the current window.
	pub fn new() -> Result<Self, IslandError> {
		let window = web_sys::window()
			.ok_or_else(|| IslandError::HostUnavailable("window not available".to_string()))?;
		let document = window
			.document()
			.ok_or_else(|| IslandError::HostUnavailable("document not available".to_string()))?;
		let global: &JsValue = window.as_ref();

		Ok(Self {
			idle: has_property(global, "requestIdleCallback").then(|| WebIdle {
				window: window.clone(),
			}),
			intersection: has_property(global, "IntersectionObserver").then_some(WebIntersection),
			media: has_property(global, "matchMedia").then(|| WebMedia {
				window: window.clone(),
			}),
			registry: has_property(global, "customElements").then(|| WebRegistry {
				document: document.clone(),
				defined: RefCell::new(HashSet::new()),
			}),
			document: WebDocument { window, document },
		})
	}
}

impl Platform for WebPlatform {
	type Element = web_sys::Element;

	fn document(&self) -> &dyn DocumentLifecycle {
		&self.document
	}

	fn idle_scheduler(&self) -> Option<&dyn IdleScheduler> {
		self.idle.as_ref().map(|i| i as &dyn IdleScheduler)
	}

	fn intersection_observer(&self) -> Option<&dyn IntersectionObserver<web_sys::Element>> {
		self.intersection
			.as_ref()
			.map(|i| i as &dyn IntersectionObserver<web_sys::Element>)
	}

	fn media_queries(&self) -> Option<&dyn MediaQueries> {
		self.media.as_ref().map(|m| m as &dyn MediaQueries)
	}

	fn element_registry(&self) -> Option<&dyn ElementRegistry<web_sys::Element>> {
		self.registry
			.as_ref()
			.map(|r| r as &dyn ElementRegistry<web_sys::Element>)
	}

	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(future);
	}
}
