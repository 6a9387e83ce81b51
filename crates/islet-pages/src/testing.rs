//! Testing utilities
//!
//! [`SimulatedPlatform`] is a [`Platform`] whose every facility is driven by
//! hand. Nothing happens until a test calls one of its drivers, which makes
//! condition ordering fully deterministic without a browser.
//!
//! ```ignore
//! let platform = Rc::new(SimulatedPlatform::builder().document_loading().build());
//! let registry = define_islands(Rc::clone(&platform), IslandSettings::default())?;
//!
//! platform.connect(&island);      // host inserts the element
//! platform.complete_load();       // window "load"
//! platform.run_idle_callbacks();  // idle slot granted
//! platform.run_until_stalled();   // drive spawned activations
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::dom::{Element, IslandElement};
use crate::error_log;
use crate::hydration::IslandError;
use crate::platform::{
	Callback, ConnectedCallback, DocumentLifecycle, ElementRegistry, IdleScheduler,
	IntersectionCallback, IntersectionEntry, IntersectionObserver, MediaQueries, MediaQueryList,
	ObserverAction, Platform,
};

/// Simulated document load state.
#[derive(Default)]
pub struct SimulatedDocument {
	loaded: Cell<bool>,
	load_listeners: RefCell<Vec<Callback>>,
}

impl DocumentLifecycle for SimulatedDocument {
	fn is_load_complete(&self) -> bool {
		self.loaded.get()
	}

	fn on_load(&self, callback: Callback) {
		self.load_listeners.borrow_mut().push(callback);
	}
}

/// Simulated `requestIdleCallback` queue.
#[derive(Default)]
pub struct SimulatedIdle {
	queue: RefCell<Vec<Callback>>,
}

impl IdleScheduler for SimulatedIdle {
	fn request_idle_callback(&self, callback: Callback) {
		self.queue.borrow_mut().push(callback);
	}
}

struct Observation {
	target: Element,
	callback: IntersectionCallback<Element>,
}

/// Simulated `IntersectionObserver`.
#[derive(Default)]
pub struct SimulatedIntersection {
	observations: RefCell<Vec<Observation>>,
}

impl IntersectionObserver<Element> for SimulatedIntersection {
	fn observe(&self, target: &Element, callback: IntersectionCallback<Element>) {
		self.observations.borrow_mut().push(Observation {
			target: target.clone(),
			callback,
		});
	}
}

type MediaListener = Box<dyn FnMut(bool) + 'static>;

#[derive(Default)]
struct MediaState {
	matches: HashMap<String, bool>,
	listeners: HashMap<String, Vec<MediaListener>>,
}

/// Simulated `matchMedia`. Unknown queries do not match.
#[derive(Default)]
pub struct SimulatedMedia {
	state: Rc<RefCell<MediaState>>,
}

struct SimulatedMediaQueryList {
	query: String,
	state: Rc<RefCell<MediaState>>,
}

impl MediaQueryList for SimulatedMediaQueryList {
	fn matches(&self) -> bool {
		self.state
			.borrow()
			.matches
			.get(&self.query)
			.copied()
			.unwrap_or(false)
	}

	fn on_change(&self, listener: MediaListener) {
		self.state
			.borrow_mut()
			.listeners
			.entry(self.query.clone())
			.or_default()
			.push(listener);
	}
}

impl MediaQueries for SimulatedMedia {
	fn match_media(&self, query: &str) -> Box<dyn MediaQueryList> {
		Box::new(SimulatedMediaQueryList {
			query: query.to_string(),
			state: Rc::clone(&self.state),
		})
	}
}

/// Simulated custom element registry.
#[derive(Default)]
pub struct SimulatedRegistry {
	definitions: RefCell<HashMap<String, ConnectedCallback<Element>>>,
}

impl ElementRegistry<Element> for SimulatedRegistry {
	fn define(&self, tag: &str, on_connected: ConnectedCallback<Element>) -> Result<(), IslandError> {
		let mut definitions = self.definitions.borrow_mut();
		if definitions.contains_key(tag) {
			return Err(IslandError::DefinitionFailed {
				tag: tag.to_string(),
				reason: "this name has already been used with this registry".to_string(),
			});
		}
		definitions.insert(tag.to_string(), on_connected);
		Ok(())
	}
}

/// Deterministic, manually driven platform.
pub struct SimulatedPlatform {
	document: SimulatedDocument,
	idle: Option<SimulatedIdle>,
	intersection: Option<SimulatedIntersection>,
	media: Option<SimulatedMedia>,
	registry: Option<SimulatedRegistry>,
	pool: RefCell<LocalPool>,
	spawner: LocalSpawner,
}

impl Default for SimulatedPlatform {
	fn default() -> Self {
		Self::new()
	}
}

impl SimulatedPlatform {
	/// Every capability present and the document already loaded.
	pub fn new() -> Self {
		Self::builder().build()
	}

	/// Starts a builder.
	pub fn builder() -> SimulatedPlatformBuilder {
		SimulatedPlatformBuilder::default()
	}

	/// Completes the document load and runs load listeners.
	pub fn complete_load(&self) {
		self.document.loaded.set(true);
		let listeners = self.document.load_listeners.take();
		for listener in listeners {
			listener();
		}
	}

	/// Grants an idle slot to every queued idle callback.
	///
	/// Returns the number of callbacks run.
	pub fn run_idle_callbacks(&self) -> usize {
		let Some(idle) = &self.idle else {
			return 0;
		};
		let queue = idle.queue.take();
		let count = queue.len();
		for callback in queue {
			callback();
		}
		count
	}

	/// Idle callbacks waiting for a slot.
	pub fn pending_idle_callbacks(&self) -> usize {
		self.idle
			.as_ref()
			.map_or(0, |idle| idle.queue.borrow().len())
	}

	/// Delivers an intersection entry to every observation of `target`.
	pub fn set_intersecting(&self, target: &Element, is_intersecting: bool) {
		let Some(intersection) = &self.intersection else {
			return;
		};
		let entry = IntersectionEntry {
			target: target.clone(),
			is_intersecting,
		};
		intersection.observations.borrow_mut().retain_mut(|obs| {
			obs.target != *target || (obs.callback)(&entry) == ObserverAction::Continue
		});
	}

	/// Active intersection observations.
	pub fn observer_count(&self) -> usize {
		self.intersection
			.as_ref()
			.map_or(0, |i| i.observations.borrow().len())
	}

	/// Sets whether `query` matches, notifying listeners on a change.
	pub fn set_media_matches(&self, query: &str, matches: bool) {
		let Some(media) = &self.media else {
			return;
		};
		let mut state = media.state.borrow_mut();
		let previous = state.matches.insert(query.to_string(), matches);
		if previous.unwrap_or(false) == matches {
			return;
		}
		let mut listeners = state.listeners.remove(query).unwrap_or_default();
		drop(state);

		for listener in listeners.iter_mut() {
			listener(matches);
		}

		let mut state = media.state.borrow_mut();
		let added = state.listeners.remove(query).unwrap_or_default();
		listeners.extend(added);
		state.listeners.insert(query.to_string(), listeners);
	}

	/// Registered change listeners across all queries.
	pub fn media_listener_count(&self) -> usize {
		self.media.as_ref().map_or(0, |m| {
			m.state.borrow().listeners.values().map(Vec::len).sum()
		})
	}

	/// Simulates the host inserting `element` into the document.
	///
	/// Calls the connected callback registered for the element's tag, if any.
	/// Returns true when a definition matched.
	pub fn connect(&self, element: &Element) -> bool {
		let Some(registry) = &self.registry else {
			return false;
		};
		let callback = registry
			.definitions
			.borrow()
			.get(&element.tag_name())
			.cloned();
		match callback {
			Some(callback) => {
				callback(element.clone());
				true
			}
			None => false,
		}
	}

	/// Runs spawned futures until none can make progress.
	pub fn run_until_stalled(&self) {
		self.pool.borrow_mut().run_until_stalled();
	}
}

impl Platform for SimulatedPlatform {
	type Element = Element;

	fn document(&self) -> &dyn DocumentLifecycle {
		&self.document
	}

	fn idle_scheduler(&self) -> Option<&dyn IdleScheduler> {
		self.idle.as_ref().map(|i| i as &dyn IdleScheduler)
	}

	fn intersection_observer(&self) -> Option<&dyn IntersectionObserver<Element>> {
		self.intersection
			.as_ref()
			.map(|i| i as &dyn IntersectionObserver<Element>)
	}

	fn media_queries(&self) -> Option<&dyn MediaQueries> {
		self.media.as_ref().map(|m| m as &dyn MediaQueries)
	}

	fn element_registry(&self) -> Option<&dyn ElementRegistry<Element>> {
		self.registry
			.as_ref()
			.map(|r| r as &dyn ElementRegistry<Element>)
	}

	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
		if let Err(e) = self.spawner.spawn_local(future) {
			error_log!("failed to spawn island activation: {}", e);
		}
	}
}

/// Builder for [`SimulatedPlatform`].
#[derive(Debug, Clone)]
pub struct SimulatedPlatformBuilder {
	loaded: bool,
	idle: bool,
	intersection: bool,
	media: bool,
	registry: bool,
}

impl Default for SimulatedPlatformBuilder {
	fn default() -> Self {
		Self {
			loaded: true,
			idle: true,
			intersection: true,
			media: true,
			registry: true,
		}
	}
}

impl SimulatedPlatformBuilder {
	/// Starts with the document still loading.
	pub fn document_loading(mut self) -> Self {
		self.loaded = false;
		self
	}

	/// Removes `requestIdleCallback`.
	pub fn without_idle_callback(mut self) -> Self {
		self.idle = false;
		self
	}

	/// Removes `IntersectionObserver`.
	pub fn without_intersection_observer(mut self) -> Self {
		self.intersection = false;
		self
	}

	/// Removes `matchMedia`.
	pub fn without_match_media(mut self) -> Self {
		self.media = false;
		self
	}

	/// Removes the custom element registry.
	pub fn without_custom_elements(mut self) -> Self {
		self.registry = false;
		self
	}

	/// Builds the platform.
	pub fn build(self) -> SimulatedPlatform {
		let pool = LocalPool::new();
		let spawner = pool.spawner();
		SimulatedPlatform {
			document: SimulatedDocument {
				loaded: Cell::new(self.loaded),
				load_listeners: RefCell::default(),
			},
			idle: self.idle.then(SimulatedIdle::default),
			intersection: self.intersection.then(SimulatedIntersection::default),
			media: self.media.then(SimulatedMedia::default),
			registry: self.registry.then(SimulatedRegistry::default),
			pool: RefCell::new(pool),
			spawner,
		}
	}
}
