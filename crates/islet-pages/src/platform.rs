//! Platform capability provider
//!
//! Condition evaluators never probe globals. Everything they need from the host
//! (load state, idle slots, viewport intersection, media queries, element
//! registration, a local executor) comes through [`Platform`]. Optional
//! facilities return `None` when the host lacks them, and each evaluator
//! decides how to degrade.
//!
//! Implementations:
//!
//! - `platform::web::WebPlatform` (WASM): backed by `web-sys`.
//! - [`SimulatedPlatform`](crate::testing::SimulatedPlatform): deterministic,
//!   manually driven; used by tests and native hosts.

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::dom::IslandElement;
use crate::hydration::IslandError;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// One-shot callback handed to the platform.
pub type Callback = Box<dyn FnOnce() + 'static>;

/// Lifecycle hook invoked when the host connects an island element.
pub type ConnectedCallback<E> = Rc<dyn Fn(E) + 'static>;

/// Document load state.
pub trait DocumentLifecycle {
	/// True once the page has finished its initial load.
	fn is_load_complete(&self) -> bool;

	/// Runs `callback` once when the load completes.
	fn on_load(&self, callback: Callback);
}

/// Idle-slot scheduling (`requestIdleCallback`).
pub trait IdleScheduler {
	/// Runs `callback` once during an idle period.
	fn request_idle_callback(&self, callback: Callback);
}

/// A single intersection notification.
#[derive(Debug, Clone)]
pub struct IntersectionEntry<E> {
	/// The observed element.
	pub target: E,
	/// Whether the target currently intersects the viewport.
	pub is_intersecting: bool,
}

/// What an intersection callback wants to happen to its observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverAction {
	/// Keep delivering notifications.
	Continue,
	/// Stop observing the target.
	Unobserve,
}

/// Callback receiving intersection notifications.
pub type IntersectionCallback<E> = Box<dyn FnMut(&IntersectionEntry<E>) -> ObserverAction + 'static>;

/// Viewport intersection observation.
pub trait IntersectionObserver<E> {
	/// Starts observing `target`. The observation ends when the callback
	/// returns [`ObserverAction::Unobserve`].
	fn observe(&self, target: &E, callback: IntersectionCallback<E>);
}

/// Result of evaluating a media query.
pub trait MediaQueryList {
	/// Whether the query currently matches.
	fn matches(&self) -> bool;

	/// Registers a listener called with the new match state on every change.
	fn on_change(&self, listener: Box<dyn FnMut(bool) + 'static>);
}

/// Display-feature queries (`matchMedia`).
pub trait MediaQueries {
	/// Evaluates `query`. Malformed queries follow the host's own behavior.
	fn match_media(&self, query: &str) -> Box<dyn MediaQueryList>;
}

/// Custom element registration.
pub trait ElementRegistry<E> {
	/// Defines `tag`. The host calls `on_connected` for every instance that
	/// is (or becomes) part of the document.
	fn define(&self, tag: &str, on_connected: ConnectedCallback<E>) -> Result<(), IslandError>;
}

/// Summary of which optional facilities a platform provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
	/// `requestIdleCallback` is available.
	pub idle_callback: bool,
	/// `IntersectionObserver` is available.
	pub intersection_observer: bool,
	/// `matchMedia` is available.
	pub match_media: bool,
	/// A custom element registry is available.
	pub custom_elements: bool,
}

/// Host environment the scheduler runs in.
///
/// All execution is single-threaded: futures are spawned on the host's local
/// executor and callbacks run on the same thread.
pub trait Platform: 'static {
	/// Element handle type of this host.
	type Element: IslandElement;

	/// Document load state.
	fn document(&self) -> &dyn DocumentLifecycle;

	/// Idle scheduling, if available.
	fn idle_scheduler(&self) -> Option<&dyn IdleScheduler>;

	/// Intersection observation, if available.
	fn intersection_observer(&self) -> Option<&dyn IntersectionObserver<Self::Element>>;

	/// Media queries, if available.
	fn media_queries(&self) -> Option<&dyn MediaQueries>;

	/// Custom element registry, if available.
	fn element_registry(&self) -> Option<&dyn ElementRegistry<Self::Element>>;

	/// Spawns a future on the host's local executor.
	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);

	/// Which optional facilities are present.
	fn capabilities(&self) -> Capabilities {
		Capabilities {
			idle_callback: self.idle_scheduler().is_some(),
			intersection_observer: self.intersection_observer().is_some(),
			match_media: self.media_queries().is_some(),
			custom_elements: self.element_registry().is_some(),
		}
	}
}
