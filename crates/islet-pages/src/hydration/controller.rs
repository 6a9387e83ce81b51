//! Hydration controller
//!
//! One controller owns one island. Activation reads the declared conditions
//! once, starts every evaluator immediately, and promotes the island's dormant
//! fragments after all of them resolve.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};

use super::conditions::{DeclaredCondition, declared_conditions, evaluate};
use super::wait::{Resolver, WaitHandle};
use crate::dom::IslandElement;
use crate::platform::Platform;
use crate::settings::IslandSettings;
use crate::{debug_log, info_log, warn_log};

/// Lifecycle of an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
	/// Not activated yet.
	Pending,
	/// Conditions are outstanding.
	Waiting,
	/// Dormant content has been promoted. Terminal.
	Hydrated,
}

/// Controller for a single island.
pub struct IslandController<P: Platform> {
	element: P::Element,
	platform: Rc<P>,
	settings: Rc<IslandSettings>,
	state: Cell<HydrationState>,
	declared: RefCell<Vec<DeclaredCondition>>,
	listeners: RefCell<Vec<Resolver>>,
	promoted: Cell<usize>,
}

impl<P: Platform> IslandController<P> {
	/// Creates a controller in the `Pending` state.
	pub fn new(element: P::Element, platform: Rc<P>, settings: Rc<IslandSettings>) -> Rc<Self> {
		Rc::new(Self {
			element,
			platform,
			settings,
			state: Cell::new(HydrationState::Pending),
			declared: RefCell::new(Vec::new()),
			listeners: RefCell::new(Vec::new()),
			promoted: Cell::new(0),
		})
	}

	/// Activates the island.
	///
	/// Every declared condition starts evaluating before this returns. When
	/// none is outstanding the island is promoted right here, synchronously;
	/// otherwise the returned future joins the outstanding conditions and then
	/// promotes.
	///
	/// Activating an island that is already waiting or hydrated is a no-op: the
	/// returned future just resolves once the island is hydrated.
	pub fn activate(self: &Rc<Self>) -> LocalBoxFuture<'static, ()> {
		let state = self.state.get();
		if state != HydrationState::Pending {
			debug_log!(
				"<{}> activated again while {:?}, ignoring",
				self.element.tag_name(),
				state
			);
			return self.when_hydrated().boxed_local();
		}

		let declared = declared_conditions(&self.element, &self.settings);
		self.state.set(HydrationState::Waiting);

		let pending: Vec<WaitHandle> = declared
			.iter()
			.filter_map(|c| evaluate(&c.condition(), &self.element, &*self.platform))
			.collect();
		*self.declared.borrow_mut() = declared;

		if pending.is_empty() {
			self.finish();
			return future::ready(()).boxed_local();
		}

		debug_log!(
			"<{}> waiting on {} condition(s)",
			self.element.tag_name(),
			pending.len()
		);
		let this = Rc::clone(self);
		async move {
			WaitHandle::all(pending).await;
			this.finish();
		}
		.boxed_local()
	}

	/// Resolves once the island is hydrated.
	pub fn when_hydrated(&self) -> WaitHandle {
		if self.is_hydrated() {
			return WaitHandle::ready();
		}
		let (resolver, handle) = WaitHandle::channel();
		self.listeners.borrow_mut().push(resolver);
		handle
	}

	/// Current lifecycle state.
	pub fn state(&self) -> HydrationState {
		self.state.get()
	}

	/// Checks if hydration is complete.
	pub fn is_hydrated(&self) -> bool {
		self.state.get() == HydrationState::Hydrated
	}

	/// The island element.
	pub fn element(&self) -> &P::Element {
		&self.element
	}

	/// Conditions captured at activation. Empty before activation.
	pub fn declared_conditions(&self) -> Vec<DeclaredCondition> {
		self.declared.borrow().clone()
	}

	/// Number of fragments promoted.
	pub fn promoted_count(&self) -> usize {
		self.promoted.get()
	}

	fn finish(&self) {
		if self.is_hydrated() {
			return;
		}
		self.state.set(HydrationState::Hydrated);

		let promoted = self.promote();
		self.promoted.set(promoted);
		info_log!(
			"<{}> hydrated, {} fragment(s) promoted",
			self.element.tag_name(),
			promoted
		);

		for listener in self.listeners.take() {
			listener.resolve();
		}
	}

	fn promote(&self) -> usize {
		let fragments = self
			.element
			.dormant_fragments(&self.settings.marker_attribute, &self.settings.tag_name);
		let mut promoted = 0;
		for fragment in fragments {
			match fragment.promote_fragment() {
				Ok(()) => promoted += 1,
				Err(e) => warn_log!(
					"<{}> skipped a dormant fragment: {}",
					self.element.tag_name(),
					e
				),
			}
		}
		promoted
	}
}

impl<P: Platform> fmt::Debug for IslandController<P>
where
	P::Element: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IslandController")
			.field("element", &self.element)
			.field("state", &self.state.get())
			.field("declared", &self.declared.borrow())
			.finish()
	}
}
