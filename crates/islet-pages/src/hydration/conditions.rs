//! Condition registry
//!
//! The closed catalog of hydration conditions and their evaluators.
//!
//! | Attribute | Satisfied when | Capability missing |
//! |-----------|----------------|--------------------|
//! | `client:idle` | page loaded and an idle slot granted | idle half satisfied immediately |
//! | `client:visible` | element intersects the viewport once | skipped |
//! | `client:media="<query>"` | query matches (now or later) | satisfied immediately |
//!
//! An evaluator returns `None` when its condition is already satisfied, or a
//! [`WaitHandle`] otherwise. No evaluator ever fails.

use std::fmt;

use super::wait::WaitHandle;
use crate::debug_log;
use crate::dom::IslandElement;
use crate::platform::{IntersectionEntry, ObserverAction, Platform};
use crate::settings::IslandSettings;

/// The fixed set of condition names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
	/// `idle`: load complete and an idle slot granted.
	Idle,
	/// `visible`: the island entered the viewport.
	Visible,
	/// `media`: a display-feature query matches.
	Media,
}

impl ConditionKind {
	/// Every condition kind, in scan order.
	pub const ALL: [ConditionKind; 3] = [
		ConditionKind::Idle,
		ConditionKind::Visible,
		ConditionKind::Media,
	];

	/// Name used after the condition prefix.
	pub fn name(self) -> &'static str {
		match self {
			ConditionKind::Idle => "idle",
			ConditionKind::Visible => "visible",
			ConditionKind::Media => "media",
		}
	}
}

impl fmt::Display for ConditionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A display-feature query such as `(min-width: 800px)`.
///
/// The string is passed to the host unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaQuery(String);

impl MediaQuery {
	/// Wraps a query string. Returns `None` for an empty query.
	pub fn new(query: impl Into<String>) -> Option<Self> {
		let query = query.into();
		if query.is_empty() {
			None
		} else {
			Some(Self(query))
		}
	}

	/// The raw query.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for MediaQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A condition with its typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
	/// See [`wait_for_idle`].
	Idle,
	/// See [`wait_for_visible`].
	Visible,
	/// See [`wait_for_media`]. `None` when no query was given.
	Media(Option<MediaQuery>),
}

impl Condition {
	/// The kind of this condition.
	pub fn kind(&self) -> ConditionKind {
		match self {
			Condition::Idle => ConditionKind::Idle,
			Condition::Visible => ConditionKind::Visible,
			Condition::Media(_) => ConditionKind::Media,
		}
	}
}

/// A condition as read from an island's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredCondition {
	/// Which condition.
	pub kind: ConditionKind,
	/// Raw attribute value; empty when the attribute has no value.
	pub parameter: String,
}

impl DeclaredCondition {
	/// Converts to the typed condition.
	pub fn condition(&self) -> Condition {
		match self.kind {
			ConditionKind::Idle => Condition::Idle,
			ConditionKind::Visible => Condition::Visible,
			ConditionKind::Media => Condition::Media(MediaQuery::new(self.parameter.clone())),
		}
	}
}

/// Scans `element` for every recognized condition attribute.
///
/// Pure: reads the current attribute state and nothing else.
pub fn declared_conditions<E: IslandElement>(
	element: &E,
	settings: &IslandSettings,
) -> Vec<DeclaredCondition> {
	ConditionKind::ALL
		.into_iter()
		.filter_map(|kind| {
			element
				.get_attribute(&settings.condition_attribute(kind))
				.map(|parameter| DeclaredCondition { kind, parameter })
		})
		.collect()
}

/// Returns true if `element` declares at least one condition.
pub fn has_any_condition<E: IslandElement>(element: &E, settings: &IslandSettings) -> bool {
	ConditionKind::ALL
		.into_iter()
		.any(|kind| element.has_attribute(&settings.condition_attribute(kind)))
}

/// Starts evaluating `condition` for `element`.
///
/// Returns `None` when the condition is already satisfied.
pub fn evaluate<P: Platform>(
	condition: &Condition,
	element: &P::Element,
	platform: &P,
) -> Option<WaitHandle> {
	match condition {
		Condition::Idle => wait_for_idle(platform),
		Condition::Visible => wait_for_visible(element, platform),
		Condition::Media(query) => wait_for_media(query.as_ref(), platform),
	}
}

/// Waits for the page load and an idle slot.
///
/// A load that already completed counts immediately, and a platform without
/// idle scheduling is treated as idle right away.
pub fn wait_for_idle<P: Platform>(platform: &P) -> Option<WaitHandle> {
	let mut pending = Vec::with_capacity(2);

	let document = platform.document();
	if !document.is_load_complete() {
		let (resolver, handle) = WaitHandle::channel();
		document.on_load(Box::new(move || {
			resolver.resolve();
		}));
		pending.push(handle);
	}

	match platform.idle_scheduler() {
		Some(scheduler) => {
			let (resolver, handle) = WaitHandle::channel();
			scheduler.request_idle_callback(Box::new(move || {
				resolver.resolve();
			}));
			pending.push(handle);
		}
		None => debug_log!("idle scheduling unavailable, treating as idle"),
	}

	if pending.is_empty() {
		None
	} else {
		Some(WaitHandle::all(pending))
	}
}

/// Waits until `element` intersects the viewport once.
///
/// Without intersection observation the condition is skipped. The observation
/// is dropped on the first intersecting entry and never re-armed.
pub fn wait_for_visible<P: Platform>(element: &P::Element, platform: &P) -> Option<WaitHandle> {
	let Some(observer) = platform.intersection_observer() else {
		debug_log!("intersection observation unavailable, skipping visibility");
		return None;
	};

	let (resolver, handle) = WaitHandle::channel();
	observer.observe(
		element,
		Box::new(move |entry: &IntersectionEntry<P::Element>| {
			if !entry.is_intersecting {
				return ObserverAction::Continue;
			}
			resolver.resolve();
			ObserverAction::Unobserve
		}),
	);
	Some(handle)
}

/// Waits until `query` matches.
///
/// No query, or no media query support, means "always active". A query that
/// matches now is satisfied without subscribing.
pub fn wait_for_media<P: Platform>(query: Option<&MediaQuery>, platform: &P) -> Option<WaitHandle> {
	let query = query?;
	let Some(media) = platform.media_queries() else {
		debug_log!("media queries unavailable, treating '{}' as matching", query);
		return None;
	};

	let list = media.match_media(query.as_str());
	if list.matches() {
		return None;
	}

	let (resolver, handle) = WaitHandle::channel();
	list.on_change(Box::new(move |matches| {
		if matches {
			resolver.resolve();
		}
	}));
	Some(handle)
}
