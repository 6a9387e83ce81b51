//! Property-based tests for condition joining
//!
//! Arbitrary subsets of conditions are declared and host events are delivered
//! in arbitrary order. An island must hydrate exactly when every declared
//! condition has been met, no matter how the events interleave.

#![cfg(not(target_arch = "wasm32"))]

use std::rc::Rc;

use islet_pages::dom::{Element, IslandElement};
use islet_pages::hydration::{HydrationState, define_islands};
use islet_pages::settings::IslandSettings;
use islet_pages::testing::SimulatedPlatform;
use proptest::prelude::*;

const QUERY: &str = "(min-width: 800px)";

#[derive(Debug, Clone, Copy)]
enum HostEvent {
	Load,
	Idle,
	Intersect(bool),
	Media(bool),
}

fn host_event() -> impl Strategy<Value = HostEvent> {
	prop_oneof![
		Just(HostEvent::Load),
		Just(HostEvent::Idle),
		any::<bool>().prop_map(HostEvent::Intersect),
		any::<bool>().prop_map(HostEvent::Media),
	]
}

fn island(idle: bool, visible: bool, media: bool) -> Element {
	let mut island = Element::new("mini-island");
	if idle {
		island = island.flag("client:idle");
	}
	if visible {
		island = island.flag("client:visible");
	}
	if media {
		island = island.attr("client:media", QUERY);
	}
	island
		.child(Element::new("template").flag("data-island").child("A"))
		.child(Element::new("template").flag("data-island").child("B"))
}

proptest! {
	#[test]
	fn hydrates_exactly_when_all_declared_conditions_are_met(
		idle in any::<bool>(),
		visible in any::<bool>(),
		media in any::<bool>(),
		events in prop::collection::vec(host_event(), 0..24),
	) {
		let platform = Rc::new(SimulatedPlatform::builder().document_loading().build());
		let registry = define_islands(Rc::clone(&platform), IslandSettings::default()).unwrap();
		let island = island(idle, visible, media);
		let controller = registry.connect(island.clone());

		let (mut loaded, mut idle_granted, mut seen, mut matched) = (false, false, false, false);
		for event in &events {
			match *event {
				HostEvent::Load => {
					loaded = true;
					platform.complete_load();
				}
				HostEvent::Idle => {
					idle_granted |= platform.run_idle_callbacks() > 0;
				}
				HostEvent::Intersect(on) => {
					seen |= on;
					platform.set_intersecting(&island, on);
				}
				HostEvent::Media(on) => {
					matched |= on;
					platform.set_media_matches(QUERY, on);
				}
			}
			platform.run_until_stalled();
		}

		let expected = (!idle || (loaded && idle_granted)) && (!visible || seen) && (!media || matched);

		prop_assert_eq!(controller.is_hydrated(), expected);
		if expected {
			prop_assert_eq!(controller.promoted_count(), 2);
			prop_assert_eq!(island.inner_html(), "AB");
		} else {
			prop_assert_eq!(controller.state(), HydrationState::Waiting);
			prop_assert_eq!(island.dormant_fragments("data-island", "mini-island").len(), 2);
		}
	}

	#[test]
	fn visibility_condition_fires_at_most_once(
		crossings in prop::collection::vec(any::<bool>(), 1..32),
	) {
		let platform = Rc::new(SimulatedPlatform::new());
		let registry = define_islands(Rc::clone(&platform), IslandSettings::default()).unwrap();
		let island = island(false, true, false);
		let controller = registry.connect(island.clone());

		for on in &crossings {
			platform.set_intersecting(&island, *on);
			platform.run_until_stalled();
		}

		let entered = crossings.iter().any(|on| *on);
		prop_assert_eq!(controller.is_hydrated(), entered);
		prop_assert_eq!(platform.observer_count(), usize::from(!entered));
		prop_assert_eq!(controller.promoted_count(), usize::from(entered) * 2);
	}
}
