//! Integration tests for condition-gated island hydration
//!
//! These tests drive the full flow through a simulated host:
//! 1. Islands are defined on the platform and connected by the host
//! 2. Declared conditions gate promotion (AND semantics)
//! 3. Missing capabilities degrade to immediate hydration
//! 4. Dormant fragments are promoted in place, exactly once

use std::rc::Rc;

use islet_pages::dom::{Element, IslandElement};
use islet_pages::hydration::{
	HydrationState, IslandController, IslandError, IslandRegistry, define_islands,
};
use islet_pages::settings::IslandSettings;
use islet_pages::testing::{SimulatedPlatform, SimulatedPlatformBuilder};
use rstest::rstest;

type Registry = Rc<IslandRegistry<SimulatedPlatform>>;
type Controller = Rc<IslandController<SimulatedPlatform>>;

fn setup(builder: SimulatedPlatformBuilder) -> (Rc<SimulatedPlatform>, Registry) {
	let platform = Rc::new(builder.build());
	let registry = define_islands(Rc::clone(&platform), IslandSettings::default()).unwrap();
	(platform, registry)
}

fn fragment(content: Element) -> Element {
	Element::new("template").flag("data-island").child(content)
}

/// Island declaring `attrs` and holding one dormant counter button.
fn counter_island(attrs: &[(&str, &str)]) -> Element {
	let island = attrs
		.iter()
		.fold(Element::new("mini-island"), |el, (k, v)| el.attr(*k, *v));
	island.child(fragment(
		Element::new("button").attr("type", "button").child("Count: 0"),
	))
}

/// Connects `island` the way the host does, keeping its controller alive.
fn connect(registry: &Registry, island: &Element) -> Controller {
	registry.connect(island.clone())
}

fn dormant(island: &Element) -> usize {
	island.dormant_fragments("data-island", "mini-island").len()
}

#[rstest]
fn test_no_conditions_hydrates_within_connect() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let island = counter_island(&[]);

	platform.connect(&island);

	// No executor turn needed.
	assert_eq!(
		island.inner_html(),
		r#"<button type="button">Count: 0</button>"#
	);
	assert_eq!(dormant(&island), 0);
	assert!(registry.is_empty());
}

#[rstest]
#[case::visible_first(true)]
#[case::idle_first(false)]
fn test_two_conditions_require_both(#[case] visible_first: bool) {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let island = counter_island(&[("client:idle", ""), ("client:visible", "")]);
	let controller = connect(&registry, &island);

	if visible_first {
		platform.set_intersecting(&island, true);
	} else {
		platform.run_idle_callbacks();
	}
	platform.run_until_stalled();
	assert_eq!(controller.state(), HydrationState::Waiting);
	assert_eq!(dormant(&island), 1);

	if visible_first {
		platform.run_idle_callbacks();
	} else {
		platform.set_intersecting(&island, true);
	}
	platform.run_until_stalled();
	assert_eq!(controller.state(), HydrationState::Hydrated);
	assert_eq!(island.text_content(), "Count: 0");
}

#[rstest]
fn test_visibility_fires_once_across_cycles() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let island = counter_island(&[("client:visible", "")]);
	let controller = connect(&registry, &island);

	platform.set_intersecting(&island, false);
	assert_eq!(platform.observer_count(), 1);
	platform.set_intersecting(&island, true);
	assert_eq!(platform.observer_count(), 0);

	// Later enter/exit cycles reach no observer.
	for _ in 0..3 {
		platform.set_intersecting(&island, false);
		platform.set_intersecting(&island, true);
	}
	platform.run_until_stalled();

	assert!(controller.is_hydrated());
	assert_eq!(controller.promoted_count(), 1);
	assert_eq!(platform.observer_count(), 0);
}

#[rstest]
fn test_visible_without_intersection_observer_hydrates_immediately() {
	let (_platform, registry) =
		setup(SimulatedPlatform::builder().without_intersection_observer());
	let island = counter_island(&[("client:visible", "")]);

	let controller = connect(&registry, &island);

	assert_eq!(controller.state(), HydrationState::Hydrated);
	assert_eq!(island.text_content(), "Count: 0");
}

#[rstest]
fn test_media_without_query_hydrates_immediately() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let island = counter_island(&[("client:media", "")]);

	let controller = connect(&registry, &island);

	assert_eq!(controller.state(), HydrationState::Hydrated);
	assert_eq!(platform.media_listener_count(), 0);
}

#[rstest]
fn test_idle_promotes_fragments_in_document_order() {
	let (platform, registry) = setup(SimulatedPlatform::builder().document_loading());
	let island = Element::new("mini-island")
		.flag("client:idle")
		.child(fragment(Element::new("p").child("F1")))
		.child(Element::new("hr"))
		.child(fragment(Element::new("p").child("F2")));
	let controller = connect(&registry, &island);

	platform.run_idle_callbacks();
	platform.run_until_stalled();
	assert_eq!(controller.state(), HydrationState::Waiting);

	platform.complete_load();
	platform.run_until_stalled();

	assert_eq!(controller.state(), HydrationState::Hydrated);
	assert_eq!(island.inner_html(), "<p>F1</p><hr></hr><p>F2</p>");
	assert!(island.descendants_with_tag("template").is_empty());
}

#[rstest]
fn test_media_query_waits_for_match_then_hydrates_once() {
	let query = "(min-width: 800px)";
	let (platform, registry) = setup(SimulatedPlatform::builder());
	platform.set_media_matches(query, false);
	let island = counter_island(&[("client:media", query)]);
	let controller = connect(&registry, &island);
	platform.run_until_stalled();

	assert_eq!(controller.state(), HydrationState::Waiting);

	platform.set_media_matches("(max-width: 400px)", true);
	platform.run_until_stalled();
	assert_eq!(controller.state(), HydrationState::Waiting);

	platform.set_media_matches(query, true);
	platform.run_until_stalled();
	assert_eq!(controller.state(), HydrationState::Hydrated);

	platform.set_media_matches(query, false);
	platform.set_media_matches(query, true);
	platform.run_until_stalled();
	assert_eq!(controller.promoted_count(), 1);
	assert_eq!(island.text_content(), "Count: 0");
}

#[rstest]
fn test_media_already_matching_hydrates_immediately() {
	let query = "(prefers-reduced-motion: no-preference)";
	let (platform, registry) = setup(SimulatedPlatform::builder());
	platform.set_media_matches(query, true);
	let island = counter_island(&[("client:media", query)]);

	let controller = connect(&registry, &island);

	assert_eq!(controller.state(), HydrationState::Hydrated);
}

#[rstest]
fn test_all_capabilities_missing_never_blocks() {
	let (_platform, registry) = setup(
		SimulatedPlatform::builder()
			.without_idle_callback()
			.without_intersection_observer()
			.without_match_media(),
	);
	let island = counter_island(&[
		("client:idle", ""),
		("client:visible", ""),
		("client:media", "(min-width: 800px)"),
	]);

	let controller = connect(&registry, &island);

	assert_eq!(controller.state(), HydrationState::Hydrated);
}

#[rstest]
fn test_reconnect_does_not_promote_twice() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let island = counter_island(&[("client:idle", "")]);

	let controller = connect(&registry, &island);
	platform.connect(&island);
	assert_eq!(platform.pending_idle_callbacks(), 1);

	platform.run_idle_callbacks();
	platform.run_until_stalled();
	platform.connect(&island);
	platform.run_until_stalled();

	assert!(Rc::ptr_eq(&registry.controller_for(&island).unwrap(), &controller));
	assert_eq!(controller.promoted_count(), 1);
	assert_eq!(registry.len(), 1);
}

#[rstest]
fn test_islands_hydrate_independently() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let eager = counter_island(&[]);
	let lazy = counter_island(&[("client:visible", "")]);

	let lazy_controller = connect(&registry, &lazy);
	let eager_controller = connect(&registry, &eager);
	platform.run_until_stalled();

	assert_eq!(eager_controller.state(), HydrationState::Hydrated);
	assert_eq!(lazy_controller.state(), HydrationState::Waiting);
	assert_eq!(dormant(&lazy), 1);
}

#[rstest]
fn test_nested_island_connects_after_parent_promotion() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let inner = counter_island(&[("client:idle", "")]);
	let outer = Element::new("mini-island")
		.flag("client:visible")
		.child(fragment(Element::new("section").child(inner.clone())));
	let outer_controller = connect(&registry, &outer);
	assert!(registry.controller_for(&inner).is_none());

	platform.set_intersecting(&outer, true);
	platform.run_until_stalled();

	assert_eq!(outer_controller.state(), HydrationState::Hydrated);
	let inner_controller = registry.controller_for(&inner).unwrap();
	assert_eq!(inner_controller.state(), HydrationState::Waiting);

	platform.run_idle_callbacks();
	platform.run_until_stalled();
	assert_eq!(inner_controller.state(), HydrationState::Hydrated);
	assert_eq!(outer.text_content(), "Count: 0");
}

#[rstest]
fn test_parent_promotion_leaves_live_nested_island_dormant() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let inner = Element::new("mini-island")
		.flag("client:visible")
		.child(fragment(Element::new("span").child("INNER")));
	let outer = Element::new("mini-island")
		.child(Element::new("div").child(inner.clone()))
		.child(fragment(Element::new("span").child("OUTER")));

	let outer_controller = connect(&registry, &outer);
	let inner_controller = connect(&registry, &inner);
	platform.run_until_stalled();

	assert_eq!(outer_controller.state(), HydrationState::Hydrated);
	assert_eq!(outer_controller.promoted_count(), 1);
	assert_eq!(inner_controller.state(), HydrationState::Waiting);
	assert_eq!(dormant(&inner), 1);
	assert_eq!(inner.text_content(), "");

	platform.set_intersecting(&inner, true);
	platform.run_until_stalled();
	assert_eq!(inner_controller.state(), HydrationState::Hydrated);
	assert_eq!(outer.text_content(), "INNEROUTER");
}

#[rstest]
fn test_hydrated_nested_island_is_not_reconnected() {
	let (platform, registry) = setup(SimulatedPlatform::builder());
	let inner = counter_island(&[("client:idle", "")]);
	let outer = Element::new("mini-island")
		.flag("client:visible")
		.child(inner.clone());
	platform.connect(&outer);
	platform.connect(&inner);

	platform.run_idle_callbacks();
	platform.run_until_stalled();
	assert_eq!(inner.text_content(), "Count: 0");
	assert_eq!(registry.len(), 1);

	platform.set_intersecting(&outer, true);
	platform.run_until_stalled();

	assert!(registry.is_empty());
	assert_eq!(platform.pending_idle_callbacks(), 0);
}

#[rstest]
fn test_missing_registry_activates_nothing() {
	let platform = Rc::new(
		SimulatedPlatform::builder()
			.without_custom_elements()
			.build(),
	);

	let err = define_islands(Rc::clone(&platform), IslandSettings::default()).unwrap_err();
	assert_eq!(err, IslandError::RegistryUnavailable);

	let island = counter_island(&[]);
	platform.connect(&island);
	platform.run_until_stalled();
	assert_eq!(island.text_content(), "");
}

#[rstest]
#[case::lowercase("shop-island")]
#[case::mixed_case("Shop-Island")]
fn test_custom_settings_from_toml(#[case] tag_name: &str) {
	let platform = Rc::new(SimulatedPlatform::new());
	let settings = IslandSettings::from_toml(&format!(
		r#"
		tag_name = "{tag_name}"
		marker_attribute = "data-dormant"
		condition_prefix = "hydrate:"
		"#
	))
	.unwrap();
	let _registry = define_islands(Rc::clone(&platform), settings).unwrap();

	let island = Element::new("shop-island")
		.flag("hydrate:visible")
		.child(
			Element::new("template")
				.flag("data-dormant")
				.child("cart"),
		)
		.child(fragment(Element::new("span").child("ignored")));
	assert!(platform.connect(&island));
	assert_eq!(platform.observer_count(), 1);

	platform.set_intersecting(&island, true);
	platform.run_until_stalled();

	assert_eq!(
		island.inner_html(),
		r#"cart<template data-island><span>ignored</span></template>"#
	);
}
