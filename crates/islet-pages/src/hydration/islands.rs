//! Island registration
//!
//! [`define_islands`] registers the island tag with the host's custom element
//! registry. From then on the host calls back into [`IslandRegistry::connect`]
//! for every island it instantiates, which is the activation entry point.
//!
//! ## Nested islands
//!
//! Islands inside dormant content are not part of the tree until their parent
//! hydrates. Once a parent is promoted, the registry connects every island tag
//! found in it that still holds dormant content; islands with a live
//! controller are left alone.
//!
//! ## Ownership
//!
//! The registry only keeps weak handles. A controller lives while its
//! activation is outstanding or while a caller holds the handle returned by
//! [`IslandRegistry::connect`]; once hydrated and released it is dropped along
//! with its element handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::IslandError;
use super::conditions::has_any_condition;
use super::controller::IslandController;
use crate::dom::IslandElement;
use crate::platform::{ConnectedCallback, Platform};
use crate::settings::IslandSettings;
use crate::{debug_log, error_log, info_log};

/// Registry of islands defined on a platform.
pub struct IslandRegistry<P: Platform> {
	platform: Rc<P>,
	settings: Rc<IslandSettings>,
	controllers: RefCell<Vec<Weak<IslandController<P>>>>,
}

impl<P: Platform> fmt::Debug for IslandRegistry<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IslandRegistry")
			.field("settings", &self.settings)
			.field("controllers", &self.controllers.borrow().len())
			.finish()
	}
}

/// Registers islands with the host.
///
/// Fails if the settings are invalid or the host cannot register custom
/// elements; in that case no island is ever activated.
///
/// # Example
///
/// ```ignore
/// let platform = Rc::new(WebPlatform::new()?);
/// let registry = define_islands(platform, IslandSettings::default())?;
/// ```
pub fn define_islands<P: Platform>(
	platform: Rc<P>,
	settings: IslandSettings,
) -> Result<Rc<IslandRegistry<P>>, IslandError> {
	settings.validate()?;

	let Some(element_registry) = platform.element_registry() else {
		let err = IslandError::RegistryUnavailable;
		error_log!("{}", err);
		return Err(err);
	};

	let registry = Rc::new(IslandRegistry {
		platform: Rc::clone(&platform),
		settings: Rc::new(settings),
		controllers: RefCell::new(Vec::new()),
	});

	let weak: Weak<IslandRegistry<P>> = Rc::downgrade(&registry);
	let on_connected: ConnectedCallback<P::Element> = Rc::new(move |element: P::Element| {
		if let Some(registry) = weak.upgrade() {
			let _ = registry.connect(element);
		}
	});

	if let Err(err) = element_registry.define(&registry.settings.tag_name, on_connected) {
		error_log!("{}", err);
		return Err(err);
	}

	info_log!(
		"<{}> defined, capabilities: {:?}",
		registry.settings.tag_name,
		platform.capabilities()
	);
	Ok(registry)
}

/// Detects the browser's capabilities and registers islands on it.
#[cfg(target_arch = "wasm32")]
pub fn start_islands(
	settings: IslandSettings,
) -> Result<Rc<IslandRegistry<crate::platform::web::WebPlatform>>, IslandError> {
	let platform = crate::platform::web::WebPlatform::new().inspect_err(|err| {
		error_log!("{}", err);
	})?;
	define_islands(Rc::new(platform), settings)
}

impl<P: Platform> IslandRegistry<P> {
	/// Lifecycle entry point: the host connected `element`.
	///
	/// Creates and activates the element's controller. Connecting the same
	/// element again while its controller is alive reuses it, so content is
	/// never promoted twice.
	pub fn connect(self: &Rc<Self>, element: P::Element) -> Rc<IslandController<P>> {
		let controller = match self.controller_for(&element) {
			Some(existing) => existing,
			None => {
				let controller = IslandController::new(
					element.clone(),
					Rc::clone(&self.platform),
					Rc::clone(&self.settings),
				);
				let mut controllers = self.controllers.borrow_mut();
				controllers.retain(|c| c.strong_count() > 0);
				controllers.push(Rc::downgrade(&controller));
				controller
			}
		};

		if !has_any_condition(&element, &self.settings) {
			debug_log!("<{}> declares no conditions", self.settings.tag_name);
		}

		let activation = controller.activate();
		let registry = Rc::downgrade(self);
		self.platform.spawn_local(Box::pin(async move {
			activation.await;
			if let Some(registry) = registry.upgrade() {
				registry.connect_nested(&element);
			}
		}));
		controller
	}

	/// Live controller owning `element`, if any.
	pub fn controller_for(&self, element: &P::Element) -> Option<Rc<IslandController<P>>> {
		self.controllers
			.borrow()
			.iter()
			.filter_map(Weak::upgrade)
			.find(|c| c.element() == element)
	}

	/// Number of live controllers.
	pub fn len(&self) -> usize {
		self.controllers
			.borrow()
			.iter()
			.filter(|c| c.strong_count() > 0)
			.count()
	}

	/// Returns true if no controller is alive.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Settings the islands were defined with.
	pub fn settings(&self) -> &IslandSettings {
		&self.settings
	}

	fn connect_nested(self: &Rc<Self>, element: &P::Element) {
		let settings = &self.settings;
		for nested in element.descendants_with_tag(&settings.tag_name) {
			let dormant = nested.dormant_fragments(&settings.marker_attribute, &settings.tag_name);
			if dormant.is_empty() || self.controller_for(&nested).is_some() {
				continue;
			}
			debug_log!("connecting nested <{}>", settings.tag_name);
			let _ = self.connect(nested);
		}
	}
}
