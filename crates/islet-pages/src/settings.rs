//! Island settings.
//!
//! All names the scheduler reads from the tree are configurable. The defaults:
//!
//! ```toml
//! tag_name = "mini-island"
//! marker_attribute = "data-island"
//! condition_prefix = "client:"
//! ```

use serde::{Deserialize, Serialize};

use crate::hydration::{ConditionKind, IslandError};

/// Default custom element tag for islands.
pub const DEFAULT_TAG_NAME: &str = "mini-island";

/// Default marker attribute for dormant `<template>` fragments.
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-island";

/// Default prefix of condition attributes (`client:idle`, ...).
pub const DEFAULT_CONDITION_PREFIX: &str = "client:";

/// Names used to find islands, their conditions and their dormant content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandSettings {
	/// Custom element tag that marks an island.
	pub tag_name: String,
	/// Boolean attribute identifying a dormant fragment.
	pub marker_attribute: String,
	/// Prefix prepended to condition names to form attribute names.
	pub condition_prefix: String,
}

impl Default for IslandSettings {
	fn default() -> Self {
		Self {
			tag_name: DEFAULT_TAG_NAME.to_string(),
			marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
			condition_prefix: DEFAULT_CONDITION_PREFIX.to_string(),
		}
	}
}

impl IslandSettings {
	/// Creates default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from TOML. Missing keys take their defaults.
	///
	/// The tag name is lower-cased, as element tag names are.
	pub fn from_toml(source: &str) -> Result<Self, IslandError> {
		let mut settings: Self =
			toml::from_str(source).map_err(|e| IslandError::SettingsParse(e.to_string()))?;
		settings.tag_name.make_ascii_lowercase();
		settings.validate()?;
		Ok(settings)
	}

	/// Sets the island tag name.
	pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
		self.tag_name = tag_name.into().to_ascii_lowercase();
		self
	}

	/// Sets the dormant fragment marker attribute.
	pub fn marker_attribute(mut self, marker: impl Into<String>) -> Self {
		self.marker_attribute = marker.into();
		self
	}

	/// Sets the condition attribute prefix.
	pub fn condition_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.condition_prefix = prefix.into();
		self
	}

	/// Attribute name declaring `kind` on an island, e.g. `client:media`.
	pub fn condition_attribute(&self, kind: ConditionKind) -> String {
		format!("{}{}", self.condition_prefix, kind.name())
	}

	/// Checks the settings can be used to register islands.
	///
	/// Custom element names must contain a hyphen.
	pub fn validate(&self) -> Result<(), IslandError> {
		if !self.tag_name.contains('-') {
			return Err(IslandError::InvalidSettings(format!(
				"tag name '{}' must contain a hyphen",
				self.tag_name
			)));
		}
		if self.tag_name.chars().any(char::is_whitespace) {
			return Err(IslandError::InvalidSettings(format!(
				"tag name '{}' must not contain whitespace",
				self.tag_name
			)));
		}
		if self.marker_attribute.is_empty() {
			return Err(IslandError::InvalidSettings(
				"marker attribute must not be empty".to_string(),
			));
		}
		if self.condition_prefix.is_empty() {
			return Err(IslandError::InvalidSettings(
				"condition prefix must not be empty".to_string(),
			));
		}
		Ok(())
	}
}
