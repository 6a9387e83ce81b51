//! Condition-gated island hydration
//!
//! An island is a server-rendered element whose interactive content ships
//! dormant inside marked `<template>` fragments. Conditions declared as
//! attributes decide when that content is promoted into the live tree.
//!
//! ## Architecture
//!
//! ```text
//! <mini-island client:visible client:media="(min-width: 800px)">
//!   <template data-island>...</template>
//! </mini-island>
//!
//! IslandRegistry::connect
//!   └─ IslandController::activate
//!        ├─ declared_conditions ──► [Visible, Media("(min-width: 800px)")]
//!        ├─ evaluate (all start now) ──► [WaitHandle, WaitHandle]
//!        ├─ WaitHandle::all (AND join)
//!        └─ promote: every template[data-island] ──► its content
//! ```
//!
//! Controller states: `Pending` → `Waiting` → `Hydrated` (terminal).

use thiserror::Error;

pub mod conditions;
pub mod controller;
pub mod islands;
pub mod wait;

pub use conditions::{
	Condition, ConditionKind, DeclaredCondition, MediaQuery, declared_conditions, evaluate,
	has_any_condition, wait_for_idle, wait_for_media, wait_for_visible,
};
pub use controller::{HydrationState, IslandController};
pub use islands::{IslandRegistry, define_islands};
#[cfg(target_arch = "wasm32")]
pub use islands::start_islands;
pub use wait::{Resolver, WaitHandle};

/// Errors that can occur while setting up island hydration.
///
/// Missing condition capabilities are not errors; they degrade to immediate
/// satisfaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IslandError {
	/// The host cannot register custom elements at all.
	#[error("Island cannot be initiated because the custom element registry is unavailable")]
	RegistryUnavailable,
	/// The host refused the element definition.
	#[error("Failed to define <{tag}>: {reason}")]
	DefinitionFailed {
		/// The tag being defined.
		tag: String,
		/// Host-provided reason.
		reason: String,
	},
	/// The host environment itself (window, document) is missing.
	#[error("Host environment unavailable: {0}")]
	HostUnavailable(String),
	/// Settings are unusable.
	#[error("Invalid island settings: {0}")]
	InvalidSettings(String),
	/// Settings could not be parsed.
	#[error("Failed to parse island settings: {0}")]
	SettingsParse(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_island_error_display() {
		assert_eq!(
			IslandError::RegistryUnavailable.to_string(),
			"Island cannot be initiated because the custom element registry is unavailable"
		);

		let err = IslandError::DefinitionFailed {
			tag: "mini-island".to_string(),
			reason: "already defined".to_string(),
		};
		assert_eq!(err.to_string(), "Failed to define <mini-island>: already defined");
	}
}
