//! Islet Pages - Condition-gated island hydration
//!
//! Server-rendered pages ship interactive regions ("islands") with their live
//! content held dormant inside marked `<template>` fragments. This crate decides
//! when each island wakes up, based on conditions declared as attributes, and
//! then swaps the dormant content into the live tree exactly once.
//!
//! ```html
//! <mini-island client:visible client:media="(min-width: 800px)">
//!   <template data-island>
//!     <button>Add to cart</button>
//!   </template>
//! </mini-island>
//! ```
//!
//! ## Conditions
//!
//! - `client:idle`: the page has loaded and the browser granted an idle slot
//! - `client:visible`: the island entered the viewport
//! - `client:media="<query>"`: the media query matches
//!
//! Conditions are AND-ed and evaluated concurrently. A missing browser facility
//! never blocks hydration: the affected condition counts as satisfied.
//!
//! ## Architecture
//!
//! - [`hydration`]: condition registry, wait primitives, controller, registration
//! - [`platform`]: capability-provider traits (and the browser implementation on WASM)
//! - [`dom`]: element handle trait and an in-memory element tree
//! - [`settings`]: tag, marker and prefix names
//! - [`testing`]: a deterministic simulated platform
//! - [`logging`]: logging macros
//!
//! ## Example
//!
//! ```ignore
//! use islet_pages::hydration::start_islands;
//! use islet_pages::settings::IslandSettings;
//!
//! // In the WASM entry point
//! let registry = start_islands(IslandSettings::default())?;
//! ```

#![warn(missing_docs)]

// Core modules
pub mod dom;
pub mod logging;
pub mod platform;
pub mod settings;

// Condition-gated hydration
pub mod hydration;

// Testing utilities (available on both WASM and native)
pub mod testing;

// Re-export commonly used types
pub use dom::{Element, IslandElement, Node, PromotionError};
pub use hydration::{
	Condition, ConditionKind, DeclaredCondition, HydrationState, IslandController, IslandError,
	IslandRegistry, MediaQuery, WaitHandle, declared_conditions, define_islands, has_any_condition,
};
#[cfg(target_arch = "wasm32")]
pub use hydration::start_islands;
pub use platform::{Capabilities, Platform};
#[cfg(target_arch = "wasm32")]
pub use platform::web::WebPlatform;
pub use settings::IslandSettings;
pub use testing::SimulatedPlatform;

// Logging macros are automatically exported via #[macro_export]
// Users can access them as: islet_pages::debug_log!, islet_pages::info_log!, etc.

#[doc(hidden)]
pub mod __private {
	#[cfg(not(target_arch = "wasm32"))]
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
