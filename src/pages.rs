//! Condition-gated island hydration
//!
//! This module provides access to islet-pages, which wakes server-rendered
//! islands once the conditions they declare are met.
//!
//! ## Example
//!
//! ```rust,ignore
//! use islet::pages::hydration::start_islands;
//! use islet::pages::settings::IslandSettings;
//!
//! #[wasm_bindgen(start)]
//! pub fn main() -> Result<(), JsValue> {
//!     let settings = IslandSettings::new().tag_name("shop-island");
//!     start_islands(settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
//!     Ok(())
//! }
//! ```

// Re-export all islet-pages functionality
pub use islet_pages::*;
