//! # Islet
//!
//! Partial hydration for server-rendered pages.
//!
//! A page is rendered on the server with its interactive regions ("islands")
//! marked by a custom tag. The live content of each island ships dormant inside
//! `<template>` fragments and is only swapped in once the island's declared
//! conditions hold:
//!
//! ```html
//! <mini-island client:idle client:media="(min-width: 800px)">
//!   <template data-island>
//!     <button>Add to cart</button>
//!   </template>
//! </mini-island>
//! ```
//!
//! ## Feature Flags
//!
//! - `pages` (default) - The island hydration scheduler
//! - `debug-hooks` - Extra scheduler logging in debug builds
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use islet::pages::hydration::define_islands;
//! use islet::pages::settings::IslandSettings;
//! use islet::pages::testing::SimulatedPlatform;
//!
//! let platform = Rc::new(SimulatedPlatform::new());
//! let registry = define_islands(Rc::clone(&platform), IslandSettings::default())?;
//! ```

#[cfg(feature = "pages")]
pub mod pages;

#[cfg(feature = "pages")]
pub use islet_pages::{IslandError, IslandSettings, Platform};
