//! Logging abstraction layer for islet-pages
//!
//! This module provides logging macros that work across WASM and native targets.
//! Native builds forward to [`tracing`](https://docs.rs/tracing), so filtering is
//! left to whatever subscriber the host installs. WASM builds write straight to
//! the browser console.
//!
//! ## Macro Overview
//!
//! | Macro | WASM | WASM gating | Non-WASM |
//! |-------|------|-------------|----------|
//! | `debug_log!` | `console.debug` | `debug-hooks` + `debug_assertions` | `tracing::debug!` |
//! | `info_log!` | `console.info` | `debug_assertions` | `tracing::info!` |
//! | `warn_log!` | `console.warn` | always | `tracing::warn!` |
//! | `error_log!` | `console.error` | always | `tracing::error!` |
//!
//! Warnings and errors are never compiled out: registration failures must stay
//! visible in production builds.
//!
//! ## Example
//!
//! ```ignore
//! use islet_pages::{debug_log, error_log, info_log, warn_log};
//!
//! debug_log!("Island state: {:?}", state);
//! info_log!("Island hydrated");
//! warn_log!("Fragment skipped: {}", reason);
//! error_log!("Registration failed: {}", error);
//! ```

/// Logs a debug message.
///
/// On WASM this requires the `debug-hooks` feature and `debug_assertions`.
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// No-op debug_log when conditions are not met
#[macro_export]
#[cfg(all(
	target_arch = "wasm32",
	not(all(debug_assertions, feature = "debug-hooks"))
))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs a debug message through `tracing`.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::debug!(target: "islet_pages", $($arg)*);
	}};
}

/// Logs an info message.
///
/// On WASM this compiles to a no-op in release builds.
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// No-op info_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message through `tracing`.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::info!(target: "islet_pages", $($arg)*);
	}};
}

/// Logs a warning message.
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// Logs a warning message through `tracing`.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::warn!(target: "islet_pages", $($arg)*);
	}};
}

/// Logs an error message.
///
/// # Example
///
/// ```ignore
/// error_log!("Island cannot be initiated: {}", error);
/// ```
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message through `tracing`.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::error!(target: "islet_pages", $($arg)*);
	}};
}
