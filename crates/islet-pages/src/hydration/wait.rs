//! One-shot wait primitives.
//!
//! A [`WaitHandle`] resolves at most once and never fails. The producing side
//! holds a [`Resolver`], which platform callbacks may call any number of times;
//! only the first call has an effect.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use crate::debug_log;

/// Producing half of a [`WaitHandle`].
pub struct Resolver {
	sender: RefCell<Option<oneshot::Sender<()>>>,
}

impl Resolver {
	/// Resolves the paired handle.
	///
	/// Returns true only when this call woke a waiting handle: later calls,
	/// and a first call after the handle was dropped, return false.
	pub fn resolve(&self) -> bool {
		match self.sender.borrow_mut().take() {
			// A dropped handle means nobody is waiting any more.
			Some(sender) => sender.send(()).is_ok(),
			None => false,
		}
	}

	/// Whether [`resolve`](Self::resolve) has already been called.
	pub fn is_resolved(&self) -> bool {
		self.sender.borrow().is_none()
	}
}

impl fmt::Debug for Resolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resolver")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

/// Single-resolution completion signal for one condition.
#[must_use = "a wait handle does nothing unless awaited"]
pub struct WaitHandle {
	inner: LocalBoxFuture<'static, ()>,
}

impl WaitHandle {
	/// Creates a connected resolver/handle pair.
	///
	/// If the resolver is dropped without resolving, the condition has been
	/// abandoned and the handle stays pending forever.
	pub fn channel() -> (Resolver, WaitHandle) {
		let (tx, rx) = oneshot::channel();
		let resolver = Resolver {
			sender: RefCell::new(Some(tx)),
		};
		let inner = async move {
			if rx.await.is_err() {
				debug_log!("wait primitive abandoned before resolving");
				future::pending::<()>().await;
			}
		}
		.boxed_local();
		(resolver, WaitHandle { inner })
	}

	/// A handle that is already resolved.
	pub fn ready() -> Self {
		Self {
			inner: future::ready(()).boxed_local(),
		}
	}

	/// Resolves once every handle has resolved. All handles are polled
	/// concurrently; an empty set resolves immediately.
	pub fn all(handles: impl IntoIterator<Item = WaitHandle>) -> Self {
		let handles: Vec<_> = handles.into_iter().collect();
		if handles.is_empty() {
			return Self::ready();
		}
		Self {
			inner: future::join_all(handles).map(|_| ()).boxed_local(),
		}
	}
}

impl Future for WaitHandle {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		self.inner.as_mut().poll(cx)
	}
}

impl fmt::Debug for WaitHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WaitHandle").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use rstest::rstest;

	#[rstest]
	fn test_resolve_only_once() {
		let (resolver, handle) = WaitHandle::channel();

		assert!(!resolver.is_resolved());
		assert!(resolver.resolve());
		assert!(!resolver.resolve());
		assert!(resolver.is_resolved());
		assert_eq!(handle.now_or_never(), Some(()));
	}

	#[rstest]
	fn test_unresolved_handle_is_pending() {
		let (_resolver, handle) = WaitHandle::channel();

		assert_eq!(handle.now_or_never(), None);
	}

	#[rstest]
	fn test_abandoned_handle_never_resolves() {
		let (resolver, mut handle) = WaitHandle::channel();
		drop(resolver);

		assert_eq!((&mut handle).now_or_never(), None);
		assert_eq!(handle.now_or_never(), None);
	}

	#[rstest]
	fn test_resolve_after_handle_dropped() {
		let (resolver, handle) = WaitHandle::channel();
		drop(handle);

		assert!(!resolver.resolve());
		assert!(resolver.is_resolved());
	}

	#[rstest]
	fn test_all_of_nothing_is_ready() {
		assert_eq!(WaitHandle::all(Vec::new()).now_or_never(), Some(()));
	}

	#[rstest]
	fn test_all_waits_for_every_handle() {
		let (first, a) = WaitHandle::channel();
		let (second, b) = WaitHandle::channel();
		let mut joined = WaitHandle::all([a, b, WaitHandle::ready()]);

		second.resolve();
		assert_eq!((&mut joined).now_or_never(), None);

		first.resolve();
		assert_eq!(joined.now_or_never(), Some(()));
	}
}
