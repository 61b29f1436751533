use intercede_primitives::BoxFutureSend;

use crate::{CallError, Invocation};

bitflags::bitflags! {
	/// Interception styles an interceptor implements.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Capabilities: u8 {
		/// Implements [`Interceptor::intercept`].
		const SYNC = 1 << 0;
		/// Implements [`Interceptor::intercept_async`].
		const ASYNC = 1 << 1;
	}
}

/// Cross-cutting behavior run around a method call.
///
/// An interceptor continues the chain by calling [`Invocation::proceed`] (or
/// [`Invocation::proceed_async`]); returning without doing so short-circuits
/// the call, and whatever return value it set becomes the result.
///
/// Implementors must declare at least one capability. A sync-only interceptor
/// may join asynchronous chains: it runs synchronously and its result is wrapped
/// in a completed future. An async-only interceptor reached from a synchronous
/// call fails with [`CallError::AsyncOnlyInterceptor`].
pub trait Interceptor: Send + Sync {
	fn capabilities(&self) -> Capabilities;

	/// Name for diagnostics.
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	fn intercept(&self, invocation: &mut Invocation) -> Result<(), CallError> {
		Err(CallError::AsyncOnlyInterceptor {
			interceptor: self.name().to_owned(),
			method: invocation.method().id().to_string(),
		})
	}

	fn intercept_async<'a>(&'a self, invocation: &'a mut Invocation) -> BoxFutureSend<'a, Result<(), CallError>> {
		Box::pin(std::future::ready(self.intercept(invocation)))
	}
}

type Action = dyn Fn(&mut Invocation) -> Result<(), CallError> + Send + Sync;

/// Interceptor backed by a closure, for advice that needs no state of its own.
///
/// The closure runs synchronously on both paths; on the asynchronous path its
/// result is returned as an already completed future.
pub struct ActionInterceptor {
	action: Box<Action>,
}

impl ActionInterceptor {
	pub fn new<F>(action: F) -> Self
	where
		F: Fn(&mut Invocation) -> Result<(), CallError> + Send + Sync + 'static,
	{
		Self {
			action: Box::new(action),
		}
	}
}

impl Interceptor for ActionInterceptor {
	fn capabilities(&self) -> Capabilities {
		Capabilities::SYNC | Capabilities::ASYNC
	}

	fn name(&self) -> &str {
		"action"
	}

	fn intercept(&self, invocation: &mut Invocation) -> Result<(), CallError> {
		(self.action)(invocation)
	}

	fn intercept_async<'a>(&'a self, invocation: &'a mut Invocation) -> BoxFutureSend<'a, Result<(), CallError>> {
		Box::pin(std::future::ready((self.action)(invocation)))
	}
}

impl std::fmt::Debug for ActionInterceptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionInterceptor").finish_non_exhaustive()
	}
}
