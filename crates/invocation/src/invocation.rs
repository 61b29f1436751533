//! Chain execution for one intercepted call.

use std::any::Any;
use std::sync::Arc;

use intercede_primitives::{Arg, BoxError, BoxFutureSend, BoxFutureStatic, Target, Value};

use crate::{CallError, Capabilities, Interceptor, MethodInfo, MethodInjector, ProxyRequest};

/// Outcome slot of an invocation.
pub enum ReturnValue {
	/// A value that is available now.
	Ready(Value),
	/// A future produced by an asynchronous method body (or supplied by an
	/// interceptor) that has not been awaited yet.
	Pending(BoxFutureStatic<Result<Value, BoxError>>),
}

impl ReturnValue {
	/// Awaits a pending future; ready values pass through.
	pub async fn resolve(self) -> Result<Value, CallError> {
		match self {
			Self::Ready(value) => Ok(value),
			Self::Pending(fut) => fut.await.map_err(CallError::failed),
		}
	}

	/// Converts into a plain value. A pending future becomes the value itself.
	pub fn into_value(self) -> Value {
		match self {
			Self::Ready(value) => value,
			Self::Pending(fut) => Box::new(fut),
		}
	}

	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending(_))
	}
}

impl std::fmt::Debug for ReturnValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Ready(_) => f.write_str("ReturnValue::Ready(..)"),
			Self::Pending(_) => f.write_str("ReturnValue::Pending(..)"),
		}
	}
}

/// Live, single-use record of one intercepted call.
///
/// Holds the call descriptor, the ordered interceptor chain resolved for it, a
/// cursor into that chain and the eventual return value. Each call to
/// [`proceed`](Self::proceed) or [`proceed_async`](Self::proceed_async) consumes
/// one chain position; once the chain is exhausted it invokes the real method.
/// Proceeding again at the terminal position invokes the method again.
///
/// On an asynchronously driven chain, a synchronous `proceed` that reaches an
/// async-only interceptor returns without entering it. The chain resumes from
/// that position once the synchronous interceptor has returned.
pub struct Invocation {
	request: ProxyRequest,
	interceptors: Arc<[Arc<dyn Interceptor>]>,
	cursor: usize,
	injector: Arc<dyn MethodInjector>,
	return_value: Option<ReturnValue>,
	driven_async: bool,
	deferred: bool,
}

impl Invocation {
	pub fn new(
		request: ProxyRequest,
		interceptors: impl Into<Arc<[Arc<dyn Interceptor>]>>,
		injector: Arc<dyn MethodInjector>,
	) -> Self {
		Self {
			request,
			interceptors: interceptors.into(),
			cursor: 0,
			injector,
			return_value: None,
			driven_async: false,
			deferred: false,
		}
	}

	pub fn request(&self) -> &ProxyRequest {
		&self.request
	}

	pub fn method(&self) -> &MethodInfo {
		self.request.method()
	}

	pub fn target(&self) -> &Target {
		self.request.target()
	}

	pub fn arguments(&self) -> &[Arg] {
		self.request.arguments()
	}

	/// Arguments passed to the rest of the chain and the real method.
	pub fn arguments_mut(&mut self) -> &mut Vec<Arg> {
		self.request.arguments_mut()
	}

	/// The full resolved chain, in execution order.
	pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
		&self.interceptors
	}

	/// Interceptors not yet entered.
	pub fn remaining(&self) -> usize {
		self.interceptors.len().saturating_sub(self.cursor)
	}

	pub fn return_value(&self) -> Option<&ReturnValue> {
		self.return_value.as_ref()
	}

	/// The ready return value as `T`.
	pub fn return_value_ref<T: Any>(&self) -> Option<&T> {
		match self.return_value.as_ref()? {
			ReturnValue::Ready(value) => value.downcast_ref::<T>(),
			ReturnValue::Pending(_) => None,
		}
	}

	pub fn set_return_value<T: Any + Send>(&mut self, value: T) {
		self.return_value = Some(ReturnValue::Ready(Box::new(value)));
	}

	pub fn set_return(&mut self, value: ReturnValue) {
		self.return_value = Some(value);
	}

	pub fn take_return_value(&mut self) -> Option<ReturnValue> {
		self.return_value.take()
	}

	fn next_interceptor(&mut self) -> Option<Arc<dyn Interceptor>> {
		let next = self.interceptors.get(self.cursor)?.clone();
		self.cursor += 1;
		Some(next)
	}

	fn invoke_target(&self) -> Result<ReturnValue, CallError> {
		tracing::trace!(method = %self.method().id(), target = %self.target().type_key(), "invocation.target");
		self.injector.invoke(self.request.target(), self.request.arguments())
	}

	/// Advances the chain synchronously.
	pub fn proceed(&mut self) -> Result<(), CallError> {
		if let Some(next) = self.interceptors.get(self.cursor) {
			let caps = next.capabilities();
			if !caps.contains(Capabilities::SYNC) {
				if self.driven_async && caps.contains(Capabilities::ASYNC) {
					tracing::trace!(interceptor = next.name(), method = %self.method().id(), "invocation.defer");
					self.deferred = true;
					return Ok(());
				}
				return Err(capability_error(&**next, caps, self.method()));
			}
		}

		let Some(interceptor) = self.next_interceptor() else {
			let value = self.invoke_target()?;
			self.return_value = Some(value);
			return Ok(());
		};
		interceptor.intercept(self)
	}

	/// Advances the chain asynchronously.
	///
	/// Each interceptor's future completes before the next interceptor or the
	/// real method starts. At the terminal position the method's future is
	/// awaited, so interceptors resuming after this call observe a ready value.
	pub fn proceed_async(&mut self) -> BoxFutureSend<'_, Result<(), CallError>> {
		Box::pin(async move {
			self.driven_async = true;
			let Some(interceptor) = self.next_interceptor() else {
				let value = self.invoke_target()?.resolve().await?;
				self.return_value = Some(ReturnValue::Ready(value));
				return Ok(());
			};

			let caps = interceptor.capabilities();
			if caps.contains(Capabilities::ASYNC) {
				interceptor.intercept_async(self).await
			} else if caps.contains(Capabilities::SYNC) {
				interceptor.intercept(self)?;
				if std::mem::take(&mut self.deferred) {
					self.proceed_async().await?;
				}
				Ok(())
			} else {
				Err(capability_error(&*interceptor, caps, self.method()))
			}
		})
	}
}

fn capability_error(interceptor: &dyn Interceptor, caps: Capabilities, method: &MethodInfo) -> CallError {
	if caps.is_empty() {
		CallError::NoCapability {
			interceptor: interceptor.name().to_owned(),
		}
	} else {
		CallError::AsyncOnlyInterceptor {
			interceptor: interceptor.name().to_owned(),
			method: method.id().to_string(),
		}
	}
}

impl std::fmt::Debug for Invocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Invocation")
			.field("request", &self.request)
			.field("interceptors", &self.interceptors.len())
			.field("cursor", &self.cursor)
			.field("driven_async", &self.driven_async)
			.field("return_value", &self.return_value)
			.finish()
	}
}
