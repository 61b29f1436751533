use std::any::Any;
use std::sync::Arc;

use intercede_invocation::{BindingContext, CallError, Invocation, MethodId, MethodInfo, ProxyRequest, ReturnShape};
use intercede_primitives::{Arg, BoxFutureStatic, Target, Value};

use crate::outcome::downcast_value;
use crate::{CallOutcome, Interception, RawCall};

/// Dispatch bridge for one proxied instance.
///
/// The proxy backend forwards every call on the proxy to [`intercept`](Self::intercept),
/// which resolves the interceptor chain, builds the [`Invocation`] and drives it
/// according to the method's return shape. Cloning shares the instance.
#[derive(Clone)]
pub struct Wrapper {
	interception: Arc<Interception>,
	context: Arc<BindingContext>,
	target: Target,
	proxy: Option<Target>,
}

impl Wrapper {
	pub(crate) fn new(interception: Arc<Interception>, context: Arc<BindingContext>, target: Target) -> Self {
		Self {
			interception,
			context,
			target,
			proxy: None,
		}
	}

	/// Records the proxy instance handed out in place of the target.
	pub fn with_proxy(mut self, proxy: Target) -> Self {
		self.proxy = Some(proxy);
		self
	}

	pub fn context(&self) -> &BindingContext {
		&self.context
	}

	pub fn target(&self) -> &Target {
		&self.target
	}

	pub fn proxy(&self) -> Option<&Target> {
		self.proxy.as_ref()
	}

	/// Dispatches one call.
	///
	/// Setup failures (open generic methods, missing continuations) are
	/// reported through the outcome in the method's own shape.
	pub fn intercept(&self, call: RawCall) -> CallOutcome {
		let shape = call.method.return_shape();
		let id = call.method.id().clone();
		if self.interception.config().dispatch.trace_calls {
			tracing::debug!(method = %id, shape = shape.as_str(), target = %self.target.type_key(), "dispatch.call");
		} else {
			tracing::trace!(method = %id, shape = shape.as_str(), target = %self.target.type_key(), "dispatch.call");
		}

		let outcome = match self.prepare(call) {
			Ok(invocation) => self.drive(invocation, shape),
			Err(err) => CallOutcome::failed(shape, err),
		};
		watch_failures(id, outcome)
	}

	fn prepare(&self, call: RawCall) -> Result<Invocation, CallError> {
		let RawCall {
			method,
			arguments,
			type_arguments,
		} = call;
		let method = if type_arguments.is_empty() {
			method
		} else {
			Arc::new(method.make_generic(&type_arguments)?)
		};

		let injector = self.interception.injectors().get_injector(&method)?;
		let mut request = ProxyRequest::new(self.context.clone(), self.target.clone(), method, arguments);
		if let Some(proxy) = &self.proxy {
			request = request.with_proxy(proxy.clone());
		}
		let chain = self.interception.registry().resolve(&request);
		Ok(Invocation::new(request, chain, injector))
	}

	fn drive(&self, mut invocation: Invocation, shape: ReturnShape) -> CallOutcome {
		match shape {
			ReturnShape::Value => {
				let result = invocation.proceed().map(|()| match invocation.take_return_value() {
					Some(value) => value.into_value(),
					None => Box::new(()) as Value,
				});
				CallOutcome::Value(result)
			}
			ReturnShape::Future => CallOutcome::Future(Box::pin(async move {
				invocation.proceed_async().await?;
				if let Some(value) = invocation.take_return_value() {
					value.resolve().await?;
				}
				Ok(())
			})),
			ReturnShape::FutureOf(ty) => {
				let continuations = self.interception.continuations();
				let continuation = continuations
					.get(ty)
					.or_else(|| invocation.method().continuation().map(|c| continuations.get_or_insert(ty, c)));
				match continuation {
					Some(continuation) => CallOutcome::FutureOf(continuation(invocation)),
					None => CallOutcome::failed(shape, CallError::NoContinuation { ty }),
				}
			}
		}
	}

	/// Calls a method and takes its value as `R`.
	pub fn call<R: Any>(&self, method: &Arc<MethodInfo>, arguments: Vec<Arg>) -> Result<R, CallError> {
		let name = method.id().to_string();
		let value = self.intercept(RawCall::new(method.clone(), arguments)).into_value()?;
		downcast_value(value, &name)
	}

	/// Calls a method and awaits it, discarding any value.
	pub fn call_async(&self, method: &Arc<MethodInfo>, arguments: Vec<Arg>) -> BoxFutureStatic<Result<(), CallError>> {
		self.intercept(RawCall::new(method.clone(), arguments)).into_unit_future()
	}

	/// Calls a method returning a future of `T` and awaits its value.
	pub fn call_async_typed<T: Any + Send>(
		&self,
		method: &Arc<MethodInfo>,
		arguments: Vec<Arg>,
	) -> BoxFutureStatic<Result<T, CallError>> {
		let name = method.id().to_string();
		self.intercept(RawCall::new(method.clone(), arguments)).into_typed_future(name)
	}
}

impl std::fmt::Debug for Wrapper {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Wrapper")
			.field("context", &self.context)
			.field("target", &self.target)
			.field("proxied", &self.proxy.is_some())
			.finish()
	}
}

fn log_failure(method: &MethodId, err: &CallError) {
	tracing::debug!(method = %method, error = %err, configuration = err.is_configuration(), "dispatch.failure");
}

fn watch_failures(method: MethodId, outcome: CallOutcome) -> CallOutcome {
	match outcome {
		CallOutcome::Value(Err(err)) => {
			log_failure(&method, &err);
			CallOutcome::Value(Err(err))
		}
		CallOutcome::Future(fut) => CallOutcome::Future(Box::pin(async move {
			let result = fut.await;
			if let Err(err) = &result {
				log_failure(&method, err);
			}
			result
		})),
		CallOutcome::FutureOf(fut) => CallOutcome::FutureOf(Box::pin(async move {
			let result = fut.await;
			if let Err(err) = &result {
				log_failure(&method, err);
			}
			result
		})),
		other => other,
	}
}
