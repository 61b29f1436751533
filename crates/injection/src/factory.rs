use std::sync::Arc;

use intercede_invocation::{CallError, MethodBody, MethodCall, MethodId, MethodInfo, MethodInjector, ReturnValue};
use intercede_primitives::{Arg, Target};

/// Builds the call primitive for one closed method.
pub trait InjectorFactory: Send + Sync {
	fn create_injector(&self, method: &Arc<MethodInfo>) -> Arc<dyn MethodInjector>;
}

/// Default factory: calls the method body supplied with the [`MethodInfo`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BodyInjectorFactory;

impl InjectorFactory for BodyInjectorFactory {
	fn create_injector(&self, method: &Arc<MethodInfo>) -> Arc<dyn MethodInjector> {
		Arc::new(BodyInjector { method: method.clone() })
	}
}

/// Invokes a [`MethodBody`] directly.
///
/// Synchronous bodies produce a ready value. Asynchronous bodies produce their
/// future unawaited.
#[derive(Debug)]
pub struct BodyInjector {
	method: Arc<MethodInfo>,
}

impl MethodInjector for BodyInjector {
	fn method(&self) -> &MethodId {
		self.method.id()
	}

	fn invoke(&self, target: &Target, arguments: &[Arg]) -> Result<ReturnValue, CallError> {
		let call = MethodCall {
			target,
			arguments,
			type_arguments: self.method.id().type_args(),
		};
		match self.method.body() {
			MethodBody::Sync(body) => body(call).map(ReturnValue::Ready).map_err(CallError::failed),
			MethodBody::Async(body) => Ok(ReturnValue::Pending(body(call))),
		}
	}
}
