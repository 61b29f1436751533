use std::any::Any;

use intercede_primitives::{BoxFutureStatic, TypeKey, Value};

use crate::{CallError, Invocation};

/// Drives an invocation whose method returns a future of one concrete type.
pub type Continuation = fn(Invocation) -> BoxFutureStatic<Result<Value, CallError>>;

/// Continuation for futures of `T`.
///
/// Runs the chain asynchronously, awaits a return value that is still pending
/// and checks it is a `T`.
pub fn continue_with<T: Any + Send>(mut invocation: Invocation) -> BoxFutureStatic<Result<Value, CallError>> {
	Box::pin(async move {
		invocation.proceed_async().await?;
		let method = invocation.method().id().to_string();
		let value = match invocation.take_return_value() {
			Some(value) => value.resolve().await?,
			None => return Err(CallError::MissingReturnValue { method }),
		};
		if value.is::<T>() {
			Ok(value)
		} else {
			Err(CallError::ReturnTypeMismatch {
				method,
				expected: TypeKey::of::<T>(),
			})
		}
	})
}
