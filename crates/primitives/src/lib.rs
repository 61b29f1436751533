//! Shared primitives for the interception engine: type identities, type-erased
//! call values and boxed future aliases.

/// Async future aliases.
pub mod future;
/// Type-erased instances, arguments and return values.
pub mod target;
/// Stable type identities.
pub mod types;

pub use future::{BoxFutureSend, BoxFutureStatic};
pub use target::{Arg, BoxError, Target, Value, arg};
pub use types::{Object, TypeKey};
