//! Canonical invocation types for intercepted method calls.
//!
//! The proxy backend describes every interceptable method with a [`MethodInfo`].
//! A call against a proxied instance becomes a [`ProxyRequest`], and the request
//! is driven through its ordered [`Interceptor`] chain by an [`Invocation`]. The
//! chain's terminal step calls the real method through a [`MethodInjector`].

mod context;
mod continuation;
mod error;
mod injector;
mod interceptor;
mod invocation;
mod method;
mod request;

pub use context::{BindingContext, BindingId};
pub use continuation::{Continuation, continue_with};
pub use error::{CallError, Result};
pub use injector::{InjectorError, MethodInjector};
pub use interceptor::{ActionInterceptor, Capabilities, Interceptor};
pub use invocation::{Invocation, ReturnValue};
pub use method::{AsyncBody, MethodBody, MethodCall, MethodId, MethodInfo, ReturnShape, SyncBody};
pub use request::{CacheKey, ProxyRequest};
