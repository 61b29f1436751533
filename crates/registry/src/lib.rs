//! Advice registration and resolution.
//!
//! Advice pairs a condition over the binding that produced an instance with a
//! [`MethodPredicate`], an execution order and an interceptor factory. The
//! [`AdviceRegistry`] turns a [`ProxyRequest`](intercede_invocation::ProxyRequest)
//! into the ordered interceptor chain for that call, caching per
//! `(method, receiver type, binding)` while no dynamic advice is registered.

mod advice;
mod builder;
mod predicate;
mod registry;
mod stats;

pub use advice::{Advice, Condition, InterceptorFactoryFn};
pub use builder::AdviceBuilder;
pub use predicate::MethodPredicate;
pub use registry::AdviceRegistry;
pub use stats::ResolutionStats;
