//! Call primitives for the real methods behind proxied instances.
//!
//! [`InjectorCache`] builds one [`MethodInjector`] per closed method and hands
//! out the same shared primitive to every caller afterwards.

mod cache;
mod factory;

pub use cache::InjectorCache;
pub use factory::{BodyInjector, BodyInjectorFactory, InjectorFactory};
pub use intercede_invocation::{InjectorError, MethodInjector};
