use std::sync::Arc;

use intercede_primitives::{Arg, Target, TypeKey};

use crate::{BindingContext, BindingId, MethodId, MethodInfo};

/// Key of one resolution cache entry: a closed method on a concrete receiver
/// type, as reached through one binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
	pub method: MethodId,
	pub target: TypeKey,
	pub binding: BindingId,
}

/// Call descriptor for one call against a proxied instance.
#[derive(Clone)]
pub struct ProxyRequest {
	context: Arc<BindingContext>,
	target: Target,
	proxy: Option<Target>,
	method: Arc<MethodInfo>,
	arguments: Vec<Arg>,
}

impl ProxyRequest {
	pub fn new(context: Arc<BindingContext>, target: Target, method: Arc<MethodInfo>, arguments: Vec<Arg>) -> Self {
		Self {
			context,
			target,
			proxy: None,
			method,
			arguments,
		}
	}

	/// Attaches the proxy instance the call arrived on.
	pub fn with_proxy(mut self, proxy: Target) -> Self {
		self.proxy = Some(proxy);
		self
	}

	pub fn context(&self) -> &BindingContext {
		&self.context
	}

	/// The real instance behind the proxy.
	pub fn target(&self) -> &Target {
		&self.target
	}

	/// The proxy instance, when the backend distinguishes it from the target.
	pub fn proxy(&self) -> Option<&Target> {
		self.proxy.as_ref()
	}

	pub fn method(&self) -> &MethodInfo {
		&self.method
	}

	pub fn arguments(&self) -> &[Arg] {
		&self.arguments
	}

	pub(crate) fn arguments_mut(&mut self) -> &mut Vec<Arg> {
		&mut self.arguments
	}

	/// Type arguments bound to the called method.
	pub fn type_arguments(&self) -> &[TypeKey] {
		self.method.id().type_args()
	}

	pub fn cache_key(&self) -> CacheKey {
		CacheKey {
			method: self.method.id().clone(),
			target: self.target.type_key(),
			binding: self.context.binding(),
		}
	}
}

impl std::fmt::Debug for ProxyRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProxyRequest")
			.field("method", self.method.id())
			.field("target", &self.target.type_key())
			.field("binding", &self.context.binding())
			.field("arguments", &self.arguments.len())
			.finish()
	}
}
