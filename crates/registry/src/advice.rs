use std::fmt;
use std::sync::Arc;

use intercede_invocation::{BindingContext, Interceptor, MethodInfo, ProxyRequest};

use crate::MethodPredicate;

/// Condition over the binding that produced an instance.
pub type Condition = dyn Fn(&BindingContext) -> bool + Send + Sync;

/// Produces the interceptor for one call.
pub type InterceptorFactoryFn = dyn Fn(&ProxyRequest) -> Arc<dyn Interceptor> + Send + Sync;

/// A rule pairing a match condition with an interceptor factory and an
/// execution order.
///
/// Lower `order` runs first. Advice with equal order runs in registration
/// order. Dynamic advice is re-evaluated on every call instead of being cached
/// per `(method, receiver type, binding)`.
#[derive(Clone)]
pub struct Advice {
	condition: Arc<Condition>,
	methods: MethodPredicate,
	order: i32,
	is_dynamic: bool,
	factory: Arc<InterceptorFactoryFn>,
	label: Arc<str>,
	ordinal: u64,
}

impl Advice {
	/// Static advice applying `factory`'s interceptor wherever `condition` holds.
	pub fn new<C, F>(condition: C, factory: F) -> Self
	where
		C: Fn(&BindingContext) -> bool + Send + Sync + 'static,
		F: Fn(&ProxyRequest) -> Arc<dyn Interceptor> + Send + Sync + 'static,
	{
		Self::from_parts(Arc::new(condition), Arc::new(factory))
	}

	pub(crate) fn from_parts(condition: Arc<Condition>, factory: Arc<InterceptorFactoryFn>) -> Self {
		Self {
			condition,
			methods: MethodPredicate::default(),
			order: 0,
			is_dynamic: false,
			factory,
			label: Arc::from("advice"),
			ordinal: 0,
		}
	}

	/// Replaces the default declaring-type method predicate.
	pub fn with_methods(mut self, methods: MethodPredicate) -> Self {
		self.methods = methods;
		self
	}

	/// Lower orders run first; ties keep registration order.
	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}

	/// Dynamic advice skips the resolution cache.
	pub fn dynamic(mut self, is_dynamic: bool) -> Self {
		self.is_dynamic = is_dynamic;
		self
	}

	/// Name shown in `advice.register` events.
	pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
		self.label = label.into();
		self
	}

	pub(crate) fn with_ordinal(mut self, ordinal: u64) -> Self {
		self.ordinal = ordinal;
		self
	}

	pub fn order(&self) -> i32 {
		self.order
	}

	pub fn is_dynamic(&self) -> bool {
		self.is_dynamic
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Position in registration order, assigned by the registry.
	pub fn ordinal(&self) -> u64 {
		self.ordinal
	}

	pub fn method_predicate(&self) -> &MethodPredicate {
		&self.methods
	}

	pub fn matches_context(&self, context: &BindingContext) -> bool {
		(self.condition)(context)
	}

	pub fn matches_method(&self, method: &MethodInfo) -> bool {
		self.methods.matches(method)
	}

	/// Condition first, then the method predicate.
	pub fn matches(&self, request: &ProxyRequest) -> bool {
		self.matches_context(request.context()) && self.matches_method(request.method())
	}

	/// Builds the interceptor for one call.
	pub fn create_interceptor(&self, request: &ProxyRequest) -> Arc<dyn Interceptor> {
		(self.factory)(request)
	}
}

impl fmt::Debug for Advice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Advice")
			.field("label", &self.label)
			.field("order", &self.order)
			.field("dynamic", &self.is_dynamic)
			.field("ordinal", &self.ordinal)
			.field("methods", &self.methods)
			.finish_non_exhaustive()
	}
}
