use std::sync::Arc;

use intercede_invocation::{ActionInterceptor, CallError, Interceptor, Invocation, ProxyRequest};

use crate::advice::{Condition, InterceptorFactoryFn};
use crate::{Advice, AdviceRegistry, MethodPredicate};

/// Fluent registration of advice sharing one condition.
///
/// Settings apply to every attach that follows. Each attach registers one
/// advice immediately.
///
/// ```ignore
/// registry
///     .intercept(|ctx| ctx.service() == TypeKey::of::<dyn Store>())
///     .methods(MethodPredicate::named_prefix("save"))
///     .in_order(10)
///     .with(audit.clone())
///     .with_action(|inv| inv.proceed());
/// ```
pub struct AdviceBuilder<'r> {
	registry: &'r AdviceRegistry,
	condition: Arc<Condition>,
	methods: MethodPredicate,
	order: i32,
	dynamic: bool,
	label: Option<Arc<str>>,
}

impl<'r> AdviceBuilder<'r> {
	pub(crate) fn new(registry: &'r AdviceRegistry, condition: Arc<Condition>) -> Self {
		Self {
			registry,
			condition,
			methods: MethodPredicate::default(),
			order: 0,
			dynamic: false,
			label: None,
		}
	}

	/// Restricts which methods the advice applies to.
	pub fn methods(mut self, methods: MethodPredicate) -> Self {
		self.methods = methods;
		self
	}

	/// Chain position; lower orders run first.
	pub fn in_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}

	/// Marks the advice as re-evaluated on every call.
	pub fn dynamic(mut self) -> Self {
		self.dynamic = true;
		self
	}

	/// Names the advice for diagnostics.
	pub fn label(mut self, label: impl Into<Arc<str>>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Attaches one shared interceptor instance.
	pub fn with(&self, interceptor: Arc<dyn Interceptor>) -> &Self {
		self.attach(Arc::new(move |_: &ProxyRequest| interceptor.clone()))
	}

	/// Attaches a factory that builds an interceptor per call.
	pub fn with_factory<F>(&self, factory: F) -> &Self
	where
		F: Fn(&ProxyRequest) -> Arc<dyn Interceptor> + Send + Sync + 'static,
	{
		self.attach(Arc::new(factory))
	}

	/// Attaches a closure run as an [`ActionInterceptor`].
	pub fn with_action<F>(&self, action: F) -> &Self
	where
		F: Fn(&mut Invocation) -> Result<(), CallError> + Send + Sync + 'static,
	{
		let interceptor: Arc<dyn Interceptor> = Arc::new(ActionInterceptor::new(action));
		self.with(interceptor)
	}

	fn attach(&self, factory: Arc<InterceptorFactoryFn>) -> &Self {
		let mut advice = Advice::from_parts(self.condition.clone(), factory)
			.with_methods(self.methods.clone())
			.with_order(self.order)
			.dynamic(self.dynamic);
		if let Some(label) = &self.label {
			advice = advice.with_label(label.clone());
		}
		self.registry.register(advice);
		self
	}
}
