#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use intercede_dispatch::{Interception, Wrapper};
use intercede_invocation::{BindingContext, BindingId, CallError, Capabilities, Interceptor, Invocation, MethodInfo};
use intercede_primitives::{BoxError, BoxFutureSend, Target, TypeKey, Value};
use parking_lot::Mutex;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
	Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
	log.lock().clone()
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init();
}

/// Service instance that records every real call.
pub struct Widget {
	pub log: Log,
	pub calls: AtomicUsize,
}

impl Widget {
	pub fn new(log: &Log) -> Self {
		Self {
			log: log.clone(),
			calls: AtomicUsize::new(0),
		}
	}

	fn record(&self, what: &str) -> usize {
		self.log.lock().push(what.to_owned());
		self.calls.fetch_add(1, Ordering::SeqCst) + 1
	}
}

/// Overrides `hash_code`.
pub struct Gadget {
	pub log: Log,
}

/// Returns the number of real calls made so far, as `usize`.
pub fn sync_method(declaring: TypeKey, name: &str) -> Arc<MethodInfo> {
	let label = format!("target:{name}");
	Arc::new(MethodInfo::sync(declaring, name, move |call| {
		if let Some(widget) = call.receiver::<Widget>() {
			return Ok(Box::new(widget.record(&label)) as Value);
		}
		let gadget = call.receiver::<Gadget>().ok_or("unexpected receiver")?;
		gadget.log.lock().push(label.clone());
		Ok(Box::new(0usize) as Value)
	}))
}

/// Sleeps briefly, then records the call.
pub fn flush_method() -> Arc<MethodInfo> {
	Arc::new(MethodInfo::future(TypeKey::of::<Widget>(), "flush", |call| {
		let target = call.target.clone();
		async move {
			tokio::time::sleep(Duration::from_millis(1)).await;
			let widget = target.downcast_ref::<Widget>().ok_or("not a widget")?;
			widget.record("target:flush");
			Ok::<(), BoxError>(())
		}
	}))
}

/// Resolves to `40 + calls so far`.
pub fn balance_method() -> Arc<MethodInfo> {
	Arc::new(MethodInfo::future_of::<i64, _, _>(TypeKey::of::<Widget>(), "balance", |call| {
		let target = call.target.clone();
		async move {
			tokio::time::sleep(Duration::from_millis(1)).await;
			let widget = target.downcast_ref::<Widget>().ok_or("not a widget")?;
			Ok::<i64, BoxError>(40 + widget.record("target:balance") as i64)
		}
	}))
}

/// Interceptor that records entry and exit.
pub struct Spy {
	label: String,
	caps: Capabilities,
	log: Log,
}

impl Spy {
	pub fn shared(label: &str, log: &Log) -> Arc<dyn Interceptor> {
		Self::with_caps(label, Capabilities::SYNC | Capabilities::ASYNC, log)
	}

	pub fn with_caps(label: &str, caps: Capabilities, log: &Log) -> Arc<dyn Interceptor> {
		Arc::new(Self {
			label: label.to_owned(),
			caps,
			log: log.clone(),
		})
	}
}

impl Interceptor for Spy {
	fn capabilities(&self) -> Capabilities {
		self.caps
	}

	fn name(&self) -> &str {
		&self.label
	}

	fn intercept(&self, invocation: &mut Invocation) -> Result<(), CallError> {
		self.log.lock().push(format!("{}>", self.label));
		invocation.proceed()?;
		self.log.lock().push(format!("<{}", self.label));
		Ok(())
	}

	fn intercept_async<'a>(&'a self, invocation: &'a mut Invocation) -> BoxFutureSend<'a, Result<(), CallError>> {
		Box::pin(async move {
			self.log.lock().push(format!("{}>", self.label));
			invocation.proceed_async().await?;
			self.log.lock().push(format!("<{}", self.label));
			Ok(())
		})
	}
}

pub fn engine() -> Arc<Interception> {
	init_tracing();
	Arc::new(Interception::new())
}

pub fn wrap<T: Send + Sync + 'static>(engine: &Arc<Interception>, instance: T) -> (Wrapper, Arc<T>) {
	let instance = Arc::new(instance);
	let context = Arc::new(BindingContext::of::<T, T>(BindingId::fresh()));
	(engine.wrap(context, Target::from_arc(instance.clone())), instance)
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("declined by {0}")]
pub struct Declined(pub &'static str);
