use std::sync::Arc;
use std::sync::atomic::Ordering;

use intercede_dispatch::{CallOutcome, Interception, InterceptionConfig, RawCall};
use intercede_invocation::{CallError, Capabilities, MethodInfo, ReturnShape, ReturnValue};
use intercede_primitives::{BoxError, TypeKey, Value, arg};

use crate::common::*;

#[tokio::test]
async fn valueless_future_completes_after_chain() {
	let engine = engine();
	let log = log();
	engine.registry().intercept(|_| true).with(Spy::shared("a", &log));
	engine.registry().intercept(|_| true).in_order(1).with(Spy::shared("b", &log));
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));

	let outcome = wrapper.intercept(RawCall::new(flush_method(), Vec::new()));
	assert!(matches!(outcome, CallOutcome::Future(_)));
	outcome.into_unit_future().await.unwrap();

	assert_eq!(entries(&log), ["a>", "b>", "target:flush", "<b", "<a"]);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn valueless_future_fails_when_an_interceptor_fails() {
	let engine = engine();
	let log = log();
	engine.registry().intercept(|_| true).with(Spy::shared("a", &log));
	engine
		.registry()
		.intercept(|_| true)
		.in_order(1)
		.with_action(|_| Err(CallError::failed(Declined("b"))));
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));

	let err = wrapper.call_async(&flush_method(), Vec::new()).await.unwrap_err();
	assert_eq!(err.downcast_ref::<Declined>(), Some(&Declined("b")));
	assert_eq!(entries(&log), ["a>"]);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valueless_future_fails_when_target_fails() {
	let engine = engine();
	let (wrapper, _) = wrap(&engine, Widget::new(&log()));
	let method = Arc::new(MethodInfo::future(TypeKey::of::<Widget>(), "sync_now", |_| async {
		Err::<(), BoxError>(Box::new(Declined("target")))
	}));

	let err = wrapper.call_async(&method, Vec::new()).await.unwrap_err();
	assert_eq!(err.downcast_ref::<Declined>(), Some(&Declined("target")));
}

#[tokio::test]
async fn future_of_value_arrives_after_interceptors_in_order() {
	let engine = engine();
	let log = log();
	let observed = log.clone();
	engine.registry().intercept(|_| true).with(Spy::shared("outer", &log));
	engine
		.registry()
		.intercept(|_| true)
		.in_order(1)
		.with_factory(move |_| {
			let observed = observed.clone();
			Arc::new(intercede_invocation::ActionInterceptor::new(move |inv| {
				inv.proceed()?;
				let pending = inv.return_value().is_some_and(ReturnValue::is_pending);
				observed.lock().push(format!("inner-pending:{pending}"));
				Ok(())
			})) as Arc<dyn intercede_invocation::Interceptor>
		});
	let (wrapper, _) = wrap(&engine, Widget::new(&log));

	let balance: i64 = wrapper.call_async_typed(&balance_method(), Vec::new()).await.unwrap();
	assert_eq!(balance, 41);
	// The inner action proceeds synchronously, so the body's future is only
	// awaited once the whole chain has returned.
	assert_eq!(entries(&log), ["outer>", "inner-pending:true", "<outer", "target:balance"]);
}

#[tokio::test]
async fn async_interceptors_observe_ready_value() {
	let engine = engine();
	let seen = log();
	let record = seen.clone();
	engine.registry().intercept(|_| true).with_factory(move |_| {
		let record = record.clone();
		Arc::new(Observer { record }) as Arc<dyn intercede_invocation::Interceptor>
	});
	let (wrapper, _) = wrap(&engine, Widget::new(&log()));

	let outcome = wrapper.intercept(RawCall::new(balance_method(), Vec::new()));
	let CallOutcome::FutureOf(fut) = outcome else {
		panic!("expected a typed future");
	};
	let value = fut.await.unwrap();
	assert_eq!(value.downcast_ref::<i64>(), Some(&41));
	assert_eq!(entries(&seen), ["Some(41)"]);
}

struct Observer {
	record: Log,
}

impl intercede_invocation::Interceptor for Observer {
	fn capabilities(&self) -> Capabilities {
		Capabilities::ASYNC
	}

	fn intercept_async<'a>(
		&'a self,
		invocation: &'a mut intercede_invocation::Invocation,
	) -> intercede_primitives::BoxFutureSend<'a, Result<(), CallError>> {
		Box::pin(async move {
			invocation.proceed_async().await?;
			let value = invocation.return_value_ref::<i64>().copied();
			self.record.lock().push(format!("{value:?}"));
			Ok(())
		})
	}
}

#[tokio::test]
async fn short_circuit_prevents_async_target() {
	let engine = engine();
	let log = log();
	engine.registry().intercept(|_| true).with_action(|inv| {
		inv.set_return_value(7i64);
		Ok(())
	});
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));

	let balance: i64 = wrapper.call_async_typed(&balance_method(), Vec::new()).await.unwrap();
	assert_eq!(balance, 7);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 0);
	assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn short_circuit_may_supply_a_future() {
	let engine = engine();
	engine.registry().intercept(|_| true).with_action(|inv| {
		inv.set_return(ReturnValue::Pending(Box::pin(async { Ok::<Value, BoxError>(Box::new(12i64)) })));
		Ok(())
	});
	let (wrapper, widget) = wrap(&engine, Widget::new(&log()));

	let balance: i64 = wrapper.call_async_typed(&balance_method(), Vec::new()).await.unwrap();
	assert_eq!(balance, 12);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn short_circuit_without_value_is_reported() {
	let engine = engine();
	engine.registry().intercept(|_| true).with_action(|_| Ok(()));
	let (wrapper, _) = wrap(&engine, Widget::new(&log()));

	let err = wrapper
		.call_async_typed::<i64>(&balance_method(), Vec::new())
		.await
		.unwrap_err();
	assert!(matches!(err, CallError::MissingReturnValue { .. }));
}

#[tokio::test]
async fn wrong_value_type_is_reported() {
	let engine = engine();
	engine.registry().intercept(|_| true).with_action(|inv| {
		inv.set_return_value(String::from("not a number"));
		Ok(())
	});
	let (wrapper, _) = wrap(&engine, Widget::new(&log()));

	let outcome = wrapper.intercept(RawCall::new(balance_method(), Vec::new()));
	let err = outcome.into_typed_future::<i64>("Widget::balance".into()).await.unwrap_err();
	match err {
		CallError::ReturnTypeMismatch { expected, .. } => assert_eq!(expected, TypeKey::of::<i64>()),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[derive(Debug, PartialEq)]
struct Report {
	lines: usize,
}

fn report_method() -> Arc<MethodInfo> {
	Arc::new(MethodInfo::future_of::<Report, _, _>(TypeKey::of::<Widget>(), "report", |call| {
		let lines = call.arguments.len();
		async move { Ok::<Report, BoxError>(Report { lines }) }
	}))
}

#[tokio::test]
async fn future_of_custom_type_dispatches_through_raw_call() {
	let config = InterceptionConfig::from_toml_str("[dispatch]\npreregister_continuations = false\n").unwrap();
	let engine = Arc::new(Interception::with_config(config));
	assert!(engine.continuations().is_empty());
	let log = log();
	engine.registry().intercept(|_| true).with(Spy::shared("spy", &log));
	let (wrapper, _) = wrap(&engine, Widget::new(&log));

	let outcome = wrapper.intercept(RawCall::new(report_method(), vec![arg(1u8)]));
	let CallOutcome::FutureOf(fut) = outcome else {
		panic!("expected a typed future");
	};
	let value = fut.await.unwrap();
	assert_eq!(value.downcast_ref::<Report>(), Some(&Report { lines: 1 }));
	assert_eq!(entries(&log), ["spy>", "<spy"]);
	assert!(engine.continuations().contains(TypeKey::of::<Report>()));
	assert_eq!(engine.continuations().len(), 1);

	let report: Report = wrapper.call_async_typed(&report_method(), Vec::new()).await.unwrap();
	assert_eq!(report, Report { lines: 0 });
}

#[tokio::test]
async fn future_of_without_known_value_type_needs_a_continuation() {
	let config = InterceptionConfig::from_toml_str("[dispatch]\npreregister_continuations = false\n").unwrap();
	let engine = Arc::new(Interception::with_config(config));
	let (wrapper, _) = wrap(&engine, Widget::new(&log()));
	let report = report_method();
	let untyped = Arc::new(MethodInfo::new(
		report.id().clone(),
		ReturnShape::FutureOf(TypeKey::of::<Report>()),
		report.body().clone(),
	));

	let outcome = wrapper.intercept(RawCall::new(untyped.clone(), Vec::new()));
	let CallOutcome::FutureOf(fut) = outcome else {
		panic!("expected a typed future");
	};
	match fut.await {
		Err(CallError::NoContinuation { ty }) => assert_eq!(ty, TypeKey::of::<Report>()),
		other => panic!("unexpected result: {:?}", other.map(|_| ())),
	}

	engine.continuations().register::<Report>();
	let report: Report = wrapper.call_async_typed(&untyped, Vec::new()).await.unwrap();
	assert_eq!(report, Report { lines: 0 });
}

#[tokio::test]
async fn sync_only_interceptor_joins_async_chain() {
	let engine = engine();
	let log = log();
	engine
		.registry()
		.intercept(|_| true)
		.with(Spy::with_caps("sync-only", Capabilities::SYNC, &log));
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));

	wrapper.call_async(&flush_method(), Vec::new()).await.unwrap();
	assert_eq!(entries(&log), ["sync-only>", "<sync-only", "target:flush"]);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_only_interceptor_behind_sync_only_one() {
	let engine = engine();
	let log = log();
	let registry = engine.registry();
	registry
		.intercept(|_| true)
		.with(Spy::with_caps("sync-only", Capabilities::SYNC, &log));
	registry
		.intercept(|_| true)
		.in_order(1)
		.with(Spy::with_caps("async-only", Capabilities::ASYNC, &log));
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));

	wrapper.call_async(&flush_method(), Vec::new()).await.unwrap();
	assert_eq!(
		entries(&log),
		["sync-only>", "<sync-only", "async-only>", "target:flush", "<async-only"]
	);
	assert_eq!(widget.calls.load(Ordering::SeqCst), 1);

	let balance: i64 = wrapper.call_async_typed(&balance_method(), Vec::new()).await.unwrap();
	assert_eq!(balance, 42);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_across_tasks() {
	let engine = engine();
	let log = log();
	engine.registry().intercept(|_| true).with(Spy::shared("spy", &log));
	let (wrapper, widget) = wrap(&engine, Widget::new(&log));
	let method = balance_method();

	let tasks: Vec<_> = (0..16)
		.map(|_| tokio::spawn(wrapper.call_async_typed::<i64>(&method, Vec::new())))
		.collect();
	let mut values = Vec::new();
	for task in tasks {
		values.push(task.await.unwrap().unwrap());
	}
	values.sort_unstable();

	assert_eq!(values, (41..=56).collect::<Vec<i64>>());
	assert_eq!(widget.calls.load(Ordering::SeqCst), 16);
	assert_eq!(engine.registry().stats().misses, 1);
	assert_eq!(engine.registry().stats().hits, 15);
	assert_eq!(engine.injectors().len(), 1);
}
