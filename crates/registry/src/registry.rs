use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use intercede_invocation::{BindingContext, BindingId, CacheKey, Interceptor, ProxyRequest};
use intercede_primitives::TypeKey;
use rustc_hash::FxBuildHasher;

use crate::stats::{CacheOutcome, StatsCounters};
use crate::{Advice, AdviceBuilder, ResolutionStats};

type Chain = Arc<[Arc<Advice>]>;

/// One published state of the registry.
///
/// Each snapshot owns its resolution cache. Publishing a successor drops the
/// cache with it, and a resolution pinned to an old snapshot can only write
/// into that snapshot's cache.
struct AdviceSnapshot {
	advice: Vec<Arc<Advice>>,
	has_dynamic: bool,
	generation: u64,
	resolved: DashMap<CacheKey, Chain, FxBuildHasher>,
}

impl AdviceSnapshot {
	fn empty() -> Self {
		Self {
			advice: Vec::new(),
			has_dynamic: false,
			generation: 0,
			resolved: DashMap::with_hasher(FxBuildHasher),
		}
	}

	fn successor(&self, added: Arc<Advice>) -> Self {
		let mut advice = Vec::with_capacity(self.advice.len() + 1);
		advice.extend(self.advice.iter().cloned());
		let has_dynamic = self.has_dynamic || added.is_dynamic();
		advice.push(added);
		Self {
			advice,
			has_dynamic,
			generation: self.generation + 1,
			resolved: DashMap::with_hasher(FxBuildHasher),
		}
	}

	/// Matching advice, sorted by order. Ties keep registration order.
	fn compute(&self, request: &ProxyRequest) -> Chain {
		let mut matched: Vec<Arc<Advice>> = self
			.advice
			.iter()
			.filter(|advice| advice.matches_context(request.context()))
			.filter(|advice| advice.matches_method(request.method()))
			.cloned()
			.collect();
		matched.sort_by_key(|advice| advice.order());
		matched.into()
	}
}

/// Registry of advice and the resolution cache built from it.
///
/// Readers pin one published snapshot without locking. Writers build a
/// successor snapshot and publish it with a compare-and-swap, retrying when
/// another registration won the race.
pub struct AdviceRegistry {
	snap: ArcSwap<AdviceSnapshot>,
	cache_resolutions: bool,
	stats: StatsCounters,
}

impl AdviceRegistry {
	pub fn new() -> Self {
		Self::with_caching(true)
	}

	/// A registry that caches resolutions only if `cache_resolutions` is set.
	pub fn with_caching(cache_resolutions: bool) -> Self {
		Self {
			snap: ArcSwap::from_pointee(AdviceSnapshot::empty()),
			cache_resolutions,
			stats: StatsCounters::default(),
		}
	}

	/// Appends `advice`, returning the registered entry.
	///
	/// Every registration publishes a snapshot with an empty resolution cache.
	pub fn register(&self, advice: Advice) -> Arc<Advice> {
		loop {
			let cur = self.snap.load_full();
			let added = Arc::new(advice.clone().with_ordinal(cur.advice.len() as u64));
			let next = Arc::new(cur.successor(added.clone()));
			let generation = next.generation;

			let prev = self.snap.compare_and_swap(&cur, next);
			if Arc::ptr_eq(&prev, &cur) {
				tracing::debug!(
					label = added.label(),
					order = added.order(),
					dynamic = added.is_dynamic(),
					generation,
					"advice.register"
				);
				if !cur.resolved.is_empty() {
					tracing::debug!(dropped = cur.resolved.len(), generation, "advice.cache_invalidated");
				}
				return added;
			}
		}
	}

	/// Starts advice for instances whose binding satisfies `condition`.
	pub fn intercept<C>(&self, condition: C) -> AdviceBuilder<'_>
	where
		C: Fn(&BindingContext) -> bool + Send + Sync + 'static,
	{
		AdviceBuilder::new(self, Arc::new(condition))
	}

	/// Starts advice for instances produced by one binding.
	pub fn intercept_binding(&self, binding: BindingId) -> AdviceBuilder<'_> {
		self.intercept(move |context| context.binding() == binding)
	}

	/// Resolves the ordered interceptor chain for `request`.
	///
	/// Cached templates are reused for repeat calls on the same method and
	/// receiver type; interceptor instances are always created fresh.
	pub fn resolve(&self, request: &ProxyRequest) -> Vec<Arc<dyn Interceptor>> {
		let snap = self.snap.load_full();
		let (chain, outcome) = self.templates(&snap, request);
		self.stats.record(outcome);
		tracing::trace!(
			method = %request.method().id(),
			target = %request.target().type_key(),
			interceptors = chain.len(),
			cache = outcome.as_str(),
			"advice.resolve"
		);
		chain.iter().map(|advice| advice.create_interceptor(request)).collect()
	}

	fn templates(&self, snap: &AdviceSnapshot, request: &ProxyRequest) -> (Chain, CacheOutcome) {
		if snap.has_dynamic || !self.cache_resolutions {
			return (snap.compute(request), CacheOutcome::Bypass);
		}

		let key = request.cache_key();
		if let Some(hit) = snap.resolved.get(&key) {
			return (hit.value().clone(), CacheOutcome::Hit);
		}

		let computed = snap.compute(request);
		let stored = snap.resolved.entry(key).or_insert(computed).value().clone();
		(stored, CacheOutcome::Miss)
	}

	/// Returns true if any dynamic advice applies to `context`.
	///
	/// Static advice is not consulted. Callers deciding whether to build a
	/// proxy should combine this with [`has_static_advice`](Self::has_static_advice).
	pub fn has_advice(&self, context: &BindingContext) -> bool {
		self.snap
			.load()
			.advice
			.iter()
			.any(|advice| advice.is_dynamic() && advice.matches_context(context))
	}

	/// Always true: static advice is never ruled out per type.
	pub fn has_static_advice(&self, _ty: TypeKey) -> bool {
		true
	}

	pub fn has_dynamic_advice(&self) -> bool {
		self.snap.load().has_dynamic
	}

	/// Registered advice in registration order.
	pub fn advice(&self) -> Vec<Arc<Advice>> {
		self.snap.load().advice.clone()
	}

	pub fn len(&self) -> usize {
		self.snap.load().advice.len()
	}

	pub fn is_empty(&self) -> bool {
		self.snap.load().advice.is_empty()
	}

	/// Number of published registrations.
	pub fn generation(&self) -> u64 {
		self.snap.load().generation
	}

	/// Entries in the current snapshot's resolution cache.
	pub fn cached_resolutions(&self) -> usize {
		self.snap.load().resolved.len()
	}

	pub fn caches_resolutions(&self) -> bool {
		self.cache_resolutions
	}

	pub fn stats(&self) -> ResolutionStats {
		self.stats.snapshot()
	}
}

impl Default for AdviceRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for AdviceRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let snap = self.snap.load();
		f.debug_struct("AdviceRegistry")
			.field("advice", &snap.advice.len())
			.field("has_dynamic", &snap.has_dynamic)
			.field("generation", &snap.generation)
			.field("cache_resolutions", &self.cache_resolutions)
			.finish()
	}
}
