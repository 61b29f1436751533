use std::sync::atomic::{AtomicU64, Ordering};

/// Resolution cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
	pub hits: u64,
	pub misses: u64,
	/// Resolutions computed without consulting the cache.
	pub bypasses: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
	hits: AtomicU64,
	misses: AtomicU64,
	bypasses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOutcome {
	Hit,
	Miss,
	Bypass,
}

impl CacheOutcome {
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			Self::Hit => "hit",
			Self::Miss => "miss",
			Self::Bypass => "bypass",
		}
	}
}

impl StatsCounters {
	pub(crate) fn record(&self, outcome: CacheOutcome) {
		let counter = match outcome {
			CacheOutcome::Hit => &self.hits,
			CacheOutcome::Miss => &self.misses,
			CacheOutcome::Bypass => &self.bypasses,
		};
		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn snapshot(&self) -> ResolutionStats {
		ResolutionStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			bypasses: self.bypasses.load(Ordering::Relaxed),
		}
	}
}
