// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	misses: AtomicU64,
	writes: AtomicU64,
	write_failures: AtomicU64,
	scope_rejections: AtomicU64,
}
impl CacheMetrics {
	/// Lookups answered from the store (tokens and API keys).
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Lookups that found nothing usable.
	pub fn misses(&self) -> u64 {
		self.misses.load(Ordering::Relaxed)
	}

	/// Successful store writes.
	pub fn writes(&self) -> u64 {
		self.writes.load(Ordering::Relaxed)
	}

	/// Store writes that failed and were reported to the caller.
	pub fn write_failures(&self) -> u64 {
		self.write_failures.load(Ordering::Relaxed)
	}

	/// Cached tokens rejected for missing required scopes.
	pub fn scope_rejections(&self) -> u64 {
		self.scope_rejections.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_miss(&self) {
		self.misses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_write(&self) {
		self.writes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_write_failure(&self) {
		self.write_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_scope_rejection(&self) {
		self.scope_rejections.fetch_add(1, Ordering::Relaxed);
	}
}
