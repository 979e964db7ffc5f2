//! Expiring key-value store contract consumed by the cache, plus an in-memory implementation.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`ExpiringStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key-value store whose entries vanish once their TTL elapses.
///
/// Values must be stored and returned byte-for-byte; a store that transforms values must
/// advertise it through [`StoreOptions::encoding`] so the cache can refuse it.
pub trait ExpiringStore
where
	Self: Send + Sync,
{
	/// Writes `value` under `key`, replacing any previous entry.
	///
	/// A `None` TTL defers to the store's default policy.
	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Option<Duration>)
	-> StoreFuture<'a, ()>;

	/// Reads the live value under `key`; expired entries read as absent.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Removes `key`; removing an absent key is not an error.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

	/// Static configuration of the store.
	fn options(&self) -> &StoreOptions;
}

/// Store-wide configuration visible to the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
	/// Maximum lifetime of any entry; also the lifetime of entries written without a TTL.
	pub ttl: Option<Duration>,
	/// Name of a value transform (compression, custom serializer, ...) applied by the store.
	pub encoding: Option<String>,
}
impl StoreOptions {
	/// Options with no TTL ceiling and raw values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the TTL ceiling.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);

		self
	}

	/// Declares a value encoding.
	pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
		self.encoding = Some(encoding.into());

		self
	}

	/// Lifetime actually applied to an entry written with `requested`.
	pub fn effective_ttl(&self, requested: Option<Duration>) -> Option<Duration> {
		match (requested, self.ttl) {
			(Some(requested), Some(ceiling)) => Some(requested.min(ceiling)),
			(requested, ceiling) => requested.or(ceiling),
		}
	}
}

/// Error type produced by [`ExpiringStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
