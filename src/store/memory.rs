//! Thread-safe in-memory [`ExpiringStore`] for local development and tests.

// std
use std::collections::HashMap;
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	store::{ExpiringStore, StoreError, StoreFuture, StoreOptions},
};

type EntryMap = Arc<RwLock<HashMap<String, Entry>>>;

#[derive(Clone, Debug)]
struct Entry {
	value: String,
	expires_at: Option<OffsetDateTime>,
}
impl Entry {
	fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expires_at| instant < expires_at)
	}
}

/// In-process store with lazy TTL eviction.
///
/// Entries past their expiry read as absent and are dropped on access;
/// [`purge_expired`](Self::purge_expired) sweeps the rest.
#[derive(Clone, Debug)]
pub struct MemoryStore {
	entries: EntryMap,
	options: StoreOptions,
	clock: Arc<dyn Clock>,
}
impl MemoryStore {
	/// Creates a store driven by the system clock.
	pub fn new(options: StoreOptions) -> Self {
		Self::with_clock(options, Arc::new(SystemClock))
	}

	/// Creates a store that reads time from `clock`.
	pub fn with_clock(options: StoreOptions, clock: Arc<dyn Clock>) -> Self {
		Self { entries: Default::default(), options, clock }
	}

	/// Number of entries that have not expired yet.
	pub fn len(&self) -> usize {
		let now = self.clock.now();

		self.entries.read().values().filter(|entry| entry.is_live_at(now)).count()
	}

	/// Returns true if no live entries remain.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every expired entry and returns how many were removed.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, entry| entry.is_live_at(now));

		before - guard.len()
	}

	/// Expiry instant of the entry under `key`, if it has one.
	pub fn expires_at(&self, key: &str) -> Option<OffsetDateTime> {
		self.entries.read().get(key).and_then(|entry| entry.expires_at)
	}

	fn set_now(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
		let ttl = self.options.effective_ttl(ttl);

		if ttl.is_some_and(|ttl| ttl.is_negative()) {
			return Err(StoreError::Backend { message: "Entry TTL cannot be negative".into() });
		}

		// A TTL reaching past the representable calendar never expires.
		let expires_at = ttl.and_then(|ttl| self.clock.now().checked_add(ttl));

		self.entries.write().insert(key.to_owned(), Entry { value, expires_at });

		Ok(())
	}

	fn get_now(&self, key: &str) -> Option<String> {
		let now = self.clock.now();

		{
			let guard = self.entries.read();

			match guard.get(key) {
				Some(entry) if entry.is_live_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		let mut guard = self.entries.write();

		if guard.get(key).is_some_and(|entry| !entry.is_live_at(now)) {
			guard.remove(key);
		}

		None
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::new(StoreOptions::default())
	}
}
impl ExpiringStore for MemoryStore {
	fn set<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.set_now(key, value, ttl) })
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.get_now(key)) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.entries.write().remove(key);

			Ok(())
		})
	}

	fn options(&self) -> &StoreOptions {
		&self.options
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::clock::ManualClock;

	fn store(ceiling: Option<Duration>) -> (MemoryStore, ManualClock) {
		let clock = ManualClock::new(macros::datetime!(2025-06-01 12:00 UTC));
		let options = StoreOptions { ttl: ceiling, encoding: None };

		(MemoryStore::with_clock(options, Arc::new(clock.clone())), clock)
	}

	#[tokio::test]
	async fn entries_expire_after_ttl() {
		let (store, clock) = store(None);

		store.set("k", "v".into(), Some(Duration::seconds(30))).await.expect("Set should succeed.");

		clock.advance(Duration::seconds(29));

		assert_eq!(store.get("k").await.expect("Get should succeed."), Some("v".into()));

		clock.advance(Duration::seconds(1));

		assert_eq!(store.get("k").await.expect("Get should succeed."), None);
		assert!(store.expires_at("k").is_none(), "Expired entry should be evicted on read.");
	}

	#[tokio::test]
	async fn ceiling_caps_and_defaults_ttl() {
		let (store, clock) = store(Some(Duration::minutes(5)));
		let now = clock.now();

		store
			.set("long", "v".into(), Some(Duration::hours(1)))
			.await
			.expect("Set should succeed.");
		store.set("default", "v".into(), None).await.expect("Set should succeed.");

		assert_eq!(store.expires_at("long"), Some(now + Duration::minutes(5)));
		assert_eq!(store.expires_at("default"), Some(now + Duration::minutes(5)));
	}

	#[tokio::test]
	async fn purge_and_delete_remove_entries() {
		let (store, clock) = store(None);

		store
			.set("short", "v".into(), Some(Duration::seconds(1)))
			.await
			.expect("Set should succeed.");
		store.set("forever", "v".into(), None).await.expect("Set should succeed.");
		store.set("gone", "v".into(), None).await.expect("Set should succeed.");
		store.delete("gone").await.expect("Delete should succeed.");
		store.delete("never-existed").await.expect("Deleting a missing key should succeed.");
		clock.advance(Duration::seconds(2));

		assert_eq!(store.len(), 1);
		assert_eq!(store.purge_expired(), 1);
		assert_eq!(store.get("forever").await.expect("Get should succeed."), Some("v".into()));
	}

	#[tokio::test]
	async fn negative_ttl_is_rejected() {
		let (store, _clock) = store(None);
		let err = store
			.set("k", "v".into(), Some(Duration::seconds(-1)))
			.await
			.expect_err("Negative TTL must be rejected.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn out_of_range_ttl_never_expires() {
		let (store, clock) = store(None);
		// `expires_in` of 1e13 seconds, as a target might report it.
		let ttl = Duration::milliseconds((1e13_f64 * 1_000.).round() as i64);

		store.set("k", "v".into(), Some(ttl)).await.expect("Huge TTL should be accepted.");
		clock.advance(Duration::days(365 * 100));

		assert_eq!(store.expires_at("k"), None);
		assert_eq!(store.get("k").await.expect("Get should succeed."), Some("v".into()));
	}
}
