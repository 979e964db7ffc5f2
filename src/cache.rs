//! Cache-aside decorator for an [`AuthorizationTarget`].
//!
//! [`CachingAuthorizer`] forwards every OAuth operation to its target and writes each
//! bearer token it sees into an [`ExpiringStore`], keyed by the access-token string with a
//! TTL of `expires_in` capped at the store's ceiling. Verification probes the store first:
//! a hit is answered locally with its residual lifetime and a scope check, a miss falls
//! through to the target and populates the store. API keys follow the same pattern under a
//! namespace prefix.

mod api_key;
mod metrics;
mod token;

pub use metrics::CacheMetrics;

// self
use crate::{
	_prelude::*,
	auth::{TokenKey, TokenRecord, TokenResponse, token::record::StoredToken},
	clock::{Clock, SystemClock},
	error::ConfigError,
	obs::{self, CacheEvent, CacheOp, OpOutcome, OpSpan},
	store::ExpiringStore,
	target::AuthorizationTarget,
};

/// Namespace prefixed to API keys so they cannot collide with access tokens.
pub const DEFAULT_API_KEY_NAMESPACE: &str = "apiKey:";

/// Cache-aside decorator in front of an OAuth service and API-key validator.
///
/// Cloning is cheap; clones share the store, target, clock, and metrics.
#[derive(Clone)]
pub struct CachingAuthorizer {
	store: Arc<dyn ExpiringStore>,
	target: Arc<dyn AuthorizationTarget>,
	clock: Arc<dyn Clock>,
	api_key_namespace: Arc<str>,
	metrics: Arc<CacheMetrics>,
}
impl CachingAuthorizer {
	/// Wraps `target` with the default clock and API-key namespace.
	///
	/// Fails if the store transforms stored values.
	pub fn new(
		store: Arc<dyn ExpiringStore>,
		target: Arc<dyn AuthorizationTarget>,
	) -> Result<Self> {
		Self::builder(store, target).build()
	}

	/// Returns a builder for non-default configuration.
	pub fn builder(
		store: Arc<dyn ExpiringStore>,
		target: Arc<dyn AuthorizationTarget>,
	) -> CachingAuthorizerBuilder {
		CachingAuthorizerBuilder {
			store,
			target,
			clock: None,
			api_key_namespace: DEFAULT_API_KEY_NAMESPACE.into(),
		}
	}

	/// Backing store.
	pub fn store(&self) -> &Arc<dyn ExpiringStore> {
		&self.store
	}

	/// Wrapped target.
	pub fn target(&self) -> &Arc<dyn AuthorizationTarget> {
		&self.target
	}

	/// Hit/miss/write counters shared by all clones.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Namespace prefixed to cached API keys.
	pub fn api_key_namespace(&self) -> &str {
		&self.api_key_namespace
	}

	/// Stores a token response under its access token and returns the parsed record.
	///
	/// Raw responses are parsed first. Records without an access token, or whose declared
	/// lifetime rounds to nothing at millisecond precision, are returned without touching the
	/// store. Encoding and store failures are returned as errors.
	pub async fn cache_token(&self, response: impl Into<TokenResponse>) -> Result<TokenRecord> {
		let record = response.into().into_record()?;
		let Some(key) = record.access_token() else {
			obs::record_cache_event(CacheEvent::Uncacheable);

			return Ok(record);
		};
		let ttl = record.cache_ttl(self.store.options().ttl);

		if ttl.is_some_and(|ttl| !ttl.is_positive()) {
			obs::record_cache_event(CacheEvent::Uncacheable);

			return Ok(record);
		}

		let value = StoredToken::encode(&record, self.clock.now())?;

		if let Err(err) = self.store.set(key, value, ttl).await {
			self.metrics.record_write_failure();

			return Err(err.into());
		}

		self.metrics.record_write();
		obs::record_cache_event(CacheEvent::Stored);

		Ok(record)
	}

	/// Looks up a cached token by raw key or by a token-shaped value's `access_token`.
	///
	/// A miss is `Ok(None)`. On a hit, `expires_in` is rebased to the time remaining now and
	/// the internal `cached_at` stamp is stripped. An entry whose residual lifetime is gone
	/// reads as a miss and is deleted.
	pub async fn cached_token<K>(&self, key: &K) -> Result<Option<TokenRecord>>
	where
		K: ?Sized + TokenKey,
	{
		let Some(key) = key.token_key() else {
			return Ok(None);
		};
		let Some(value) = self.store.get(key).await? else {
			self.metrics.record_miss();
			obs::record_cache_event(CacheEvent::Miss);

			return Ok(None);
		};
		let record = StoredToken::decode(&value)?.into_residual(self.clock.now());

		if record.expires_in.is_some_and(|seconds| seconds <= 0.) {
			self.metrics.record_miss();
			obs::record_cache_event(CacheEvent::Stale);
			self.delete_key(key).await;

			return Ok(None);
		}

		self.metrics.record_hit();
		obs::record_cache_event(CacheEvent::Hit);

		Ok(Some(record))
	}

	/// Drops a cached token, keyed like [`cached_token`](Self::cached_token).
	///
	/// Best effort: store failures are logged, never returned.
	pub async fn delete_cached_token<K>(&self, key: &K)
	where
		K: ?Sized + TokenKey,
	{
		if let Some(key) = key.token_key() {
			self.delete_key(key).await;
		}
	}

	async fn delete_key(&self, key: &str) {
		if let Err(err) = self.store.delete(key).await {
			obs::record_delete_failure(&err);
		}
	}
}
impl Debug for CachingAuthorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachingAuthorizer")
			.field("store_options", self.store.options())
			.field("clock", &self.clock)
			.field("api_key_namespace", &self.api_key_namespace)
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Builder for [`CachingAuthorizer`].
pub struct CachingAuthorizerBuilder {
	store: Arc<dyn ExpiringStore>,
	target: Arc<dyn AuthorizationTarget>,
	clock: Option<Arc<dyn Clock>>,
	api_key_namespace: String,
}
impl CachingAuthorizerBuilder {
	/// Overrides the clock used for `cached_at` stamps and residual lifetimes.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Overrides the API-key namespace prefix (defaults to `apiKey:`).
	pub fn api_key_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.api_key_namespace = namespace.into();

		self
	}

	/// Validates the configuration and produces a [`CachingAuthorizer`].
	pub fn build(self) -> Result<CachingAuthorizer> {
		if let Some(encoding) = &self.store.options().encoding {
			return Err(ConfigError::EncodedStore { encoding: encoding.clone() }.into());
		}
		if self.api_key_namespace.is_empty() {
			return Err(ConfigError::EmptyNamespace.into());
		}

		Ok(CachingAuthorizer {
			store: self.store,
			target: self.target,
			clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
			api_key_namespace: Arc::from(self.api_key_namespace),
			metrics: Default::default(),
		})
	}
}
impl Debug for CachingAuthorizerBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachingAuthorizerBuilder")
			.field("store_options", self.store.options())
			.field("clock", &self.clock)
			.field("api_key_namespace", &self.api_key_namespace)
			.finish()
	}
}

/// Runs `fut` inside an operation span and records its attempt + outcome.
async fn observed<T, Fut>(op: CacheOp, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(op, stage);

	obs::record_op_outcome(op, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_op_outcome(op, OpOutcome::Success),
		Err(_) => obs::record_op_outcome(op, OpOutcome::Failure),
	}

	result
}
