//! API-key cache-aside: presence of the namespaced key in the store means "valid".

// self
use crate::{
	_prelude::*,
	auth::ApiKey,
	cache::{CachingAuthorizer, observed},
	obs::{self, CacheEvent, CacheOp},
	target::RequestContext,
};

impl CachingAuthorizer {
	/// Marks `api_key` as valid until the store's default TTL runs out.
	pub async fn cache_api_key(&self, api_key: &ApiKey) -> Result<()> {
		let key = api_key.cache_key(&self.api_key_namespace);

		if let Err(err) = self.store.set(&key, api_key.expose().to_owned(), None).await {
			self.metrics.record_write_failure();

			return Err(err.into());
		}

		self.metrics.record_write();
		obs::record_cache_event(CacheEvent::Stored);

		Ok(())
	}

	/// Returns true if `api_key` is currently cached as valid.
	pub async fn cached_api_key(&self, api_key: &ApiKey) -> Result<bool> {
		let key = api_key.cache_key(&self.api_key_namespace);
		let hit = self.store.get(&key).await?.is_some();

		if hit {
			self.metrics.record_hit();
			obs::record_cache_event(CacheEvent::Hit);
		} else {
			self.metrics.record_miss();
			obs::record_cache_event(CacheEvent::Miss);
		}

		Ok(hit)
	}

	/// Drops a cached API key. Best effort, like token deletion.
	pub async fn invalidate_cached_api_key(&self, api_key: &ApiKey) {
		self.delete_key(&api_key.cache_key(&self.api_key_namespace)).await;
	}

	/// Verifies `api_key`, from cache when possible.
	///
	/// A store failure or a hit answers immediately. On a miss the target validates the key
	/// against `request` (origin checks and the like); a positive answer is cached before it
	/// is returned, a negative one is not cached at all.
	pub async fn verify_api_key(&self, api_key: &ApiKey, request: &RequestContext) -> Result<bool> {
		observed(CacheOp::VerifyApiKey, "verify_api_key", async {
			if self.cached_api_key(api_key).await? {
				return Ok(true);
			}

			let valid = self.target.verify_api_key(api_key, request).await?;

			if valid {
				self.cache_api_key(api_key).await?;
			}

			Ok(valid)
		})
		.await
	}
}
