//! Token issuance pass-throughs, verification, and invalidation.
//!
//! Issuance and refresh delegate to the target and feed the result through
//! [`CachingAuthorizer::cache_token`]. Verification answers from cache when it can; a
//! scope mismatch on a cached token is final and never re-asks the target. Invalidation
//! drops the cached entry before the target starts revoking so concurrent verifications
//! stop seeing it as early as possible.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord, TokenSecret},
	cache::{CachingAuthorizer, observed},
	obs::{self, CacheEvent, CacheOp},
	target::{GrantRequest, InvalidationRequest},
};

impl CachingAuthorizer {
	/// Performs the `client_credentials` grant and caches the issued token.
	pub async fn create_token_client_credentials(
		&self,
		request: &GrantRequest,
	) -> Result<TokenRecord> {
		observed(CacheOp::ClientCredentials, "create_token_client_credentials", async {
			let response = self.target.create_token_client_credentials(request).await?;

			self.cache_token(response).await
		})
		.await
	}

	/// Performs the `password` grant and caches the issued token.
	pub async fn create_token_password_credentials(
		&self,
		request: &GrantRequest,
	) -> Result<TokenRecord> {
		observed(CacheOp::PasswordCredentials, "create_token_password_credentials", async {
			let response = self.target.create_token_password_credentials(request).await?;

			self.cache_token(response).await
		})
		.await
	}

	/// Exchanges an authorization code and caches the issued token.
	pub async fn create_token_authorization_code(
		&self,
		request: &GrantRequest,
	) -> Result<TokenRecord> {
		observed(CacheOp::AuthorizationCode, "create_token_authorization_code", async {
			let response = self.target.create_token_authorization_code(request).await?;

			self.cache_token(response).await
		})
		.await
	}

	/// Performs the implicit grant and caches the issued token.
	pub async fn create_token_implicit_grant(&self, request: &GrantRequest) -> Result<TokenRecord> {
		observed(CacheOp::ImplicitGrant, "create_token_implicit_grant", async {
			let response = self.target.create_token_implicit_grant(request).await?;

			self.cache_token(response).await
		})
		.await
	}

	/// Exchanges a refresh token and caches the new access token.
	///
	/// The superseded access token is left to expire on its own; callers that need it gone
	/// immediately should [`invalidate_token`](Self::invalidate_token) it.
	pub async fn refresh_token(&self, request: &GrantRequest) -> Result<TokenRecord> {
		observed(CacheOp::Refresh, "refresh_token", async {
			let response = self.target.refresh_token(request).await?;

			self.cache_token(response).await
		})
		.await
	}

	/// Asks the target for an authorization-code redirect. Nothing is cached.
	pub async fn generate_authorization_code(&self, request: &GrantRequest) -> Result<Url> {
		observed(CacheOp::GenerateAuthorizationCode, "generate_authorization_code", async {
			self.target.generate_authorization_code(request).await
		})
		.await
	}

	/// Drops the cached entry for `request.token`, then revokes it at the target.
	pub async fn invalidate_token(&self, request: &InvalidationRequest) -> Result<()> {
		observed(CacheOp::InvalidateToken, "invalidate_token", async {
			self.delete_cached_token(&request.token).await;
			self.target.invalidate_token(request).await
		})
		.await
	}

	/// Verifies `token`, from cache when possible.
	///
	/// On a hit, every scope in `required_scopes` must appear in the cached `scope` field or
	/// the call fails with [`Error::InvalidScope`] without consulting the target. An empty or
	/// absent requirement skips the check. On a miss the target decides; its answer is
	/// stamped with `token` as the access token and cached.
	pub async fn verify_token(
		&self,
		token: &str,
		required_scopes: Option<&ScopeSet>,
	) -> Result<TokenRecord> {
		observed(CacheOp::VerifyToken, "verify_token", async {
			if let Some(cached) = self.cached_token(token).await? {
				return self.check_scopes(cached, required_scopes);
			}

			let mut record = self.target.verify_token(token, required_scopes).await?.into_record()?;

			record.access_token = Some(TokenSecret::new(token));

			self.cache_token(record).await
		})
		.await
	}

	fn check_scopes(
		&self,
		cached: TokenRecord,
		required_scopes: Option<&ScopeSet>,
	) -> Result<TokenRecord> {
		let Some(required) = required_scopes.filter(|scopes| !scopes.is_empty()) else {
			return Ok(cached);
		};
		let granted = cached.granted_scopes();

		if required.is_subset_of(&granted) {
			return Ok(cached);
		}

		self.metrics.record_scope_rejection();
		obs::record_cache_event(CacheEvent::ScopeRejected);

		Err(Error::InvalidScope { missing: required.missing_from(&granted) })
	}
}
