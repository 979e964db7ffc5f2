//! Demonstrates wrapping an in-process token service with the cache so repeated
//! verifications and API-key checks are answered from the in-memory store.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
use time::Duration;
// self
use oauth2_token_cache::{
	CachingAuthorizer,
	auth::{ApiKey, ScopeSet, TokenRecord, TokenResponse},
	store::{ExpiringStore, MemoryStore, StoreOptions},
	target::{AuthorizationTarget, GrantRequest, RequestContext, TargetFuture},
};

/// Token service that hands out a fixed token and counts how often it is consulted.
#[derive(Default)]
struct DemoService {
	lookups: AtomicUsize,
}
impl AuthorizationTarget for DemoService {
	fn create_token_client_credentials<'a>(
		&'a self,
		request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		let scope = request.scope.normalized();

		Box::pin(async move {
			Ok(TokenResponse::Raw(format!(
				r#"{{"access_token":"demo-access","token_type":"Bearer","expires_in":900,"scope":"{scope}"}}"#
			)))
		})
	}

	fn verify_api_key<'a>(
		&'a self,
		api_key: &'a ApiKey,
		_request: &'a RequestContext,
	) -> TargetFuture<'a, bool> {
		self.lookups.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move { Ok(api_key.expose().starts_with("demo-")) })
	}

	fn verify_token<'a>(
		&'a self,
		_token: &'a str,
		_required_scopes: Option<&'a ScopeSet>,
	) -> TargetFuture<'a, TokenResponse> {
		self.lookups.fetch_add(1, Ordering::SeqCst);

		Box::pin(async { Ok(TokenResponse::from(TokenRecord::default().with_expires_in(60.))) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn ExpiringStore> =
		Arc::new(MemoryStore::new(StoreOptions::new().with_ttl(Duration::minutes(10))));
	let service = Arc::new(DemoService::default());
	let authorizer = CachingAuthorizer::new(store, service.clone())?;
	let request =
		GrantRequest::new("demo-client").with_scope(ScopeSet::new(["email.read", "profile.read"])?);
	let issued = authorizer.create_token_client_credentials(&request).await?;
	let required = ScopeSet::new(["email.read"])?;
	let verified = authorizer.verify_token("demo-access", Some(&required)).await?;

	println!(
		"Issued {:?}; verified from cache with {:?}s left.",
		issued.access_token(),
		verified.expires_in
	);

	let key = ApiKey::new("demo-key");

	for _ in 0..3 {
		authorizer.verify_api_key(&key, &RequestContext::new()).await?;
	}

	println!(
		"Target consulted {} time(s); cache hits: {}.",
		service.lookups.load(Ordering::SeqCst),
		authorizer.metrics().hits()
	);

	Ok(())
}
