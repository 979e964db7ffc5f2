//! Scripted target and instrumented store shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::{BTreeMap, BTreeSet},
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime, macros};
use url::Url;
// self
use oauth2_token_cache::{
	CachingAuthorizer,
	error::Error,
	auth::{ApiKey, ScopeSet, TokenRecord, TokenResponse},
	clock::ManualClock,
	store::{ExpiringStore, MemoryStore, StoreError, StoreFuture, StoreOptions},
	target::{AuthorizationTarget, GrantRequest, InvalidationRequest, RequestContext, TargetFuture},
};

pub const EPOCH: OffsetDateTime = macros::datetime!(2025-05-01 09:00 UTC);

/// Authorization target answering from in-memory fixtures and counting every call.
#[derive(Default)]
pub struct MockTarget {
	issued: Mutex<Option<TokenResponse>>,
	introspection: Mutex<BTreeMap<String, TokenRecord>>,
	revoked: Mutex<BTreeSet<String>>,
	api_keys: Mutex<BTreeMap<String, Option<String>>>,
	reject_grants: AtomicBool,
	calls: Mutex<BTreeMap<&'static str, usize>>,
}
impl MockTarget {
	/// Response returned by every token-issuing grant.
	pub fn issue(&self, response: impl Into<TokenResponse>) {
		*self.issued.lock() = Some(response.into());
	}

	/// Metadata returned when `token` is verified; the record omits the access token.
	pub fn know_token(&self, token: &str, record: TokenRecord) {
		self.introspection.lock().insert(token.to_owned(), record);
	}

	/// Accepts `key`, optionally only from `origin`.
	pub fn accept_api_key(&self, key: &str, origin: Option<&str>) {
		self.api_keys.lock().insert(key.to_owned(), origin.map(str::to_owned));
	}

	/// Makes every grant fail with `invalid_grant`.
	pub fn reject_grants(&self) {
		self.reject_grants.store(true, Ordering::SeqCst);
	}

	/// Number of times `operation` reached the target.
	pub fn calls(&self, operation: &str) -> usize {
		self.calls.lock().get(operation).copied().unwrap_or(0)
	}

	/// Tokens revoked so far.
	pub fn revoked(&self) -> BTreeSet<String> {
		self.revoked.lock().clone()
	}

	fn count(&self, operation: &'static str) {
		*self.calls.lock().entry(operation).or_default() += 1;
	}

	fn grant(&self, operation: &'static str) -> TargetFuture<'_, TokenResponse> {
		self.count(operation);

		let result = if self.reject_grants.load(Ordering::SeqCst) {
			Err(Error::InvalidGrant { reason: "grant rejected by mock".into() })
		} else {
			self.issued
				.lock()
				.clone()
				.ok_or_else(|| Error::InvalidClient { reason: "no token scripted".into() })
		};

		Box::pin(async move { result })
	}
}
impl AuthorizationTarget for MockTarget {
	fn create_token_client_credentials<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		self.grant("create_token_client_credentials")
	}

	fn create_token_password_credentials<'a>(
		&'a self,
		request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		if request.username.is_none() || request.password.is_none() {
			self.count("create_token_password_credentials");

			return Box::pin(async {
				Err(Error::InvalidGrant { reason: "missing credentials".into() })
			});
		}

		self.grant("create_token_password_credentials")
	}

	fn create_token_authorization_code<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		self.grant("create_token_authorization_code")
	}

	fn create_token_implicit_grant<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		self.grant("create_token_implicit_grant")
	}

	fn generate_authorization_code<'a>(
		&'a self,
		request: &'a GrantRequest,
	) -> TargetFuture<'a, Url> {
		self.count("generate_authorization_code");

		Box::pin(async move {
			let mut redirect = request
				.redirect_uri
				.clone()
				.ok_or_else(|| Error::InvalidGrant { reason: "redirect_uri required".into() })?;

			redirect.query_pairs_mut().append_pair("code", "code-123");

			if let Some(state) = &request.state {
				redirect.query_pairs_mut().append_pair("state", state);
			}

			Ok(redirect)
		})
	}

	fn refresh_token<'a>(&'a self, _request: &'a GrantRequest) -> TargetFuture<'a, TokenResponse> {
		self.grant("refresh_token")
	}

	fn invalidate_token<'a>(&'a self, request: &'a InvalidationRequest) -> TargetFuture<'a, ()> {
		self.count("invalidate_token");
		self.revoked.lock().insert(request.token.expose().to_owned());
		self.introspection.lock().remove(request.token.expose());

		Box::pin(async { Ok(()) })
	}

	fn verify_token<'a>(
		&'a self,
		token: &'a str,
		required_scopes: Option<&'a ScopeSet>,
	) -> TargetFuture<'a, TokenResponse> {
		self.count("verify_token");

		let known = self.introspection.lock().get(token).cloned();

		Box::pin(async move {
			let record = known.ok_or_else(|| Error::InvalidToken { reason: "unknown".into() })?;

			if let Some(required) = required_scopes {
				let missing = required.missing_from(&record.granted_scopes());

				if !missing.is_empty() {
					return Err(Error::InvalidScope { missing });
				}
			}

			Ok(TokenResponse::from(record))
		})
	}

	fn verify_api_key<'a>(
		&'a self,
		api_key: &'a ApiKey,
		request: &'a RequestContext,
	) -> TargetFuture<'a, bool> {
		self.count("verify_api_key");

		let valid = match self.api_keys.lock().get(api_key.expose()) {
			Some(Some(origin)) => request.origin.as_deref() == Some(origin.as_str()),
			Some(None) => true,
			None => false,
		};

		Box::pin(async move { Ok(valid) })
	}
}

/// Memory store that counts traffic and can be told to fail.
pub struct CountingStore {
	inner: MemoryStore,
	sets: AtomicUsize,
	gets: AtomicUsize,
	deletes: AtomicUsize,
	fail_reads: AtomicBool,
	fail_writes: AtomicBool,
}
impl CountingStore {
	pub fn new(inner: MemoryStore) -> Self {
		Self {
			inner,
			sets: AtomicUsize::new(0),
			gets: AtomicUsize::new(0),
			deletes: AtomicUsize::new(0),
			fail_reads: AtomicBool::new(false),
			fail_writes: AtomicBool::new(false),
		}
	}

	pub fn inner(&self) -> &MemoryStore {
		&self.inner
	}

	pub fn sets(&self) -> usize {
		self.sets.load(Ordering::SeqCst)
	}

	pub fn gets(&self) -> usize {
		self.gets.load(Ordering::SeqCst)
	}

	pub fn deletes(&self) -> usize {
		self.deletes.load(Ordering::SeqCst)
	}

	pub fn fail_reads(&self, fail: bool) {
		self.fail_reads.store(fail, Ordering::SeqCst);
	}

	pub fn fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::SeqCst);
	}
}
impl ExpiringStore for CountingStore {
	fn set<'a>(
		&'a self,
		key: &'a str,
		value: String,
		ttl: Option<Duration>,
	) -> StoreFuture<'a, ()> {
		self.sets.fetch_add(1, Ordering::SeqCst);

		if self.fail_writes.load(Ordering::SeqCst) {
			return Box::pin(async {
				Err(StoreError::Backend { message: "connection reset".into() })
			});
		}

		self.inner.set(key, value, ttl)
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		self.gets.fetch_add(1, Ordering::SeqCst);

		if self.fail_reads.load(Ordering::SeqCst) {
			return Box::pin(async {
				Err(StoreError::Backend { message: "connection reset".into() })
			});
		}

		self.inner.get(key)
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		self.deletes.fetch_add(1, Ordering::SeqCst);

		self.inner.delete(key)
	}

	fn options(&self) -> &StoreOptions {
		self.inner.options()
	}
}

/// Authorizer, target, store, and clock wired together for a test.
pub struct Harness {
	pub authorizer: CachingAuthorizer,
	pub target: Arc<MockTarget>,
	pub store: Arc<CountingStore>,
	pub clock: ManualClock,
}

pub fn harness(options: StoreOptions) -> Harness {
	let clock = ManualClock::new(EPOCH);
	let store = Arc::new(CountingStore::new(MemoryStore::with_clock(
		options,
		Arc::new(clock.clone()),
	)));
	let target = Arc::new(MockTarget::default());
	let authorizer = CachingAuthorizer::builder(store.clone(), target.clone())
		.clock(Arc::new(clock.clone()))
		.build()
		.expect("Harness authorizer should build.");

	Harness { authorizer, target, store, clock }
}
