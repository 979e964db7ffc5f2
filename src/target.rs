//! Authorization target contract: the OAuth service and API-key validator behind the cache.
//!
//! Every method returns a boxed `Send` future and defaults to
//! [`ConfigError::UnsupportedOperation`], so a target only overrides what it actually
//! serves. Request fields are opaque to the cache and interpreted by the target alone.

mod request;

pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::{ApiKey, ScopeSet, TokenResponse},
	error::ConfigError,
};

/// Boxed future returned by [`AuthorizationTarget`] operations.
pub type TargetFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Authoritative OAuth service wrapped by [`CachingAuthorizer`](crate::CachingAuthorizer).
pub trait AuthorizationTarget
where
	Self: Send + Sync,
{
	/// Issues a token for the `client_credentials` grant.
	fn create_token_client_credentials<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		unsupported("create_token_client_credentials")
	}

	/// Issues a token for the resource-owner `password` grant.
	fn create_token_password_credentials<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		unsupported("create_token_password_credentials")
	}

	/// Exchanges an authorization code for a token.
	fn create_token_authorization_code<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		unsupported("create_token_authorization_code")
	}

	/// Issues a token for the implicit grant.
	fn create_token_implicit_grant<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, TokenResponse> {
		unsupported("create_token_implicit_grant")
	}

	/// Mints an authorization code and returns the redirect URI carrying it.
	fn generate_authorization_code<'a>(
		&'a self,
		_request: &'a GrantRequest,
	) -> TargetFuture<'a, Url> {
		unsupported("generate_authorization_code")
	}

	/// Exchanges a refresh token for a new access token.
	fn refresh_token<'a>(&'a self, _request: &'a GrantRequest) -> TargetFuture<'a, TokenResponse> {
		unsupported("refresh_token")
	}

	/// Revokes a token.
	fn invalidate_token<'a>(&'a self, _request: &'a InvalidationRequest) -> TargetFuture<'a, ()> {
		unsupported("invalidate_token")
	}

	/// Validates `token`, optionally against `required_scopes`, and returns its metadata.
	///
	/// The returned record need not echo the access token.
	fn verify_token<'a>(
		&'a self,
		_token: &'a str,
		_required_scopes: Option<&'a ScopeSet>,
	) -> TargetFuture<'a, TokenResponse> {
		unsupported("verify_token")
	}

	/// Validates an API key in the context of the request presenting it.
	fn verify_api_key<'a>(
		&'a self,
		_api_key: &'a ApiKey,
		_request: &'a RequestContext,
	) -> TargetFuture<'a, bool> {
		unsupported("verify_api_key")
	}
}

fn unsupported<'a, T>(operation: &'static str) -> TargetFuture<'a, T>
where
	T: 'a + Send,
{
	Box::pin(async move { Err(ConfigError::UnsupportedOperation { operation }.into()) })
}
