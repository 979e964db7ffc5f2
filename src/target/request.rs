// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
};

/// Options for token issuance, refresh, and authorization-code generation.
///
/// Which fields matter depends on the grant; the cache forwards the whole request
/// untouched.
#[derive(Clone, Debug, Default)]
pub struct GrantRequest {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential clients.
	pub client_secret: Option<TokenSecret>,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// Lifetime the caller asks the target to issue.
	pub token_lifetime: Option<Duration>,
	/// Resource-owner username (password grant).
	pub username: Option<String>,
	/// Resource-owner password (password grant).
	pub password: Option<TokenSecret>,
	/// Redirect URI (authorization-code and implicit grants).
	pub redirect_uri: Option<Url>,
	/// Authorization code being exchanged.
	pub code: Option<TokenSecret>,
	/// Refresh token being exchanged.
	pub refresh_token: Option<TokenSecret>,
	/// Opaque state echoed on the redirect.
	pub state: Option<String>,
	/// Target-specific extra attributes.
	pub attributes: JsonMap<String, JsonValue>,
}
impl GrantRequest {
	/// Creates a request for `client_id`.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), ..Default::default() }
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the requested scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the requested token lifetime.
	pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = Some(lifetime);

		self
	}

	/// Sets resource-owner credentials.
	pub fn with_credentials(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.username = Some(username.into());
		self.password = Some(TokenSecret::new(password));

		self
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Sets the authorization code.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(TokenSecret::new(code));

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the opaque redirect state.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Adds a target-specific attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.attributes.insert(name.into(), value.into());

		self
	}
}

/// RFC 7009 `token_type_hint` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
	/// The token is an access token.
	AccessToken,
	/// The token is a refresh token.
	RefreshToken,
}
impl TokenTypeHint {
	/// Returns the wire identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenTypeHint::AccessToken => "access_token",
			TokenTypeHint::RefreshToken => "refresh_token",
		}
	}
}

/// Options for token invalidation.
#[derive(Clone, Debug)]
pub struct InvalidationRequest {
	/// Token to revoke; its cache entry is dropped before the target is called.
	pub token: TokenSecret,
	/// Hint about which kind of token `token` is.
	pub token_type_hint: Option<TokenTypeHint>,
	/// Client identifier, when the target authenticates revocations.
	pub client_id: Option<String>,
	/// Client secret, when the target authenticates revocations.
	pub client_secret: Option<TokenSecret>,
}
impl InvalidationRequest {
	/// Creates a request revoking `token`.
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: TokenSecret::new(token),
			token_type_hint: None,
			client_id: None,
			client_secret: None,
		}
	}

	/// Sets the token type hint.
	pub fn with_hint(mut self, hint: TokenTypeHint) -> Self {
		self.token_type_hint = Some(hint);

		self
	}

	/// Sets the client credentials used to authenticate the revocation.
	pub fn with_client(mut self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}
}

/// Request metadata forwarded to the target when validating an API key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	/// `Origin` of the calling request.
	pub origin: Option<String>,
	/// Peer address of the calling request.
	pub remote_addr: Option<String>,
	/// Remaining request headers, lower-cased names.
	pub headers: BTreeMap<String, String>,
}
impl RequestContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the request origin.
	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());

		self
	}

	/// Sets the peer address.
	pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
		self.remote_addr = Some(addr.into());

		self
	}

	/// Adds a header; the name is lower-cased.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_context_headers_are_case_insensitive() {
		let ctx = RequestContext::new().with_header("X-Forwarded-For", "10.0.0.1");

		assert_eq!(ctx.header("x-forwarded-for"), Some("10.0.0.1"));
		assert_eq!(ctx.header("X-FORWARDED-FOR"), Some("10.0.0.1"));
		assert_eq!(ctx.header("origin"), None);
	}

	#[test]
	fn grant_request_debug_redacts_secrets() {
		let request = GrantRequest::new("client")
			.with_client_secret("client-secret-value")
			.with_credentials("alice", "hunter2");
		let rendered = format!("{request:?}");

		assert!(rendered.contains("alice"));
		assert!(!rendered.contains("client-secret-value"));
		assert!(!rendered.contains("hunter2"));
	}
}
