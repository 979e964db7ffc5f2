//! Cache-key derivation for anything that identifies an access token.

// self
use crate::auth::token::{record::TokenRecord, secret::TokenSecret};

/// Identifies the store key of a cached access token.
///
/// Token keys are the literal access-token string. Implemented for raw strings and for
/// token-shaped values, which contribute their `access_token` field.
pub trait TokenKey {
	/// Store key, or `None` if the value carries no usable access token.
	fn token_key(&self) -> Option<&str>;
}
impl TokenKey for str {
	fn token_key(&self) -> Option<&str> {
		Some(self).filter(|key| !key.is_empty())
	}
}
impl TokenKey for String {
	fn token_key(&self) -> Option<&str> {
		self.as_str().token_key()
	}
}
impl TokenKey for TokenSecret {
	fn token_key(&self) -> Option<&str> {
		self.expose().token_key()
	}
}
impl TokenKey for TokenRecord {
	fn token_key(&self) -> Option<&str> {
		self.access_token()
	}
}
