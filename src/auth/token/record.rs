//! OAuth token payloads, the boundary variant targets return, and the stored envelope.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
	error::SerializationError,
};

const CACHED_AT: &str = "cached_at";

/// Structured OAuth token response (RFC 6749 §5.1) plus provider-defined attributes.
///
/// Unknown fields are preserved verbatim in [`attributes`](Self::attributes) so a record
/// serializes back to the same JSON object it was parsed from.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Bearer token; a record without a non-empty one is never cached.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Token type, usually `Bearer`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Remaining lifetime in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none", with = "seconds")]
	pub expires_in: Option<f64>,
	/// Space-delimited granted scopes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Refresh token, if the target issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Any other provider-defined fields.
	#[serde(flatten)]
	pub attributes: JsonMap<String, JsonValue>,
}
impl TokenRecord {
	/// Creates a record carrying only the provided access token.
	pub fn bearer(access_token: impl Into<String>) -> Self {
		Self {
			access_token: Some(TokenSecret::new(access_token)),
			token_type: Some("Bearer".into()),
			..Default::default()
		}
	}

	/// Sets the remaining lifetime in seconds.
	pub fn with_expires_in(mut self, seconds: f64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Sets the space-delimited granted scope string.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Adds a provider-defined attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.attributes.insert(name.into(), value.into());

		self
	}

	/// Access token string, if present and non-empty.
	pub fn access_token(&self) -> Option<&str> {
		self.access_token.as_ref().map(TokenSecret::expose).filter(|token| !token.is_empty())
	}

	/// Scopes granted by the `scope` field (empty if absent).
	pub fn granted_scopes(&self) -> ScopeSet {
		self.scope.as_deref().map(ScopeSet::from_delimited).unwrap_or_default()
	}

	/// Store TTL for this record: `expires_in` rounded to milliseconds and capped at `ceiling`.
	///
	/// Returns `None` when the record declares no lifetime, leaving expiry to the store's
	/// default policy. A lifetime that rounds to zero yields [`Duration::ZERO`].
	pub fn cache_ttl(&self, ceiling: Option<Duration>) -> Option<Duration> {
		let millis = (self.expires_in? * 1_000.).round() as i64;
		let requested = Duration::milliseconds(millis);

		Some(match ceiling {
			Some(ceiling) if ceiling < requested => ceiling,
			_ => requested,
		})
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("scope", &self.scope)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("attributes", &self.attributes.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Token payload as returned by an authorization target.
#[derive(Clone, Debug)]
pub enum TokenResponse {
	/// Pre-serialized JSON token response.
	Raw(String),
	/// Already-parsed token response.
	Structured(TokenRecord),
}
impl TokenResponse {
	/// Parses the response into a [`TokenRecord`].
	pub fn into_record(self) -> Result<TokenRecord, SerializationError> {
		match self {
			Self::Raw(raw) => {
				let mut de = serde_json::Deserializer::from_str(&raw);

				serde_path_to_error::deserialize(&mut de).map_err(SerializationError::decode)
			},
			Self::Structured(record) => Ok(record),
		}
	}
}
impl From<TokenRecord> for TokenResponse {
	fn from(value: TokenRecord) -> Self {
		Self::Structured(value)
	}
}
impl From<String> for TokenResponse {
	fn from(value: String) -> Self {
		Self::Raw(value)
	}
}

/// Stored form of a token record: its JSON object plus the `cached_at` stamp.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredToken {
	#[serde(flatten)]
	record: TokenRecord,
	/// Epoch milliseconds at which the record was written.
	cached_at: i64,
}
impl StoredToken {
	pub(crate) fn encode(
		record: &TokenRecord,
		cached_at: OffsetDateTime,
	) -> Result<String, SerializationError> {
		let mut record = record.clone();

		record.attributes.remove(CACHED_AT);

		let stored = Self { record, cached_at: epoch_millis(cached_at) };

		serde_json::to_string(&stored).map_err(|source| SerializationError::Encode { source })
	}

	pub(crate) fn decode(raw: &str) -> Result<Self, SerializationError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(SerializationError::decode)
	}

	/// Strips the stamp and rebases `expires_in` onto `now`.
	pub(crate) fn into_residual(self, now: OffsetDateTime) -> TokenRecord {
		let Self { mut record, cached_at } = self;
		let elapsed = (epoch_millis(now) - cached_at).max(0) as f64 / 1_000.;

		record.expires_in = record.expires_in.map(|seconds| seconds - elapsed);

		record
	}
}

fn epoch_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}

mod seconds {
	// self
	use super::*;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Seconds {
		Number(f64),
		Text(String),
	}

	pub(super) fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(seconds) if seconds.fract() == 0. && seconds.abs() < 9e15 =>
				serializer.serialize_i64(*seconds as i64),
			Some(seconds) => serializer.serialize_f64(*seconds),
			None => serializer.serialize_none(),
		}
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let seconds = match <Option<Seconds>>::deserialize(deserializer)? {
			None => return Ok(None),
			Some(Seconds::Number(seconds)) => seconds,
			Some(Seconds::Text(text)) => text.trim().parse::<f64>().map_err(DeError::custom)?,
		};

		if seconds.is_finite() {
			Ok(Some(seconds))
		} else {
			Err(DeError::custom("expires_in must be a finite number"))
		}
	}
}
