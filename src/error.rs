//! Crate-level error types shared by the decorator, stores, and targets.

// self
use crate::{_prelude::*, auth::ScopeSet};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token payload could not be encoded for, or decoded from, the store.
	#[error(transparent)]
	Serialization(#[from] SerializationError),

	/// Cached token does not grant every required scope.
	#[error("Token lacks the required scopes: {missing}.")]
	InvalidScope {
		/// Required scopes absent from the token's grant.
		missing: ScopeSet,
	},
	/// Target reported the token as unknown, expired, or malformed.
	#[error("Token is invalid: {reason}.")]
	InvalidToken {
		/// Target-supplied reason string.
		reason: String,
	},
	/// Target rejected the grant (e.g., bad code or refresh token).
	#[error("Target rejected the grant: {reason}.")]
	InvalidGrant {
		/// Target-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Target-supplied reason string.
		reason: String,
	},
	/// Token has been revoked and must not be reused.
	#[error("Token has been revoked.")]
	Revoked,
	/// Opaque failure raised by the authorization target.
	#[error("Authorization target failed.")]
	Target {
		/// Target-specific failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps an arbitrary target failure inside [`Error::Target`].
	pub fn target(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Target { source: Box::new(src) }
	}

	/// Machine-readable OAuth error code, when the failure maps onto one.
	pub fn error_code(&self) -> Option<ErrorCode> {
		match self {
			Self::InvalidScope { .. } => Some(ErrorCode::InvalidScope),
			Self::InvalidToken { .. } | Self::Revoked => Some(ErrorCode::InvalidToken),
			Self::InvalidGrant { .. } => Some(ErrorCode::InvalidGrant),
			Self::InvalidClient { .. } => Some(ErrorCode::InvalidClient),
			_ => None,
		}
	}
}

/// OAuth error codes surfaced by [`Error::error_code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	/// `invalid_scope`
	InvalidScope,
	/// `invalid_token`
	InvalidToken,
	/// `invalid_grant`
	InvalidGrant,
	/// `invalid_client`
	InvalidClient,
}
impl ErrorCode {
	/// Returns the RFC 6749 / RFC 6750 wire identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::InvalidScope => "invalid_scope",
			ErrorCode::InvalidToken => "invalid_token",
			ErrorCode::InvalidGrant => "invalid_grant",
			ErrorCode::InvalidClient => "invalid_client",
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration failures raised while wiring the decorator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Store transforms values, so stored token JSON would not round-trip byte-for-byte.
	#[error("Store applies the `{encoding}` value encoding; the cache requires raw values.")]
	EncodedStore {
		/// Name of the configured encoding.
		encoding: String,
	},
	/// API-key namespace prefix was empty.
	#[error("API key namespace cannot be empty.")]
	EmptyNamespace,
	/// Target does not implement the requested operation.
	#[error("Authorization target does not support `{operation}`.")]
	UnsupportedOperation {
		/// Operation label.
		operation: &'static str,
	},
}

/// Failures converting token records to and from their stored JSON form.
#[derive(Debug, ThisError)]
pub enum SerializationError {
	/// Record could not be encoded as JSON.
	#[error("Token record could not be encoded.")]
	Encode {
		/// Underlying encoder failure.
		#[source]
		source: serde_json::Error,
	},
	/// Stored or raw JSON could not be decoded into a token record.
	#[error("Token payload is malformed at `{path}`.")]
	Decode {
		/// JSON path of the offending value.
		path: String,
		/// Underlying decoder failure.
		#[source]
		source: serde_json::Error,
	},
}
impl SerializationError {
	pub(crate) fn decode(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::Decode { path, source: err.into_inner() }
	}
}
