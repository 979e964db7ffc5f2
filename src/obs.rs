//! Optional observability helpers for cache operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to run every operation inside an `oauth2_token_cache.op` span
//!   with `op` and `stage` fields, and to emit debug events for hits/misses plus warnings for
//!   best-effort deletes that failed.
//! - Enable `metrics` to increment the `oauth2_token_cache_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations exposed by the caching authorizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOp {
	/// `client_credentials` token issuance.
	ClientCredentials,
	/// `password` token issuance.
	PasswordCredentials,
	/// Authorization-code exchange.
	AuthorizationCode,
	/// Implicit-grant issuance.
	ImplicitGrant,
	/// Authorization-code generation.
	GenerateAuthorizationCode,
	/// Refresh-token exchange.
	Refresh,
	/// Token revocation.
	InvalidateToken,
	/// Token verification.
	VerifyToken,
	/// API-key verification.
	VerifyApiKey,
}
impl CacheOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOp::ClientCredentials => "client_credentials",
			CacheOp::PasswordCredentials => "password",
			CacheOp::AuthorizationCode => "authorization_code",
			CacheOp::ImplicitGrant => "implicit",
			CacheOp::GenerateAuthorizationCode => "generate_authorization_code",
			CacheOp::Refresh => "refresh_token",
			CacheOp::InvalidateToken => "invalidate_token",
			CacheOp::VerifyToken => "verify_token",
			CacheOp::VerifyApiKey => "verify_api_key",
		}
	}
}
impl Display for CacheOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
