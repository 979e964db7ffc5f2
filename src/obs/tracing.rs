// self
use crate::{_prelude::*, obs::CacheOp, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// Cache-level events worth a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
	/// Lookup found a live entry.
	Hit,
	/// Lookup found nothing.
	Miss,
	/// Lookup found an entry whose residual lifetime had run out.
	Stale,
	/// Record was written to the store.
	Stored,
	/// Record carried no access token (or no remaining lifetime) and was not stored.
	Uncacheable,
	/// Cached token failed the required-scope check.
	ScopeRejected,
}
impl CacheEvent {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheEvent::Hit => "hit",
			CacheEvent::Miss => "miss",
			CacheEvent::Stale => "stale",
			CacheEvent::Stored => "stored",
			CacheEvent::Uncacheable => "uncacheable",
			CacheEvent::ScopeRejected => "scope_rejected",
		}
	}
}

/// A span builder used by cache operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: CacheOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_token_cache.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a cache-level event inside the current span.
pub fn record_cache_event(event: CacheEvent) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(event = event.as_str(), "token cache event");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}

/// Warns about a best-effort delete the caller never sees fail.
pub fn record_delete_failure(err: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %err, "token cache delete failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
