// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Resolves to an instrumented future with `tracing`, or to the future itself without it.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// `social_oauth.call` span covering one authenticator call.
///
/// `outcome` and `status` start empty and are filled by [`CallSpan::close`] once the round trip
/// resolved, so a single span carries the whole call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `kind` at call site `stage`.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"social_oauth.call",
				call = kind.as_str(),
				stage,
				outcome = tracing::field::Empty,
				status = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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

	/// Records the final outcome and, when the provider answered, its status.
	pub fn close(&self, outcome: CallOutcome, status: Option<u16>) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());

			if let Some(status) = status {
				self.span.record("status", status);
			}
			if outcome == CallOutcome::Failure {
				self.span.in_scope(|| tracing::debug!(status, "call failed"));
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (self, outcome, status);
		}
	}
}
