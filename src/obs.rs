//! Optional observability helpers for authenticator calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `social_oauth.call` with the `call` (kind)
//!   and `stage` (call site) fields. `outcome` and `status` are recorded once the call resolves.
//! - Enable `metrics` to increment `social_oauth_call_total{call, outcome}` for every attempt,
//!   success, and failure, and `social_oauth_call_failure_status_total{call, status}` for
//!   failures with a provider status.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Authenticator calls observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Signed API call.
	Get,
	/// OAuth 2.0 refresh-token exchange.
	Refresh,
	/// OAuth 2.0 token revocation.
	Revoke,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Get => "get",
			CallKind::Refresh => "refresh",
			CallKind::Revoke => "revoke",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an authenticator call.
	Attempt,
	/// Successful completion, including provider failures that classified as empty.
	Success,
	/// Error propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `call` inside a [`CallSpan`], counting the attempt and the final outcome.
///
/// Failures that carry a provider status are also counted per status.
pub(crate) async fn observe<T, Fut>(kind: CallKind, stage: &'static str, call: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage);

	record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(call).await;
	let (outcome, status) = match &result {
		Ok(_) => (CallOutcome::Success, None),
		Err(e) => (CallOutcome::Failure, e.status()),
	};

	span.close(outcome, status);
	record_call_outcome(kind, outcome);

	if let Some(status) = status {
		record_failure_status(kind, status);
	}

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(CallKind::Refresh.to_string(), "refresh");
		assert_eq!(CallOutcome::Failure.to_string(), "failure");
	}

	#[tokio::test]
	async fn observe_passes_result_through() {
		let ok = observe(CallKind::Get, "observe_ok", async { Ok(7) }).await;

		assert_eq!(ok.expect("Call should succeed."), 7);

		let err = observe::<(), _>(CallKind::Revoke, "observe_err", async {
			Err(Error::TokenInvalid)
		})
		.await;

		assert!(matches!(err, Err(Error::TokenInvalid)));
	}
}
