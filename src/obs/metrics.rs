// self
use crate::obs::{CallKind, CallOutcome};

/// Increments `social_oauth_call_total{call, outcome}`.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_oauth_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Increments `social_oauth_call_failure_status_total{call, status}` for failures that carry
/// a provider status. Transport and signing failures have none and are not counted here.
pub fn record_failure_status(kind: CallKind, status: u16) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_oauth_call_failure_status_total",
			"call" => kind.as_str(),
			"status" => status.to_string()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, status);
	}
}
