//! Response body decoders.

// crates.io
use ::http::StatusCode;
use serde_json::{Value, json};
// self
use crate::{_prelude::*, error::DecodeError};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Turns a drained response body into JSON before it is mapped onto the caller's types.
///
/// Decoders never see `204 No Content` responses.
pub trait ResponseDecoder
where
	Self: 'static + Send + Sync + Debug,
{
	/// Decodes `body`. An empty body decodes to [`Value::Null`] unless the decoder substitutes
	/// a placeholder.
	fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Value, DecodeError>;
}

/// Strict JSON decoder used by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDecoder;
impl ResponseDecoder for JsonDecoder {
	fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Value, DecodeError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		serde_json::from_slice(body)
			.map_err(|source| DecodeError::Json { status: status.as_u16(), source })
	}
}

/// Decoder for providers that answer failures with HTML or other non-JSON pages.
///
/// Successful responses are decoded strictly. A failed response whose body is empty or not
/// JSON is replaced with `{"message": "Failed request", "error": <status>, "body": <preview>}`
/// so the failure value is never blank.
#[derive(Clone, Copy, Debug, Default)]
pub struct LenientJsonDecoder;
impl ResponseDecoder for LenientJsonDecoder {
	fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Value, DecodeError> {
		if status.is_success() {
			return JsonDecoder.decode(status, body);
		}

		match JsonDecoder.decode(status, body) {
			Ok(value) if !value.is_null() => Ok(value),
			_ => Ok(json!({
				"message": "Failed request",
				"error": status.as_u16(),
				"body": truncate_preview(String::from_utf8_lossy(body).into_owned()),
			})),
		}
	}
}

pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
