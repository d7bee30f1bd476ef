//! Crate-wide error types shared by the signers, the HTTP builder, and both authenticators.

// self
use crate::{
	_prelude::*,
	classify::{ApiError, DomainError},
	profile::ProfileError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by every public API.
///
/// Signing, request-construction, transport, and decode failures are surfaced unchanged.
/// A failed provider response surfaces as [`Error::Provider`] until the caller normalizes it
/// through [`check_error`](crate::classify::check_error), which yields [`Error::Domain`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Consumer key or secret is empty.
	#[error("Consumer credentials are missing or empty.")]
	CredentialsInvalid,
	/// Token material required for the call is empty.
	#[error("Token is missing or empty.")]
	TokenInvalid,
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Outgoing request could not be assembled.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Signature computation failed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Transport failure (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the requested shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Provider answered with a failure body that has not been classified yet.
	#[error("{0}")]
	Provider(Box<dyn ApiError>),
	/// Provider failure normalized into the domain taxonomy.
	#[error(transparent)]
	Domain(#[from] DomainError),
}
impl Error {
	/// Returns the HTTP status attached to the error, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Provider(failure) => Some(failure.status()),
			Self::Domain(domain) => domain.status,
			Self::Decode(decode) => Some(decode.status()),
			_ => None,
		}
	}
}

/// Configuration failures raised while assembling transports or provider profiles.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider profile failed validation.
	#[error(transparent)]
	Profile(#[from] ProfileError),
	/// Token endpoint returned an `expires_in` that overflows the supported time range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures raised while turning a builder into an outgoing request.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// Base URL or resolved path is not a valid absolute URL.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// Raw URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A query source could not be encoded into key/value pairs.
	#[error("Query parameters could not be encoded.")]
	QueryEncode(#[from] serde_urlencoded::ser::Error),
	/// A request body could not be form-encoded.
	#[error("Form body could not be encoded.")]
	FormEncode {
		/// Underlying encoding failure.
		#[source]
		source: serde_urlencoded::ser::Error,
	},
	/// A computed header value contains bytes that HTTP forbids.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name that was being set.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	Http(#[from] http::Error),
}

/// Failures raised while producing a signature.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The MAC rejected the derived signing key.
	#[error("HMAC signing key was rejected.")]
	MacKey,
	/// RSA private key material could not be parsed.
	#[error("RSA private key could not be parsed.")]
	InvalidPrivateKey {
		/// Underlying PEM/DER failure.
		#[source]
		source: BoxError,
	},
	/// RSA signing failed.
	#[error("RSA-SHA1 signing failed.")]
	Rsa {
		/// Underlying signature failure.
		#[source]
		source: rsa::signature::Error,
	},
}
impl SigningError {
	/// Wraps a key parsing failure.
	pub fn invalid_private_key(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::InvalidPrivateKey { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response decoding failures. The status is kept so callers can still inspect the round trip.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("Provider returned a body that is not valid JSON (status {status}).")]
	Json {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Body is JSON but does not match the target type.
	#[error("Provider returned JSON that does not match the expected shape (status {status}).")]
	Shape {
		/// HTTP status code of the response.
		status: u16,
		/// Parsing failure annotated with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl DecodeError {
	/// HTTP status of the response that failed to decode.
	pub fn status(&self) -> u16 {
		match self {
			Self::Json { status, .. } | Self::Shape { status, .. } => *status,
		}
	}
}
