//! Provider failure classification.
//!
//! Every provider binding decodes its failure body into a value implementing [`ApiError`].
//! [`relevant_error`] decides whether such a value should surface at all, and [`check_error`]
//! normalizes it into a [`DomainError`] through the provider's [`StatusTable`].

// self
use crate::_prelude::*;

/// Capability set of a decoded provider failure.
pub trait ApiError
where
	Self: 'static + Send + Sync + Debug + Display,
{
	/// Returns `true` when the value carries no failure information.
	///
	/// Non-2xx responses must never report empty, even when the provider sent no body.
	fn is_empty(&self) -> bool;

	/// HTTP status code of the response the value was decoded from.
	fn status(&self) -> u16;

	/// Maps the failure into the normalized domain taxonomy.
	fn classify(&self) -> DomainError;
}

/// Provider failure that can be built from a response status and its decoded body.
///
/// `body` is `None` when the provider answered with an empty body.
pub trait ProviderFailure
where
	Self: ApiError + Sized,
{
	/// Wire shape of the failure body.
	type Body: DeserializeOwned + Send;

	/// Builds the failure value from a round trip.
	fn from_response(status: u16, body: Option<Self::Body>) -> Self;
}

/// Normalized, provider-independent failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainErrorKind {
	/// Resource does not exist.
	NotFound,
	/// Caller is not authorized.
	Unauthorized,
	/// Request limit reached for the current window.
	RateLimited,
	/// Authentication data was missing or wholly invalid.
	BadAuthenticationData,
	/// Token is invalid or expired.
	ExpiredToken,
	/// User or app has been suspended or deleted.
	Forbidden,
	/// Content has not been modified since the cached copy.
	NotModified,
	/// Request was malformed.
	BadRequest,
	/// Provider failed internally.
	InternalApiError,
	/// Catch-all for statuses no table entry matches.
	Unknown,
}
impl DomainErrorKind {
	/// Returns a stable human-readable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NotFound => "not found",
			Self::Unauthorized => "unauthorized",
			Self::RateLimited => "rate limit exceeded",
			Self::BadAuthenticationData => "bad authentication data",
			Self::ExpiredToken => "invalid or expired token",
			Self::Forbidden => "user/app has been suspended or deleted",
			Self::NotModified => "not modified",
			Self::BadRequest => "bad request",
			Self::InternalApiError => "internal api error",
			Self::Unknown => "unknown error",
		}
	}
}
impl Display for DomainErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure normalized into the domain taxonomy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainError {
	/// Normalized category.
	pub kind: DomainErrorKind,
	/// HTTP status of the originating response, when known.
	pub status: Option<u16>,
	/// Provider-supplied message, when one was present.
	pub message: Option<String>,
}
impl DomainError {
	/// Creates a domain error without status or message.
	pub fn new(kind: DomainErrorKind) -> Self {
		Self { kind, status: None, message: None }
	}

	/// Attaches the originating HTTP status.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches a provider message. Empty messages are ignored.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		let message = message.into();

		if !message.is_empty() {
			self.message = Some(message);
		}

		self
	}
}
impl Display for DomainError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.kind.as_str())?;

		if let Some(status) = self.status {
			write!(f, " (status {status})")?;
		}
		if let Some(message) = &self.message {
			write!(f, ": {message}")?;
		}

		Ok(())
	}
}
impl StdError for DomainError {}

/// Per-provider status lookup that always terminates in [`DomainErrorKind::Unknown`].
#[derive(Clone, Copy, Debug)]
pub struct StatusTable(pub &'static [(&'static [u16], DomainErrorKind)]);
impl StatusTable {
	/// Returns the kind registered for `status`, or `Unknown` when nothing matches.
	pub fn lookup(&self, status: u16) -> DomainErrorKind {
		self.0
			.iter()
			.find(|(codes, _)| codes.contains(&status))
			.map(|(_, kind)| *kind)
			.unwrap_or(DomainErrorKind::Unknown)
	}

	/// Classifies `status` into a [`DomainError`] carrying the optional message.
	pub fn classify(&self, status: u16, message: Option<&str>) -> DomainError {
		let error = DomainError::new(self.lookup(status)).with_status(status);

		match message {
			Some(message) => error.with_message(message),
			None => error,
		}
	}
}

/// Status table used by [`JsonApiError`].
pub const DEFAULT_STATUS_TABLE: StatusTable = StatusTable(&[
	(&[304], DomainErrorKind::NotModified),
	(&[400], DomainErrorKind::BadRequest),
	(&[401], DomainErrorKind::Unauthorized),
	(&[403], DomainErrorKind::Forbidden),
	(&[404, 410], DomainErrorKind::NotFound),
	(&[429], DomainErrorKind::RateLimited),
	(&[500, 502, 503], DomainErrorKind::InternalApiError),
]);

/// Picks the error a call should surface.
///
/// A transport error always wins. Otherwise the provider failure surfaces as
/// [`Error::Provider`] unless it [is empty](ApiError::is_empty).
pub fn relevant_error<E>(transport: Option<Error>, provider: E) -> Result<()>
where
	E: ApiError,
{
	if let Some(e) = transport {
		return Err(e);
	}
	if provider.is_empty() {
		return Ok(());
	}

	Err(Error::Provider(Box::new(provider)))
}

/// Normalizes provider failures into [`Error::Domain`]; every other error passes through.
pub fn check_error(err: Error) -> Error {
	match err {
		Error::Provider(failure) => Error::Domain(failure.classify()),
		e => e,
	}
}

/// Generic provider failure holding any JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonApiError {
	/// HTTP status of the response.
	pub status: u16,
	/// Decoded body, `Null` when the provider sent nothing.
	pub body: serde_json::Value,
}
impl JsonApiError {
	/// Best-effort message lookup across the field names providers commonly use.
	pub fn message(&self) -> Option<&str> {
		["message", "error_description", "error"]
			.iter()
			.find_map(|key| self.body.get(key).and_then(serde_json::Value::as_str))
	}
}
impl Display for JsonApiError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self.message() {
			Some(message) => write!(f, "Provider returned status {}: {message}.", self.status),
			None => write!(f, "Provider returned status {}.", self.status),
		}
	}
}
impl ApiError for JsonApiError {
	fn is_empty(&self) -> bool {
		(200..300).contains(&self.status) && is_blank(&self.body)
	}

	fn status(&self) -> u16 {
		self.status
	}

	fn classify(&self) -> DomainError {
		DEFAULT_STATUS_TABLE.classify(self.status, self.message())
	}
}
impl ProviderFailure for JsonApiError {
	type Body = serde_json::Value;

	fn from_response(status: u16, body: Option<Self::Body>) -> Self {
		Self { status, body: body.unwrap_or(serde_json::Value::Null) }
	}
}

/// RFC 6749 error body returned by token refresh and revocation endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEndpointErrorBody {
	/// Machine-readable error code.
	#[serde(default)]
	pub error: Option<String>,
	/// Human-readable description.
	#[serde(default)]
	pub error_description: Option<String>,
}

/// Failure returned by a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEndpointError {
	/// HTTP status of the response.
	pub status: u16,
	/// Decoded error body.
	pub body: TokenEndpointErrorBody,
}
impl Display for TokenEndpointError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Token endpoint returned status {}", self.status)?;

		if let Some(error) = &self.body.error {
			write!(f, ": {error}")?;
		}
		if let Some(description) = &self.body.error_description {
			write!(f, " ({description})")?;
		}

		f.write_str(".")
	}
}
impl ApiError for TokenEndpointError {
	fn is_empty(&self) -> bool {
		(200..300).contains(&self.status)
			&& self.body.error.is_none()
			&& self.body.error_description.is_none()
	}

	fn status(&self) -> u16 {
		self.status
	}

	fn classify(&self) -> DomainError {
		let message = self.body.error_description.as_deref().or(self.body.error.as_deref());
		let kind = match self.body.error.as_deref() {
			Some(code) if code.eq_ignore_ascii_case("invalid_grant") =>
				DomainErrorKind::ExpiredToken,
			Some(code)
				if code.eq_ignore_ascii_case("invalid_client")
					|| code.eq_ignore_ascii_case("unauthorized_client") =>
				DomainErrorKind::BadAuthenticationData,
			_ => return DEFAULT_STATUS_TABLE.classify(self.status, message),
		};
		let error = DomainError::new(kind).with_status(self.status);

		match message {
			Some(message) => error.with_message(message),
			None => error,
		}
	}
}
impl ProviderFailure for TokenEndpointError {
	type Body = TokenEndpointErrorBody;

	fn from_response(status: u16, body: Option<Self::Body>) -> Self {
		Self { status, body: body.unwrap_or_default() }
	}
}

fn is_blank(value: &serde_json::Value) -> bool {
	match value {
		serde_json::Value::Null => true,
		serde_json::Value::Object(map) => map.is_empty(),
		serde_json::Value::String(s) => s.is_empty(),
		_ => false,
	}
}
