//! Fluent request builder and status-aware executor.

// crates.io
use ::http::{
	HeaderMap, HeaderValue, Method, StatusCode,
	header::{CONTENT_TYPE, IntoHeaderName},
};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	classify::{ProviderFailure, relevant_error},
	error::{DecodeError, RequestError},
	http::{HttpRequest, HttpResponse, HttpTransport, JsonDecoder, ResponseDecoder},
};

/// Query parameters contributed by one source, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySource(Vec<(String, String)>);
impl QuerySource {
	/// Flattens a serializable struct into pairs. `None` fields are omitted.
	pub fn serialize<Q>(query: &Q) -> Result<Self>
	where
		Q: ?Sized + Serialize,
	{
		let encoded = serde_urlencoded::to_string(query).map_err(RequestError::from)?;

		Ok(url::form_urlencoded::parse(encoded.as_bytes()).into_owned().collect())
	}

	/// Appends one pair.
	pub fn push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.push((key.into(), value.into()));

		self
	}

	/// Returns the pairs.
	pub fn pairs(&self) -> &[(String, String)] {
		&self.0
	}
}
impl<K, V> FromIterator<(K, V)> for QuerySource
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl From<Vec<(String, String)>> for QuerySource {
	fn from(pairs: Vec<(String, String)>) -> Self {
		Self(pairs)
	}
}
impl<const N: usize> From<[(&str, &str); N]> for QuerySource {
	fn from(pairs: [(&str, &str); N]) -> Self {
		pairs.into_iter().collect()
	}
}

/// Decoded outcome of one round trip.
#[derive(Debug)]
pub enum Outcome<S, F> {
	/// `204 No Content`; nothing was decoded.
	NoContent,
	/// 2xx response decoded into the success type.
	Success(S),
	/// Any other status decoded into the failure type.
	Failure(F),
	/// The body did not decode into the type its status selected.
	Malformed(DecodeError),
}
impl<S, F> Outcome<S, F> {
	/// Returns `true` for [`Outcome::NoContent`].
	pub fn is_no_content(&self) -> bool {
		matches!(self, Self::NoContent)
	}
}

/// Result of [`HttpClient::execute`]. Returned whenever a round trip happened, whatever the
/// status and whether or not the body decoded, so callers can inspect it before
/// classification.
#[derive(Debug)]
pub struct Exchange<S, F> {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Decoded body.
	pub outcome: Outcome<S, F>,
}

/// Fluent, provider-agnostic request builder.
///
/// Setters take `self` by value and return the updated builder. Cloning, or the explicit
/// [`branch`](Self::branch), copies the method, URL, headers, query sources, and body, so a
/// derived builder never affects the one it came from. The transport and decoder are shared.
#[derive(Clone)]
pub struct HttpClient {
	transport: Arc<dyn HttpTransport>,
	decoder: Arc<dyn ResponseDecoder>,
	method: Method,
	raw_url: String,
	headers: HeaderMap,
	queries: Vec<QuerySource>,
	body: Option<Vec<u8>>,
}
impl HttpClient {
	/// Creates a `GET` builder with no base URL and the strict [`JsonDecoder`].
	pub fn new(transport: impl HttpTransport) -> Self {
		Self::with_transport(Arc::new(transport))
	}

	/// Creates a builder around an already shared transport.
	pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
		Self {
			transport,
			decoder: Arc::new(JsonDecoder),
			method: Method::GET,
			raw_url: String::new(),
			headers: HeaderMap::new(),
			queries: Vec::new(),
			body: None,
		}
	}

	/// Returns an independent copy to derive a new request from.
	pub fn branch(&self) -> Self {
		self.clone()
	}

	/// Swaps the transport while keeping every other setting.
	pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = transport;

		self
	}

	/// Replaces the response decoder.
	pub fn decoder(mut self, decoder: impl ResponseDecoder) -> Self {
		self.decoder = Arc::new(decoder);

		self
	}

	/// Sets the raw base URL.
	pub fn base(mut self, raw_url: impl Into<String>) -> Self {
		self.raw_url = raw_url.into();

		self
	}

	/// Resolves `path` against the current URL as an RFC 3986 reference.
	///
	/// `https://api.example.com/` + `user/` yields `https://api.example.com/user/`, while
	/// `https://api.example.com/v1` + `user` yields `https://api.example.com/user`. Without a
	/// base the path becomes the URL. An unparsable base or an unresolvable path leaves the URL
	/// as is.
	pub fn path(mut self, path: &str) -> Self {
		if self.raw_url.is_empty() {
			self.raw_url = path.to_owned();
		} else if let Ok(url) = Url::parse(&self.raw_url).and_then(|base| base.join(path)) {
			self.raw_url = url.into();
		}

		self
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Sets the method to `GET` and resolves `path`.
	pub fn get(self, path: &str) -> Self {
		self.with_method(Method::GET).path(path)
	}

	/// Sets the method to `POST` and resolves `path`.
	pub fn post(self, path: &str) -> Self {
		self.with_method(Method::POST).path(path)
	}

	/// Sets the method to `PUT` and resolves `path`.
	pub fn put(self, path: &str) -> Self {
		self.with_method(Method::PUT).path(path)
	}

	/// Sets the method to `PATCH` and resolves `path`.
	pub fn patch(self, path: &str) -> Self {
		self.with_method(Method::PATCH).path(path)
	}

	/// Sets the method to `DELETE` and resolves `path`.
	pub fn delete(self, path: &str) -> Self {
		self.with_method(Method::DELETE).path(path)
	}

	/// Registers another query source.
	pub fn query(mut self, source: impl Into<QuerySource>) -> Self {
		self.queries.push(source.into());

		self
	}

	/// Sets the raw request body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Form-encodes `form` as the body and sets the matching `Content-Type`.
	pub fn form<T>(self, form: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_urlencoded::to_string(form)
			.map_err(|source| RequestError::FormEncode { source })?;

		Ok(self
			.set_header(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"))
			.body(body))
	}

	/// Appends a header value, keeping existing values for the same name.
	pub fn add_header<K>(mut self, name: K, value: HeaderValue) -> Self
	where
		K: IntoHeaderName,
	{
		self.headers.append(name, value);

		self
	}

	/// Sets a header value, replacing existing values for the same name.
	pub fn set_header<K>(mut self, name: K, value: HeaderValue) -> Self
	where
		K: IntoHeaderName,
	{
		self.headers.insert(name, value);

		self
	}

	/// Current HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Current raw URL, before query merging.
	pub fn raw_url(&self) -> &str {
		&self.raw_url
	}

	/// Current headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Registered query sources.
	pub fn queries(&self) -> &[QuerySource] {
		&self.queries
	}

	/// Builds the unsigned request.
	///
	/// The URL's own query is merged with every registered source. Keys come out sorted and a
	/// repeated key keeps all of its values.
	pub fn request(&self) -> Result<HttpRequest> {
		let mut url = Url::parse(&self.raw_url)
			.map_err(|source| RequestError::InvalidUrl { url: self.raw_url.clone(), source })?;
		let mut merged = BTreeMap::<String, Vec<String>>::new();

		for (k, v) in url.query_pairs() {
			merged.entry(k.into_owned()).or_default().push(v.into_owned());
		}
		for (k, v) in self.queries.iter().flat_map(QuerySource::pairs) {
			merged.entry(k.to_owned()).or_default().push(v.to_owned());
		}

		if !merged.is_empty() {
			let mut pairs = url.query_pairs_mut();

			pairs.clear();

			for (k, values) in &merged {
				for v in values {
					pairs.append_pair(k, v);
				}
			}
		}

		let mut request = ::http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.body(self.body.clone().unwrap_or_default())
			.map_err(RequestError::from)?;

		*request.headers_mut() = self.headers.clone();

		Ok(request)
	}

	/// Executes `request` and decodes the response by status.
	///
	/// `204` skips decoding entirely, 2xx decodes into `S`, and every other status decodes
	/// into `F`. The body is always drained by the transport first. Only transport failures
	/// are errors; a body that does not decode comes back as [`Outcome::Malformed`] alongside
	/// the status and headers.
	pub async fn execute<S, F>(&self, request: HttpRequest) -> Result<Exchange<S, F>>
	where
		S: DeserializeOwned,
		F: DeserializeOwned,
	{
		let (parts, body) = self.transport.send(request).await?.into_parts();
		let outcome = if parts.status == StatusCode::NO_CONTENT {
			Outcome::NoContent
		} else if parts.status.is_success() {
			self.decode(parts.status, &body).map_or_else(Outcome::Malformed, Outcome::Success)
		} else {
			self.decode(parts.status, &body).map_or_else(Outcome::Malformed, Outcome::Failure)
		};

		Ok(Exchange { status: parts.status, headers: parts.headers, outcome })
	}

	/// Builds the request from the current state and executes it.
	pub async fn receive<S, F>(&self) -> Result<Exchange<S, F>>
	where
		S: DeserializeOwned,
		F: DeserializeOwned,
	{
		let request = self.request()?;

		self.execute(request).await
	}

	/// Executes `request` without decoding.
	pub async fn execute_raw(&self, request: HttpRequest) -> Result<HttpResponse> {
		Ok(self.transport.send(request).await?)
	}

	fn decode<T>(&self, status: StatusCode, body: &[u8]) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let value = self.decoder.decode(status, body)?;

		serde_path_to_error::deserialize(value)
			.map_err(|source| DecodeError::Shape { status: status.as_u16(), source })
	}
}
impl Debug for HttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpClient")
			.field("method", &self.method)
			.field("raw_url", &self.raw_url)
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.field("queries", &self.queries)
			.field("decoder", &self.decoder)
			.finish()
	}
}

/// Executes `request` and folds the exchange into the `(payload, provider failure)` contract.
///
/// `204` yields `Ok(None)`. Failure bodies that do not match `E::Body` still produce a failure
/// value from the status alone, so a non-2xx response never reads as success.
pub(crate) async fn round_trip<S, E>(client: &HttpClient, request: HttpRequest) -> Result<Option<S>>
where
	S: DeserializeOwned,
	E: ProviderFailure,
{
	let exchange = client.execute::<S, Value>(request).await?;

	match exchange.outcome {
		Outcome::NoContent => Ok(None),
		Outcome::Success(payload) => Ok(Some(payload)),
		Outcome::Malformed(e) => Err(e.into()),
		Outcome::Failure(body) => {
			let body = if body.is_null() { None } else { serde_json::from_value(body).ok() };

			relevant_error(None, E::from_response(exchange.status.as_u16(), body))?;

			Ok(None)
		},
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{error::TransportError, http::TransportFuture};

	#[derive(Debug)]
	struct CannedTransport {
		status: StatusCode,
		body: &'static str,
	}
	impl HttpTransport for CannedTransport {
		fn send(&self, _request: HttpRequest) -> TransportFuture<'_> {
			let status = self.status;
			let body = self.body.as_bytes().to_vec();

			Box::pin(async move {
				let mut response = HttpResponse::new(body);

				*response.status_mut() = status;

				Ok::<_, TransportError>(response)
			})
		}
	}

	#[derive(Debug, Default)]
	struct CountingDecoder(Arc<AtomicUsize>);
	impl ResponseDecoder for CountingDecoder {
		fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Value, DecodeError> {
			self.0.fetch_add(1, Ordering::SeqCst);

			JsonDecoder.decode(status, body)
		}
	}

	fn client(status: StatusCode, body: &'static str) -> HttpClient {
		HttpClient::new(CannedTransport { status, body }).base("https://api.example.com/")
	}

	#[test]
	fn path_uses_reference_resolution() {
		let builder = client(StatusCode::OK, "").path("user/");

		assert_eq!(builder.raw_url(), "https://api.example.com/user/");

		let nested = HttpClient::new(CannedTransport { status: StatusCode::OK, body: "" })
			.base("https://api.example.com/v1/")
			.get("me")
			.path("../v2/me");

		assert_eq!(nested.raw_url(), "https://api.example.com/v2/me");

		let replaced = client(StatusCode::OK, "").path("https://other.example.com/x");

		assert_eq!(replaced.raw_url(), "https://other.example.com/x");
	}

	#[test]
	fn path_keeps_unparsable_base() {
		let transport = || CannedTransport { status: StatusCode::OK, body: "" };
		let kept = HttpClient::new(transport()).base("not a url").path("user");

		assert_eq!(kept.raw_url(), "not a url");

		let bare = HttpClient::new(transport()).path("https://api.example.com/user");

		assert_eq!(bare.raw_url(), "https://api.example.com/user");
	}

	#[test]
	fn branch_never_mutates_parent() {
		let parent = client(StatusCode::OK, "")
			.add_header("x-parent", HeaderValue::from_static("1"))
			.query([("a", "1")]);
		let child = parent
			.branch()
			.add_header("x-child", HeaderValue::from_static("2"))
			.set_header("x-parent", HeaderValue::from_static("overridden"))
			.query([("b", "2")])
			.post("child");

		assert_eq!(parent.headers().len(), 1);
		assert_eq!(parent.headers()["x-parent"], "1");
		assert_eq!(parent.queries().len(), 1);
		assert_eq!(*parent.method(), Method::GET);
		assert_eq!(parent.raw_url(), "https://api.example.com/");
		assert_eq!(child.headers()["x-parent"], "overridden");
		assert_eq!(child.queries().len(), 2);
	}

	#[test]
	fn request_merges_and_sorts_queries() {
		#[derive(Serialize)]
		struct Paging {
			limit: u32,
			after: Option<String>,
		}

		let request = client(StatusCode::OK, "")
			.get("items?z=last&tag=a")
			.query(QuerySource::serialize(&Paging { limit: 10, after: None }).expect("Paging should encode."))
			.query([("tag", "b c")])
			.request()
			.expect("Request should build.");

		assert_eq!(
			request.uri().to_string(),
			"https://api.example.com/items?limit=10&tag=a&tag=b+c&z=last"
		);
	}

	#[test]
	fn request_without_queries_has_no_query_string() {
		let request =
			client(StatusCode::OK, "").get("items").request().expect("Request should build.");

		assert_eq!(request.uri().to_string(), "https://api.example.com/items");
		assert!(request.body().is_empty());
	}

	#[test]
	fn request_rejects_relative_urls() {
		let err = HttpClient::new(CannedTransport { status: StatusCode::OK, body: "" })
			.get("relative/path")
			.request()
			.expect_err("Relative URLs cannot be requested.");

		assert!(matches!(err, Error::Request(RequestError::InvalidUrl { .. })));
	}

	#[test]
	fn form_sets_body_and_content_type() {
		let request = client(StatusCode::OK, "")
			.post("token")
			.form(&[("grant_type", "refresh_token"), ("refresh_token", "a b")])
			.expect("Form should encode.")
			.request()
			.expect("Request should build.");

		assert_eq!(request.headers()[CONTENT_TYPE], "application/x-www-form-urlencoded");
		assert_eq!(request.body().as_slice(), b"grant_type=refresh_token&refresh_token=a+b");
	}

	#[tokio::test]
	async fn no_content_skips_decoder() {
		let calls = Arc::new(AtomicUsize::new(0));
		let builder = client(StatusCode::NO_CONTENT, "not json at all")
			.decoder(CountingDecoder(calls.clone()));
		let request = builder.request().expect("Request should build.");
		let exchange = builder
			.execute::<Value, Value>(request)
			.await
			.expect("204 should not fail to decode.");

		assert!(exchange.outcome.is_no_content());
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn failure_status_decodes_into_failure_type() {
		let builder = client(StatusCode::UNAUTHORIZED, r#"{"message":"bad token"}"#);
		let exchange = builder
			.receive::<Value, Value>()
			.await
			.expect("Failure bodies should decode.");

		assert_eq!(exchange.status, StatusCode::UNAUTHORIZED);
		assert!(matches!(exchange.outcome, Outcome::Failure(ref body) if body["message"] == "bad token"));
	}

	#[tokio::test]
	async fn shape_mismatch_reports_path() {
		#[derive(Debug, Deserialize)]
		struct User {
			#[allow(dead_code)]
			id: u64,
		}

		let exchange = client(StatusCode::OK, r#"{"id":"nope"}"#)
			.receive::<User, Value>()
			.await
			.expect("Undecodable bodies should still yield the exchange.");

		match exchange.outcome {
			Outcome::Malformed(DecodeError::Shape { status, source }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "id");
			},
			other => panic!("Unexpected outcome: {other:?}."),
		}
	}

	#[tokio::test]
	async fn round_trip_surfaces_malformed_bodies_as_decode_errors() {
		let builder = client(StatusCode::BAD_GATEWAY, "<html>oops</html>");
		let request = builder.request().expect("Request should build.");
		let err = round_trip::<Value, crate::classify::JsonApiError>(&builder, request)
			.await
			.expect_err("HTML failures should not decode strictly.");

		assert!(matches!(err, Error::Decode(DecodeError::Json { status: 502, .. })));
	}
}
