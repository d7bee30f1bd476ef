#![cfg(all(feature = "test", feature = "reqwest"))]

// std
use std::{
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration as StdDuration,
};
// crates.io
use httpmock::prelude::*;
use serde_json::Value;
// self
use social_oauth::{
	_preludet::*,
	classify::{DomainErrorKind, JsonApiError, check_error},
	error::{DecodeError, TransportError},
	http::{HttpClient, JsonDecoder, Outcome, QuerySource, ReqwestHttpClient, ResponseDecoder},
	oauth2::TokenScheme,
	profile::{ProfileQuirks, ProviderProfile},
	reqwest::StatusCode,
};

#[derive(Debug)]
struct CountingDecoder(&'static AtomicUsize);
impl ResponseDecoder for CountingDecoder {
	fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Value, DecodeError> {
		self.0.fetch_add(1, Ordering::SeqCst);

		JsonDecoder.decode(status, body)
	}
}

#[derive(Serialize)]
struct SearchQuery<'a> {
	q: &'a str,
	limit: u8,
	cursor: Option<&'a str>,
}

#[tokio::test]
async fn no_content_never_reaches_decoder() {
	static CALLS: AtomicUsize = AtomicUsize::new(0);

	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/items/1");
			then.status(204).body("ignored trailing bytes");
		})
		.await;
	let client = test_http_client().base(server.url("/")).decoder(CountingDecoder(&CALLS));
	let exchange = client
		.branch()
		.delete("items/1")
		.receive::<Value, Value>()
		.await
		.expect("204 should be handled without decoding.");

	mock.assert_async().await;

	assert_eq!(exchange.status, StatusCode::NO_CONTENT);
	assert!(matches!(exchange.outcome, Outcome::NoContent));
	assert_eq!(CALLS.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn struct_and_pair_queries_merge_on_the_wire() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/search")
				.query_param("q", "rust lang")
				.query_param("limit", "20")
				.query_param("page", "2")
				.query_param("type", "track");
			then.status(200).header("content-type", "application/json").body("{\"total\":2}");
		})
		.await;
	let base = test_http_client().base(server.url("/"));
	let exchange = base
		.branch()
		.get("search?page=2")
		.query(
			QuerySource::serialize(&SearchQuery { q: "rust lang", limit: 20, cursor: None })
				.expect("Search query should encode."),
		)
		.query([("type", "track")])
		.receive::<Value, Value>()
		.await
		.expect("Search should succeed.");

	mock.assert_async().await;

	assert!(matches!(exchange.outcome, Outcome::Success(ref body) if body["total"] == 2));
	assert!(base.queries().is_empty());
	assert_eq!(base.raw_url(), server.url("/"));
}

#[tokio::test]
async fn lenient_profile_turns_html_failures_into_classifiable_errors() {
	let server = MockServer::start_async().await;
	let base = Url::parse(&server.url("/")).expect("Mock server base URL should parse.");
	let profile = ProviderProfile::builder("html-errors")
		.api_base(base)
		.scheme(TokenScheme::Custom("bearer ".into()))
		.quirks(ProfileQuirks { lenient_error_bodies: true })
		.build()
		.expect("Lenient profile should build.");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me");
			then.status(502).header("content-type", "text/html").body("<html>Bad Gateway</html>");
		})
		.await;
	let client = profile.http_client(ReqwestHttpClient::default()).get("api/v1/me");
	let exchange = client
		.receive::<Value, Value>()
		.await
		.expect("Lenient decoder should never fail on HTML.");

	mock.assert_async().await;

	let Outcome::Failure(body) = exchange.outcome else {
		panic!("502 should decode into the failure branch.");
	};

	assert_eq!(body["message"], "Failed request");
	assert_eq!(body["error"], 502);

	let failure = JsonApiError { status: exchange.status.as_u16(), body };

	match check_error(Error::Provider(Box::new(failure))) {
		Error::Domain(domain) => {
			assert_eq!(domain.kind, DomainErrorKind::InternalApiError);
			assert_eq!(domain.message.as_deref(), Some("Failed request"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn strict_decoder_keeps_exchange_for_html_failures() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/broken");
			then.status(500).header("retry-after", "30").body("<html>oops</html>");
		})
		.await;
	let exchange = test_http_client()
		.base(server.url("/"))
		.get("broken")
		.receive::<Value, Value>()
		.await
		.expect("A completed round trip should yield the exchange.");

	mock.assert_async().await;

	assert_eq!(exchange.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(exchange.headers["retry-after"], "30");

	let Outcome::Malformed(source) = exchange.outcome else {
		panic!("HTML should not decode strictly.");
	};

	assert!(matches!(source, DecodeError::Json { status: 500, .. }));

	let err = Error::from(source);

	assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn execute_raw_returns_status_headers_and_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/upload").body("payload");
			then.status(201).header("x-request-id", "abc").body("created");
		})
		.await;
	let client = test_http_client().base(server.url("/")).post("upload").body("payload");
	let request = client.request().expect("Upload request should build.");
	let response = client.execute_raw(request).await.expect("Upload should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::CREATED);
	assert_eq!(response.headers()["x-request-id"], "abc");
	assert_eq!(response.body().as_slice(), b"created");
}

#[tokio::test]
async fn transport_timeout_surfaces_unchanged() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/slow");
			then.status(200).delay(StdDuration::from_millis(500)).body("{}");
		})
		.await;
	let transport = ReqwestHttpClient::with_timeout(StdDuration::from_millis(50))
		.expect("Timeout-bound client should build.");
	let err = HttpClient::new(transport)
		.base(server.url("/"))
		.get("slow")
		.receive::<Value, Value>()
		.await
		.expect_err("Slow responses should time out.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(err.status(), None);
}
