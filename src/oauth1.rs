//! OAuth 1.0a authenticator (RFC 5849).
//!
//! [`OAuth1`] signs every request with the protocol parameters, a fresh nonce, and the current
//! timestamp, then places the signature in the `Authorization` header. The held token never
//! changes during a session.

pub mod canonical;
pub mod encode;
pub mod signer;

pub use canonical::*;
pub use encode::*;
pub use signer::*;

// crates.io
use ::http::{HeaderValue, Method, header::AUTHORIZATION};
use rand::{Rng, distr::Alphanumeric};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{Credentials, OAuth1Token},
	classify::ProviderFailure,
	error::RequestError,
	http::{HttpClient, HttpRequest, HttpTransport, QuerySource, round_trip},
	obs::{self, CallKind},
	profile::ProviderProfile,
};

const NONCE_LEN: usize = 16;

/// Signer, credentials, token, and transport for one OAuth 1.0a provider session.
#[derive(Clone, Debug)]
pub struct OAuth1 {
	credentials: Credentials,
	token: OAuth1Token,
	client: HttpClient,
	signer: Arc<dyn Signer>,
}
impl OAuth1 {
	/// Creates an authenticator backed by a default reqwest transport and `HMAC-SHA1`.
	#[cfg(feature = "reqwest")]
	pub fn new(credentials: Credentials, token: OAuth1Token) -> Self {
		Self::with_http_client(credentials, token, HttpClient::new(ReqwestHttpClient::default()))
	}

	/// Creates an authenticator on top of a preconfigured builder, signing with `HMAC-SHA1`.
	pub fn with_http_client(credentials: Credentials, token: OAuth1Token, client: HttpClient) -> Self {
		let signer = Arc::new(HmacSha1Signer::new(credentials.consumer_secret.clone()));

		Self { credentials, token, client, signer }
	}

	/// Creates an authenticator whose builder is derived from `profile`.
	pub fn from_profile(
		profile: &ProviderProfile,
		transport: impl HttpTransport,
		credentials: Credentials,
		token: OAuth1Token,
	) -> Self {
		Self::with_http_client(credentials, token, profile.http_client(transport))
	}

	/// Replaces the signature method.
	pub fn with_signer(mut self, signer: impl Signer) -> Self {
		self.signer = Arc::new(signer);

		self
	}

	/// Returns a copy of this authenticator that sends through `client`.
	pub fn with_client(&self, client: HttpClient) -> Self {
		Self { client, ..self.clone() }
	}

	/// Base builder requests are derived from.
	pub fn client(&self) -> &HttpClient {
		&self.client
	}

	/// Consumer credentials.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Access token.
	pub fn token(&self) -> &OAuth1Token {
		&self.token
	}

	/// Active signature method.
	pub fn signer(&self) -> &dyn Signer {
		self.signer.as_ref()
	}

	/// Signed `GET` of `path` with `query` merged into the URL.
	///
	/// Returns `Ok(None)` for `204 No Content` and `Ok(Some(_))` for other 2xx responses. Any
	/// other status yields [`Error::Provider`] built from `E`.
	pub async fn get<S, E>(&self, path: &str, query: impl Into<QuerySource>) -> Result<Option<S>>
	where
		S: DeserializeOwned,
		E: ProviderFailure,
	{
		let client = self.client.branch().get(path).query(query);

		obs::observe(CallKind::Get, "oauth1.get", async move {
			let request = self.sign_request(client.request()?)?;

			round_trip::<S, E>(&client, request).await
		})
		.await
	}

	/// Signs `request` with a fresh nonce and the current timestamp.
	pub fn sign_request(&self, request: HttpRequest) -> Result<HttpRequest> {
		self.sign_request_with(request, &nonce(), OffsetDateTime::now_utc().unix_timestamp())
	}

	/// Signs `request` with a caller-supplied nonce and timestamp.
	pub fn sign_request_with(
		&self,
		mut request: HttpRequest,
		nonce: &str,
		timestamp: i64,
	) -> Result<HttpRequest> {
		let url = Url::parse(&request.uri().to_string()).map_err(|source| {
			RequestError::InvalidUrl { url: request.uri().to_string(), source }
		})?;
		let header = self.authorization_header(request.method(), &url, nonce, timestamp)?;
		let value = HeaderValue::from_str(&header)
			.map_err(|source| RequestError::InvalidHeader { name: "authorization", source })?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(request)
	}

	/// Computes the `Authorization` header value for `method` + `url`.
	pub fn authorization_header(
		&self,
		method: &Method,
		url: &Url,
		nonce: &str,
		timestamp: i64,
	) -> Result<String> {
		self.credentials.require_key_and_secret()?;
		self.token.require_complete()?;

		let protocol = ProtocolParams {
			consumer_key: self.credentials.consumer_key.clone(),
			token: self.token.token.clone(),
			nonce: nonce.to_owned(),
			signature_method: self.signer.name(),
			timestamp,
		};
		let base_string = signature_base_string(method, url, &protocol);
		let signature = self.signer.sign(self.token.token_secret.expose(), &base_string)?;

		Ok(canonical::authorization_header(&protocol, &signature))
	}
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
