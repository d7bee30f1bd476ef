//! OAuth 2.0 authenticator for already-issued tokens.
//!
//! API calls carry `Authorization: <prefix><access token>`. Refresh and revocation calls go to
//! a token endpoint that may live on a different base URL, and refresh calls authenticate with
//! HTTP Basic consumer credentials instead of the access token.
//!
//! [`OAuth2::refresh_token`] and [`OAuth2::update_token`] take `&mut self`: the token is
//! swapped without internal locking, so concurrent refreshes against one authenticator must be
//! serialized by the caller.

pub mod signer;

pub use signer::*;

// std
use std::mem;
// crates.io
use serde::Deserializer;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{Credentials, OAuth2Token, TokenSecret},
	classify::ProviderFailure,
	error::ConfigError,
	http::{HttpClient, HttpRequest, HttpTransport, QuerySource, round_trip},
	obs::{self, CallKind},
	profile::ProviderProfile,
};

/// Successful refresh-token response (RFC 6749 section 5.1).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// New refresh token. Absent (or empty) when the provider keeps the old one valid.
	#[serde(default, deserialize_with = "empty_secret_as_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Access token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Granted scope string.
	#[serde(default)]
	pub scope: Option<String>,
}
impl Debug for RefreshResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshResponse")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("scope", &self.scope)
			.finish()
	}
}

/// Credentials, token, header scheme, and transport for one OAuth 2.0 provider session.
#[derive(Clone, Debug)]
pub struct OAuth2 {
	credentials: Credentials,
	token: OAuth2Token,
	client: HttpClient,
	scheme: TokenScheme,
}
impl OAuth2 {
	/// Creates an authenticator backed by a default reqwest transport and the `Bearer` scheme.
	#[cfg(feature = "reqwest")]
	pub fn new(credentials: Credentials, token: OAuth2Token) -> Self {
		Self::with_http_client(credentials, token, HttpClient::new(ReqwestHttpClient::default()))
	}

	/// Creates an authenticator on top of a preconfigured builder.
	pub fn with_http_client(credentials: Credentials, token: OAuth2Token, client: HttpClient) -> Self {
		Self { credentials, token, client, scheme: TokenScheme::default() }
	}

	/// Creates an authenticator whose builder and scheme come from `profile`.
	pub fn from_profile(
		profile: &ProviderProfile,
		transport: impl HttpTransport,
		credentials: Credentials,
		token: OAuth2Token,
	) -> Self {
		Self::with_http_client(credentials, token, profile.http_client(transport))
			.with_scheme(profile.scheme.clone())
	}

	/// Overrides the API `Authorization` scheme.
	pub fn with_scheme(mut self, scheme: TokenScheme) -> Self {
		self.scheme = scheme;

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

	/// Current token pair.
	pub fn token(&self) -> &OAuth2Token {
		&self.token
	}

	/// API `Authorization` scheme.
	pub fn scheme(&self) -> &TokenScheme {
		&self.scheme
	}

	/// Replaces the token wholesale and returns the previous one.
	pub fn update_token(&mut self, token: OAuth2Token) -> OAuth2Token {
		mem::replace(&mut self.token, token)
	}

	/// Attaches the API `Authorization` and `Content-Type` headers to `request`.
	pub fn sign_request(&self, request: HttpRequest) -> Result<HttpRequest> {
		sign_api_request(request, &self.scheme, &self.token.access_token)
	}

	/// Authorized `GET` of `path` with `query` merged into the URL.
	///
	/// Returns `Ok(None)` for `204 No Content` and `Ok(Some(_))` for other 2xx responses. Any
	/// other status yields [`Error::Provider`] built from `E`.
	pub async fn get<S, E>(&self, path: &str, query: impl Into<QuerySource>) -> Result<Option<S>>
	where
		S: DeserializeOwned,
		E: ProviderFailure,
	{
		let client = self.client.branch().get(path).query(query);

		obs::observe(CallKind::Get, "oauth2.get", async move {
			let request = self.sign_request(client.request()?)?;

			round_trip::<S, E>(&client, request).await
		})
		.await
	}

	/// Exchanges the held refresh token at `base` + `path`.
	///
	/// The request is a form `POST` of `grant_type=refresh_token&refresh_token=<current>`
	/// authenticated with HTTP Basic consumer credentials. On success the held token is swapped
	/// for the rotated one; a response without a refresh token keeps the previous refresh token.
	pub async fn refresh_token<E>(
		&mut self,
		base: &str,
		path: &str,
	) -> Result<Option<RefreshResponse>>
	where
		E: ProviderFailure,
	{
		self.credentials.require_key()?;

		let refresh_token = self
			.token
			.refresh_token
			.as_ref()
			.filter(|token| !token.is_empty())
			.ok_or(Error::TokenInvalid)?;
		let client = self
			.client
			.branch()
			.base(base)
			.post(path)
			.form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token.expose())])?;
		let credentials = &self.credentials;
		let response = obs::observe(CallKind::Refresh, "oauth2.refresh_token", async move {
			let request = sign_token_request(client.request()?, credentials)?;

			round_trip::<RefreshResponse, E>(&client, request).await
		})
		.await?;

		if let Some(refreshed) = &response {
			let mut token =
				self.token.rotated(refreshed.access_token.clone(), refreshed.refresh_token.clone());

			if let Some(expires_in) = refreshed.expires_in {
				token = token.with_expires_at(expiry_after(OffsetDateTime::now_utc(), expires_in)?);
			}

			self.token = token;
		}

		Ok(response)
	}

	/// Revokes a token at `base` + `path`.
	///
	/// The request is a `POST` carrying the provider-specific `query` (client id, token, ...).
	/// Nothing is signed.
	pub async fn revoke_token<S, E>(
		&self,
		base: &str,
		path: &str,
		query: impl Into<QuerySource>,
	) -> Result<Option<S>>
	where
		S: DeserializeOwned,
		E: ProviderFailure,
	{
		let client = self.client.branch().base(base).post(path).query(query);

		obs::observe(CallKind::Revoke, "oauth2.revoke_token", async move {
			let request = client.request()?;

			round_trip::<S, E>(&client, request).await
		})
		.await
	}
}

fn expiry_after(now: OffsetDateTime, expires_in: i64) -> Result<OffsetDateTime, ConfigError> {
	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn);
	}

	now.checked_add(Duration::seconds(expires_in)).ok_or(ConfigError::ExpiresInOutOfRange)
}

fn empty_secret_as_none<'de, D>(deserializer: D) -> Result<Option<TokenSecret>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<TokenSecret>::deserialize(deserializer)?;

	Ok(value.filter(|secret| !secret.is_empty()))
}
