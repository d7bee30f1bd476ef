//! Header schemes for OAuth 2.0 API calls and token endpoint calls.

// crates.io
use ::http::{
	HeaderValue,
	header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	error::RequestError,
	http::HttpRequest,
};

/// `Authorization` scheme attached to API calls.
///
/// Providers disagree on the prefix: most expect `Bearer `, GitHub historically accepted
/// `token `, and some expect the lower-case `bearer `.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScheme {
	/// `Bearer <token>`.
	#[default]
	Bearer,
	/// `Basic <token>`.
	Basic,
	/// Verbatim prefix, trailing space included.
	Custom(String),
}
impl TokenScheme {
	/// Header prefix including the trailing space.
	pub fn prefix(&self) -> &str {
		match self {
			Self::Bearer => "Bearer ",
			Self::Basic => "Basic ",
			Self::Custom(prefix) => prefix,
		}
	}

	/// `Authorization` value for `token`.
	pub fn authorization_value(&self, token: &TokenSecret) -> String {
		format!("{}{}", self.prefix(), token.expose())
	}
}

/// Attaches `Authorization: <prefix><token>` and `Content-Type: application/json`.
pub fn sign_api_request(
	mut request: HttpRequest,
	scheme: &TokenScheme,
	token: &TokenSecret,
) -> Result<HttpRequest> {
	if token.is_empty() {
		return Err(Error::TokenInvalid);
	}

	let value = sensitive(header_value("authorization", &scheme.authorization_value(token))?);
	let headers = request.headers_mut();

	headers.insert(AUTHORIZATION, value);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	Ok(request)
}

/// Attaches HTTP Basic consumer credentials, the form content type, and the body length.
pub fn sign_token_request(
	mut request: HttpRequest,
	credentials: &Credentials,
) -> Result<HttpRequest> {
	credentials.require_key()?;

	let value = sensitive(header_value("authorization", &credentials.basic_authorization())?);
	let length = HeaderValue::from(request.body().len());
	let headers = request.headers_mut();

	headers.insert(AUTHORIZATION, value);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
	headers.insert(CONTENT_LENGTH, length);

	Ok(request)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(value)
		.map_err(|source| RequestError::InvalidHeader { name, source }.into())
}

fn sensitive(mut value: HeaderValue) -> HeaderValue {
	value.set_sensitive(true);

	value
}
