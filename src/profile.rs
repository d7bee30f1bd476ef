//! Provider profiles: the configuration value an authenticator is built from.
//!
//! Callers deserialize or build a [`ProviderProfile`] from their own configuration layer; the
//! crate never reads files or environment variables.

pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	http::{HttpClient, HttpTransport, LenientJsonDecoder},
	oauth2::TokenScheme,
};

/// Provider-specific behavior toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileQuirks {
	/// Provider answers failures with HTML pages; decode them with [`LenientJsonDecoder`].
	pub lenient_error_bodies: bool,
}

/// Validated provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Human-readable provider name.
	pub name: String,
	/// Base URL API paths resolve against.
	pub api_base: Url,
	/// Base URL of the token endpoint, when it differs from the API base.
	#[serde(default)]
	pub token_base: Option<Url>,
	/// API `Authorization` scheme for OAuth 2.0 providers.
	#[serde(default)]
	pub scheme: TokenScheme,
	/// Provider-specific quirks.
	#[serde(default)]
	pub quirks: ProfileQuirks,
}
impl ProviderProfile {
	/// Creates a new builder for the provided name.
	pub fn builder(name: impl Into<String>) -> ProviderProfileBuilder {
		ProviderProfileBuilder::new(name)
	}

	/// Base URL for refresh and revocation calls.
	pub fn token_base(&self) -> &Url {
		self.token_base.as_ref().unwrap_or(&self.api_base)
	}

	/// Builds the base [`HttpClient`] for this provider on top of `transport`.
	pub fn http_client(&self, transport: impl HttpTransport) -> HttpClient {
		let client = HttpClient::new(transport).base(self.api_base.as_str());

		if self.quirks.lenient_error_bodies { client.decoder(LenientJsonDecoder) } else { client }
	}
}
