// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	oauth2::TokenScheme,
	profile::{ProfileQuirks, ProviderProfile},
};

/// Errors raised while constructing or validating profiles.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProfileError {
	/// Profiles need a name for diagnostics.
	#[error("Profile name must not be empty.")]
	MissingName,
	/// API base URL is mandatory.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoints must be usable as a base for reference resolution.
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	NotABase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderProfile`] values.
#[derive(Debug)]
pub struct ProviderProfileBuilder {
	/// Provider name.
	pub name: String,
	/// API base URL.
	pub api_base: Option<Url>,
	/// Optional token endpoint base URL.
	pub token_base: Option<Url>,
	/// API `Authorization` scheme.
	pub scheme: TokenScheme,
	/// Provider-specific quirks.
	pub quirks: ProfileQuirks,
}
impl ProviderProfileBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			api_base: None,
			token_base: None,
			scheme: TokenScheme::default(),
			quirks: ProfileQuirks::default(),
		}
	}

	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the token endpoint base URL.
	pub fn token_base(mut self, url: Url) -> Self {
		self.token_base = Some(url);

		self
	}

	/// Overrides the API `Authorization` scheme.
	pub fn scheme(mut self, scheme: TokenScheme) -> Self {
		self.scheme = scheme;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProfileQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting profile.
	pub fn build(self) -> Result<ProviderProfile, ProfileError> {
		let api_base = self.api_base.ok_or(ProfileError::MissingApiBase)?;
		let profile = ProviderProfile {
			name: self.name,
			api_base,
			token_base: self.token_base,
			scheme: self.scheme,
			quirks: self.quirks,
		};

		profile.validate()?;

		Ok(profile)
	}
}

impl ProviderProfile {
	/// Checks the invariants [`ProviderProfileBuilder::build`] enforces. Useful for profiles
	/// deserialized straight from configuration.
	pub fn validate(&self) -> Result<(), ProfileError> {
		if self.name.trim().is_empty() {
			return Err(ProfileError::MissingName);
		}

		validate_endpoint("api", &self.api_base)?;

		if let Some(token_base) = self.token_base.as_ref() {
			validate_endpoint("token", token_base)?;
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProfileError> {
	if url.cannot_be_a_base() {
		return Err(ProfileError::NotABase { endpoint: name, url: url.to_string() });
	}
	if url.scheme() != "https" && !is_loopback(url) {
		return Err(ProfileError::InsecureEndpoint { endpoint: name, url: url.to_string() });
	}

	Ok(())
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
