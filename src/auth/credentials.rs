//! Consumer credentials issued to an application by a provider.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Consumer key and secret owned by one authenticator.
///
/// The value is read-only after construction and cheap to clone, so concurrent calls share it
/// by value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Public consumer (client) key.
	pub consumer_key: String,
	/// Consumer (client) secret.
	pub consumer_secret: TokenSecret,
}
impl Credentials {
	/// Creates credentials from a key/secret pair.
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<TokenSecret>) -> Self {
		Self { consumer_key: consumer_key.into(), consumer_secret: consumer_secret.into() }
	}

	/// Returns `true` when both the key and the secret are present.
	pub fn is_complete(&self) -> bool {
		!self.consumer_key.is_empty() && !self.consumer_secret.is_empty()
	}

	/// Fails with [`Error::CredentialsInvalid`] unless both halves are present.
	pub fn require_key_and_secret(&self) -> Result<()> {
		if self.is_complete() { Ok(()) } else { Err(Error::CredentialsInvalid) }
	}

	/// Fails with [`Error::CredentialsInvalid`] when the consumer key is empty.
	pub fn require_key(&self) -> Result<()> {
		if self.consumer_key.is_empty() { Err(Error::CredentialsInvalid) } else { Ok(()) }
	}

	/// HTTP Basic authorization value built from `key:secret`.
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.consumer_key, self.consumer_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}
