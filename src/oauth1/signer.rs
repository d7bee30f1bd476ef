//! OAuth 1.0a signature methods.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rsa::{
	RsaPrivateKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15::SigningKey,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer as _},
};
use sha1::Sha1;
// self
use crate::{_prelude::*, auth::TokenSecret, error::SigningError, oauth1::percent_encode};

type HmacSha1 = Hmac<Sha1>;

/// `oauth_signature_method` value of [`HmacSha1Signer`].
pub const HMAC_SHA1: &str = "HMAC-SHA1";
/// `oauth_signature_method` value of [`RsaSha1Signer`].
pub const RSA_SHA1: &str = "RSA-SHA1";
/// `oauth_signature_method` value of [`PlaintextSigner`].
pub const PLAINTEXT: &str = "PLAINTEXT";

/// Signature method producing `oauth_signature` from the signature base string.
pub trait Signer
where
	Self: 'static + Send + Sync + Debug,
{
	/// Value sent as `oauth_signature_method`.
	fn name(&self) -> &'static str;

	/// Signs `message`. `token_secret` is empty for requests without a token.
	fn sign(&self, token_secret: &str, message: &str) -> Result<String, SigningError>;
}

/// `HMAC-SHA1` keyed with `enc(consumer_secret)&enc(token_secret)`.
#[derive(Clone, Debug)]
pub struct HmacSha1Signer {
	consumer_secret: TokenSecret,
}
impl HmacSha1Signer {
	/// Creates a signer for the given consumer secret.
	pub fn new(consumer_secret: impl Into<TokenSecret>) -> Self {
		Self { consumer_secret: consumer_secret.into() }
	}
}
impl Signer for HmacSha1Signer {
	fn name(&self) -> &'static str {
		HMAC_SHA1
	}

	fn sign(&self, token_secret: &str, message: &str) -> Result<String, SigningError> {
		let key = signing_key(&self.consumer_secret, token_secret);
		let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| SigningError::MacKey)?;

		mac.update(message.as_bytes());

		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}
}

/// `RSA-SHA1` (RSASSA-PKCS1-v1_5 over SHA-1). The token secret is not used.
#[derive(Clone)]
pub struct RsaSha1Signer {
	key: SigningKey<Sha1>,
}
impl RsaSha1Signer {
	/// Wraps a parsed private key.
	pub fn new(key: RsaPrivateKey) -> Self {
		Self { key: SigningKey::<Sha1>::new(key) }
	}

	/// Loads a PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM document.
	pub fn from_pkcs1_pem(pem: &str) -> Result<Self, SigningError> {
		let key = RsaPrivateKey::from_pkcs1_pem(pem).map_err(SigningError::invalid_private_key)?;

		Ok(Self::new(key))
	}

	/// Loads a PKCS#8 (`BEGIN PRIVATE KEY`) PEM document.
	pub fn from_pkcs8_pem(pem: &str) -> Result<Self, SigningError> {
		let key = RsaPrivateKey::from_pkcs8_pem(pem).map_err(SigningError::invalid_private_key)?;

		Ok(Self::new(key))
	}
}
impl Debug for RsaSha1Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RsaSha1Signer").field("key", &"<redacted>").finish()
	}
}
impl Signer for RsaSha1Signer {
	fn name(&self) -> &'static str {
		RSA_SHA1
	}

	fn sign(&self, _token_secret: &str, message: &str) -> Result<String, SigningError> {
		let signature =
			self.key.try_sign(message.as_bytes()).map_err(|source| SigningError::Rsa { source })?;

		Ok(STANDARD.encode(signature.to_bytes()))
	}
}

/// `PLAINTEXT`: the signature is the signing key itself. Only safe over TLS.
#[derive(Clone, Debug)]
pub struct PlaintextSigner {
	consumer_secret: TokenSecret,
}
impl PlaintextSigner {
	/// Creates a signer for the given consumer secret.
	pub fn new(consumer_secret: impl Into<TokenSecret>) -> Self {
		Self { consumer_secret: consumer_secret.into() }
	}
}
impl Signer for PlaintextSigner {
	fn name(&self) -> &'static str {
		PLAINTEXT
	}

	fn sign(&self, token_secret: &str, _message: &str) -> Result<String, SigningError> {
		Ok(signing_key(&self.consumer_secret, token_secret))
	}
}

fn signing_key(consumer_secret: &TokenSecret, token_secret: &str) -> String {
	format!("{}&{}", percent_encode(consumer_secret.expose()), percent_encode(token_secret))
}
