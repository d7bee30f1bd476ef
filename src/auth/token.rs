//! Already-issued token material for OAuth 1.0a and OAuth 2.0 sessions.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 1.0a access token, immutable for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Token {
	/// Access token identifier sent as `oauth_token`.
	pub token: String,
	/// Token secret mixed into the signing key.
	pub token_secret: TokenSecret,
}
impl OAuth1Token {
	/// Creates a token from its identifier and secret.
	pub fn new(token: impl Into<String>, token_secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), token_secret: token_secret.into() }
	}

	/// Fails with [`Error::TokenInvalid`] when either half is empty.
	pub fn require_complete(&self) -> Result<()> {
		if self.token.is_empty() || self.token_secret.is_empty() {
			Err(Error::TokenInvalid)
		} else {
			Ok(())
		}
	}
}

/// OAuth 2.0 token pair.
///
/// The value is only ever replaced wholesale, either through a successful refresh or an
/// explicit [`update_token`](crate::oauth2::OAuth2::update_token).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
	/// Access token attached to API calls.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant derived from the last `expires_in`, when known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<OffsetDateTime>,
}
impl OAuth2Token {
	/// Creates a token pair without expiry information.
	pub fn new(access_token: impl Into<TokenSecret>, refresh_token: Option<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), refresh_token, expires_at: None }
	}

	/// Sets the expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Builds the successor token after a refresh.
	///
	/// Providers disagree on whether a refresh returns a new refresh token, so an absent one
	/// keeps the current value.
	pub fn rotated(&self, access_token: TokenSecret, refresh_token: Option<TokenSecret>) -> Self {
		Self {
			access_token,
			refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
			expires_at: None,
		}
	}

	/// Returns `true` once the expiry instant has been reached. Tokens without expiry never
	/// expire locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for OAuth2Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn oauth1_token_requires_both_halves() {
		assert!(OAuth1Token::new("token", "secret").require_complete().is_ok());
		assert!(matches!(
			OAuth1Token::new("token", "").require_complete(),
			Err(Error::TokenInvalid)
		));
		assert!(matches!(OAuth1Token::new("", "secret").require_complete(), Err(Error::TokenInvalid)));
	}

	#[test]
	fn rotation_keeps_previous_refresh_token_when_absent() {
		let current = OAuth2Token::new("old-access", Some(TokenSecret::new("old-refresh")));
		let rotated = current.rotated(TokenSecret::new("new-access"), None);

		assert_eq!(rotated.access_token.expose(), "new-access");
		assert_eq!(rotated.refresh_token.as_ref().map(TokenSecret::expose), Some("old-refresh"));

		let replaced =
			current.rotated(TokenSecret::new("new-access"), Some(TokenSecret::new("new-refresh")));

		assert_eq!(replaced.refresh_token.as_ref().map(TokenSecret::expose), Some("new-refresh"));
	}

	#[test]
	fn expiry_is_inclusive() {
		let expires_at = datetime!(2025-01-01 00:00 UTC);
		let token = OAuth2Token::new("access", None).with_expires_at(expires_at);

		assert!(!token.is_expired_at(expires_at - Duration::seconds(1)));
		assert!(token.is_expired_at(expires_at));
		assert!(!OAuth2Token::new("access", None).is_expired_at(expires_at));
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let token = OAuth2Token::new("access-secret", Some(TokenSecret::new("refresh-secret")));
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
	}
}
