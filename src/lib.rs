//! Signing and HTTP substrate shared by social API bindings.
//!
//! The crate signs requests with RFC 5849 OAuth 1.0a signatures, attaches OAuth 2.0 tokens and
//! refreshes them, builds requests through a fluent client with status-aware decoding, and
//! classifies provider failures into one domain error set.

#![deny(clippy::all)]
#![warn(missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod classify;
pub mod error;
pub mod http;
pub mod oauth1;
pub mod oauth2;
pub mod obs;
pub mod profile;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::{HttpClient, ReqwestHttpClient},
		oauth2::TokenScheme,
		profile::{ProfileQuirks, ProviderProfile},
	};

	/// Builds an [`HttpClient`] backed by a fresh reqwest transport.
	pub fn test_http_client() -> HttpClient {
		HttpClient::new(ReqwestHttpClient::default())
	}

	/// Builds a profile whose API and token bases both point at a local mock server.
	pub fn mock_profile(name: &str, base: &str, scheme: TokenScheme) -> ProviderProfile {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		ProviderProfile::builder(name)
			.api_base(base.clone())
			.token_base(base)
			.scheme(scheme)
			.quirks(ProfileQuirks::default())
			.build()
			.expect("Mock provider profile should build.")
	}
}

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
