//! HTTP substrate shared by both authenticators.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. [`HttpClient`] builds
//! requests on top of it and decodes responses through a pluggable [`ResponseDecoder`], so
//! provider bindings never touch a concrete client. Every call performs exactly one round trip:
//! no retries, no background tasks. Dropping the returned future cancels the in-flight request.

pub mod builder;
pub mod decode;

pub use builder::*;
pub use decode::*;

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration as StdDuration};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, error::TransportError};

/// Outgoing request with a fully buffered body.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Incoming response with a fully drained body.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one request.
///
/// Implementations must read the whole response body before resolving so the underlying
/// connection can be reused, even when the caller later skips decoding. They must be
/// `Send + Sync + 'static` so a single transport can back many cloned builders.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and resolves once the response body has been drained.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// [`HttpTransport`] backed by a reqwest [`ReqwestClient`].
///
/// Deadlines are a transport concern: configure them with [`with_timeout`](Self::with_timeout)
/// or through a custom [`ReqwestClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail once `timeout` elapses.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
