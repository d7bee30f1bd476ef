//! Signature base string and `Authorization` header construction (RFC 5849 section 3.4.1).

// crates.io
use ::http::Method;
// self
use crate::{_prelude::*, oauth1::percent_encode};

/// Protocol version sent as `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";
/// Scheme prefix of the `Authorization` header.
pub const AUTHORIZATION_PREFIX: &str = "OAuth ";

/// `oauth_*` parameters attached to one signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
	/// `oauth_consumer_key`.
	pub consumer_key: String,
	/// `oauth_token`.
	pub token: String,
	/// `oauth_nonce`.
	pub nonce: String,
	/// `oauth_signature_method`.
	pub signature_method: &'static str,
	/// `oauth_timestamp`, in Unix seconds.
	pub timestamp: i64,
}
impl ProtocolParams {
	/// Returns the parameters as `(name, value)` pairs, `oauth_version` included.
	pub fn pairs(&self) -> [(&'static str, String); 6] {
		[
			("oauth_consumer_key", self.consumer_key.clone()),
			("oauth_nonce", self.nonce.clone()),
			("oauth_signature_method", self.signature_method.to_owned()),
			("oauth_timestamp", self.timestamp.to_string()),
			("oauth_token", self.token.clone()),
			("oauth_version", OAUTH_VERSION.to_owned()),
		]
	}
}

/// Normalized parameter string.
///
/// Query parameters are collected first, keeping the first value of a repeated key. Protocol
/// parameters then overwrite any query parameter with the same name. Names and values are
/// percent-encoded, sorted by encoded name, and joined as `name=value` with `&`.
pub fn normalized_parameters(url: &Url, protocol: &ProtocolParams) -> String {
	let mut params = BTreeMap::<String, String>::new();

	for (k, v) in url.query_pairs() {
		params
			.entry(percent_encode(&k).into_owned())
			.or_insert_with(|| percent_encode(&v).into_owned());
	}
	for (k, v) in protocol.pairs() {
		params.insert(percent_encode(k).into_owned(), percent_encode(&v).into_owned());
	}

	params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

/// Base string URI: lower-case scheme and host, port dropped when it is 80 or 443, and the
/// escaped path. Query and fragment are excluded.
pub fn base_string_uri(url: &Url) -> String {
	let scheme = url.scheme().to_ascii_lowercase();
	let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

	match url.port() {
		None | Some(80) | Some(443) => format!("{scheme}://{host}{}", url.path()),
		Some(port) => format!("{scheme}://{host}:{port}{}", url.path()),
	}
}

/// `METHOD&enc(base string URI)&enc(normalized parameters)`.
pub fn signature_base_string(method: &Method, url: &Url, protocol: &ProtocolParams) -> String {
	format!(
		"{}&{}&{}",
		method.as_str().to_ascii_uppercase(),
		percent_encode(&base_string_uri(url)),
		percent_encode(&normalized_parameters(url, protocol))
	)
}

/// `Authorization` header value carrying the protocol parameters and the signature.
pub fn authorization_header(protocol: &ProtocolParams, signature: &str) -> String {
	let mut params = protocol
		.pairs()
		.into_iter()
		.chain([("oauth_signature", signature.to_owned())])
		.collect::<Vec<_>>();

	params.sort_by(|a, b| a.0.cmp(b.0));

	let pairs = params
		.iter()
		.map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
		.collect::<Vec<_>>();

	format!("{AUTHORIZATION_PREFIX}{}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn protocol() -> ProtocolParams {
		ProtocolParams {
			consumer_key: "dpf43f3p2l4k3l03".into(),
			token: "nnch734d00sl2jdk".into(),
			nonce: "kllo9940pd9333jh".into(),
			signature_method: "HMAC-SHA1",
			timestamp: 1191242096,
		}
	}

	#[test]
	fn base_string_uri_normalizes_scheme_host_and_port() {
		let url = Url::parse("HTTP://Example.COM:80/r%20v/X?id=123#frag")
			.expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "http://example.com/r%20v/X");

		let url = Url::parse("https://www.example.net:8080/?q=1").expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "https://www.example.net:8080/");

		let url = Url::parse("http://example.com:443/a").expect("Fixture URL should parse.");

		assert_eq!(base_string_uri(&url), "http://example.com/a");
	}

	#[test]
	fn base_string_matches_rfc_example() {
		let url = Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
			.expect("Fixture URL should parse.");

		assert_eq!(
			signature_base_string(&Method::GET, &url, &protocol()),
			"GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26\
			 oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26\
			 oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26\
			 oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
		);
	}

	#[test]
	fn protocol_params_override_query_and_first_query_value_wins() {
		let url = Url::parse("https://api.example.com/x?oauth_nonce=spoofed&b=2&b=1&a=x%20y+z")
			.expect("Fixture URL should parse.");
		let params = normalized_parameters(&url, &protocol());

		assert!(params.starts_with("a=x%20y%20z&b=2&oauth_consumer_key="));
		assert!(params.contains("oauth_nonce=kllo9940pd9333jh"));
		assert!(!params.contains("spoofed"));
		assert!(!params.contains('+'));
	}

	#[test]
	fn header_lists_sorted_protocol_params_and_signature() {
		let header = authorization_header(&protocol(), "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");

		assert_eq!(
			header,
			"OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_nonce=\"kllo9940pd9333jh\", \
			 oauth_signature=\"tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D\", \
			 oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1191242096\", \
			 oauth_token=\"nnch734d00sl2jdk\", oauth_version=\"1.0\""
		);
	}
}
