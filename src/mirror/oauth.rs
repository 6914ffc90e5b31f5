//! OAuth 1.0a request signing (HMAC-SHA1)

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::Hmac;
use hmac::Mac;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use sha1::Sha1;
use uuid::Uuid;

/// Everything but the unreserved characters of RFC 3986
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Credentials of a pre-authorized account
pub struct Credentials<'a> {
    /// Key of the application
    pub consumer_key: &'a str,

    /// Secret of the application
    pub consumer_secret: &'a str,

    /// Access token of the account
    pub access_token: &'a str,

    /// Access token secret of the account
    pub access_token_secret: &'a str,
}

/// Percent-encode a value as OAuth wants it
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Build the `Authorization` header for a request
///
/// Only the OAuth parameters are signed, request bodies are expected to be JSON
pub fn authorization_header(method: &str, url: &str, credentials: &Credentials) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    let timestamp = chrono::Utc::now().timestamp().to_string();

    authorization_header_with(method, url, &[], credentials, &nonce, &timestamp)
}

/// Build the `Authorization` header with a known nonce and timestamp
fn authorization_header_with(
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: &str,
) -> String {
    let oauth_params = [
        ("oauth_consumer_key", credentials.consumer_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token),
        ("oauth_version", "1.0"),
    ];

    let signature = signature(
        method,
        url,
        oauth_params.iter().chain(request_params.iter()).copied(),
        credentials,
    );

    let header_params = oauth_params
        .iter()
        .copied()
        .chain([("oauth_signature", signature.as_str())])
        .map(|(key, value)| format!(r#"{}="{}""#, percent_encode(key), percent_encode(value)))
        .collect::<Vec<String>>()
        .join(", ");

    format!("OAuth {header_params}")
}

/// Calculate the signature over the method, URL and all parameters
fn signature<'a, P>(method: &str, url: &str, params: P, credentials: &Credentials) -> String
where
    P: Iterator<Item = (&'a str, &'a str)>,
{
    let mut encoded_params = params
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect::<Vec<(String, String)>>();
    encoded_params.sort();

    let parameter_string = encoded_params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string)
    );

    let signing_key = format!(
        "{}&{}",
        percent_encode(credentials.consumer_secret),
        percent_encode(credentials.access_token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());

    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example request from the Twitter documentation on creating signatures
    const CREDENTIALS: Credentials<'static> = Credentials {
        consumer_key: "xvz1evFS4wEEPTGEFPHBog",
        consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
        access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
    };
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";
    const REQUEST_PARAMS: [(&str, &str); 2] = [
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("hello"), "hello");
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("a=b&c=d"), "a%3Db%26c%3Dd");
        assert_eq!(percent_encode("-._~"), "-._~");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature() {
        let params = [
            ("oauth_consumer_key", CREDENTIALS.consumer_key),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", TIMESTAMP),
            ("oauth_token", CREDENTIALS.access_token),
            ("oauth_version", "1.0"),
        ];

        let signature = signature(
            "post",
            URL,
            params.iter().chain(REQUEST_PARAMS.iter()).copied(),
            &CREDENTIALS,
        );

        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header() {
        let header = authorization_header_with(
            "POST",
            URL,
            &REQUEST_PARAMS,
            &CREDENTIALS,
            NONCE,
            TIMESTAMP,
        );

        assert!(header.starts_with("OAuth "));
        assert!(header.contains(r#"oauth_consumer_key="xvz1evFS4wEEPTGEFPHBog""#));
        assert!(header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#));
        assert!(!header.contains("status"));
    }

    #[test]
    fn test_authorization_header_is_fresh() {
        let first = authorization_header("POST", URL, &CREDENTIALS);
        let second = authorization_header("POST", URL, &CREDENTIALS);

        assert_ne!(first, second);
    }
}
