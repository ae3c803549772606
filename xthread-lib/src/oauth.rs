//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! Only the pieces the X API needs for user-context calls: query and form
//! parameters take part in the signature, JSON bodies do not.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;

use crate::error::ApiError;

type HmacSha1 = Hmac<Sha1>;

/// The four secrets that authorize requests on behalf of one account.
#[derive(Clone)]
pub struct OAuthKeys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl fmt::Debug for OAuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthKeys")
            .field("consumer_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl OAuthKeys {
    /// Build the `Authorization` header value for one request, using a fresh
    /// nonce and the current time.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        request_params: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_header_with(method, url, request_params, &nonce, timestamp)
    }

    fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        request_params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, ApiError> {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, request_params, &oauth_params)?;

        let mut fields: Vec<String> = oauth_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, percent_encode(value)))
            .collect();
        fields.push(format!("oauth_signature=\"{}\"", percent_encode(&signature)));
        fields.sort();

        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        request_params: &[(&str, &str)],
        oauth_params: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        // Parameters are sorted by encoded key, then encoded value
        let mut pairs: Vec<(String, String)> = request_params
            .iter()
            .chain(oauth_params.iter())
            .map(|(key, value)| (percent_encode(key), percent_encode(value)))
            .collect();
        pairs.sort();

        let parameter_string = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&parameter_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| ApiError::Signing(e.to_string()))?;
        mac.update(base_string.as_bytes());

        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}
