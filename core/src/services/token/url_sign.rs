//! Request signatures for signed URLs
//!
//! A signature binds a request path, its method, its query parameters and a
//! unix timestamp to the shared secret. Parameters are encoded like an HTML
//! form, sorted by key with the values of one key kept in the given order, so
//! client and server derive the same string without agreeing on an order.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{DomainError, DomainResult, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Methods a URL signature may cover, lowercase
pub const SIGNABLE_METHODS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

/// Signs and verifies request URLs with a shared secret
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl UrlSigner {
    /// Build a signer; an empty secret is a configuration error
    pub fn new(secret: &str) -> DomainResult<Self> {
        if secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "URL signing secret must not be empty".to_string(),
            });
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Lowercase hex HMAC-SHA256 over path, lowercased method, encoded
    /// parameters and `timestamp`
    pub fn sign<K, V>(
        &self,
        timestamp: i64,
        path: &str,
        method: &str,
        params: &[(K, V)],
    ) -> DomainResult<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mac = self.mac(timestamp, path, method, params)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check `signature` for the request at `now`.
    ///
    /// Timestamps further than `max_skew_secs` from `now` in either direction
    /// fail with [`TokenError::ExpiredOrNotActive`]; a wrong signature fails
    /// with [`TokenError::SignatureMismatch`]. The comparison is constant time.
    #[allow(clippy::too_many_arguments)]
    pub fn verify<K, V>(
        &self,
        signature: &str,
        timestamp: i64,
        path: &str,
        method: &str,
        params: &[(K, V)],
        now: i64,
        max_skew_secs: i64,
    ) -> DomainResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if now.abs_diff(timestamp) > max_skew_secs.unsigned_abs() {
            return Err(TokenError::ExpiredOrNotActive.into());
        }

        let expected = hex::decode(signature).map_err(|_| TokenError::SignatureMismatch)?;
        self.mac(timestamp, path, method, params)?
            .verify_slice(&expected)
            .map_err(|_| TokenError::SignatureMismatch.into())
    }

    fn mac<K, V>(&self, timestamp: i64, path: &str, method: &str, params: &[(K, V)]) -> DomainResult<HmacSha256>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let method = method.to_ascii_lowercase();
        if !SIGNABLE_METHODS.contains(&method.as_str()) {
            return Err(TokenError::UnsupportedMethod { method }.into());
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|e| DomainError::Internal {
            message: format!("Invalid URL signing key: {}", e),
        })?;
        mac.update(path.as_bytes());
        mac.update(method.as_bytes());
        mac.update(encode_params(params).as_bytes());
        mac.update(timestamp.to_string().as_bytes());
        Ok(mac)
    }
}

/// `k1=v1&k1=v2&k2=v3`, keys sorted, values of a key in input order
pub fn encode_params<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect();
    // Stable, so repeated keys keep their order
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (key, value) in sorted {
        if !out.is_empty() {
            out.push('&');
        }
        query_escape(key, &mut out);
        out.push('=');
        query_escape(value, &mut out);
    }
    out
}

/// Form encoding: unreserved bytes kept, space as `+`, the rest `%XX`
fn query_escape(input: &str, out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0x0f) as usize] as char);
            }
        }
    }
}
