//! HMAC-SHA1 request signer

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cloudcall_domain::{CloudCallError, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::canonical::{hash_input, url_escape};
use super::RequestSigner;

type HmacSha1 = Hmac<Sha1>;

/// Signs the lowercased hash input with HMAC-SHA1 and returns the
/// URL-escaped base64 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl HmacSha1Signer {
    /// New signer. It holds no key; the secret is passed per call.
    pub fn new() -> Self {
        Self
    }
}

impl RequestSigner for HmacSha1Signer {
    fn sign(&self, params: &[(String, String)], secret_key: &[u8]) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(secret_key)
            .map_err(|e| CloudCallError::Config(format!("unusable secret key: {e}")))?;
        mac.update(hash_input(params).as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(url_escape(&BASE64.encode(digest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn signs_known_vector() {
        let params = pairs(&[
            ("command", "listZones"),
            ("response", "json"),
            ("apiKey", "KEY123"),
            ("available", "true"),
        ]);
        let signature = HmacSha1Signer::new().sign(&params, b"SECRET456").unwrap();
        assert_eq!(signature, "iREniyZ0e797HSK9BXsS0HEeHHM%3D");
    }

    #[test]
    fn signs_mixed_case_parameters_over_lowercased_input() {
        let params = pairs(&[("Foo", "Bar Baz")]);
        let signature = HmacSha1Signer::new().sign(&params, b"secret").unwrap();
        assert_eq!(signature, "rs99DzDi8g%2FKIXEllTgNnUnp%2FOQ%3D");
    }

    #[test]
    fn empty_parameter_set_is_still_signed() {
        let signature = HmacSha1Signer::new().sign(&[], b"secret").unwrap();
        assert_eq!(signature, "Ja9hdKD87MTTRmgKcrfOZEuaiOg%3D");
    }

    #[test]
    fn signature_is_deterministic_and_order_independent() {
        let signer = HmacSha1Signer::new();
        let params = pairs(&[("zoneid", "1"), ("templateid", "2"), ("serviceofferingid", "3")]);
        let mut shuffled = params.clone();
        shuffled.rotate_left(1);

        let first = signer.sign(&params, b"k").unwrap();
        assert_eq!(first, signer.sign(&params, b"k").unwrap());
        assert_eq!(first, signer.sign(&shuffled, b"k").unwrap());
        assert_ne!(first, signer.sign(&params, b"other").unwrap());
    }
}
