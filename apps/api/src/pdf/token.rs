//! Print token signing.
//!
//! The print view is fetched by a headless browser that carries no session.
//! It authenticates with a short opaque token bound to
//! `(owner_id, proforma_id)`: an HMAC-SHA256 over `"{owner}:{document}"`,
//! hex-encoded. Verification recomputes the MAC and compares in constant
//! time - no database lookup involved.

use ring::hmac;

/// Signs and verifies print tokens.
pub struct PdfTokenSigner {
    key: hmac::Key,
}

impl PdfTokenSigner {
    /// Creates a signer from the configured secret.
    pub fn new(secret: &str) -> Self {
        PdfTokenSigner {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        }
    }

    /// Signs a token for one (owner, document) pair.
    pub fn sign(&self, owner_id: &str, proforma_id: &str) -> String {
        let payload = payload(owner_id, proforma_id);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        hex::encode(tag.as_ref())
    }

    /// Verifies a presented token against the expected value for
    /// (owner, document). Constant-time.
    pub fn verify(&self, owner_id: &str, proforma_id: &str, token: &str) -> bool {
        let Ok(tag) = hex::decode(token) else {
            return false;
        };

        let payload = payload(owner_id, proforma_id);
        hmac::verify(&self.key, payload.as_bytes(), &tag).is_ok()
    }
}

fn payload(owner_id: &str, proforma_id: &str) -> String {
    format!("{owner_id}:{proforma_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let signer = PdfTokenSigner::new("test-secret");
        let token = signer.sign("owner-1", "doc-1");

        assert!(signer.verify("owner-1", "doc-1", &token));
    }

    #[test]
    fn test_token_is_bound_to_both_ids() {
        let signer = PdfTokenSigner::new("test-secret");
        let token = signer.sign("owner-1", "doc-1");

        assert!(!signer.verify("owner-2", "doc-1", &token));
        assert!(!signer.verify("owner-1", "doc-2", &token));
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        let signer = PdfTokenSigner::new("test-secret");

        assert!(!signer.verify("owner-1", "doc-1", ""));
        assert!(!signer.verify("owner-1", "doc-1", "not-hex!"));
        assert!(!signer.verify("owner-1", "doc-1", "deadbeef"));
    }

    #[test]
    fn test_different_secrets_disagree() {
        let a = PdfTokenSigner::new("secret-a");
        let b = PdfTokenSigner::new("secret-b");

        let token = a.sign("owner-1", "doc-1");
        assert!(!b.verify("owner-1", "doc-1", &token));
    }
}
