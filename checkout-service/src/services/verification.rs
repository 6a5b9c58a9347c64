//! Checkout payment signature verification.
//!
//! Razorpay signs `order_id + "|" + payment_id` with the API key secret and
//! hands the hex digest to the browser. Recomputing it server-side proves the
//! confirmation came from the gateway. Verification is pure: it never marks
//! an order as paid.

use secrecy::{ExposeSecret, Secret};
use service_core::utils::signature::{hmac_sha256_hex, signatures_match};

use crate::dtos::VerifyPaymentRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    /// One or more of the three fields was absent or empty.
    MissingFields(Vec<&'static str>),
    SignatureMismatch,
    /// No key secret configured; nothing can verify.
    NotConfigured,
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    /// Label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::MissingFields(_) => "missing_fields",
            VerificationOutcome::SignatureMismatch => "signature_mismatch",
            VerificationOutcome::NotConfigured => "not_configured",
        }
    }
}

#[derive(Clone)]
pub struct PaymentVerifier {
    key_secret: Secret<String>,
}

impl PaymentVerifier {
    pub fn new(key_secret: Secret<String>) -> Self {
        Self { key_secret }
    }

    /// `hex(HMAC-SHA256(key_secret, order_id|payment_id))`
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> anyhow::Result<String> {
        let payload = format!("{}|{}", order_id, payment_id);
        hmac_sha256_hex(self.key_secret.expose_secret(), &payload)
    }

    pub fn verify(&self, request: &VerifyPaymentRequest) -> VerificationOutcome {
        let order_id = present(request.razorpay_order_id.as_deref());
        let payment_id = present(request.razorpay_payment_id.as_deref());
        let signature = present(request.razorpay_signature.as_deref());

        let (order_id, payment_id, signature) = match (order_id, payment_id, signature) {
            (Some(o), Some(p), Some(s)) => (o, p, s),
            (o, p, s) => {
                let missing = [
                    ("razorpay_order_id", o.is_none()),
                    ("razorpay_payment_id", p.is_none()),
                    ("razorpay_signature", s.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return VerificationOutcome::MissingFields(missing);
            }
        };

        if self.key_secret.expose_secret().is_empty() {
            return VerificationOutcome::NotConfigured;
        }

        let expected = match self.expected_signature(order_id, payment_id) {
            Ok(expected) => expected,
            Err(e) => {
                tracing::error!(error = %e, "Failed to compute payment signature");
                return VerificationOutcome::SignatureMismatch;
            }
        };

        if signatures_match(&expected, signature) {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::SignatureMismatch
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
