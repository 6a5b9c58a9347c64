use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute `HMAC-SHA256(secret, payload)` as lowercase hex.
pub fn hmac_sha256_hex(secret: &str, payload: &str) -> Result<String, anyhow::Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;

    mac.update(payload.as_bytes());
    let result = mac.finalize();

    Ok(hex::encode(result.into_bytes()))
}

/// Byte-exact comparison that does not short-circuit on the first
/// differing byte. No case or whitespace normalisation is applied.
pub fn signatures_match(expected: &str, supplied: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let supplied_bytes = supplied.as_bytes();

    if expected_bytes.len() != supplied_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(supplied_bytes).into()
}

/// Verify a hex HMAC-SHA256 signature over `payload`.
pub fn verify_hmac_sha256_hex(
    secret: &str,
    payload: &str,
    signature: &str,
) -> Result<bool, anyhow::Error> {
    let expected_signature = hmac_sha256_hex(secret, payload)?;
    Ok(signatures_match(&expected_signature, signature))
}
