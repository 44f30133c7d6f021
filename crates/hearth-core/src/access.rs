//! Pin credentials.
//!
//! A household is guarded by a short numeric pin. The pin is never stored:
//! the creation fact carries an opaque credential, the standard base64 of
//! `salt || PBKDF2-HMAC-SHA256(pin, salt, iterations)`. Verification
//! re-derives the hash with the embedded salt and compares in constant time.
//!
//! Verification never errors. A credential that fails to decode, or decodes
//! to the wrong length, simply does not match.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::CoreError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Decoded credential length.
const CREDENTIAL_LEN: usize = SALT_LEN + HASH_LEN;

/// PBKDF2 iteration count used when none is configured.
pub const DEFAULT_PIN_ITERATIONS: u32 = 100_000;

/// Accepted pin lengths, in digits.
const PIN_DIGITS: core::ops::RangeInclusive<usize> = 4..=12;

/// Derives and verifies pin credentials with a fixed iteration count.
///
/// The iteration count is not embedded in the credential, so every
/// credential in a deployment must be verified with the count it was
/// created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHasher {
    iterations: u32,
}

impl PinHasher {
    /// Hasher running `iterations` rounds of PBKDF2 (at least one).
    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations: if iterations == 0 { 1 } else { iterations },
        }
    }

    /// Configured iteration count.
    pub const fn iterations(self) -> u32 {
        self.iterations
    }

    /// Hash `pin` under a freshly generated random salt.
    pub fn create_credential(self, pin: &str) -> String {
        let mut salt = [0_u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);

        let hash = self.derive(pin, &salt);
        let mut bytes = Vec::with_capacity(CREDENTIAL_LEN);
        bytes.extend_from_slice(&salt);
        bytes.extend_from_slice(&hash);
        BASE64.encode(bytes)
    }

    /// Whether `pin` matches `credential`.
    pub fn verify(self, pin: &str, credential: &str) -> bool {
        let Ok(bytes) = BASE64.decode(credential) else {
            return false;
        };
        if bytes.len() != CREDENTIAL_LEN {
            return false;
        }
        let (salt, expected) = bytes.split_at(SALT_LEN);
        let actual = self.derive(pin, salt);
        actual.as_slice().ct_eq(expected).into()
    }

    /// Spend the same work as [`PinHasher::verify`] and fail.
    ///
    /// Used when there is no credential to check against, so a missing
    /// household costs as much as a wrong pin.
    pub fn verify_nothing(self, pin: &str) -> bool {
        let _ = core::hint::black_box(self.derive(pin, &[0_u8; SALT_LEN]));
        false
    }

    fn derive(self, pin: &str, salt: &[u8]) -> [u8; HASH_LEN] {
        let mut out = [0_u8; HASH_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, self.iterations, &mut out);
        out
    }
}

impl Default for PinHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PIN_ITERATIONS)
    }
}

/// Hash `pin` with the default iteration count.
pub fn create_pin_credential(pin: &str) -> String {
    PinHasher::default().create_credential(pin)
}

/// Verify `pin` against `credential` with the default iteration count.
pub fn verify_pin(pin: &str, credential: &str) -> bool {
    PinHasher::default().verify(pin, credential)
}

/// Check that `pin` is 4 to 12 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), CoreError> {
    if PIN_DIGITS.contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::InvalidPin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap hasher so the suite stays fast in debug builds.
    const FAST: PinHasher = PinHasher::new(1_000);

    #[test]
    fn roundtrip_verifies() {
        let credential = FAST.create_credential("1234");
        assert!(FAST.verify("1234", &credential));
    }

    #[test]
    fn wrong_pin_fails() {
        let credential = FAST.create_credential("1234");
        assert!(!FAST.verify("4321", &credential));
        assert!(!FAST.verify("12345", &credential));
        assert!(!FAST.verify("", &credential));
    }

    #[test]
    fn salts_differ_per_credential() {
        assert_ne!(FAST.create_credential("1234"), FAST.create_credential("1234"));
    }

    #[test]
    fn corrupted_credentials_fail_without_panicking() {
        let credential = FAST.create_credential("1234");
        let truncated = credential.get(..credential.len().saturating_sub(8)).unwrap_or("");
        for bad in ["", "not base64 at all!", "AAAA", truncated] {
            assert!(!FAST.verify("1234", bad), "{bad:?} should not verify");
        }

        let too_long = format!("{credential}AAAA");
        assert!(!FAST.verify("1234", &too_long));
    }

    #[test]
    fn different_iteration_counts_do_not_match() {
        let credential = FAST.create_credential("1234");
        assert!(!PinHasher::new(1_001).verify("1234", &credential));
    }

    #[test]
    fn verify_nothing_always_fails() {
        assert!(!FAST.verify_nothing("1234"));
    }

    #[test]
    fn default_functions_roundtrip() {
        let credential = create_pin_credential("987654");
        assert!(verify_pin("987654", &credential));
        assert!(!verify_pin("987655", &credential));
    }

    #[test]
    fn zero_iterations_clamped() {
        assert_eq!(PinHasher::new(0).iterations(), 1);
    }

    #[test]
    fn pin_validation() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("123456789012").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("1234567890123").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("").is_err());
    }
}
