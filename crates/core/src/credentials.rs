//! Password digests and one-time reset codes.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OTP_TTL_MINUTES: i64 = 10;
const HASH_COST: u32 = 10;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(#[from] bcrypt::BcryptError);

/// Salted bcrypt digest in modular crypt format (`$2b$10$...`).
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// Checks a password against a stored digest. Malformed digests never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Six-digit code in `100000..=999999`.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("OTP not requested.")]
    NotRequested,
    #[error("Invalid OTP.")]
    Invalid,
    #[error("OTP expired.")]
    Expired,
}

/// A pending password-reset code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self::with_code(generate_otp(), now)
    }

    pub fn with_code(code: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { code: code.into(), expires_at: now + Duration::minutes(OTP_TTL_MINUTES) }
    }

    /// A wrong code is reported before expiry is checked.
    pub fn verify(challenge: Option<&Self>, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        let challenge = challenge.ok_or(OtpError::NotRequested)?;
        if !constant_time_eq(challenge.code.as_bytes(), code.trim().as_bytes()) {
            return Err(OtpError::Invalid);
        }
        if challenge.expires_at < now {
            return Err(OtpError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{generate_otp, hash_password, verify_password, OtpChallenge, OtpError};

    #[test]
    fn password_round_trips_and_rejects_wrong_input() {
        let stored = hash_password("s3cret!").expect("hash");

        assert!(stored.starts_with("$2b$10$"));
        assert!(verify_password("s3cret!", &stored));
        assert!(!verify_password("S3cret!", &stored));
        assert_ne!(stored, hash_password("s3cret!").expect("hash"), "salts differ per hash");
    }

    #[test]
    fn malformed_digests_never_match() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "pw"));
        assert!(!verify_password("pw", "sha256$1$00$00"));
        assert!(!verify_password("pw", "$2b$10$tooshort"));
        assert!(!verify_password("pw", "$2b$99$abcdefghijklmnopqrstuuabcdefghijklmnopqrstuvwxyz01234"));

        let stored = hash_password("pw").expect("hash");
        assert!(verify_password("pw", &stored));
        assert!(!verify_password("pw", &format!("{stored}$extra")));
        assert!(!verify_password("pw", &stored[..stored.len() - 1]));
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|ch| ch.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn otp_verification_reports_each_failure() {
        let issued_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).single().expect("valid time");
        let challenge = OtpChallenge::with_code("123456", issued_at);

        assert_eq!(OtpChallenge::verify(None, "123456", issued_at), Err(OtpError::NotRequested));
        assert_eq!(
            OtpChallenge::verify(Some(&challenge), "654321", issued_at),
            Err(OtpError::Invalid)
        );
        assert_eq!(
            OtpChallenge::verify(Some(&challenge), "123456", issued_at + Duration::minutes(11)),
            Err(OtpError::Expired)
        );
        assert_eq!(
            OtpChallenge::verify(Some(&challenge), "123456", issued_at + Duration::minutes(10)),
            Ok(())
        );
        assert_eq!(OtpError::Expired.to_string(), "OTP expired.");
    }
}
