use rand::{distributions::Alphanumeric, Rng};
use time::{Duration, OffsetDateTime};

use crate::auth::repo::Role;

/// Link-scheme tokens live for 15 minutes, OTPs for 10.
pub const RESET_TOKEN_TTL: Duration = Duration::minutes(15);
pub const RESET_OTP_TTL: Duration = Duration::minutes(10);

const RESET_TOKEN_LEN: usize = 48;

/// Opaque recovery token for the link scheme. 48 alphanumeric characters
/// (~285 bits of randomness).
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Six-digit numeric code for the OTP scheme.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Expiry instant for a secret issued now.
pub fn expiry_from_now(ttl: Duration) -> OffsetDateTime {
    OffsetDateTime::now_utc() + ttl
}

/// Placeholder roll number for non-student accounts. Not a real academic
/// identifier; exists only so the roll-number uniqueness index holds for
/// every row. Timestamp plus random suffix keeps concurrent registrations
/// from colliding.
pub fn placeholder_roll_number(role: Role) -> String {
    let ts = OffsetDateTime::now_utc().unix_timestamp();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("NO-RN-{role}-{ts}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_token_is_long_and_alphanumeric() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            // Never zero-padded below six digits.
            assert!(otp.parse::<u32>().unwrap() >= 100_000);
        }
    }

    #[test]
    fn expiry_is_in_the_future() {
        let expiry = expiry_from_now(RESET_OTP_TTL);
        assert!(expiry > OffsetDateTime::now_utc());
    }

    #[test]
    fn placeholder_roll_number_names_the_role() {
        let roll = placeholder_roll_number(Role::Teacher);
        assert!(roll.starts_with("NO-RN-teacher-"));
    }

    #[test]
    fn placeholder_roll_numbers_diverge() {
        // Same role, same second: the random suffix still separates them in
        // all but 1/1000 runs; retry once to keep the test stable.
        let a = placeholder_roll_number(Role::Hod);
        let b = placeholder_roll_number(Role::Hod);
        let c = placeholder_roll_number(Role::Hod);
        assert!(a != b || b != c);
    }
}
