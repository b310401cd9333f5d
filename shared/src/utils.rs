use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

/// Hash a lock password for storage (lowercase hex SHA-256)
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored hash using constant-time comparison
pub fn verify_password(password: &str, hash: &str) -> bool {
    let password_hash = hash_password(password);
    constant_time_eq(&password_hash, hash)
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.bytes().zip(b.bytes()) {
        result |= a_byte ^ b_byte;
    }
    result == 0
}

/// Generate a unique item ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse a stored timestamp.
///
/// RFC 3339 is what this crate writes. Items written before that carry a
/// naive ISO 8601 UTC timestamp without an offset, which is accepted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Initialise the fmt subscriber used by every Lambda.
///
/// CloudWatch stamps each line, so timestamps and targets are left out. The
/// level comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
        assert_eq!(hash_password("secret").len(), 64);
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("hello", "hello"));
        assert!(!constant_time_eq("hello", "world"));
        assert!(!constant_time_eq("hello", "hello!"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-05-01T08:30:00+00:00").unwrap();
        let naive = parse_timestamp("2024-05-01T08:30:00").unwrap();
        let fractional = parse_timestamp("2024-05-01T08:30:00.250000").unwrap();

        assert_eq!(rfc, naive);
        assert_eq!((fractional - naive).num_milliseconds(), 250);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_generate_id_is_unique_uuid() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
