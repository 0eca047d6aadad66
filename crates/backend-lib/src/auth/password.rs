// ============================
// goaltrack-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng}, Scrypt};
use zeroize::Zeroize;

/// Hash a password using scrypt with a fresh random salt.
///
/// The result is a self-describing PHC string carrying the algorithm,
/// parameters, salt, and digest, so verification needs no side channel.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash.
///
/// A malformed hash fails closed: the function returns false, it never
/// propagates an error past this boundary.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String) -> anyhow::Result<String> {
    let hash = hash_password(plain)?;
    plain.zeroize();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("longpass1").unwrap();

        // the hash is self-describing and never equals the plaintext
        assert_ne!(hash, "longpass1");
        assert!(hash.starts_with("$scrypt$"));

        assert!(verify_password(&hash, "longpass1"));
        assert!(!verify_password(&hash, "longpass2"));
    }

    #[test]
    fn test_fresh_salt_per_hash() {
        let first = hash_password("longpass1").unwrap();
        let second = hash_password("longpass1").unwrap();
        assert_ne!(first, second);

        assert!(verify_password(&first, "longpass1"));
        assert!(verify_password(&second, "longpass1"));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("not-a-phc-string", "longpass1"));
        assert!(!verify_password("", "longpass1"));
    }

    #[test]
    fn test_secure_hash_zeroizes_plaintext() {
        let mut plain = "longpass1".to_string();
        let hash = hash_password_secure(&mut plain).unwrap();
        assert!(plain.is_empty());
        assert!(verify_password(&hash, "longpass1"));
    }
}
