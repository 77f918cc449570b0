//! Salted password digests.
//!
//! Passwords are never kept in plaintext: a `PasswordHash` stores a random
//! salt and the SHA-256 digest of `salt || password`.

use sha2::{Digest, Sha256};

/// Salted SHA-256 password digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hash a plaintext password with a fresh random salt.
    pub fn new(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    /// A hash no password verifies against, for checking credentials of
    /// unknown users at the same cost as known ones.
    pub fn decoy() -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        Self {
            salt,
            digest: "0".repeat(64),
        }
    }

    /// Check a candidate password against the stored digest.
    pub fn verify(&self, candidate: &str) -> bool {
        let computed = digest(&self.salt, candidate);
        // compare every byte so timing does not leak the mismatch position
        computed.len() == self.digest.len()
            && computed
                .bytes()
                .zip(self.digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("digest", &format_args!("{}..", &self.digest[..8]))
            .finish()
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_hash_when_verifying_same_password_then_matches() {
        let hash = PasswordHash::new("s3cret-pass");
        assert!(hash.verify("s3cret-pass"));
        assert!(!hash.verify("s3cret-pasS"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn given_same_password_twice_when_hashing_then_salts_differ() {
        let a = PasswordHash::new("password1");
        let b = PasswordHash::new("password1");
        assert_ne!(a, b);
    }

    #[test]
    fn given_decoy_when_verifying_any_password_then_never_matches() {
        let decoy = PasswordHash::decoy();
        for candidate in ["", "password1", "internhub-demo"] {
            assert!(!decoy.verify(candidate));
        }
    }

    #[test]
    fn given_hash_when_debug_printed_then_plaintext_absent() {
        let hash = PasswordHash::new("hunter2hunter2");
        assert!(!format!("{hash:?}").contains("hunter2"));
    }
}
