use anyhow::anyhow;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};

use courier_types::error::{Error, Result};

/// Hashes and verifies passwords with Argon2id. The work factor (iteration
/// count) is injected at construction; each digest carries its own salt and
/// parameters in the PHC string, so raising the factor later leaves every
/// stored digest verifiable.
pub struct CredentialStore {
    argon2: Argon2<'static>,
}

impl CredentialStore {
    pub fn new(work_factor: u32) -> anyhow::Result<Self> {
        let params = Params::new(Params::DEFAULT_M_COST, work_factor, Params::DEFAULT_P_COST, None)
            .map_err(|e| anyhow!("invalid hash work factor {work_factor}: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Store(anyhow!("password hashing failed: {e}")))?;
        Ok(digest.to_string())
    }

    /// Verify a candidate plaintext against a stored digest. The candidate
    /// is hashed with the salt and parameters embedded in the digest, never
    /// compared as two independently salted hashes. A mismatch is a normal
    /// `false`; only a malformed digest is an error.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| Error::Store(anyhow!("malformed password digest: {e}")))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Store(anyhow!("password verification failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verify_roundtrip() {
        let store = CredentialStore::new(1).unwrap();
        let digest = store.hash("secret1").unwrap();

        assert_ne!(digest, "secret1");
        assert!(store.verify("secret1", &digest).unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let store = CredentialStore::new(1).unwrap();
        let digest = store.hash("secret1").unwrap();

        assert!(!store.verify("wrong", &digest).unwrap());
    }

    #[test]
    fn salts_differ_but_both_verify() {
        let store = CredentialStore::new(1).unwrap();
        let a = store.hash("secret1").unwrap();
        let b = store.hash("secret1").unwrap();

        assert_ne!(a, b);
        assert!(store.verify("secret1", &a).unwrap());
        assert!(store.verify("secret1", &b).unwrap());
    }

    #[test]
    fn raising_work_factor_keeps_old_digests_valid() {
        let old = CredentialStore::new(1).unwrap();
        let digest = old.hash("secret1").unwrap();

        // Verification uses the parameters embedded in the digest.
        let new = CredentialStore::new(2).unwrap();
        assert!(new.verify("secret1", &digest).unwrap());
        assert!(!new.verify("wrong", &digest).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error() {
        let store = CredentialStore::new(1).unwrap();
        assert!(store.verify("secret1", "not-a-phc-string").is_err());
    }
}
