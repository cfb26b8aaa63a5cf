//! Access gate: password hashing and stateless signed bearer tokens.
//!
//! Passwords are hashed with PBKDF2-SHA256 and a per-user random salt.
//! Tokens are `base64url(claims) . base64url(hmac-sha256(secret, claims))`
//! with a 24-hour validity window and no server-side revocation; the resolved
//! identity travels with the request as [`AuthContext`] rather than any
//! process-global state.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::models::enums::Role;
use crate::models::User;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Token validity window: 24 hours from issuance.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token required")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

/// Request-scoped identity resolved from a bearer token.
/// Injected into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ═══════════════════════════════════════════════════════════
// Password hashing
// ═══════════════════════════════════════════════════════════

/// Salt + hash pair, base64-encoded for storage on the user record.
#[derive(Debug, Clone)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);
    PasswordHash {
        salt: STANDARD.encode(salt),
        hash: STANDARD.encode(hash),
    }
}

/// Check a password against a stored salt + hash, in constant time.
pub fn verify_password(password: &str, salt_b64: &str, hash_b64: &str) -> bool {
    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(hash_b64) else {
        return false;
    };
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);
    hash.as_slice().ct_eq(&expected).into()
}

// ═══════════════════════════════════════════════════════════
// Signed bearer tokens
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: u64,
    username: String,
    role: Role,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Issues and verifies HMAC-signed bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: [u8; 32],
}

impl TokenSigner {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Issue a token for `user`, valid for [`TOKEN_TTL_SECS`].
    pub fn issue(&self, user: &User) -> String {
        self.issue_with_exp(user, Utc::now().timestamp() + TOKEN_TTL_SECS)
    }

    pub(crate) fn issue_with_exp(&self, user: &User, exp: i64) -> String {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp,
        };
        // Claims are a plain struct; serialization cannot fail.
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let sig = self.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(sig)
        )
    }

    /// Verify a bearer token and resolve it to the caller's identity.
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(AuthError::Invalid)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::Invalid)?;
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::Invalid)?;

        let expected = self.sign(&payload);
        if !bool::from(expected.ct_eq(&sig)) {
            return Err(AuthError::Invalid);
        }

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::Invalid)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(AuthContext {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: 2,
            username: "doctor1".into(),
            password_hash: String::new(),
            salt: String::new(),
            name: "Dr. Rajesh Kumar".into(),
            email: "rajesh@setu.gov.in".into(),
            role: Role::Doctor,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_verifies_against_its_own_hash() {
        let stored = hash_password("doctor123");
        assert!(verify_password("doctor123", &stored.salt, &stored.hash));
        assert!(!verify_password("doctor124", &stored.salt, &stored.hash));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let a = hash_password("doctor123");
        let b = hash_password("doctor123");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn garbage_stored_material_never_verifies() {
        assert!(!verify_password("doctor123", "not base64 !!", "also bad"));
    }

    #[test]
    fn token_round_trips_identity() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.issue(&test_user());
        let ctx = signer.verify(&token).unwrap();
        assert_eq!(ctx.user_id, 2);
        assert_eq!(ctx.username, "doctor1");
        assert_eq!(ctx.role, Role::Doctor);
        assert!(!ctx.is_admin());
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.issue_with_exp(&test_user(), Utc::now().timestamp() - 1);
        assert!(matches!(signer.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.issue(&test_user());
        let (_, sig) = token.split_once('.').unwrap();

        let forged_claims =
            format!(r#"{{"sub":2,"username":"doctor1","role":"admin","exp":{}}}"#,
                Utc::now().timestamp() + 1000);
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(forged_claims), sig);
        assert!(matches!(signer.verify(&forged), Err(AuthError::Invalid)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let signer = TokenSigner::new([7u8; 32]);
        let other = TokenSigner::new([8u8; 32]);
        let token = other.issue(&test_user());
        assert!(matches!(signer.verify(&token), Err(AuthError::Invalid)));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = TokenSigner::new([7u8; 32]);
        for bad in ["", "no-dot", "a.b.c", "!!!.???"] {
            assert!(signer.verify(bad).is_err(), "accepted {bad:?}");
        }
    }
}
