use std::net::SocketAddr;
use std::path::PathBuf;

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Application-level constants
pub const APP_NAME: &str = "SETU Referral Hub";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the data directory holding the JSON document collections.
/// `SETU_DATA_DIR` overrides; default is ~/.setu-referral/data
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SETU_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".setu-referral").join("data")
}

/// Bind address for the HTTP server.
/// `SETU_ADDR` takes a full socket address; `PORT` alone keeps host 0.0.0.0.
pub fn bind_addr() -> SocketAddr {
    if let Ok(addr) = std::env::var("SETU_ADDR") {
        if let Ok(parsed) = addr.parse() {
            return parsed;
        }
        tracing::warn!(addr, "Ignoring unparseable SETU_ADDR");
    }
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Token-signing secret: derived from `SETU_TOKEN_SECRET` when set, otherwise
/// random per process (restarting the server then invalidates issued tokens).
pub fn token_secret() -> [u8; 32] {
    if let Ok(secret) = std::env::var("SETU_TOKEN_SECRET") {
        let digest = Sha256::digest(secret.as_bytes());
        return digest.into();
    }
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

pub fn default_log_filter() -> String {
    "setu_referral=info,tower_http=warn".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_defaults_under_home() {
        if std::env::var("SETU_DATA_DIR").is_ok() {
            return; // environment override wins; nothing to assert here
        }
        let dir = data_dir();
        assert!(dir.ends_with(".setu-referral/data"));
    }

    #[test]
    fn token_secret_from_env_is_deterministic() {
        // Direct derivation check without mutating the process environment.
        let a: [u8; 32] = Sha256::digest(b"secret").into();
        let b: [u8; 32] = Sha256::digest(b"secret").into();
        assert_eq!(a, b);
    }

    #[test]
    fn random_secret_differs_per_call() {
        if std::env::var("SETU_TOKEN_SECRET").is_ok() {
            return;
        }
        assert_ne!(token_secret(), token_secret());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
