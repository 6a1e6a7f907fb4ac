// =============================================================================
// Bearer Token Authentication — Axum Extractor
// =============================================================================
//
// Extracts and validates a Bearer token from the `Authorization` header and
// resolves it to a configured subscriber. Tokens are never stored — config
// holds hex-encoded SHA-256 digests, and the presented token is hashed and
// compared in constant time against each digest.
//
// Usage as an Axum extractor:
//
//   async fn handler(subscriber: Subscriber, ...) { ... }
//
// If the token is missing or unknown, the extractor short-circuits the
// request with a 403 Forbidden response before the handler body executes.
// =============================================================================

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::app_state::AppState;

// =============================================================================
// Constant-time comparison
// =============================================================================

/// Compare two byte slices in constant time. Returns `true` if they are
/// identical. The comparison always examines every byte of both slices even
/// when a mismatch is found early, preventing timing side-channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Hex-encoded SHA-256 digest of a token, lower case. This is the format the
/// `subscribers[].token_sha256` config field expects.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller: resolved from the bearer token against the
/// configured subscriber table.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub name: String,
    pub plan: String,
}

/// Rejection type returned when authentication fails.
pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Subscriber {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let subscribers = &state.config.subscribers;

        if subscribers.is_empty() {
            warn!("no subscribers configured — all authenticated requests will be rejected");
            return Err(AuthRejection {
                status: StatusCode::FORBIDDEN,
                message: "Server authentication not configured",
            });
        }

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(value) if value.starts_with("Bearer ") => &value[7..],
            _ => {
                warn!("missing or malformed Authorization header");
                return Err(AuthRejection {
                    status: StatusCode::FORBIDDEN,
                    message: "Missing or invalid authorization token",
                });
            }
        };

        let digest = token_digest(token);

        for sub in subscribers {
            let expected = sub.token_sha256.to_lowercase();
            if constant_time_eq(digest.as_bytes(), expected.as_bytes()) {
                return Ok(Subscriber {
                    name: sub.name.clone(),
                    plan: sub.plan.clone(),
                });
            }
        }

        warn!("unknown token presented");
        Err(AuthRejection {
            status: StatusCode::FORBIDDEN,
            message: "Invalid authorization token",
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_identical() {
        assert!(constant_time_eq(b"hello", b"hello"));
    }

    #[test]
    fn constant_time_eq_different() {
        assert!(!constant_time_eq(b"hello", b"world"));
    }

    #[test]
    fn constant_time_eq_different_lengths() {
        assert!(!constant_time_eq(b"short", b"longer_string"));
    }

    #[test]
    fn constant_time_eq_empty() {
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn token_digest_is_hex_sha256() {
        // SHA-256("") is a well-known vector.
        assert_eq!(
            token_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // 64 lowercase hex chars for any input.
        let d = token_digest("meridian-test-token");
        assert_eq!(d.len(), 64);
        assert!(d.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn digest_comparison_matches_case_insensitively() {
        let digest = token_digest("secret");
        let upper = digest.to_uppercase();
        assert!(constant_time_eq(
            digest.as_bytes(),
            upper.to_lowercase().as_bytes()
        ));
    }
}
