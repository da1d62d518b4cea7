// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that JWT tokens created by auth routes can be decoded
//! by the auth middleware, catching compatibility issues early.

use healthsnap::middleware::auth::{create_jwt, verify_jwt};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims structure that must match what the middleware expects.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    exp: usize,
    iat: usize,
}

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("3f1c-uid", "asha@example.com", signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "3f1c-uid");
    assert_eq!(token_data.claims.email, "asha@example.com");
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = create_jwt("uid", "a@b.co", signing_key).unwrap();
    let claims = verify_jwt(&token, signing_key).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Token should expire at least 29 days in the future
    assert!(
        claims.exp > now + 86400 * 29,
        "Token expiration should be ~30 days in the future"
    );
}

#[test]
fn test_expired_token_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let claims = Claims {
        sub: "uid".to_string(),
        email: "a@b.co".to_string(),
        iat: 1_000_000,
        exp: 1_000_060,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap();

    assert!(verify_jwt(&token, signing_key).is_err());
}

#[test]
fn test_token_without_email_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[derive(Serialize)]
    struct LegacyClaims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = encode(
        &Header::new(Algorithm::HS256),
        &LegacyClaims {
            sub: "uid".to_string(),
            iat: 1_700_000_000,
            exp: 4_000_000_000,
        },
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap();

    assert!(verify_jwt(&token, signing_key).is_err());
}
