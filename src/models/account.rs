// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login credentials, stored apart from the health profile.

use serde::{Deserialize, Serialize};

/// Credential record stored at `accounts/{normalized email}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// User ID shared with the profile document
    pub uid: String,
    /// Email as entered at registration
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: String,
}

/// Normalize an email for use as a document ID.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
