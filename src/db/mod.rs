// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Health profiles (keyed by uid)
    pub const USERS: &str = "Users";
    /// Login credentials (keyed by normalized email)
    pub const ACCOUNTS: &str = "accounts";
    /// Label scan records
    pub const OCR_DATA: &str = "ocrData";
    pub const BARCODES: &str = "Barcodes";
}
