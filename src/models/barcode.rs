// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Barcode records linking a scanned product code to a cached analysis.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored at `Barcodes/{barcode_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BarcodeRecord {
    /// Generated ID (also used as document ID)
    pub barcode_id: String,
    /// Decoded barcode string; empty until a code is attached
    #[serde(default)]
    pub scanned_code: String,
    #[serde(default)]
    pub product_name: Option<String>,
    /// Cached AI response for the product
    pub ai_response: String,
    pub created_at: String,
    /// Last write time (sort key for history)
    pub updated_at: String,
}

/// Outcome of looking up a scanned code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MatchStatus {
    Found,
    #[serde(rename = "Not Found")]
    NotFound,
}

/// Find the candidate whose stored code equals `code` exactly.
///
/// Records without an attached code never match.
pub fn find_match<'a>(candidates: &'a [BarcodeRecord], code: &str) -> Option<&'a BarcodeRecord> {
    if code.is_empty() {
        return None;
    }
    candidates.iter().find(|r| r.scanned_code == code)
}
