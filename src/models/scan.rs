// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Label scan (OCR + AI analysis) records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One analysis event, stored at `ocrData/{id}`. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScanRecord {
    /// Generated ID (also used as document ID)
    pub id: String,
    /// Concatenated AI response text
    pub ai_response: String,
    /// Captured label images as data URLs
    #[serde(default)]
    pub scanned_images: ScannedImages,
    /// Text recognized on the device, if the client ran a recognition pass
    #[serde(default)]
    pub recognized_text: Option<String>,
    /// Owner's email
    pub user_email: String,
    /// RFC 3339 creation time (sort key for history)
    pub created_at: String,
}

/// Captured images, keyed by which part of the label they show.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScannedImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<String>,
}

impl ScannedImages {
    /// Build from capture order: first image is ingredients, second nutrition.
    pub fn from_captures(captures: &[String]) -> Self {
        Self {
            ingredients: captures.first().cloned(),
            nutrition: captures.get(1).cloned(),
        }
    }
}
