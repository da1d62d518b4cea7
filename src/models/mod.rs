// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod account;
pub mod barcode;
pub mod image;
pub mod profile;
pub mod scan;

pub use account::Account;
pub use barcode::{BarcodeRecord, MatchStatus};
pub use image::LabelImage;
pub use profile::{ProfileFields, UserProfile};
pub use scan::{ScanRecord, ScannedImages};
