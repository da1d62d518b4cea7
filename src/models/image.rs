// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Captured label images, received from the client as `data:` URLs.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Largest decoded image accepted from the client.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image ready to be sent as inline data to the AI endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImage {
    pub mime_type: String,
    /// Base64 payload, as found in the data URL
    pub data: String,
}

impl LabelImage {
    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url.strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(ImageError::NotBase64)?
            .trim()
            .to_ascii_lowercase();

        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotImage(mime_type));
        }

        let payload = payload.trim();
        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| ImageError::InvalidPayload(e.to_string()))?;

        if decoded.is_empty() {
            return Err(ImageError::InvalidPayload("empty image".to_string()));
        }
        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge(decoded.len()));
        }

        Ok(Self {
            mime_type,
            data: payload.to_string(),
        })
    }
}

/// Errors from image intake.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image must be a data URL")]
    NotDataUrl,

    #[error("Image data URL must be base64 encoded")]
    NotBase64,

    #[error("Please upload an image file (got {0})")]
    NotImage(String),

    #[error("Invalid image data: {0}")]
    InvalidPayload(String),

    #[error("File size should be less than 5MB (got {0} bytes)")]
    TooLarge(usize),
}
