// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deterministic health rules: blood-pressure categories, BMI and the
//! field-level bounds applied to profile input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidationError;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const MAX_HBA1C: f64 = 20.0;
pub const MAX_FASTING_BLOOD_SUGAR: f64 = 400.0;
pub const MAX_POSTPRANDIAL_BLOOD_SUGAR: f64 = 600.0;
pub const MAX_SYSTOLIC: f64 = 200.0;
pub const MAX_DIASTOLIC: f64 = 120.0;

/// Diabetes type value meaning "no diabetes".
pub const NO_DIABETES: &str = "Nil";

// ─── Blood Pressure ──────────────────────────────────────────

/// A "systolic/diastolic" reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Blood pressure must look like 120/80")]
pub struct BloodPressureParseError;

impl FromStr for BloodPressure {
    type Err = BloodPressureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sys, dia) = s.split_once('/').ok_or(BloodPressureParseError)?;
        let systolic: f64 = sys.trim().parse().map_err(|_| BloodPressureParseError)?;
        let diastolic: f64 = dia.trim().parse().map_err(|_| BloodPressureParseError)?;

        if !systolic.is_finite() || !diastolic.is_finite() {
            return Err(BloodPressureParseError);
        }

        Ok(Self {
            systolic,
            diastolic,
        })
    }
}

impl BloodPressure {
    pub fn category(&self) -> Option<BloodPressureCategory> {
        classify(self.systolic, self.diastolic)
    }
}

/// Blood-pressure category derived from a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BloodPressureCategory {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Elevated")]
    Elevated,
    #[serde(rename = "Hypertension Stage 1")]
    HypertensionStage1,
    #[serde(rename = "Hypertension Stage 2")]
    HypertensionStage2,
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::HypertensionStage1 => "Hypertension Stage 1",
            Self::HypertensionStage2 => "Hypertension Stage 2",
            Self::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a reading to its category.
///
/// The checks run in a fixed order and the first match wins, so a reading
/// whose systolic and diastolic values fall in different bands takes the
/// band that is tested first (e.g. 135/95 is Stage 1, not Stage 2).
pub fn classify(systolic: f64, diastolic: f64) -> Option<BloodPressureCategory> {
    use BloodPressureCategory::*;

    if systolic < 120.0 && diastolic < 80.0 {
        return Some(Normal);
    }
    if (120.0..130.0).contains(&systolic) && diastolic < 80.0 {
        return Some(Elevated);
    }
    if (130.0..140.0).contains(&systolic) || (80.0..90.0).contains(&diastolic) {
        return Some(HypertensionStage1);
    }
    if (140.0..180.0).contains(&systolic) || (90.0..120.0).contains(&diastolic) {
        return Some(HypertensionStage2);
    }
    if systolic >= 180.0 || diastolic >= 120.0 {
        return Some(HypertensiveCrisis);
    }

    None
}

/// Category display string for a raw "sys/dia" string; empty when the input
/// is blank or cannot be parsed.
pub fn categorize(reading: &str) -> String {
    if reading.trim().is_empty() {
        return String::new();
    }

    reading
        .parse::<BloodPressure>()
        .ok()
        .and_then(|bp| bp.category())
        .map(|c| c.as_str().to_string())
        .unwrap_or_default()
}

// ─── BMI ─────────────────────────────────────────────────────

/// Body-mass index from height in centimetres and weight in kilograms,
/// rounded to two decimals.
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if !(height_cm.is_finite() && weight_kg.is_finite()) || height_cm <= 0.0 || weight_kg <= 0.0
    {
        return None;
    }

    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 100.0).round() / 100.0)
}

// ─── Field Validators ────────────────────────────────────────

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Name fields accept anything except digits.
pub fn validate_person_name(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(|c| c.is_ascii_digit()) {
        return Err(field_error("letters_only", "Only letters are allowed"));
    }
    Ok(())
}

pub fn validate_hba1c(value: f64) -> Result<(), ValidationError> {
    if value > MAX_HBA1C {
        return Err(field_error("max_hba1c", "Max HbA1c level is 20%"));
    }
    validate_non_negative(value)
}

pub fn validate_fasting_blood_sugar(value: f64) -> Result<(), ValidationError> {
    if value > MAX_FASTING_BLOOD_SUGAR {
        return Err(field_error(
            "max_fasting_blood_sugar",
            "Max Fasting Blood Sugar is 400 mg/dL",
        ));
    }
    validate_non_negative(value)
}

pub fn validate_postprandial_blood_sugar(value: f64) -> Result<(), ValidationError> {
    if value > MAX_POSTPRANDIAL_BLOOD_SUGAR {
        return Err(field_error(
            "max_postprandial_blood_sugar",
            "Max Postprandial Blood Sugar is 600 mg/dL",
        ));
    }
    validate_non_negative(value)
}

/// Blood pressure must parse as "sys/dia" and stay within 200/120.
pub fn validate_blood_pressure(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }

    let bp: BloodPressure = value
        .parse()
        .map_err(|_| field_error("blood_pressure_format", "Blood pressure must look like 120/80"))?;

    if bp.systolic > MAX_SYSTOLIC || bp.diastolic > MAX_DIASTOLIC {
        return Err(field_error(
            "max_blood_pressure",
            "Max Blood Pressure is 200/120 mmHg",
        ));
    }
    if bp.systolic < 0.0 || bp.diastolic < 0.0 {
        return Err(field_error("negative", "Value must not be negative"));
    }
    Ok(())
}

pub fn validate_non_negative(value: f64) -> Result<(), ValidationError> {
    if value < 0.0 || !value.is_finite() {
        return Err(field_error("negative", "Value must not be negative"));
    }
    Ok(())
}

/// Email must look like `local@domain.tld` with no whitespace.
pub fn validate_email_shape(value: &str) -> Result<(), ValidationError> {
    let invalid = || field_error("email", "Please enter a valid email address");

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}
