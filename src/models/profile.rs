// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User health profile for storage and API.

use crate::services::health::{self, NO_DIABETES};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Health profile stored in Firestore at `Users/{uid}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    /// User ID (also used as document ID)
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,

    // ─── Anthropometrics ─────────────────────────────────────────
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Derived from height and weight
    #[serde(default)]
    pub bmi: Option<f64>,

    // ─── Glycemic Markers ────────────────────────────────────────
    /// "Type 1", "Type 2", "Gestational", "Prediabetes" or "Nil"
    #[serde(default)]
    pub diabetes_type: Option<String>,
    #[serde(default)]
    pub hba1c: Option<f64>,
    #[serde(default)]
    pub fasting_blood_sugar: Option<f64>,
    #[serde(default)]
    pub postprandial_blood_sugar: Option<f64>,

    // ─── Blood Pressure ──────────────────────────────────────────
    /// Raw "systolic/diastolic" reading
    #[serde(default)]
    pub blood_pressure: Option<String>,
    /// Derived category display string
    #[serde(default)]
    pub blood_pressure_type: Option<String>,

    // ─── Lifestyle & Diet ────────────────────────────────────────
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub lifestyle: Option<String>,
    #[serde(default)]
    pub water_intake: Option<String>,
    #[serde(default)]
    pub sugar_alternatives: Option<String>,
    #[serde(default)]
    pub food_avoidances: Option<String>,
    #[serde(default)]
    pub meal_preference: Option<String>,
    #[serde(default)]
    pub sugar_sensitivity: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,

    // ─── Metadata ────────────────────────────────────────────────
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// Recompute derived fields after any edit.
    ///
    /// A diabetes type of "Nil" clears the glycemic markers and the blood
    /// pressure reading before BMI and the blood-pressure category are derived.
    pub fn refresh_derived(&mut self) {
        if self.diabetes_type.as_deref() == Some(NO_DIABETES) {
            self.hba1c = None;
            self.fasting_blood_sugar = None;
            self.postprandial_blood_sugar = None;
            self.blood_pressure = None;
        }

        self.bmi = match (self.height_cm, self.weight_kg) {
            (Some(h), Some(w)) => health::calculate_bmi(h, w),
            _ => None,
        };

        self.blood_pressure_type = self
            .blood_pressure
            .as_deref()
            .map(health::categorize)
            .filter(|c| !c.is_empty());
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Editable profile fields, shared by registration and profile edits.
///
/// Every field is optional; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileFields {
    #[validate(custom(function = "health::validate_person_name"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "health::validate_person_name"))]
    pub last_name: Option<String>,
    #[validate(range(max = 150, message = "Age must be at most 150"))]
    pub age: Option<u32>,
    pub gender: Option<String>,
    #[validate(custom(function = "health::validate_non_negative"))]
    pub height_cm: Option<f64>,
    #[validate(custom(function = "health::validate_non_negative"))]
    pub weight_kg: Option<f64>,
    pub diabetes_type: Option<String>,
    #[validate(custom(function = "health::validate_hba1c"))]
    pub hba1c: Option<f64>,
    #[validate(custom(function = "health::validate_fasting_blood_sugar"))]
    pub fasting_blood_sugar: Option<f64>,
    #[validate(custom(function = "health::validate_postprandial_blood_sugar"))]
    pub postprandial_blood_sugar: Option<f64>,
    #[validate(custom(function = "health::validate_blood_pressure"))]
    pub blood_pressure: Option<String>,
    pub allergies: Option<String>,
    pub lifestyle: Option<String>,
    pub water_intake: Option<String>,
    pub sugar_alternatives: Option<String>,
    pub food_avoidances: Option<String>,
    pub meal_preference: Option<String>,
    pub sugar_sensitivity: Option<String>,
    pub medications: Option<String>,
}

impl ProfileFields {
    /// Copy every provided field onto `profile` and re-derive computed values.
    pub fn apply_to(self, profile: &mut UserProfile) {
        macro_rules! set_some {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { profile.$field = Some(v); })*
            };
        }

        if let Some(v) = self.first_name {
            profile.first_name = v.trim().to_string();
        }
        if let Some(v) = self.last_name {
            profile.last_name = v.trim().to_string();
        }

        set_some!(
            age,
            gender,
            height_cm,
            weight_kg,
            diabetes_type,
            hba1c,
            fasting_blood_sugar,
            postprandial_blood_sugar,
            blood_pressure,
            allergies,
            lifestyle,
            water_intake,
            sugar_alternatives,
            food_avoidances,
            meal_preference,
            sugar_sensitivity,
            medications,
        );

        profile.refresh_derived();
    }

    /// Fields the registration form requires; returns the missing names.
    pub fn missing_for_registration(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("first_name");
        }
        if self.last_name.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("last_name");
        }
        if self.height_cm.is_none() {
            missing.push("height_cm");
        }
        if self.weight_kg.is_none() {
            missing.push("weight_kg");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_profile() -> UserProfile {
        UserProfile {
            uid: "uid-1".to_string(),
            email: "asha@example.com".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_derives_bmi_and_bp_type() {
        let mut profile = base_profile();
        ProfileFields {
            height_cm: Some(170.0),
            weight_kg: Some(70.0),
            diabetes_type: Some("Type 2".to_string()),
            blood_pressure: Some("135/85".to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.bmi, Some(24.22));
        assert_eq!(
            profile.blood_pressure_type.as_deref(),
            Some("Hypertension Stage 1")
        );
    }

    #[test]
    fn test_nil_diabetes_clears_glycemic_fields() {
        let mut profile = base_profile();
        ProfileFields {
            diabetes_type: Some("Type 1".to_string()),
            hba1c: Some(7.5),
            fasting_blood_sugar: Some(130.0),
            blood_pressure: Some("150/95".to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);
        assert_eq!(profile.hba1c, Some(7.5));

        ProfileFields {
            diabetes_type: Some(NO_DIABETES.to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.hba1c, None);
        assert_eq!(profile.fasting_blood_sugar, None);
        assert_eq!(profile.blood_pressure, None);
        assert_eq!(profile.blood_pressure_type, None);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut profile = base_profile();
        profile.allergies = Some("peanuts".to_string());

        ProfileFields {
            meal_preference: Some("Veg".to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.allergies.as_deref(), Some("peanuts"));
        assert_eq!(profile.meal_preference.as_deref(), Some("Veg"));
        assert_eq!(profile.first_name, "Asha");
    }

    #[test]
    fn test_validation_messages() {
        let fields = ProfileFields {
            first_name: Some("J0hn".to_string()),
            hba1c: Some(21.0),
            fasting_blood_sugar: Some(401.0),
            postprandial_blood_sugar: Some(601.0),
            blood_pressure: Some("210/80".to_string()),
            ..Default::default()
        };

        let errors = fields.validate().unwrap_err();
        let field_errors = errors.field_errors();
        for field in [
            "first_name",
            "hba1c",
            "fasting_blood_sugar",
            "postprandial_blood_sugar",
            "blood_pressure",
        ] {
            assert!(field_errors.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_numeric_fields_within_bounds_pass() {
        let fields = ProfileFields {
            height_cm: Some(170.0),
            weight_kg: Some(0.0),
            hba1c: Some(20.0),
            fasting_blood_sugar: Some(400.0),
            postprandial_blood_sugar: Some(600.0),
            ..Default::default()
        };
        assert!(fields.validate().is_ok());

        let negative = ProfileFields {
            height_cm: Some(-1.0),
            weight_kg: Some(-70.0),
            ..Default::default()
        };
        let errors = negative.validate().unwrap_err();
        let fields = crate::error::field_messages(&errors);
        assert_eq!(fields["height_cm"], vec!["Value must not be negative"]);
        assert_eq!(fields["weight_kg"], vec!["Value must not be negative"]);
    }

    #[test]
    fn test_missing_for_registration() {
        let fields = ProfileFields {
            first_name: Some("Asha".to_string()),
            last_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fields.missing_for_registration(),
            vec!["last_name", "height_cm", "weight_kg"]
        );
    }
}
