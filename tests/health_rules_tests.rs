// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health rule tests through the public profile and barcode types.

use healthsnap::models::barcode::find_match;
use healthsnap::models::{BarcodeRecord, ProfileFields, UserProfile};
use healthsnap::services::health::{self, BloodPressure, BloodPressureCategory};
use validator::Validate;

fn empty_profile() -> UserProfile {
    UserProfile {
        uid: "uid-1".to_string(),
        email: "asha@example.com".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_blood_pressure_table() {
    let cases = [
        ("119/79", BloodPressureCategory::Normal),
        ("125/70", BloodPressureCategory::Elevated),
        ("135/85", BloodPressureCategory::HypertensionStage1),
        ("150/95", BloodPressureCategory::HypertensionStage2),
        ("190/125", BloodPressureCategory::HypertensiveCrisis),
    ];

    for (reading, expected) in cases {
        let bp: BloodPressure = reading.parse().unwrap();
        assert_eq!(bp.category(), Some(expected), "reading {}", reading);
        assert_eq!(health::categorize(reading), expected.to_string());
    }
}

#[test]
fn test_category_serializes_as_display_string() {
    let json = serde_json::to_string(&BloodPressureCategory::HypertensiveCrisis).unwrap();
    assert_eq!(json, "\"Hypertensive Crisis\"");
}

#[test]
fn test_registration_fields_derive_metrics() {
    let json = r#"{
        "first_name": " Asha ",
        "last_name": "Rao",
        "height_cm": 170,
        "weight_kg": 70,
        "diabetes_type": "Type 2",
        "hba1c": 6.8,
        "blood_pressure": "150/95"
    }"#;
    let fields: ProfileFields = serde_json::from_str(json).unwrap();
    assert!(fields.validate().is_ok());
    assert!(fields.missing_for_registration().is_empty());

    let mut profile = empty_profile();
    fields.apply_to(&mut profile);

    assert_eq!(profile.first_name, "Asha");
    assert_eq!(profile.full_name(), "Asha Rao");
    assert_eq!(profile.bmi, Some(24.22));
    assert_eq!(
        profile.blood_pressure_type.as_deref(),
        Some("Hypertension Stage 2")
    );
    assert_eq!(profile.hba1c, Some(6.8));
}

#[test]
fn test_nil_diabetes_clears_markers_on_save() {
    let mut profile = empty_profile();
    ProfileFields {
        diabetes_type: Some("Nil".to_string()),
        hba1c: Some(6.0),
        fasting_blood_sugar: Some(95.0),
        postprandial_blood_sugar: Some(130.0),
        blood_pressure: Some("118/76".to_string()),
        ..Default::default()
    }
    .apply_to(&mut profile);

    assert_eq!(profile.hba1c, None);
    assert_eq!(profile.fasting_blood_sugar, None);
    assert_eq!(profile.postprandial_blood_sugar, None);
    assert_eq!(profile.blood_pressure, None);
    assert_eq!(profile.blood_pressure_type, None);
}

#[test]
fn test_barcode_match_is_exact() {
    let record = BarcodeRecord {
        barcode_id: "b1".to_string(),
        scanned_code: "8901063010239".to_string(),
        product_name: Some("Glucose biscuits".to_string()),
        ai_response: "Ingredients: wheat flour, sugar".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-02T00:00:00Z".to_string(),
    };
    let candidates = vec![record];

    assert!(find_match(&candidates, "8901063010239").is_some());
    assert!(find_match(&candidates, "89010630102").is_none());
    assert!(find_match(&candidates, "8901063010239 ").is_none());
}
