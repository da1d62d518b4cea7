// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt templates sent to the generative model.
//!
//! All integration with the model is parameter embedding into free text;
//! responses have no schema.

use crate::models::UserProfile;
use std::fmt::Display;

pub const INGREDIENTS_EXTRACTION: &str = "Read only the ingredient part from this image.";
pub const NUTRITION_EXTRACTION: &str =
    "Read only the nutritional information part from this image.";

/// Placeholder section text when a response has no label content.
pub const NO_LABEL_CONTENT: &str = "Nil";
pub const NO_RESPONSE: &str = "No response available";
pub const SECTION_FAILED: &str = "Error retrieving information.";

pub const CHAT_FALLBACK: &str = "I'm not sure how to respond.";
pub const CHAT_FAILED: &str =
    "I apologize, but I encountered an error. Please try asking your food-related question again.";
pub const CHAT_IMAGE_ONLY_QUESTION: &str = "Food label image uploaded";

/// Number of recent chat messages given to the model as context.
pub const CHAT_CONTEXT_MESSAGES: usize = 10;

/// Extraction prompt for the capture at `index` (0 = ingredients, 1 = nutrition).
pub fn extraction_prompt(index: usize) -> &'static str {
    if index == 0 {
        INGREDIENTS_EXTRACTION
    } else {
        NUTRITION_EXTRACTION
    }
}

/// Whether an AI response mentions ingredient or nutrition content at all.
pub fn has_label_content(ai_response: &str) -> bool {
    let lower = ai_response.to_lowercase();
    lower.contains("ingredient") || lower.contains("nutrition")
}

fn or_else<T: Display>(value: Option<T>, fallback: &str) -> String {
    match value {
        Some(v) => {
            let s = v.to_string();
            if s.trim().is_empty() {
                fallback.to_string()
            } else {
                s
            }
        }
        None => fallback.to_string(),
    }
}

/// `(label, value)` pairs describing the user's health, in prompt order.
pub fn profile_parameters(p: &UserProfile) -> Vec<(&'static str, String)> {
    const NP: &str = "Not provided";
    const NONE: &str = "None";

    let blood_pressure = match (&p.blood_pressure, &p.blood_pressure_type) {
        (Some(bp), Some(kind)) if !bp.is_empty() => format!("{} ({})", bp, kind),
        (bp, _) => or_else(bp.as_deref(), NP),
    };

    vec![
        ("Activity Level", or_else(p.lifestyle.as_deref(), NP)),
        ("Diabetes Type", or_else(p.diabetes_type.as_deref(), NP)),
        ("Sugar Sensitivity", or_else(p.sugar_sensitivity.as_deref(), NP)),
        ("Allergies", or_else(p.allergies.as_deref(), NONE)),
        ("Food Avoidances", or_else(p.food_avoidances.as_deref(), NONE)),
        ("Medications", or_else(p.medications.as_deref(), NONE)),
        ("Water Intake", or_else(p.water_intake.as_deref(), NP)),
        ("Blood Pressure", blood_pressure),
        ("Fasting Blood Sugar", or_else(p.fasting_blood_sugar, NP)),
        ("HbA1c", or_else(p.hba1c, NP)),
        ("Postprandial Blood Sugar", or_else(p.postprandial_blood_sugar, NP)),
        (
            "Preferred Sugar Alternatives",
            or_else(p.sugar_alternatives.as_deref(), NONE),
        ),
        ("Meal Preference", or_else(p.meal_preference.as_deref(), NONE)),
        ("BMI", or_else(p.bmi, NP)),
        ("Height (cm)", or_else(p.height_cm, NP)),
        ("Weight (kg)", or_else(p.weight_kg, NP)),
        ("Age", or_else(p.age, NP)),
        ("Gender", or_else(p.gender.as_deref(), NP)),
    ]
}

/// Multi-line "User Health Profile" block.
pub fn health_profile_block(p: &UserProfile) -> String {
    let mut block = String::from("User Health Profile:");
    for (label, value) in profile_parameters(p) {
        block.push_str(&format!("\n- {}: {}", label, value));
    }
    block
}

/// Inline "Label (value), Label (value), ..." form of the profile.
fn health_profile_inline(p: &UserProfile) -> String {
    profile_parameters(p)
        .into_iter()
        .map(|(label, value)| format!("{} ({})", label, value))
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── Verdict Sections ────────────────────────────────────────

/// A titled verdict prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPrompt {
    pub title: &'static str,
    pub prompt: String,
}

/// Regulatory verdict prompts (no profile).
pub fn fssai_sections(ai_response: &str) -> Vec<SectionPrompt> {
    vec![
        SectionPrompt {
            title: "FSSAI Approval Status",
            prompt: format!(
                "### FSSAI Approval Status for Ingredient: \"{ai_response}\"\n\n\
                 Provide the FSSAI approval status in one word: Approved / Restricted / Banned.\n\
                 - Include the regulation number if available.\n\
                 - Base the answer strictly on verified sources."
            ),
        },
        SectionPrompt {
            title: "Safety Score Evaluation",
            prompt: format!(
                "### Safety Score Evaluation for Ingredient: \"{ai_response}\"\n\n\
                 Only if the FSSAI approval status is Approved, give a safety score from 1 to 10 \
                 as a single word, considering the FSSAI standard and health risk.\n\
                 - Justify briefly with sources if possible (e.g. site:fssai.gov.in)."
            ),
        },
        SectionPrompt {
            title: "Final Verdict",
            prompt: format!(
                "### Final Verdict on Ingredient: \"{ai_response}\"\n\n\
                 In one sentence, say Safe / Moderate / Unsafe based on FSSAI standards and \
                 regulation.\n\
                 - Base the answer strictly on verified sources."
            ),
        },
        SectionPrompt {
            title: "Comprehensive Analysis",
            prompt: format!(
                "### Comprehensive Ingredient Analysis: \"{ai_response}\"\n\n\
                 Provide a concise analysis in two sentences at most.\n\
                 - Mention definition, risks, benefits and regulatory status.\n\
                 - Base the answer strictly on verified sources."
            ),
        },
    ]
}

/// Verdict prompts personalized with the user's health profile.
pub fn personal_sections(ai_response: &str, profile: &UserProfile) -> Vec<SectionPrompt> {
    let allergies = or_else(profile.allergies.as_deref(), "None");
    let params = health_profile_inline(profile);

    vec![
        SectionPrompt {
            title: "User Allergy based Status",
            prompt: format!(
                "### User Usage Approval based on allergies in Ingredient: \"{ai_response}\"\n\n\
                 Give the approval status as Approved, Restricted or Notusable in one word, \
                 followed by a comma and a reason in at most 5 words. Consider only the user's \
                 allergies ({allergies}) and verified health sources."
            ),
        },
        SectionPrompt {
            title: "Safety rank Evaluation",
            prompt: format!(
                "### Safety Score Evaluation for Ingredient: \"{ai_response}\"\n\n\
                 Say Safe or Unsafe in one word, then justify in at most 7 words, considering \
                 the user's health profile: {params}. Keep all dietary insights aligned with \
                 verified health sources."
            ),
        },
        SectionPrompt {
            title: "Final Verdict based on user profile",
            prompt: format!(
                "### Final Verdict on Ingredient: \"{ai_response}\"\n\n\
                 Give a conclusive analysis in at most 20 words stating the ingredient's safety \
                 status and regulatory basis, considering the user's health profile: {params}."
            ),
        },
        SectionPrompt {
            title: "Comprehensive Analysis based on user profile",
            prompt: format!(
                "### Comprehensive Analysis for Ingredient: \"{ai_response}\"\n\n\
                 In at most 35 words, evaluate safety rank and the user-specific health \
                 parameters: {params}. Then list the sources and regulations used and offer \
                 personalized dietary recommendations."
            ),
        },
    ]
}

// ─── Product Analysis & Comparison ───────────────────────────

/// Which half of the label a product-analysis prompt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSection {
    Ingredients,
    Nutrition,
}

/// Profile-aware FSSAI analysis prompt for one label image.
pub fn product_analysis_prompt(section: LabelSection, profile: &UserProfile) -> String {
    let profile_block = health_profile_block(profile);
    match section {
        LabelSection::Ingredients => format!(
            "First, extract and list all ingredients from this image. Then analyze them \
             considering FSSAI standards and the following user health profile:\n\
             {profile_block}\n\n\
             Please provide:\n\
             1. A list of all ingredients found in the image\n\
             2. Exactly 2 sentences:\n   \
             - First sentence: FSSAI compliance status and safety assessment\n   \
             - Second sentence: Key safety concerns based on the user's health profile\n\
             Keep the analysis clear and concise."
        ),
        LabelSection::Nutrition => format!(
            "First, extract and list all nutritional information from this image. Then \
             analyze it considering FSSAI standards and the following user health profile:\n\
             {profile_block}\n\n\
             Please provide:\n\
             1. A list of all nutritional values found in the image\n\
             2. Exactly 2 sentences:\n   \
             - First sentence: FSSAI compliance status and nutritional assessment\n   \
             - Second sentence: Health impact based on the user's health profile\n\
             Keep the analysis clear and concise."
        ),
    }
}

/// One product entry in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedProduct {
    pub ingredients: String,
    pub nutrition: String,
}

/// Aggregate prompt asking for a single-sentence recommendation.
pub fn comparison_prompt(products: &[ComparedProduct], profile: &UserProfile) -> String {
    let mut listing = String::new();
    for (i, product) in products.iter().enumerate() {
        listing.push_str(&format!(
            "\nProduct {}:\nAnalysis:\n{}\n{}\n",
            i + 1,
            product.ingredients,
            product.nutrition
        ));
    }

    format!(
        "Compare these {count} products considering FSSAI standards and the following user \
         health profile:\n\n\
         {profile}\n\n\
         Products to Compare:\n{listing}\n\
         Please provide exactly 1 sentence stating which product is the best choice and why, \
         considering:\n\
         1. FSSAI compliance\n\
         2. User's health conditions\n\
         3. Nutritional value\n\
         4. Safety concerns\n\
         5. Dietary restrictions\n\
         Name exactly one product as better than all of the others.",
        count = products.len(),
        profile = health_profile_block(profile),
    )
}

// ─── Chat ────────────────────────────────────────────────────

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// System prompt for the food-label assistant, with the recent conversation.
pub fn chat_system_prompt(recent: &[(Speaker, String)]) -> String {
    let start = recent.len().saturating_sub(CHAT_CONTEXT_MESSAGES);
    let context = recent[start..]
        .iter()
        .map(|(speaker, text)| {
            let who = match speaker {
                Speaker::User => "User",
                Speaker::Assistant => "Assistant",
            };
            format!("{}: {}", who, text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a specialized Food & Nutrition Assistant for HealthSnap, focused on analyzing \
         food labels and providing detailed nutritional information. Your expertise includes:\n\
         1. Food Label Analysis: ingredient lists, nutritional breakdown, FSSAI compliance \
         verification, allergen identification, health impact assessment\n\
         2. Product Comparison: nutritional values, ingredient quality, health benefits and \
         risks, healthier alternatives\n\
         3. Health & Safety: potential health concerns, beneficial ingredients, harmful \
         additives, dietary recommendations\n\
         4. HealthSnap knowledge: the food analysis system, FSSAI guidelines, common food \
         additives, nutritional labeling\n\n\
         Keep responses clear and structured, focused on food safety and nutrition, based on \
         scientific evidence, practical, easy to understand and relevant to the conversation.\n\n\
         Previous conversation context:\n{context}\n\n\
         If the question is not related to food or nutrition, politely redirect the user to ask \
         food-related questions."
    )
}
