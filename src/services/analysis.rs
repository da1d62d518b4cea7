// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Label analysis pipelines built on a [`GenerativeModel`].
//!
//! Handlers own request parsing and persistence; the functions here only
//! build prompts, call the model and shape the text that comes back.

use crate::models::{LabelImage, UserProfile};
use crate::services::ai::{AiError, GenerativeModel, PromptPart};
use crate::services::prompts::{self, ComparedProduct, LabelSection, SectionPrompt, Speaker};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Bounds on the number of products in one comparison.
pub const MIN_COMPARE_ITEMS: usize = 2;
pub const MAX_COMPARE_ITEMS: usize = 5;

/// Which prompt family a verdict request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictMode {
    /// Regulatory verdict only
    Fssai,
    /// Verdict personalized with the caller's health profile
    Personal,
}

/// One titled section of a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VerdictSection {
    pub title: String,
    pub content: String,
}

/// Analysis of one product's label images.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProductAnalysis {
    pub ingredients: String,
    pub nutrition: String,
    pub ai_response: String,
}

/// Extract label text: one model call per image, in capture order.
///
/// Calls are sequential and the responses are joined with a newline. Any
/// failure aborts the whole extraction.
pub async fn extract_label(
    model: &dyn GenerativeModel,
    images: &[LabelImage],
) -> Result<String, AiError> {
    let mut responses = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let text = model
            .generate(vec![
                PromptPart::text(prompts::extraction_prompt(index)),
                PromptPart::Image(image.clone()),
            ])
            .await?;
        responses.push(text);
    }
    Ok(responses.join("\n"))
}

/// Produce the four verdict sections for an AI response.
///
/// Never fails: a response without label content yields "Nil" sections in
/// regulatory mode, and any model error replaces every section with a fixed
/// error message.
pub async fn verdicts(
    model: &dyn GenerativeModel,
    ai_response: &str,
    mode: VerdictMode,
    profile: Option<&UserProfile>,
) -> Vec<VerdictSection> {
    let sections = match (mode, profile) {
        (VerdictMode::Personal, Some(profile)) => prompts::personal_sections(ai_response, profile),
        _ => {
            let sections = prompts::fssai_sections(ai_response);
            if !prompts::has_label_content(ai_response) {
                return fill_sections(&sections, |_| prompts::NO_LABEL_CONTENT.to_string());
            }
            sections
        }
    };

    let results = join_all(
        sections
            .iter()
            .map(|s| model.generate(vec![PromptPart::text(s.prompt.clone())])),
    )
    .await;

    let failed = results
        .iter()
        .any(|r| matches!(r, Err(e) if !matches!(e, AiError::EmptyResponse)));
    if failed {
        tracing::warn!(?mode, "Verdict generation failed");
        return fill_sections(&sections, |_| prompts::SECTION_FAILED.to_string());
    }

    sections
        .iter()
        .zip(results)
        .map(|(section, result)| VerdictSection {
            title: section.title.to_string(),
            content: result.unwrap_or_else(|_| prompts::NO_RESPONSE.to_string()),
        })
        .collect()
}

fn fill_sections(
    sections: &[SectionPrompt],
    content: impl Fn(&SectionPrompt) -> String,
) -> Vec<VerdictSection> {
    sections
        .iter()
        .map(|s| VerdictSection {
            title: s.title.to_string(),
            content: content(s),
        })
        .collect()
}

/// Profile-aware analysis of one product from its two label images.
pub async fn analyze_product(
    model: &dyn GenerativeModel,
    ingredients_image: LabelImage,
    nutrition_image: LabelImage,
    profile: &UserProfile,
) -> Result<ProductAnalysis, AiError> {
    let ingredients = model
        .generate(vec![
            PromptPart::text(prompts::product_analysis_prompt(
                LabelSection::Ingredients,
                profile,
            )),
            PromptPart::Image(ingredients_image),
        ])
        .await?;

    let nutrition = model
        .generate(vec![
            PromptPart::text(prompts::product_analysis_prompt(
                LabelSection::Nutrition,
                profile,
            )),
            PromptPart::Image(nutrition_image),
        ])
        .await?;

    let ai_response = format!(
        "Ingredients Analysis:\n{}\n\nNutrition Analysis:\n{}",
        ingredients, nutrition
    );

    Ok(ProductAnalysis {
        ingredients,
        nutrition,
        ai_response,
    })
}

/// Ask for a single-sentence recommendation across 2 to 5 products.
///
/// The caller checks the product count.
pub async fn compare(
    model: &dyn GenerativeModel,
    products: &[ComparedProduct],
    profile: &UserProfile,
) -> Result<String, AiError> {
    let prompt = prompts::comparison_prompt(products, profile);
    model.generate(vec![PromptPart::text(prompt)]).await
}

/// Answer a chat question. Never fails; errors become an apology message.
pub async fn chat(
    model: &dyn GenerativeModel,
    question: &str,
    image: Option<LabelImage>,
    history: &[(Speaker, String)],
) -> String {
    let question = if question.trim().is_empty() {
        prompts::CHAT_IMAGE_ONLY_QUESTION
    } else {
        question.trim()
    };

    let mut parts = vec![
        PromptPart::text(prompts::chat_system_prompt(history)),
        PromptPart::text(format!("User's question: {}", question)),
    ];
    if let Some(image) = image {
        parts.push(PromptPart::Image(image));
    }

    match model.generate(parts).await {
        Ok(answer) => answer,
        Err(AiError::EmptyResponse) => prompts::CHAT_FALLBACK.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Chat request failed");
            prompts::CHAT_FAILED.to_string()
        }
    }
}
