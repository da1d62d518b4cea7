// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{
    AppError, Result, BARCODE_HISTORY_FAILED, COMPARISON_FAILED, EXTRACTION_FAILED,
};
use crate::middleware::auth::{AuthUser, SESSION_COOKIE};
use crate::models::account::normalize_email;
use crate::models::barcode::find_match;
use crate::models::{
    BarcodeRecord, LabelImage, MatchStatus, ProfileFields, ScanRecord, ScannedImages,
    UserProfile,
};
use crate::services::analysis::{
    self, ProductAnalysis, VerdictMode, VerdictSection, MAX_COMPARE_ITEMS, MIN_COMPARE_ITEMS,
};
use crate::services::prompts::{ComparedProduct, Speaker};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_HISTORY_LIMIT: u32 = 10;
const MAX_HISTORY_LIMIT: u32 = 50;
/// How many recent barcode records a lookup searches before falling back to
/// an exact query.
pub const BARCODE_LOOKUP_CANDIDATES: u32 = 100;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/account", delete(delete_account))
        .route("/api/scans", post(create_scan).get(list_scans))
        .route("/api/scans/{id}", get(get_scan))
        .route("/api/verdicts", post(create_verdict))
        .route("/api/products/analyze", post(analyze_product))
        .route("/api/compare", post(compare_products))
        .route("/api/barcodes", post(create_barcode).get(list_barcodes))
        .route("/api/barcodes/{id}", put(update_barcode))
        .route("/api/barcodes/lookup", post(lookup_barcode))
        .route("/api/chat", post(chat))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<u32>,
}

impl HistoryQuery {
    fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

fn parse_image(data_url: &str) -> Result<LabelImage> {
    LabelImage::from_data_url(data_url).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

async fn load_profile(state: &AppState, uid: &str) -> Result<UserProfile> {
    state
        .db
        .get_profile(uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))
}

// ─── User Profile ────────────────────────────────────────────

/// Get the caller's health profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    Ok(Json(load_profile(&state, &user.uid).await?))
}

/// Partially update the caller's profile. Last write wins.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<UserProfile>> {
    fields.validate()?;

    let mut profile = load_profile(&state, &user.uid).await?;
    fields.apply_to(&mut profile);
    profile.updated_at = now_rfc3339();

    state.db.upsert_profile(&profile).await?;

    tracing::info!(uid = %user.uid, "Profile updated");

    Ok(Json(profile))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
    pub deleted_documents: usize,
}

/// Delete the caller's credentials, profile and scan history, and end the session.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DeleteAccountResponse>)> {
    tracing::info!(uid = %user.uid, "User-initiated account deletion");

    let deleted = state
        .db
        .delete_user_data(&user.uid, &user.email, &normalize_email(&user.email))
        .await?;

    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure);

    Ok((
        jar.remove(removal),
        Json(DeleteAccountResponse {
            success: true,
            message: "Account deleted. All data has been removed.".to_string(),
            deleted_documents: deleted,
        }),
    ))
}

// ─── Scans ───────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateScanRequest {
    /// Data URLs in capture order: ingredients, then nutrition
    #[validate(length(min = 1, max = 2, message = "Provide one or two label images"))]
    images: Vec<String>,
    /// Text recognized on the device, if any
    #[serde(default)]
    recognized_text: Option<String>,
}

/// Extract label text from captured images and store the result.
///
/// Nothing is stored when extraction fails.
async fn create_scan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateScanRequest>,
) -> Result<(StatusCode, Json<ScanRecord>)> {
    body.validate()?;

    let images = body
        .images
        .iter()
        .map(|url| parse_image(url))
        .collect::<Result<Vec<_>>>()?;

    let ai_response = analysis::extract_label(state.model.as_ref(), &images)
        .await
        .map_err(|e| {
            tracing::warn!(uid = %user.uid, error = %e, "Label extraction failed");
            AppError::AiService(EXTRACTION_FAILED)
        })?;

    let record = ScanRecord {
        id: uuid::Uuid::new_v4().to_string(),
        ai_response,
        scanned_images: ScannedImages::from_captures(&body.images),
        recognized_text: body.recognized_text.filter(|t| !t.trim().is_empty()),
        user_email: user.email.clone(),
        created_at: now_rfc3339(),
    };

    state.db.add_scan(&record).await?;

    tracing::info!(
        uid = %user.uid,
        scan_id = %record.id,
        images = images.len(),
        "Stored label scan"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// Caller's scan history, newest first.
async fn list_scans(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ScanRecord>>> {
    let scans = state
        .db
        .list_scans_for_owner(&user.email, params.limit())
        .await?;
    Ok(Json(scans))
}

/// One scan record. Records owned by other users are reported as missing.
async fn get_scan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ScanRecord>> {
    state
        .db
        .get_scan(&id)
        .await?
        .filter(|scan| scan.user_email == user.email)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Scan {} not found", id)))
}

// ─── Verdicts ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct VerdictRequest {
    #[validate(custom(function = "not_blank", message = "No AI response to evaluate"))]
    ai_response: String,
    mode: VerdictMode,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VerdictResponse {
    pub sections: Vec<VerdictSection>,
}

/// Four-section safety verdict for an AI response.
async fn create_verdict(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<VerdictRequest>,
) -> Result<Json<VerdictResponse>> {
    body.validate()?;

    let profile = match body.mode {
        VerdictMode::Personal => Some(load_profile(&state, &user.uid).await?),
        VerdictMode::Fssai => None,
    };

    let sections = analysis::verdicts(
        state.model.as_ref(),
        &body.ai_response,
        body.mode,
        profile.as_ref(),
    )
    .await;

    Ok(Json(VerdictResponse { sections }))
}

// ─── Product Comparison ──────────────────────────────────────

#[derive(Deserialize)]
struct AnalyzeProductRequest {
    ingredients_image: String,
    nutrition_image: String,
}

/// Analyze one product for comparison. Not stored.
async fn analyze_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AnalyzeProductRequest>,
) -> Result<Json<ProductAnalysis>> {
    let ingredients = parse_image(&body.ingredients_image)?;
    let nutrition = parse_image(&body.nutrition_image)?;
    let profile = load_profile(&state, &user.uid).await?;

    let result = analysis::analyze_product(state.model.as_ref(), ingredients, nutrition, &profile)
        .await
        .map_err(|e| {
            tracing::warn!(uid = %user.uid, error = %e, "Product analysis failed");
            AppError::AiService(EXTRACTION_FAILED)
        })?;

    Ok(Json(result))
}

#[derive(Deserialize)]
struct ProductInput {
    ingredients: String,
    nutrition: String,
}

#[derive(Deserialize)]
struct CompareRequest {
    /// Stored scans owned by the caller
    #[serde(default)]
    scan_ids: Vec<String>,
    /// Analyses produced by `/api/products/analyze`
    #[serde(default)]
    products: Vec<ProductInput>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompareResponse {
    pub recommendation: String,
    pub product_count: usize,
}

/// Single-sentence recommendation across 2 to 5 products.
async fn compare_products(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CompareRequest>,
) -> Result<Json<CompareResponse>> {
    let count = body.scan_ids.len() + body.products.len();
    if !(MIN_COMPARE_ITEMS..=MAX_COMPARE_ITEMS).contains(&count) {
        return Err(AppError::BadRequest(format!(
            "Select between {} and {} products to compare",
            MIN_COMPARE_ITEMS, MAX_COMPARE_ITEMS
        )));
    }

    let mut products = Vec::with_capacity(count);
    let scans = state.db.get_scans(&body.scan_ids).await?;
    for (id, scan) in body.scan_ids.iter().zip(scans) {
        let scan = scan
            .filter(|s| s.user_email == user.email)
            .ok_or_else(|| AppError::NotFound(format!("Scan {} not found", id)))?;
        products.push(ComparedProduct {
            ingredients: scan.ai_response,
            nutrition: String::new(),
        });
    }
    products.extend(body.products.into_iter().map(|p| ComparedProduct {
        ingredients: p.ingredients,
        nutrition: p.nutrition,
    }));

    let profile = load_profile(&state, &user.uid).await?;

    let recommendation = analysis::compare(state.model.as_ref(), &products, &profile)
        .await
        .map_err(|e| {
            tracing::warn!(uid = %user.uid, error = %e, "Comparison failed");
            AppError::AiService(COMPARISON_FAILED)
        })?;

    tracing::info!(uid = %user.uid, count, "Generated product comparison");

    Ok(Json(CompareResponse {
        recommendation,
        product_count: count,
    }))
}

// ─── Barcodes ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateBarcodeRequest {
    #[validate(custom(function = "not_blank", message = "No AI response to link"))]
    ai_response: String,
}

/// Link an AI response to a new, not yet scanned, barcode record.
async fn create_barcode(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateBarcodeRequest>,
) -> Result<(StatusCode, Json<BarcodeRecord>)> {
    body.validate()?;

    let now = now_rfc3339();
    let record = BarcodeRecord {
        barcode_id: uuid::Uuid::new_v4().to_string(),
        scanned_code: String::new(),
        product_name: None,
        ai_response: body.ai_response,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_barcode(&record).await?;

    tracing::info!(uid = %user.uid, barcode_id = %record.barcode_id, "Created barcode record");

    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize, Validate)]
struct UpdateBarcodeRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "No barcode scanned!"))]
    scanned_code: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Please enter a product name!"))]
    product_name: String,
}

/// Attach a scanned code and product name. Last write wins.
async fn update_barcode(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBarcodeRequest>,
) -> Result<Json<BarcodeRecord>> {
    body.validate()?;

    let mut record = state
        .db
        .get_barcode(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Barcode {} not found", id)))?;

    record.scanned_code = body.scanned_code;
    record.product_name = Some(body.product_name.trim().to_string());
    record.updated_at = now_rfc3339();

    state.db.upsert_barcode(&record).await?;

    tracing::info!(uid = %user.uid, barcode_id = %id, "Attached barcode");

    Ok(Json(record))
}

/// Barcode history, most recently updated first.
async fn list_barcodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<BarcodeRecord>>> {
    Ok(Json(state.db.list_barcodes(params.limit()).await?))
}

#[derive(Deserialize)]
struct LookupRequest {
    #[serde(default)]
    code: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LookupResponse {
    pub status: MatchStatus,
    pub record: Option<BarcodeRecord>,
}

/// Look a scanned code up by exact equality against stored records.
///
/// Recent history is searched first; older records are found with an
/// equality query on the stored code.
async fn lookup_barcode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LookupRequest>,
) -> Result<Json<LookupResponse>> {
    let storage_failure = |e: AppError| {
        tracing::error!(error = %e, "Barcode lookup failed");
        AppError::Storage(BARCODE_HISTORY_FAILED)
    };

    let candidates = state
        .db
        .list_barcodes(BARCODE_LOOKUP_CANDIDATES)
        .await
        .map_err(storage_failure)?;

    let mut record = find_match(&candidates, &body.code).cloned();
    if record.is_none() && !body.code.is_empty() {
        record = state
            .db
            .find_barcode_by_code(&body.code)
            .await
            .map_err(storage_failure)?;
    }

    let status = if record.is_some() {
        MatchStatus::Found
    } else {
        MatchStatus::NotFound
    };

    tracing::debug!(?status, candidates = candidates.len(), "Barcode lookup");

    Ok(Json(LookupResponse { status, record }))
}

// ─── Ask-AI Chat ─────────────────────────────────────────────

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ChatRole {
    User,
    Assistant,
}

#[derive(Deserialize)]
struct ChatMessage {
    role: ChatRole,
    text: String,
}

#[derive(Deserialize, Validate)]
struct ChatRequest {
    #[serde(default)]
    #[validate(length(max = 4000, message = "Question is too long"))]
    question: String,
    /// Optional food label as a data URL
    #[serde(default)]
    image: Option<String>,
    /// Client-held conversation, oldest first
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatResponse {
    pub answer: String,
}

/// Answer a food or nutrition question.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    body.validate()?;

    let image = body.image.as_deref().map(parse_image).transpose()?;
    if body.question.trim().is_empty() && image.is_none() {
        return Err(AppError::BadRequest(
            "Ask a question or attach a label image".to_string(),
        ));
    }

    let history: Vec<(Speaker, String)> = body
        .history
        .into_iter()
        .map(|m| {
            let speaker = match m.role {
                ChatRole::User => Speaker::User,
                ChatRole::Assistant => Speaker::Assistant,
            };
            (speaker, m.text)
        })
        .collect();

    let answer = analysis::chat(state.model.as_ref(), &body.question, image, &history).await;

    Ok(Json(ChatResponse { answer }))
}
