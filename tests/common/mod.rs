// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::response::Response;
use healthsnap::config::Config;
use healthsnap::db::FirestoreDb;
use healthsnap::routes::create_router;
use healthsnap::services::{AiError, GenerativeModel, PromptPart};
use healthsnap::AppState;
use std::sync::{Arc, Mutex};

/// A tiny valid PNG payload as a data URL.
#[allow(dead_code)]
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Generative model that replays scripted replies and records its prompts.
///
/// Once the script runs out every call answers "ok".
#[derive(Default)]
pub struct FakeModel {
    replies: Mutex<Vec<Result<String, AiError>>>,
    calls: Mutex<Vec<Vec<PromptPart>>>,
}

#[allow(dead_code)]
impl FakeModel {
    pub fn scripted(replies: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::scripted(
            (0..8)
                .map(|_| {
                    Err(AiError::Status {
                        status: 503,
                        body: "unavailable".to_string(),
                    })
                })
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<Vec<PromptPart>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String, AiError> {
        self.calls.lock().unwrap().push(parts);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok("ok".to_string())
        } else {
            replies.remove(0)
        }
    }
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_model(Arc::new(FakeModel::default()))
}

/// Create a test app with an offline database and the given model.
#[allow(dead_code)]
pub fn create_test_app_with_model(model: Arc<FakeModel>) -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), test_db_offline(), model)
}

/// Create a test app from explicit parts.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    db: FirestoreDb,
    model: Arc<FakeModel>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState { config, db, model });

    (create_router(state.clone()), state)
}

/// Create a session token the auth middleware accepts.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, email: &str, signing_key: &[u8]) -> String {
    healthsnap::middleware::auth::create_jwt(uid, email, signing_key)
        .expect("Failed to create JWT")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
