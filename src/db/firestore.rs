// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (login credentials)
//! - Users (health profiles)
//! - ocrData (label scan records)
//! - Barcodes (scanned-code links to cached analyses)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Account, BarcodeRecord, ScanRecord, UserProfile};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 10;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Error to report when the profile write of a registration failed.
///
/// A failed rollback leaves an account without a profile; it is logged and
/// carried in the returned error.
fn registration_failure<E: std::fmt::Display>(
    uid: &str,
    profile_err: AppError,
    rollback: Result<(), E>,
) -> AppError {
    match rollback {
        Ok(()) => profile_err,
        Err(rollback_err) => {
            tracing::error!(uid, error = %rollback_err, "Account rollback failed");
            AppError::Database(format!(
                "{}; account rollback failed: {}",
                profile_err, rollback_err
            ))
        }
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // With the emulator, use an unauthenticated connection so no local
        // credentials are picked up.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Get credentials by normalized email.
    pub async fn get_account(&self, email_key: &str) -> Result<Option<Account>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(email_key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an account and its profile.
    ///
    /// The account insert fails with `Conflict` if the email is taken. If the
    /// profile write then fails, the account is removed again so the email
    /// can be reused.
    pub async fn register_user(
        &self,
        email_key: &str,
        account: &Account,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let inserted: Result<Account, _> = client
            .fluent()
            .insert()
            .into(collections::ACCOUNTS)
            .document_id(email_key)
            .object(account)
            .execute()
            .await;

        match inserted {
            Ok(_) => {}
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        if let Err(e) = self.upsert_profile(profile).await {
            tracing::warn!(uid = %account.uid, "Profile write failed, rolling back account");
            let rollback: Result<(), _> = client
                .fluent()
                .delete()
                .from(collections::ACCOUNTS)
                .document_id(email_key)
                .execute()
                .await;
            return Err(registration_failure(&account.uid, e, rollback));
        }

        Ok(())
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a health profile by user ID.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a profile (last write wins).
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Scan Operations ─────────────────────────────────────────

    /// Store a new scan record.
    pub async fn add_scan(&self, scan: &ScanRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::OCR_DATA)
            .document_id(&scan.id)
            .object(scan)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a scan record by ID.
    pub async fn get_scan(&self, id: &str) -> Result<Option<ScanRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::OCR_DATA)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get several scans by ID, preserving the order of `ids`.
    ///
    /// Missing documents come back as `None`.
    pub async fn get_scans(&self, ids: &[String]) -> Result<Vec<Option<ScanRecord>>, AppError> {
        stream::iter(ids.to_vec())
            .map(|id| async move { self.get_scan(&id).await })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<ScanRecord>, AppError>>>()
            .await
            .into_iter()
            .collect()
    }

    /// Scan history for one owner, newest first.
    pub async fn list_scans_for_owner(
        &self,
        user_email: &str,
        limit: u32,
    ) -> Result<Vec<ScanRecord>, AppError> {
        let user_email = user_email.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::OCR_DATA)
            .filter(move |q| q.field("user_email").eq(user_email.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Barcode Operations ──────────────────────────────────────

    /// Create or replace a barcode record (last write wins).
    pub async fn upsert_barcode(&self, record: &BarcodeRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BARCODES)
            .document_id(&record.barcode_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a barcode record by ID.
    pub async fn get_barcode(&self, barcode_id: &str) -> Result<Option<BarcodeRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BARCODES)
            .obj()
            .one(barcode_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Barcode history, most recently updated first.
    pub async fn list_barcodes(&self, limit: u32) -> Result<Vec<BarcodeRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BARCODES)
            .order_by([("updated_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a barcode record whose attached code equals `code` exactly.
    pub async fn find_barcode_by_code(&self, code: &str) -> Result<Option<BarcodeRecord>, AppError> {
        let code = code.to_string();
        let mut found: Vec<BarcodeRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BARCODES)
            .filter(move |q| q.field("scanned_code").eq(code.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.pop())
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── Account Deletion ────────────────────────────────────────

    /// Delete all data for a user.
    ///
    /// Deletes:
    /// - every `ocrData` record owned by `user_email`
    /// - `Users/{uid}`
    /// - `accounts/{email_key}`
    ///
    /// Barcode records are shared and are left in place.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(
        &self,
        uid: &str,
        user_email: &str,
        email_key: &str,
    ) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Delete all scan records
        let owner = user_email.to_string();
        let scans: Vec<ScanRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::OCR_DATA)
            .filter(move |q| q.field("user_email").eq(owner.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = scans.len();
        self.batch_delete(&scans, collections::OCR_DATA, |scan: &ScanRecord| {
            scan.id.clone()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(uid, count, "Deleted scan records");

        // 2. Delete the profile
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(uid, "Deleted user profile");

        // 3. Delete the credentials
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::ACCOUNTS)
            .document_id(email_key)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;

        tracing::info!(uid, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
