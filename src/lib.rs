// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HealthSnap: personalized food-label analysis
//!
//! This crate provides the backend API for scanning packaged-food labels,
//! analyzing them with a generative vision model, and judging the result
//! against the user's stored health profile.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::GenerativeModel;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub model: Arc<dyn GenerativeModel>,
}
