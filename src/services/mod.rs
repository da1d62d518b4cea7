// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ai;
pub mod analysis;
pub mod health;
pub mod password;
pub mod prompts;

pub use ai::{AiError, GeminiClient, GenerativeModel, PromptPart};
pub use analysis::{ProductAnalysis, VerdictMode, VerdictSection};
