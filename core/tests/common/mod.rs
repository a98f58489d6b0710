// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - A scripted sync manager standing in for the server
//! - A prompt recording what the user would have seen
//! - Test data factories (fixtures)
//! - Temporary directory management with auto-cleanup

#![allow(dead_code)]

mod fake_sync;
mod fixtures;
mod prompt;
mod temp_dir;

#[allow(unused_imports)]
pub use fake_sync::{FakeSyncManager, Scripted};
#[allow(unused_imports)]
pub use fixtures::{Harness, conflict_payload, person_draft, schedule_draft, schedule_json};
#[allow(unused_imports)]
pub use prompt::RecordingPrompt;
#[allow(unused_imports)]
pub use temp_dir::setup_temp_dirs;
