// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tests of the person and schedule store adapters against a scripted sync manager.

mod person_store;
mod schedule_store;
