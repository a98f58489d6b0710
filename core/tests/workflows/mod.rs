// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end workflow tests for the synccal-core crate.
//!
//! These tests drive the stores, the conflict collector, the calendar plotter and
//! the coordinator together, the way the application wires them.

mod calendar_plot;
mod conflict_review;
mod coordinator;
