// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::rc::Rc;

use crate::{EntityKind, SyncQuery, SyncReport, Synchronizer, UserPrompt};

/// Size of the visible area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A part of the screen that draws synchronized data.
pub trait Region {
    /// Rebuilds whatever the region derives from the collections and redraws it.
    fn replot(&mut self);

    /// Adjusts the layout to a new viewport.
    fn resize(&mut self, viewport: Viewport);
}

/// Where the latest synchronization cycle stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Success,
    /// Conflicts were reported, local data is kept and awaits review.
    Conflict,
    /// The server could not be reached, local edits stay unsynced until the next
    /// user-initiated sync.
    NetworkFailure,
}

const MSG_SYNCED: &str = "Synchronization completed";
const MSG_CONFLICT: &str =
    "Some changes conflict with the server, please review them before submitting again";
const MSG_NETWORK: &str =
    "Synchronization failed, your changes are kept and will be sent on the next sync";

/// Bootstraps synchronization and fans out replot and resize signals.
pub struct Coordinator {
    sync: Synchronizer,
    prompt: Rc<dyn UserPrompt>,
    regions: Vec<Box<dyn Region>>,
    state: SyncState,
    viewport: Viewport,
}

impl Coordinator {
    pub fn new(sync: Synchronizer, prompt: Rc<dyn UserPrompt>) -> Self {
        Self {
            sync,
            prompt,
            regions: Vec::new(),
            state: SyncState::Idle,
            viewport: Viewport::default(),
        }
    }

    /// Adds a child region.
    pub fn add_region(&mut self, region: Box<dyn Region>) {
        self.regions.push(region);
    }

    /// State of the latest synchronization cycle.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The last viewport seen.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Registers every entity type, runs a full synchronization and replots.
    #[tracing::instrument(skip(self))]
    pub async fn startup(&mut self) -> SyncState {
        self.sync.add_queries(&[
            SyncQuery::all(EntityKind::Person),
            SyncQuery::all(EntityKind::Schedule),
        ]);
        self.cycle(false).await
    }

    /// Synchronizes on user request and replots.
    ///
    /// The success message is skipped when the server reported conflicts.
    #[tracing::instrument(skip(self))]
    pub async fn sync_now(&mut self) -> SyncState {
        self.cycle(true).await
    }

    /// Signals every region to adjust to the new viewport.
    pub fn on_resize(&mut self, viewport: Viewport) {
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
        for region in &mut self.regions {
            region.resize(viewport);
        }
    }

    /// Signals every region to replot.
    pub fn replot(&mut self) {
        tracing::debug!(regions = self.regions.len(), "replotting regions");
        for region in &mut self.regions {
            region.replot();
        }
    }

    async fn cycle(&mut self, alert_success: bool) -> SyncState {
        self.state = SyncState::Syncing;
        let result = self.sync.sync().await;
        self.state = match result {
            Ok(report) => self.on_report(report, alert_success),
            Err(err) => {
                tracing::warn!(%err, "synchronization failed");
                self.prompt.alert(&format!("{MSG_NETWORK}: {err}"));
                SyncState::NetworkFailure
            }
        };

        // conflicting data is still local data, it stays on the calendar
        self.replot();
        self.state
    }

    fn on_report(&self, report: SyncReport, alert_success: bool) -> SyncState {
        if report.is_conflict() {
            self.prompt.alert(MSG_CONFLICT);
            SyncState::Conflict
        } else if report.is_duplicate() {
            // the duplicate-id subscribers have asked for a new identifier already
            SyncState::Conflict
        } else {
            if alert_success {
                self.prompt.alert(MSG_SYNCED);
            }
            SyncState::Success
        }
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("sync", &self.sync)
            .field("regions", &self.regions.len())
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .finish()
    }
}
