//! SyncRegionUseCase: keeps every registered tablet mapped onto the target
//! window.
//!
//! This use case is the heart of the daemon.  It consumes compositor events
//! strictly in arrival order, keeps the [`TabletRegistry`] in step with
//! input attach/detach notifications, and on every geometry-changing window
//! event runs a *mapping pass*:
//!
//! ```text
//! GET_TREE ──► find_target_window ──► for each registered tablet:
//!                                        size lookup ──► overscan ──► RUN_COMMAND
//! ```
//!
//! # Architecture
//!
//! The use case depends only on the [`CompositorIpc`] trait and domain types.
//! The sway socket adapter is injected at construction time, making the use
//! case fully unit-testable against a mock.
//!
//! # Failure handling
//!
//! Nothing that happens during a pass stops the loop: unknown tablet models
//! are skipped, a missing target window makes the pass a no-op, a rejected
//! command is logged and the remaining tablets still get theirs, and a failed
//! tree fetch is logged before waiting for the next event.

use std::ops::ControlFlow;
use std::sync::Arc;

use tabletmap_core::domain::region::MappingRectangle;
use tabletmap_core::{find_target_window, CompositorEvent, InputDescriptor, SizeTable};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::application::manage_tablets::TabletRegistry;
use crate::infrastructure::ipc::{CompositorIpc, IpcError};

/// Outcome of one mapping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Commands the compositor accepted.
    pub commands_sent: usize,
    /// Tablets skipped because their model is not in the size table.
    pub skipped_unknown: usize,
    /// Commands the compositor rejected.
    pub failed: usize,
}

/// The Sync Region use case.
pub struct SyncRegionUseCase {
    ipc: Arc<dyn CompositorIpc>,
    registry: TabletRegistry,
    sizes: SizeTable,
    target_app_id: String,
    remap_on_attach: bool,
}

impl SyncRegionUseCase {
    /// Creates a use case with an empty registry.
    pub fn new(
        ipc: Arc<dyn CompositorIpc>,
        sizes: SizeTable,
        target_app_id: impl Into<String>,
    ) -> Self {
        Self {
            ipc,
            registry: TabletRegistry::new(),
            sizes,
            target_app_id: target_app_id.into(),
            remap_on_attach: false,
        }
    }

    /// Enables a mapping pass right after a new tablet is registered.
    pub fn with_remap_on_attach(mut self, enabled: bool) -> Self {
        self.remap_on_attach = enabled;
        self
    }

    /// Returns the registry of attached tablets.
    pub fn registry(&self) -> &TabletRegistry {
        &self.registry
    }

    /// Returns the app id of the window tablets are mapped onto.
    pub fn target_app_id(&self) -> &str {
        &self.target_app_id
    }

    /// Registers every tablet tool the compositor currently reports.
    ///
    /// Returns the number of newly registered tablets.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the input list cannot be fetched.
    pub async fn seed(&mut self) -> Result<usize, IpcError> {
        let inputs = self.ipc.get_inputs().await?;
        let mut added = 0;
        for tablet in inputs.iter().filter_map(InputDescriptor::as_tablet) {
            if self.registry.add(tablet) {
                added += 1;
            }
        }

        info!("registered {added} tablet(s) at startup");
        Ok(added)
    }

    /// Consumes `events` until the compositor shuts down or the stream closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<CompositorEvent>) {
        while let Some(event) = events.recv().await {
            if self.handle_event(event).await.is_break() {
                info!("compositor is shutting down; stopping");
                return;
            }
        }
        info!("compositor event stream closed; stopping");
    }

    /// Applies one event.  Returns `Break` when the loop should stop.
    pub async fn handle_event(&mut self, event: CompositorEvent) -> ControlFlow<()> {
        match event {
            CompositorEvent::WindowCreated(_)
            | CompositorEvent::WindowMoved(_)
            | CompositorEvent::WindowClosed(_)
            | CompositorEvent::WindowFloating(_)
            | CompositorEvent::WindowFullscreen(_) => {
                self.sync_logged().await;
            }
            CompositorEvent::InputAdded(input) => {
                let Some(tablet) = input.as_tablet() else {
                    debug!("ignoring attached {} {}", input.device_type, input.identifier);
                    return ControlFlow::Continue(());
                };
                if self.registry.add(tablet) {
                    info!("tablet attached: {}", input.identifier);
                    if self.remap_on_attach {
                        self.sync_logged().await;
                    }
                }
            }
            CompositorEvent::InputRemoved(input) => {
                let Some(tablet) = input.as_tablet() else {
                    return ControlFlow::Continue(());
                };
                match self.registry.remove(&tablet) {
                    Ok(()) => info!("tablet detached: {}", input.identifier),
                    Err(e) => warn!("{e}"),
                }
            }
            CompositorEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Runs one mapping pass.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the layout tree cannot be fetched.
    /// Rejected commands are counted in the report, not returned.
    pub async fn sync_mapping(&self) -> Result<SyncReport, IpcError> {
        let mut report = SyncReport::default();
        if self.registry.is_empty() {
            debug!("no tablets registered; skipping mapping pass");
            return Ok(report);
        }

        let tree = self.ipc.get_tree().await?;
        let Some(window) = find_target_window(&tree, &self.target_app_id) else {
            debug!("no visible {} window", self.target_app_id);
            return Ok(report);
        };
        let rect = window.rect;

        for tablet in self.registry.all() {
            let Some(size) = self.sizes.lookup(tablet.vendor_id, tablet.product_id) else {
                warn!(
                    "no physical size known for {} ({:04x}:{:04x}); skipping",
                    tablet.identifier, tablet.vendor_id, tablet.product_id
                );
                report.skipped_unknown += 1;
                continue;
            };
            let Some(region) = MappingRectangle::for_window(size, rect) else {
                debug!("target window has no area; skipping {}", tablet.identifier);
                continue;
            };

            let command = region.command_for(&tablet).to_string();
            match self.ipc.run_command(&command).await {
                Ok(()) => {
                    debug!("{command}");
                    report.commands_sent += 1;
                }
                Err(e) => {
                    warn!("{command} failed: {e}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn sync_logged(&self) {
        match self.sync_mapping().await {
            Ok(report) => debug!(?report, "mapping pass done"),
            Err(e) => error!("mapping pass failed: {e}"),
        }
    }
}
