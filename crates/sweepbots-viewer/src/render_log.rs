//! Default render backend: emits bridge calls as tracing events.

use sweepbots_core::{EntityId, WorldPos};
use sweepbots_world::{RenderBridge, VisualHandle, VisualKind};
use tracing::debug;

/// Stand-in renderer for running without an attached engine. Every bridge
/// call becomes a log line, which is enough to watch a run or pipe it
/// into tooling.
#[derive(Debug, Default)]
pub struct TracingRender {
    next_handle: u64,
}

impl TracingRender {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBridge for TracingRender {
    fn spawn_visual(
        &mut self,
        kind: VisualKind,
        id: Option<EntityId>,
        pos: WorldPos,
    ) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        debug!(
            "spawn {:?} id={:?} at ({}, {}, {})",
            kind, id, pos.x, pos.y, pos.z
        );
        handle
    }

    fn move_visual(&mut self, handle: VisualHandle, pos: WorldPos) {
        debug!("move {:?} to ({}, {}, {})", handle, pos.x, pos.y, pos.z);
    }

    fn set_visual_active(&mut self, handle: VisualHandle, active: bool) {
        debug!("set {:?} active={}", handle, active);
    }
}
