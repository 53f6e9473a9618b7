//! Seam between the world model and whatever draws it.

use serde::{Deserialize, Serialize};
use sweepbots_core::{EntityId, WorldPos};

/// Opaque handle to a visual object owned by the renderer. The renderer
/// keys its own objects by entity id; it never owns simulation truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// What a visual represents. Terrain, bins and obstacles are static
/// scenery; robots and trash items track registry entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Terrain,
    TrashBin,
    Obstacle,
    Robot,
    TrashItem,
}

/// Narrow interface to the external renderer. The world model never
/// draws; it only emits these calls during bootstrap and frame
/// application.
pub trait RenderBridge {
    fn spawn_visual(
        &mut self,
        kind: VisualKind,
        id: Option<EntityId>,
        pos: WorldPos,
    ) -> VisualHandle;

    fn move_visual(&mut self, handle: VisualHandle, pos: WorldPos);

    fn set_visual_active(&mut self, handle: VisualHandle, active: bool);
}

/// Capture backend recording every bridge call, for tests and headless
/// runs.
#[derive(Debug, Default)]
pub struct RecordingRender {
    next_handle: u64,
    pub spawned: Vec<(VisualKind, Option<EntityId>, WorldPos)>,
    pub moves: Vec<(VisualHandle, WorldPos)>,
    pub activations: Vec<(VisualHandle, bool)>,
}

impl RecordingRender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned_of_kind(&self, kind: VisualKind) -> usize {
        self.spawned.iter().filter(|(k, _, _)| *k == kind).count()
    }
}

impl RenderBridge for RecordingRender {
    fn spawn_visual(
        &mut self,
        kind: VisualKind,
        id: Option<EntityId>,
        pos: WorldPos,
    ) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.spawned.push((kind, id, pos));
        handle
    }

    fn move_visual(&mut self, handle: VisualHandle, pos: WorldPos) {
        self.moves.push((handle, pos));
    }

    fn set_visual_active(&mut self, handle: VisualHandle, active: bool) {
        self.activations.push((handle, active));
    }
}
