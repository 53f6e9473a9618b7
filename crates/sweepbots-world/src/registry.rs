//! Stable-id tracking for dynamic entities.

use crate::render::VisualHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sweepbots_core::{EntityId, EntityKind, GridPos};
use tracing::warn;

/// Trash item ids live in their own namespace, well clear of the wire
/// protocol's robot id range.
const TRASH_ID_BASE: u32 = 1000;

/// A tracked dynamic entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: GridPos,
    pub active: bool,
    /// Handle the render bridge returned for this entity's visual, if any.
    pub visual: Option<VisualHandle>,
}

/// Authoritative `id -> Entity` mapping.
///
/// Single writer: mutated only by bootstrap and the frame applier, so no
/// internal locking is needed under the one-frame-in-flight polling model.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Entity>,
    trash_ids_issued: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` robots at `spawn` with ids `id_base..id_base+count`.
    /// They all share the spawn cell; frames spread them out once the
    /// simulation starts reporting positions.
    pub fn register_robots(&mut self, spawn: GridPos, id_base: u32, count: u32) -> Vec<EntityId> {
        (id_base..id_base + count)
            .map(|raw| {
                let id = EntityId(raw);
                self.entities.insert(
                    id,
                    Entity {
                        id,
                        kind: EntityKind::Robot,
                        position: spawn,
                        active: true,
                        visual: None,
                    },
                );
                id
            })
            .collect()
    }

    /// Create one collectible trash item at `cell` with a fresh local id.
    pub fn register_trash_item(&mut self, cell: GridPos) -> EntityId {
        let id = EntityId(TRASH_ID_BASE + self.trash_ids_issued);
        self.trash_ids_issued += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                kind: EntityKind::TrashItem,
                position: cell,
                active: true,
                visual: None,
            },
        );
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Attach the visual handle the render bridge returned for `id`.
    pub fn attach_visual(&mut self, id: EntityId, handle: VisualHandle) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.visual = Some(handle);
        }
    }

    /// Move a tracked robot, returning it for the caller to relay to the
    /// renderer. An unknown or non-robot id is a warn-logged no-op: the
    /// server may reference ids this client never spawned.
    pub fn set_position(&mut self, id: EntityId, position: GridPos) -> Option<&Entity> {
        match self.entities.get_mut(&id) {
            Some(entity) if entity.kind == EntityKind::Robot => {
                entity.position = position;
                Some(&*entity)
            }
            _ => {
                warn!("Frame referenced unknown robot id {}", id);
                None
            }
        }
    }

    /// Deactivate every active trash item at `position`. Coincident items
    /// all deactivate together; a collected item is never reactivated.
    pub fn deactivate_at(&mut self, position: GridPos) -> Vec<(EntityId, Option<VisualHandle>)> {
        let mut collected = Vec::new();
        for entity in self.entities.values_mut() {
            if entity.kind == EntityKind::TrashItem && entity.active && entity.position == position
            {
                entity.active = false;
                collected.push((entity.id, entity.visual));
            }
        }
        collected
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn robots(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Robot)
    }

    pub fn trash_items(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::TrashItem)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
