//! One-time world construction from the parsed map.

use crate::map::WorldGrid;
use crate::registry::EntityRegistry;
use crate::render::{RenderBridge, VisualKind};
use sweepbots_core::{CellKind, EntityKind, ProtocolConfig};
use tracing::info;

/// Counts of what bootstrap created, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub robots: usize,
    pub trash_items: usize,
    pub visuals: usize,
}

/// Spawn the static scenery and the initial dynamic entities for `grid`.
///
/// All robots at one spawn point start co-located; simulation frames
/// spread them out. Id blocks are contiguous per spawn point, later spawn
/// points taking the next consecutive block. Obstacle cells are trash
/// sources, so they register a collectible item alongside their scenery.
pub fn spawn_world<R: RenderBridge>(
    grid: &WorldGrid,
    protocol: &ProtocolConfig,
    registry: &mut EntityRegistry,
    render: &mut R,
) -> BootstrapSummary {
    let mut summary = BootstrapSummary::default();

    // One ground tile per cell
    for (pos, _) in grid.iter() {
        render.spawn_visual(VisualKind::Terrain, None, pos.ground());
        summary.visuals += 1;
    }

    let mut next_id_base = protocol.robot_id_base;
    for (pos, kind) in grid.iter() {
        match kind {
            CellKind::TrashBin => {
                render.spawn_visual(VisualKind::TrashBin, None, pos.ground());
                summary.visuals += 1;
            }
            CellKind::SpawnPoint => {
                let ids = registry.register_robots(pos, next_id_base, protocol.robots_per_spawn);
                next_id_base += protocol.robots_per_spawn;
                for id in ids {
                    let handle = render.spawn_visual(
                        VisualKind::Robot,
                        Some(id),
                        pos.to_world(EntityKind::Robot),
                    );
                    registry.attach_visual(id, handle);
                    summary.robots += 1;
                    summary.visuals += 1;
                }
            }
            CellKind::Obstacle | CellKind::TrashPile(_) => {
                let visual_kind = if kind == CellKind::Obstacle {
                    VisualKind::Obstacle
                } else {
                    VisualKind::TrashItem
                };
                let id = registry.register_trash_item(pos);
                let handle = render.spawn_visual(
                    visual_kind,
                    Some(id),
                    pos.to_world(EntityKind::TrashItem),
                );
                registry.attach_visual(id, handle);
                summary.trash_items += 1;
                summary.visuals += 1;
            }
            CellKind::Empty => {}
        }
    }

    info!(
        "World bootstrapped: {} robots, {} trash items, {} visuals",
        summary.robots, summary.trash_items, summary.visuals
    );

    summary
}
