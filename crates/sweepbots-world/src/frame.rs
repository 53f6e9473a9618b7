//! Per-iteration frame parsing and diff application.

use crate::map::{parse_dimension, WorldGrid};
use crate::registry::EntityRegistry;
use crate::render::RenderBridge;
use serde::{Deserialize, Serialize};
use sweepbots_core::{CodeClass, EntityKind, Error, FrameCodes, GridPos, Result};
use tracing::debug;

/// One iteration's full grid snapshot as reported by the simulation
/// server. Transient: parsed, applied, dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub iteration: u64,
    pub height: usize,
    pub width: usize,
    pub codes: Vec<Vec<i64>>,
}

impl Frame {
    /// Parse a frame body: the same header+matrix shape as the map text,
    /// but cells are integer codes. Short rows pad with 0, an ignored
    /// code, matching the map parser's leniency. An unparsable token is a
    /// format error though; frame cells are integers by protocol.
    pub fn parse(iteration: u64, text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::Format("empty frame body".into()))?;

        let mut dims = header.split_whitespace();
        let height = parse_dimension(dims.next(), "height")?;
        let width = parse_dimension(dims.next(), "width")?;

        let mut codes = vec![vec![0i64; width]; height];
        for (row, line) in lines.take(height).enumerate() {
            for (col, token) in line.split_whitespace().take(width).enumerate() {
                codes[row][col] = token.parse().map_err(|_| {
                    Error::Format(format!(
                        "frame cell ({}, {}) is not an integer: {:?}",
                        row, col, token
                    ))
                })?;
            }
        }

        Ok(Self {
            iteration,
            height,
            width,
            codes,
        })
    }
}

/// Per-frame application counters, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub robots_moved: usize,
    pub items_collected: usize,
    pub unknown_entities: usize,
}

impl FrameStats {
    pub fn merge(&mut self, other: FrameStats) {
        self.robots_moved += other.robots_moved;
        self.items_collected += other.items_collected;
        self.unknown_entities += other.unknown_entities;
    }
}

/// Applies frames as state diffs against the registry, relaying the
/// resulting entity changes to the renderer.
#[derive(Debug, Clone)]
pub struct FrameApplier {
    codes: FrameCodes,
}

impl FrameApplier {
    pub fn new(codes: FrameCodes) -> Self {
        Self { codes }
    }

    /// Apply one frame. A dimension mismatch against the static grid is a
    /// format error raised before anything is mutated, so a rejected
    /// frame is discarded whole — there is no partial application.
    pub fn apply<R: RenderBridge>(
        &self,
        frame: &Frame,
        grid: &WorldGrid,
        registry: &mut EntityRegistry,
        render: &mut R,
    ) -> Result<FrameStats> {
        if frame.height != grid.height() || frame.width != grid.width() {
            return Err(Error::Format(format!(
                "frame {} is {}x{}, world is {}x{}",
                frame.iteration,
                frame.height,
                frame.width,
                grid.height(),
                grid.width()
            )));
        }

        let mut stats = FrameStats::default();
        for (row, row_codes) in frame.codes.iter().enumerate() {
            for (col, &code) in row_codes.iter().enumerate() {
                let pos = GridPos::new(row, col);
                match self.codes.classify(code) {
                    CodeClass::Robot(id) => match registry.set_position(id, pos) {
                        Some(robot) => {
                            if let Some(handle) = robot.visual {
                                render.move_visual(handle, pos.to_world(EntityKind::Robot));
                            }
                            stats.robots_moved += 1;
                        }
                        None => stats.unknown_entities += 1,
                    },
                    CodeClass::Collected => {
                        for (id, visual) in registry.deactivate_at(pos) {
                            if let Some(handle) = visual {
                                render.set_visual_active(handle, false);
                            }
                            debug!("Trash item {} collected at {}", id, pos);
                            stats.items_collected += 1;
                        }
                    }
                    CodeClass::Ignored => {}
                }
            }
        }

        debug!(
            "Applied frame {}: {} robots moved, {} collected, {} unknown ids",
            frame.iteration, stats.robots_moved, stats.items_collected, stats.unknown_entities
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::spawn_world;
    use crate::render::RecordingRender;
    use sweepbots_core::{EntityId, ProtocolConfig};

    fn scenario_world(
        robots_per_spawn: u32,
    ) -> (WorldGrid, EntityRegistry, RecordingRender, FrameApplier) {
        let grid = WorldGrid::parse("2 2\nS X\n. .").unwrap();
        let protocol = ProtocolConfig {
            robots_per_spawn,
            ..ProtocolConfig::default()
        };
        let mut registry = EntityRegistry::new();
        let mut render = RecordingRender::new();
        spawn_world(&grid, &protocol, &mut registry, &mut render);
        let applier = FrameApplier::new(FrameCodes::new(&protocol));
        (grid, registry, render, applier)
    }

    #[test]
    fn test_parse_frame() {
        let frame = Frame::parse(7, "2 2\n100 0\n0 400").unwrap();
        assert_eq!(frame.iteration, 7);
        assert_eq!(frame.codes, vec![vec![100, 0], vec![0, 400]]);
    }

    #[test]
    fn test_parse_frame_short_rows_pad_zero() {
        let frame = Frame::parse(0, "2 3\n100").unwrap();
        assert_eq!(frame.codes, vec![vec![100, 0, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn test_parse_frame_rejects_garbage() {
        assert!(Frame::parse(0, "").is_err());
        assert!(Frame::parse(0, "2\n0 0").is_err());
        assert!(Frame::parse(0, "2 2\n100 X").is_err());
    }

    #[test]
    fn test_robot_move_and_collection() {
        let (grid, mut registry, mut render, applier) = scenario_world(1);

        // Robot 100 reported at its spawn cell: position unchanged
        let frame = Frame::parse(0, "2 2\n100 0\n0 0").unwrap();
        let stats = applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        assert_eq!(stats.robots_moved, 1);
        assert_eq!(
            registry.entity(EntityId(100)).unwrap().position,
            GridPos::new(0, 0)
        );

        // Next frame collects the trash at (0, 1)
        let frame = Frame::parse(1, "2 2\n100 400\n0 0").unwrap();
        let stats = applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        assert_eq!(stats.items_collected, 1);
        let trash: Vec<_> = registry.trash_items().collect();
        assert!(!trash[0].active);
        // The renderer was told to hide the collected item's visual
        assert_eq!(render.activations.len(), 1);
        assert!(!render.activations[0].1);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (grid, mut registry, mut render, applier) = scenario_world(1);
        let frame = Frame::parse(0, "2 2\n0 400\n100 0").unwrap();

        applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        let positions: Vec<_> = registry.robots().map(|r| r.position).collect();
        let active: Vec<_> = registry.trash_items().map(|t| t.active).collect();

        let stats = applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        assert_eq!(stats.items_collected, 0);
        assert_eq!(
            registry.robots().map(|r| r.position).collect::<Vec<_>>(),
            positions
        );
        assert_eq!(
            registry.trash_items().map(|t| t.active).collect::<Vec<_>>(),
            active
        );
    }

    #[test]
    fn test_robot_round_trip_distinct_cells() {
        let grid = WorldGrid::parse("2 3\nS . .\n. . .").unwrap();
        let protocol = ProtocolConfig::default();
        let mut registry = EntityRegistry::new();
        let mut render = RecordingRender::new();
        spawn_world(&grid, &protocol, &mut registry, &mut render);
        let applier = FrameApplier::new(FrameCodes::new(&protocol));

        let frame = Frame::parse(0, "2 3\n100 101 102\n103 104 0").unwrap();
        let stats = applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        assert_eq!(stats.robots_moved, 5);

        let mut positions: Vec<_> = registry.robots().map(|r| r.position).collect();
        positions.sort_by_key(|p| (p.row, p.col));
        assert_eq!(
            positions,
            vec![
                GridPos::new(0, 0),
                GridPos::new(0, 1),
                GridPos::new(0, 2),
                GridPos::new(1, 0),
                GridPos::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_unknown_robot_id_is_counted_not_fatal() {
        // No spawn point, so no robot is ever registered
        let grid = WorldGrid::parse("2 2\n. X\n. .").unwrap();
        let protocol = ProtocolConfig::default();
        let mut registry = EntityRegistry::new();
        let mut render = RecordingRender::new();
        spawn_world(&grid, &protocol, &mut registry, &mut render);
        let applier = FrameApplier::new(FrameCodes::new(&protocol));

        // 103 is inside the robot code range but this client never spawned it
        let frame = Frame::parse(0, "2 2\n103 0\n0 0").unwrap();
        let stats = applier.apply(&frame, &grid, &mut registry, &mut render).unwrap();
        assert_eq!(stats.unknown_entities, 1);
        assert_eq!(stats.robots_moved, 0);
    }

    #[test]
    fn test_dimension_mismatch_discards_frame() {
        let (grid, mut registry, mut render, applier) = scenario_world(1);
        let before: Vec<_> = registry.robots().map(|r| r.position).collect();

        let frame = Frame::parse(0, "3 2\n0 400\n100 0\n0 0").unwrap();
        let err = applier
            .apply(&frame, &grid, &mut registry, &mut render)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        // Nothing was touched
        assert_eq!(
            registry.robots().map(|r| r.position).collect::<Vec<_>>(),
            before
        );
        assert!(registry.trash_items().all(|t| t.active));
        assert!(render.moves.is_empty());
    }
}
