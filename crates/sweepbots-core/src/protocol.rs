//! Frame-code classification.

use crate::config::ProtocolConfig;
use crate::types::EntityId;
use std::ops::Range;

/// Semantic meaning of one frame cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeClass {
    /// The robot with this id occupies the cell.
    Robot(EntityId),
    /// The trash item originally at the cell has been fully collected.
    Collected,
    /// Reserved or static echo; no effect on this client.
    Ignored,
}

/// Lookup table mapping raw frame codes to semantic actions.
#[derive(Debug, Clone)]
pub struct FrameCodes {
    robot_ids: Range<i64>,
    collected: i64,
}

impl FrameCodes {
    pub fn new(config: &ProtocolConfig) -> Self {
        let base = i64::from(config.robot_id_base);
        Self {
            robot_ids: base..base + i64::from(config.robots_per_spawn),
            collected: config.collected_code,
        }
    }

    pub fn classify(&self, code: i64) -> CodeClass {
        if self.robot_ids.contains(&code) {
            CodeClass::Robot(EntityId(code as u32))
        } else if code == self.collected {
            CodeClass::Collected
        } else {
            CodeClass::Ignored
        }
    }
}

impl Default for FrameCodes {
    fn default() -> Self {
        Self::new(&ProtocolConfig::default())
    }
}
