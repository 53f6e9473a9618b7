//! Configuration types for the viewer.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wire-protocol constants shared with the simulation server.
///
/// Frame cells carry integer codes; this table is the single source of
/// truth for what the numeric ranges mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// First robot id on the wire
    pub robot_id_base: u32,
    /// Robots created per spawn point; also the width of the robot id range
    pub robots_per_spawn: u32,
    /// Sentinel code: the trash originally at this cell is fully collected
    pub collected_code: i64,
    /// Static trash-bin echo code; carried in frames but ignored here
    pub trash_bin_code: i64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            robot_id_base: 100,
            robots_per_spawn: 5,
            collected_code: 400,
            trash_bin_code: 300,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Simulation server base URL
    pub server_url: String,
    /// Path to the static map text
    pub map_path: String,
    /// Session identifier (generated when unset)
    pub session_id: Option<String>,
    /// HTTP request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Wire code table
    pub protocol: ProtocolConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            map_path: "maps/demo.txt".to_string(),
            session_id: None,
            request_timeout_secs: 30,
            protocol: ProtocolConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
