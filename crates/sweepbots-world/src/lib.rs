//! World model for the sweepbots viewer.
//!
//! Parses the static map text, tracks dynamic entities under stable ids,
//! and applies per-iteration simulation frames as diffs that drive an
//! external renderer through a narrow bridge.

pub mod bootstrap;
pub mod frame;
pub mod map;
pub mod registry;
pub mod render;

pub use bootstrap::{spawn_world, BootstrapSummary};
pub use frame::{Frame, FrameApplier, FrameStats};
pub use map::WorldGrid;
pub use registry::{Entity, EntityRegistry};
pub use render::{RecordingRender, RenderBridge, VisualHandle, VisualKind};
