//! Iteration-polling synchronization engine.

use sweepbots_core::{FrameCodes, Result};
use sweepbots_world::{EntityRegistry, Frame, FrameApplier, FrameStats, RenderBridge, WorldGrid};
use tracing::{info, warn};

/// Where frames come from. The HTTP client is the production source; the
/// trait exists so the loop can be driven by a scripted source in tests.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Total number of iterations available on the server.
    async fn iteration_count(&self) -> Result<i64>;

    /// Raw body of the frame for `iteration`.
    async fn frame_body(&self, iteration: u64) -> Result<String>;
}

/// Run phases, tracked for logging and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    FetchingCount,
    FetchingFrame(u64),
    Applying(u64),
    Completed,
    Failed,
}

/// Totals for one completed synchronization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub iterations: u64,
    pub frames_applied: u64,
    pub frames_skipped: u64,
    pub stats: FrameStats,
}

/// Drives the strictly sequential fetch/apply loop: exactly one request
/// in flight, and frame `i + 1` is never requested before frame `i` has
/// been fully applied or skipped. Entities therefore never observe
/// frames out of order or two frames' effects interleaved.
pub struct SyncEngine<S> {
    source: S,
    applier: FrameApplier,
    state: SyncState,
}

impl<S: FrameSource> SyncEngine<S> {
    pub fn new(source: S, codes: FrameCodes) -> Self {
        Self {
            source,
            applier: FrameApplier::new(codes),
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Fetch the iteration count, then fetch and apply every frame in
    /// index order.
    ///
    /// A failed count fetch aborts the whole run: the loop bound is
    /// unknown, so no frame can be requested. A failed frame fetch or
    /// application is logged and skipped and the loop moves on; one stale
    /// iteration is the accepted cost of keeping the run live.
    pub async fn run<R: RenderBridge>(
        &mut self,
        grid: &WorldGrid,
        registry: &mut EntityRegistry,
        render: &mut R,
    ) -> Result<SyncReport> {
        self.state = SyncState::FetchingCount;
        let count = match self.source.iteration_count().await {
            Ok(count) => count,
            Err(err) => {
                self.state = SyncState::Failed;
                return Err(err);
            }
        };

        // An empty run is a valid run
        if count <= 0 {
            info!("Server reports no iterations, nothing to synchronize");
            self.state = SyncState::Completed;
            return Ok(SyncReport::default());
        }

        info!("Synchronizing {} iterations", count);

        let mut report = SyncReport {
            iterations: count as u64,
            ..SyncReport::default()
        };

        for iteration in 0..count as u64 {
            self.state = SyncState::FetchingFrame(iteration);
            match self.fetch_and_apply(iteration, grid, registry, render).await {
                Ok(stats) => {
                    report.frames_applied += 1;
                    report.stats.merge(stats);
                }
                Err(err) => {
                    warn!("Skipping frame {}: {}", iteration, err);
                    report.frames_skipped += 1;
                }
            }
        }

        self.state = SyncState::Completed;
        info!(
            "Synchronization complete: {} applied, {} skipped, {} items collected",
            report.frames_applied, report.frames_skipped, report.stats.items_collected
        );
        Ok(report)
    }

    async fn fetch_and_apply<R: RenderBridge>(
        &mut self,
        iteration: u64,
        grid: &WorldGrid,
        registry: &mut EntityRegistry,
        render: &mut R,
    ) -> Result<FrameStats> {
        let body = self.source.frame_body(iteration).await?;
        let frame = Frame::parse(iteration, &body)?;
        self.state = SyncState::Applying(iteration);
        self.applier.apply(&frame, grid, registry, render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use sweepbots_core::{EntityId, Error, GridPos, ProtocolConfig};
    use sweepbots_world::{spawn_world, RecordingRender};

    struct ScriptedSource {
        count: std::result::Result<i64, String>,
        frames: Vec<std::result::Result<String, String>>,
        calls: Mutex<Vec<u64>>,
    }

    impl ScriptedSource {
        fn new(count: i64, frames: Vec<std::result::Result<String, String>>) -> Self {
            Self {
                count: Ok(count),
                frames,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        async fn iteration_count(&self) -> Result<i64> {
            self.count.clone().map_err(Error::Network)
        }

        async fn frame_body(&self, iteration: u64) -> Result<String> {
            self.calls.lock().unwrap().push(iteration);
            self.frames[iteration as usize]
                .clone()
                .map_err(Error::Network)
        }
    }

    fn bootstrapped_world() -> (WorldGrid, EntityRegistry, RecordingRender, ProtocolConfig) {
        let grid = WorldGrid::parse("2 2\nS .\n. .").unwrap();
        let protocol = ProtocolConfig {
            robots_per_spawn: 1,
            ..ProtocolConfig::default()
        };
        let mut registry = EntityRegistry::new();
        let mut render = RecordingRender::new();
        spawn_world(&grid, &protocol, &mut registry, &mut render);
        (grid, registry, render, protocol)
    }

    #[tokio::test]
    async fn test_zero_iterations_completes_without_fetching() {
        let (grid, mut registry, mut render, protocol) = bootstrapped_world();
        let source = ScriptedSource::new(0, vec![]);
        let mut engine = SyncEngine::new(source, FrameCodes::new(&protocol));

        let report = engine.run(&grid, &mut registry, &mut render).await.unwrap();

        assert_eq!(engine.state(), SyncState::Completed);
        assert_eq!(report, SyncReport::default());
        assert!(engine.source.calls.lock().unwrap().is_empty());
        // Registry unchanged from bootstrap
        assert_eq!(
            registry.entity(EntityId(100)).unwrap().position,
            GridPos::new(0, 0)
        );
    }

    #[tokio::test]
    async fn test_count_fetch_failure_aborts_run() {
        let (grid, mut registry, mut render, protocol) = bootstrapped_world();
        let source = ScriptedSource {
            count: Err("connection refused".into()),
            frames: vec![],
            calls: Mutex::new(Vec::new()),
        };
        let mut engine = SyncEngine::new(source, FrameCodes::new(&protocol));

        let err = engine
            .run(&grid, &mut registry, &mut render)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert_eq!(engine.state(), SyncState::Failed);
        assert!(engine.source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_frames_applied_in_order() {
        let (grid, mut registry, mut render, protocol) = bootstrapped_world();
        let source = ScriptedSource::new(
            2,
            vec![
                Ok("2 2\n0 100\n0 0".to_string()),
                Ok("2 2\n0 0\n0 100".to_string()),
            ],
        );
        let mut engine = SyncEngine::new(source, FrameCodes::new(&protocol));

        let report = engine.run(&grid, &mut registry, &mut render).await.unwrap();

        assert_eq!(report.frames_applied, 2);
        assert_eq!(report.frames_skipped, 0);
        assert_eq!(*engine.source.calls.lock().unwrap(), vec![0, 1]);
        // Final position comes from the last frame
        assert_eq!(
            registry.entity(EntityId(100)).unwrap().position,
            GridPos::new(1, 1)
        );
    }

    #[tokio::test]
    async fn test_failed_frame_is_skipped_and_loop_continues() {
        let (grid, mut registry, mut render, protocol) = bootstrapped_world();
        // Iteration 2 of 5 dies with a server error; later frames carry no
        // robot codes, so the surviving state is exactly iteration 1's.
        let source = ScriptedSource::new(
            5,
            vec![
                Ok("2 2\n0 100\n0 0".to_string()),
                Ok("2 2\n0 0\n0 100".to_string()),
                Err("HTTP 500 Internal Server Error".into()),
                Ok("2 2\n0 0\n0 0".to_string()),
                Ok("2 2\n0 0\n0 0".to_string()),
            ],
        );
        let mut engine = SyncEngine::new(source, FrameCodes::new(&protocol));

        let report = engine.run(&grid, &mut registry, &mut render).await.unwrap();

        assert_eq!(report.frames_applied, 4);
        assert_eq!(report.frames_skipped, 1);
        // Every iteration after the failure was still attempted
        assert_eq!(*engine.source.calls.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(engine.state(), SyncState::Completed);
        assert_eq!(
            registry.entity(EntityId(100)).unwrap().position,
            GridPos::new(1, 1)
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let (grid, mut registry, mut render, protocol) = bootstrapped_world();
        let source = ScriptedSource::new(
            3,
            vec![
                Ok("2 2\n0 100\n0 0".to_string()),
                // Wrong dimensions for this world
                Ok("3 3\n0 0 0\n0 0 0\n0 0 0".to_string()),
                Ok("not a frame".to_string()),
            ],
        );
        let mut engine = SyncEngine::new(source, FrameCodes::new(&protocol));

        let report = engine.run(&grid, &mut registry, &mut render).await.unwrap();

        assert_eq!(report.frames_applied, 1);
        assert_eq!(report.frames_skipped, 2);
        assert_eq!(
            registry.entity(EntityId(100)).unwrap().position,
            GridPos::new(0, 1)
        );
    }
}
