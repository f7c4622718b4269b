//! The single-writer handle around the world state.
//!
//! Every mutation of the [`WorldState`] (a scheduler tick, an observer
//! command, an admin merge) goes through [`Simulation`], which holds one
//! async mutex for the whole mutate-and-publish step. The snapshot is handed
//! to the [`SnapshotPublisher`] while the lock is still held, so observers
//! see snapshots in exactly the order the mutations happened. Publishing
//! must never wait on an observer; the broadcast hub only enqueues.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use geopolitics_types::{Command, WorldSnapshot};
use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::tick::TickError;
use crate::world::WorldState;

/// Errors from handing a snapshot to observers.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The snapshot could not be serialized.
    #[error("failed to serialize snapshot: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The publisher is not able to accept snapshots.
    #[error("publisher unavailable: {reason}")]
    Unavailable {
        /// Why the publisher refused the snapshot.
        reason: String,
    },
}

/// Errors from a mutate-and-publish step.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The tick itself failed; nothing was written or published.
    #[error("tick failed: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The mutation was applied but the snapshot could not be published.
    #[error("broadcast failed: {source}")]
    Publish {
        /// The underlying publish error.
        #[from]
        source: PublishError,
    },
}

/// Receives every snapshot produced under the world lock.
///
/// Implementations must not block: they are called with the world lock held.
pub trait SnapshotPublisher: Send + Sync {
    /// Deliver `snapshot` to every observer. Returns how many accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the snapshot could not be handed off at
    /// all. Per-observer delivery failures are not errors.
    fn publish(&self, snapshot: &WorldSnapshot) -> Result<usize, PublishError>;
}

/// A publisher with no observers, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl SnapshotPublisher for NullPublisher {
    fn publish(&self, _snapshot: &WorldSnapshot) -> Result<usize, PublishError> {
        Ok(0)
    }
}

/// Monotonic counters describing the run so far.
#[derive(Debug, Default)]
pub struct SimulationStats {
    ticks_completed: AtomicU64,
    tick_failures: AtomicU64,
    consecutive_failures: AtomicU64,
    commands_applied: AtomicU64,
    commands_rejected: AtomicU64,
}

impl SimulationStats {
    /// Record a successful tick and reset the failure streak.
    pub fn record_tick(&self) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    /// Record a failed tick. Returns the length of the current failure streak.
    pub fn record_failure(&self) -> u64 {
        self.tick_failures.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1)
    }

    /// Record an applied command.
    pub fn record_command(&self) {
        self.commands_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected command frame.
    pub fn record_rejected(&self) {
        self.commands_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Current failure streak.
    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Copy of every counter.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            ticks_completed: self.ticks_completed.load(Ordering::Relaxed),
            tick_failures: self.tick_failures.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`SimulationStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Ticks that completed and published.
    pub ticks_completed: u64,
    /// Ticks that failed in total.
    pub tick_failures: u64,
    /// Ticks that failed since the last success.
    pub consecutive_failures: u64,
    /// Commands applied.
    pub commands_applied: u64,
    /// Command frames rejected.
    pub commands_rejected: u64,
}

/// Shared handle to the world. Cheap to clone behind an [`Arc`].
pub struct Simulation {
    world: Mutex<WorldState>,
    publisher: Arc<dyn SnapshotPublisher>,
    wake: Notify,
    stats: SimulationStats,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Wrap `world`, publishing every change to `publisher`.
    pub fn new(world: WorldState, publisher: Arc<dyn SnapshotPublisher>) -> Self {
        Self {
            world: Mutex::new(world),
            publisher,
            wake: Notify::new(),
            stats: SimulationStats::default(),
        }
    }

    /// Run `f` against the world under the lock without publishing.
    ///
    /// Anything `f` does is serialized with ticks and commands, which is
    /// how a new observer gets a baseline no tick can slip in front of.
    pub async fn with_world<T>(&self, f: impl FnOnce(&WorldState) -> T) -> T {
        let world = self.world.lock().await;
        f(&*world)
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> WorldSnapshot {
        self.with_world(WorldState::snapshot).await
    }

    /// Whether the scheduler is paused.
    pub async fn is_paused(&self) -> bool {
        self.with_world(WorldState::is_paused).await
    }

    /// Apply `f`, then publish the resulting snapshot before releasing the lock.
    ///
    /// If `f` fails nothing is published. If publishing fails the mutation
    /// stays applied.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or [`PublishError`] converted into `E`.
    pub async fn mutate<T, E>(
        &self,
        f: impl FnOnce(&mut WorldState) -> Result<T, E>,
    ) -> Result<(T, usize), E>
    where
        E: From<PublishError>,
    {
        let mut world = self.world.lock().await;
        let value = f(&mut *world)?;
        let delivered = self.publisher.publish(&world.snapshot())?;
        drop(world);
        Ok((value, delivered))
    }

    /// Like [`mutate`](Self::mutate), but `f` decides whether anything changed.
    ///
    /// Returning `Ok(None)` leaves observers alone: nothing is published and
    /// `Ok(None)` comes back.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or [`PublishError`] converted into `E`.
    pub async fn mutate_if<T, E>(
        &self,
        f: impl FnOnce(&mut WorldState) -> Result<Option<T>, E>,
    ) -> Result<Option<(T, usize)>, E>
    where
        E: From<PublishError>,
    {
        let mut world = self.world.lock().await;
        let Some(value) = f(&mut *world)? else {
            return Ok(None);
        };
        let delivered = self.publisher.publish(&world.snapshot())?;
        drop(world);
        Ok(Some((value, delivered)))
    }

    /// Apply a control command and broadcast the result to every observer.
    ///
    /// Returns the number of observers the snapshot was queued for.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the snapshot could not be handed off.
    /// The command is applied regardless.
    pub async fn apply_command(&self, command: Command) -> Result<usize, PublishError> {
        let (resumed, delivered) = self
            .mutate(|world| {
                let was_paused = world.is_paused();
                match command {
                    Command::Pause => world.set_paused(true),
                    Command::Resume => world.set_paused(false),
                    Command::SetSpeed { speed } => world.set_speed(speed),
                }
                Ok::<bool, PublishError>(was_paused && !world.is_paused())
            })
            .await?;

        if resumed {
            self.wake.notify_waiters();
        }
        self.stats.record_command();
        debug!(action = command.action(), delivered, "Command applied");
        Ok(delivered)
    }

    /// Wait until `timeout` elapses or a resume command arrives.
    ///
    /// Returns at once if the world is already running. Only a resume that
    /// happens during the wait ends it early; older ones leave no trace.
    pub async fn wait_for_resume(&self, timeout: Duration) {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        // Registered before the check, so a resume right after it still wakes us.
        notified.as_mut().enable();
        if !self.is_paused().await {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(timeout) => {}
            () = notified => {}
        }
    }

    /// Run-time counters.
    pub const fn stats(&self) -> &SimulationStats {
        &self.stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex as StdMutex;

    use geopolitics_types::GameSpeed;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::roster;

    /// Records every published snapshot.
    #[derive(Default)]
    pub(crate) struct RecordingPublisher {
        pub(crate) published: StdMutex<Vec<(tokio::time::Instant, WorldSnapshot)>>,
    }

    impl RecordingPublisher {
        pub(crate) fn snapshots(&self) -> Vec<WorldSnapshot> {
            self.published
                .lock()
                .unwrap()
                .iter()
                .map(|(_, s)| s.clone())
                .collect()
        }
    }

    impl SnapshotPublisher for RecordingPublisher {
        fn publish(&self, snapshot: &WorldSnapshot) -> Result<usize, PublishError> {
            self.published
                .lock()
                .unwrap()
                .push((tokio::time::Instant::now(), snapshot.clone()));
            Ok(1)
        }
    }

    pub(crate) fn world() -> WorldState {
        WorldState::bootstrap(
            &roster::catalog().unwrap(),
            &roster::relations(),
            &SimulationConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn every_command_is_broadcast() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Simulation::new(world(), publisher.clone());

        sim.apply_command(Command::Pause).await.unwrap();
        sim.apply_command(Command::SetSpeed {
            speed: GameSpeed::Fast,
        })
        .await
        .unwrap();
        sim.apply_command(Command::Resume).await.unwrap();

        let published = publisher.snapshots();
        assert_eq!(published.len(), 3);
        assert!(published.first().unwrap().paused);
        assert_eq!(published.get(1).unwrap().speed, GameSpeed::Fast);
        assert!(!published.get(2).unwrap().paused);
        assert_eq!(sim.stats().report().commands_applied, 3);
    }

    #[tokio::test]
    async fn failed_mutation_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Simulation::new(world(), publisher.clone());

        let result: Result<((), usize), PublishError> = sim
            .mutate(|_| {
                Err(PublishError::Unavailable {
                    reason: "test".to_owned(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(publisher.snapshots().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn resume_wakes_a_waiting_scheduler_early() {
        let sim = Arc::new(Simulation::new(world(), Arc::new(NullPublisher)));
        let waiter = Arc::clone(&sim);
        let start = tokio::time::Instant::now();
        let handle = tokio::spawn(async move {
            waiter.wait_for_resume(Duration::from_secs(60)).await;
            tokio::time::Instant::now()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        sim.apply_command(Command::Resume).await.unwrap();
        let woke = handle.await.unwrap();
        assert!(woke.duration_since(start) < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_while_running_does_not_cut_the_next_pause_short() {
        let sim = Arc::new(Simulation::new(world(), Arc::new(NullPublisher)));
        sim.apply_command(Command::Resume).await.unwrap();
        // Already running: nothing to wake.
        sim.apply_command(Command::Resume).await.unwrap();
        sim.apply_command(Command::Pause).await.unwrap();

        let start = tokio::time::Instant::now();
        sim.wait_for_resume(Duration::from_secs(1)).await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_while_running_returns_immediately() {
        let sim = Simulation::new(world(), Arc::new(NullPublisher));
        sim.apply_command(Command::Resume).await.unwrap();

        let start = tokio::time::Instant::now();
        sim.wait_for_resume(Duration::from_secs(60)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unchanged_world_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Simulation::new(world(), publisher.clone());

        let result = sim
            .mutate_if(|_| Ok::<Option<()>, PublishError>(None))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(publisher.snapshots().is_empty());

        let result = sim
            .mutate_if(|_| Ok::<_, PublishError>(Some(7)))
            .await
            .unwrap();
        assert_eq!(result, Some((7, 1)));
        assert_eq!(publisher.snapshots().len(), 1);
    }

    #[test]
    fn failure_streak_resets_on_success() {
        let stats = SimulationStats::default();
        assert_eq!(stats.record_failure(), 1);
        assert_eq!(stats.record_failure(), 2);
        stats.record_tick();
        assert_eq!(stats.consecutive_failures(), 0);
        let report = stats.report();
        assert_eq!(report.tick_failures, 2);
        assert_eq!(report.ticks_completed, 1);
    }
}
