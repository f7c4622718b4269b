//! The tick scheduler.
//!
//! [`Scheduler::run`] loops for the life of the process:
//!
//! - **Paused**: wait for the poll interval or a resume, whichever comes
//!   first. The calendar does not move.
//! - **Running**: run one tick under the world lock, publish the snapshot,
//!   then sleep `tick_interval / speed multiplier`.
//! - **Failed**: log, count, and back off before trying again. The loop
//!   never exits because of a failed tick.
//!
//! There is no shutdown path; the loop ends when its task is dropped.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};

use crate::config::{EventConfig, SimulationConfig, TimingConfig};
use crate::economy::EconomyModel;
use crate::events::EventGenerator;
use crate::simulation::{Simulation, SimulationError};
use crate::tick::{self, TickSummary};

/// Result of one scheduler iteration.
#[derive(Debug)]
pub enum StepOutcome {
    /// The world is paused; nothing happened.
    Paused,
    /// A tick completed and was published.
    Ticked {
        /// What the tick did.
        summary: TickSummary,
        /// Observers the snapshot was queued for.
        delivered: usize,
        /// How long to wait before the next iteration.
        delay: Duration,
    },
    /// The tick failed.
    Failed {
        /// Why it failed.
        error: SimulationError,
        /// How long to wait before the next iteration.
        backoff: Duration,
    },
}

/// Drives ticks against a shared [`Simulation`].
///
/// Owns the random source, so every tick's randomness comes from one
/// stream that tests can seed.
pub struct Scheduler<R = StdRng> {
    sim: Arc<Simulation>,
    model: EconomyModel,
    generator: EventGenerator,
    events: EventConfig,
    timing: TimingConfig,
    rng: R,
}

impl Scheduler<StdRng> {
    /// Build a scheduler from configuration.
    ///
    /// Uses `world.seed` when set, otherwise OS entropy.
    pub fn from_config(sim: Arc<Simulation>, config: &SimulationConfig) -> Self {
        let rng = config
            .world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(sim, config, rng)
    }
}

impl<R: Rng + Send> Scheduler<R> {
    /// Build a scheduler with an injected random source.
    pub fn with_rng(sim: Arc<Simulation>, config: &SimulationConfig, rng: R) -> Self {
        Self {
            sim,
            model: EconomyModel::new(config.economy.clone()),
            generator: EventGenerator::new(),
            events: config.events.clone(),
            timing: config.timing.clone(),
            rng,
        }
    }

    /// Run one iteration without sleeping.
    pub async fn step(&mut self) -> StepOutcome {
        let Self {
            sim,
            model,
            generator,
            events,
            timing,
            rng,
        } = self;

        // A paused world is left alone and nothing is published.
        let result = sim
            .mutate_if(|world| {
                if world.is_paused() {
                    return Ok(None);
                }
                let summary = tick::run_tick(world, model, generator, events, rng)?;
                Ok::<_, SimulationError>(Some((summary, world.speed().multiplier())))
            })
            .await;

        match result {
            Ok(None) => StepOutcome::Paused,
            Ok(Some(((summary, multiplier), delivered))) => {
                sim.stats().record_tick();
                StepOutcome::Ticked {
                    summary,
                    delivered,
                    delay: tick_delay(timing, multiplier),
                }
            }
            Err(error) => {
                let consecutive = sim.stats().record_failure();
                let backoff = failure_backoff(timing, consecutive);
                if consecutive >= timing.failure_alert_threshold {
                    error!(
                        error = %error,
                        consecutive,
                        backoff_ms = backoff.as_millis(),
                        "Tick failing repeatedly"
                    );
                } else {
                    warn!(
                        error = %error,
                        consecutive,
                        backoff_ms = backoff.as_millis(),
                        "Tick failed, backing off"
                    );
                }
                StepOutcome::Failed { error, backoff }
            }
        }
    }

    /// Loop forever: tick, sleep, repeat.
    pub async fn run(mut self) {
        info!(
            tick_interval_ms = self.timing.tick_interval_ms,
            pause_poll_ms = self.timing.pause_poll_ms,
            "Scheduler starting"
        );
        let poll = Duration::from_millis(self.timing.pause_poll_ms);

        loop {
            match self.step().await {
                StepOutcome::Paused => self.sim.wait_for_resume(poll).await,
                StepOutcome::Ticked { delay, .. } => tokio::time::sleep(delay).await,
                StepOutcome::Failed { backoff, .. } => tokio::time::sleep(backoff).await,
            }
        }
    }
}

/// Real-time wait between ticks at the given speed multiplier.
pub fn tick_delay(timing: &TimingConfig, multiplier: f64) -> Duration {
    let base = Duration::from_millis(timing.tick_interval_ms);
    if multiplier.is_finite() && multiplier > 0.0 {
        base.div_f64(multiplier)
    } else {
        base
    }
}

/// Backoff after the `consecutive`-th failure in a row:
/// `min(error_backoff * 2^(consecutive - 1), max_error_backoff)`.
pub fn failure_backoff(timing: &TimingConfig, consecutive: u64) -> Duration {
    let exponent = u32::try_from(consecutive.saturating_sub(1)).unwrap_or(u32::MAX);
    let factor = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
    let millis = timing
        .error_backoff_ms
        .saturating_mul(factor)
        .min(timing.max_error_backoff_ms);
    Duration::from_millis(millis)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use geopolitics_types::{Command, GameSpeed, WorldSnapshot};
    use tokio::time::Instant;

    use super::*;
    use crate::simulation::tests::{RecordingPublisher, world};
    use crate::simulation::{PublishError, SnapshotPublisher};

    fn seeded(sim: &Arc<Simulation>, config: &SimulationConfig) -> Scheduler<StdRng> {
        Scheduler::with_rng(Arc::clone(sim), config, StdRng::seed_from_u64(7))
    }

    /// Fails the first `failures` publishes, then records like [`RecordingPublisher`].
    struct FlakyPublisher {
        failures: AtomicUsize,
        published: StdMutex<Vec<(Instant, String)>>,
    }

    impl SnapshotPublisher for FlakyPublisher {
        fn publish(&self, snapshot: &WorldSnapshot) -> Result<usize, PublishError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(PublishError::Unavailable {
                    reason: "injected".to_owned(),
                });
            }
            self.published
                .lock()
                .unwrap()
                .push((Instant::now(), snapshot.date.clone()));
            Ok(1)
        }
    }

    #[tokio::test]
    async fn paused_steps_never_move_the_world() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Arc::new(Simulation::new(world(), publisher.clone()));
        let before = sim.snapshot().await;
        let mut scheduler = seeded(&sim, &SimulationConfig::default());

        for _ in 0..25 {
            assert!(matches!(scheduler.step().await, StepOutcome::Paused));
        }

        assert_eq!(sim.snapshot().await, before);
        assert!(publisher.snapshots().is_empty());
        assert_eq!(sim.stats().report().ticks_completed, 0);
    }

    #[tokio::test]
    async fn resume_then_tick_reaches_the_second_of_january() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Arc::new(Simulation::new(world(), publisher.clone()));
        let before = sim.snapshot().await;
        let mut scheduler = seeded(&sim, &SimulationConfig::default());

        sim.apply_command(Command::Resume).await.unwrap();
        let outcome = scheduler.step().await;
        let StepOutcome::Ticked { delay, delivered, .. } = outcome else {
            panic!("expected a tick, got {outcome:?}");
        };
        assert_eq!(delay, Duration::from_secs(1));
        assert_eq!(delivered, 1);

        let after = sim.snapshot().await;
        assert_eq!(after.date, "January 2, 2025");
        for (old, new) in before.nations.iter().zip(&after.nations) {
            assert!((new.gdp - old.gdp).abs() / old.gdp < 0.005);
        }
        assert_eq!(publisher.snapshots().last().unwrap(), &after);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_sets_the_tick_cadence() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Arc::new(Simulation::new(world(), publisher.clone()));
        let scheduler = seeded(&sim, &SimulationConfig::default());

        sim.apply_command(Command::Pause).await.unwrap();
        sim.apply_command(Command::SetSpeed {
            speed: GameSpeed::Fast,
        })
        .await
        .unwrap();
        sim.apply_command(Command::Resume).await.unwrap();
        assert_eq!(publisher.snapshots().len(), 3);

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        handle.abort();

        let ticks: Vec<Instant> = publisher
            .published
            .lock()
            .unwrap()
            .iter()
            .skip(3)
            .map(|(at, _)| *at)
            .collect();
        assert!(ticks.len() >= 5, "only {} ticks", ticks.len());
        for pair in ticks.windows(2) {
            let (Some(a), Some(b)) = (pair.first(), pair.get(1)) else {
                continue;
            };
            let gap = b.duration_since(*a);
            assert!(
                gap >= Duration::from_millis(660) && gap <= Duration::from_millis(673),
                "gap {gap:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_backs_off_and_keeps_going() {
        let publisher = Arc::new(FlakyPublisher {
            failures: AtomicUsize::new(0),
            published: StdMutex::new(Vec::new()),
        });
        let sim = Arc::new(Simulation::new(world(), publisher.clone()));
        let scheduler = seeded(&sim, &SimulationConfig::default());

        sim.apply_command(Command::Resume).await.unwrap();
        // Fail the first tick's broadcast.
        publisher.failures.store(1, Ordering::SeqCst);

        let start = Instant::now();
        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(7_500)).await;
        handle.abort();

        let report = sim.stats().report();
        assert_eq!(report.tick_failures, 1);
        assert!(report.ticks_completed >= 2);
        assert_eq!(report.consecutive_failures, 0);

        let published = publisher.published.lock().unwrap();
        // Index 0 is the resume broadcast; the first tick failed to publish.
        let (first_tick_at, first_tick_date) = published.get(1).unwrap();
        assert!(first_tick_at.duration_since(start) >= Duration::from_secs(5));
        // The failed tick was still applied, so the next one is two days on.
        assert_eq!(first_tick_date, "January 3, 2025");
    }

    #[tokio::test(start_paused = true)]
    async fn paused_scheduler_stays_silent_for_a_minute() {
        let publisher = Arc::new(RecordingPublisher::default());
        let sim = Arc::new(Simulation::new(world(), publisher.clone()));
        let scheduler = seeded(&sim, &SimulationConfig::default());

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(60)).await;
        handle.abort();

        assert!(publisher.snapshots().is_empty());
        assert_eq!(sim.snapshot().await.date, "January 1, 2025");
    }

    #[tokio::test(start_paused = true)]
    async fn tick_that_fails_mid_update_recovers_after_backoff() {
        let publisher = Arc::new(RecordingPublisher::default());
        let mut broken = world();
        if let Some(first) = broken.nations_mut().first_mut() {
            first.gdp = f64::INFINITY;
        }
        let sim = Arc::new(Simulation::new(broken, publisher.clone()));
        let scheduler = seeded(&sim, &SimulationConfig::default());
        sim.apply_command(Command::Resume).await.unwrap();

        let start = Instant::now();
        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(1)).await;

        let report = sim.stats().report();
        assert_eq!(report.tick_failures, 1);
        assert_eq!(report.ticks_completed, 0);
        assert_eq!(sim.snapshot().await.date, "January 1, 2025");

        sim.mutate(|world| {
            if let Some(first) = world.nations_mut().first_mut() {
                first.gdp = 1_000.0;
            }
            Ok::<(), PublishError>(())
        })
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(4_500)).await;
        handle.abort();

        let report = sim.stats().report();
        assert_eq!(report.tick_failures, 1);
        assert_eq!(report.ticks_completed, 1);
        assert_eq!(report.consecutive_failures, 0);

        let published = publisher.published.lock().unwrap();
        let (ticked_at, _) = published
            .iter()
            .find(|(_, snapshot)| snapshot.date == "January 2, 2025")
            .unwrap();
        // The failed tick never advanced the calendar; the retry waited out the backoff.
        assert!(ticked_at.duration_since(start) >= Duration::from_secs(5));
    }

    #[test]
    fn delay_scales_inversely_with_speed() {
        let timing = TimingConfig::default();
        assert_eq!(tick_delay(&timing, 1.0), Duration::from_secs(1));
        assert_eq!(tick_delay(&timing, 2.0), Duration::from_millis(500));
        assert_eq!(tick_delay(&timing, 0.5), Duration::from_secs(2));
        assert_eq!(tick_delay(&timing, 0.0), Duration::from_secs(1));
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let timing = TimingConfig {
            error_backoff_ms: 500,
            max_error_backoff_ms: 3_000,
            ..TimingConfig::default()
        };
        assert_eq!(failure_backoff(&timing, 1), Duration::from_millis(500));
        assert_eq!(failure_backoff(&timing, 2), Duration::from_millis(1_000));
        assert_eq!(failure_backoff(&timing, 3), Duration::from_millis(2_000));
        assert_eq!(failure_backoff(&timing, 4), Duration::from_millis(3_000));
        assert_eq!(failure_backoff(&timing, 200), Duration::from_millis(3_000));
    }

    #[test]
    fn default_backoff_is_fixed_at_five_seconds() {
        let timing = TimingConfig::default();
        for n in 1..20 {
            assert_eq!(failure_backoff(&timing, n), Duration::from_secs(5));
        }
    }
}
