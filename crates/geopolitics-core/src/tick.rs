//! A single simulation tick.
//!
//! One tick advances the calendar by exactly one day, updates every nation's
//! GDP and military power, and may emit one narrative event. All new values
//! are computed from the pre-tick world and validated before any of them is
//! written, so a failed tick leaves the world exactly as it was.

use chrono::NaiveDate;
use geopolitics_types::GameEvent;
use rand::Rng;
use tracing::{debug, info};

use crate::clock::ClockError;
use crate::config::EventConfig;
use crate::economy::EconomyModel;
use crate::events::EventGenerator;
use crate::world::WorldState;

/// Errors that abort a tick before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The calendar could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An update produced a NaN or infinite value.
    #[error("non-finite {metric} computed for {nation}")]
    NonFiniteMetric {
        /// The affected nation.
        nation: String,
        /// Which metric was invalid.
        metric: &'static str,
    },
}

/// What a completed tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The date after the tick.
    pub date: NaiveDate,
    /// Number of nations updated.
    pub nations_updated: usize,
    /// The event emitted this tick, if any.
    pub event: Option<GameEvent>,
}

/// The per-nation values a tick will commit.
struct NationUpdate {
    growth_rate: f64,
    gdp: f64,
    military_power: f64,
}

/// Run one tick against `world`.
///
/// The speed multiplier scales the military drift and the event chance; it
/// never changes the number of days a tick covers.
///
/// # Errors
///
/// Returns [`TickError`] if the calendar cannot advance or a computed
/// metric is not finite. The world is unchanged in both cases.
pub fn run_tick<R: Rng + ?Sized>(
    world: &mut WorldState,
    model: &EconomyModel,
    generator: &EventGenerator,
    events: &EventConfig,
    rng: &mut R,
) -> Result<TickSummary, TickError> {
    let multiplier = world.speed().multiplier();

    let mut clock = *world.clock();
    let date = clock.advance()?;

    let context = world.economic_context();
    let mut updates = Vec::with_capacity(context.nations.len());
    for nation in context.nations {
        let growth_rate = model.calculate_gdp_growth(nation, context, rng);
        let update = NationUpdate {
            growth_rate,
            gdp: model.grow_gdp(nation.gdp, growth_rate),
            military_power: model.drift_military(nation.military_power, multiplier, rng),
        };
        check_finite(&nation.name, "gdp", update.gdp)?;
        check_finite(&nation.name, "military_power", update.military_power)?;
        updates.push(update);
    }

    let event = roll_event(events.base_probability * multiplier, rng)
        .then(|| generator.generate(&clock.display(), world.nations(), rng))
        .flatten();

    world.set_clock(clock);
    for (nation, update) in world.nations_mut().iter_mut().zip(updates) {
        nation.gdp_growth_rate = update.growth_rate;
        nation.gdp = update.gdp;
        nation.military_power = update.military_power;
    }
    if let Some(ref event) = event {
        info!(date = %event.date, category = ?event.category, text = %event.text, "Event");
        world.events_mut().push(event.clone());
    }

    let nations_updated = world.nations().len();
    debug!(%date, nations_updated, "Tick complete");

    Ok(TickSummary {
        date,
        nations_updated,
        event,
    })
}

fn roll_event<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    if probability.is_finite() {
        rng.random_bool(probability.clamp(0.0, 1.0))
    } else {
        false
    }
}

fn check_finite(nation: &str, metric: &'static str, value: f64) -> Result<(), TickError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TickError::NonFiniteMetric {
            nation: nation.to_owned(),
            metric,
        })
    }
}
