//! Economic model: GDP growth, trade, and sanctions.
//!
//! Every function here is pure apart from the random source it is handed.
//! Inputs are read-only slices of the world; outputs are new values the
//! caller decides to commit. With a seeded RNG every result is reproducible.

use geopolitics_types::{Nation, SanctionImpact, TradeImpact};
use rand::Rng;

use crate::config::EconomyConfig;
use crate::diplomacy::{self, SanctionRegistry};

/// Multiplier range applied to the per-partner trade boost.
const TRADE_BOOST_RANGE: (f64, f64) = (0.5, 1.0);

/// Multiplier range applied to the per-sanction penalty.
const SANCTION_PENALTY_RANGE: (f64, f64) = (0.7, 1.0);

/// Trade volume as a share of the smaller economy.
const TRADE_VOLUME_RANGE: (f64, f64) = (0.05, 0.15);

/// Noise on each side's trade benefit.
const TRADE_BENEFIT_NOISE: (f64, f64) = (0.8, 1.2);

/// Sanction size as a share of the smaller economy.
const SANCTION_SIZE_RANGE: (f64, f64) = (0.01, 0.05);

/// Power ratio assumed when the target has no economy at all.
const DEFAULT_POWER_RATIO: f64 = 10.0;

/// The slice of world state the growth calculation reads.
#[derive(Debug, Clone, Copy)]
pub struct EconomicContext<'a> {
    /// Every nation in the world, including the one being evaluated.
    pub nations: &'a [Nation],
    /// Active sanctions.
    pub sanctions: &'a SanctionRegistry,
}

/// The economy model, parameterised by [`EconomyConfig`].
#[derive(Debug, Clone, Default)]
pub struct EconomyModel {
    config: EconomyConfig,
}

impl EconomyModel {
    /// Create a model with the given constants.
    pub const fn new(config: EconomyConfig) -> Self {
        Self { config }
    }

    /// The model's constants.
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Annualized GDP growth rate for `nation`.
    ///
    /// Starts from the base rate, penalises tax above the baseline, rewards
    /// research, adds a boost per trade partner, subtracts a penalty per
    /// sanctioning nation, adds jitter, and clamps to
    /// `[min_growth_rate, max_growth_rate]`.
    pub fn calculate_gdp_growth<R: Rng + ?Sized>(
        &self,
        nation: &Nation,
        world: EconomicContext<'_>,
        rng: &mut R,
    ) -> f64 {
        let cfg = &self.config;
        let mut growth = cfg.base_growth_rate;

        growth -= (nation.tax_rate - cfg.tax_baseline) * cfg.tax_penalty_factor;
        growth += nation.research_spending * cfg.research_bonus_factor;

        let partners = diplomacy::trade_partners(nation, world.nations, world.sanctions).count();
        growth += count_as_f64(partners)
            * cfg.trade_boost_factor
            * uniform(rng, TRADE_BOOST_RANGE);

        let sanctions = world.sanctions.count_against(nation.id);
        growth -= count_as_f64(sanctions)
            * cfg.sanction_penalty_factor
            * uniform(rng, SANCTION_PENALTY_RANGE);

        growth += uniform(rng, (-cfg.growth_jitter, cfg.growth_jitter));

        growth.clamp(cfg.min_growth_rate, cfg.max_growth_rate)
    }

    /// Convert an annualized rate into the rate for a single tick.
    ///
    /// With `growth_periods_per_year == 1` this is the identity.
    pub fn per_tick_rate(&self, annual: f64) -> f64 {
        let periods = f64::from(self.config.growth_periods_per_year.max(1));
        (1.0 + annual).powf(periods.recip()) - 1.0
    }

    /// GDP after one tick of `annual` growth, never below the floor.
    pub fn grow_gdp(&self, gdp: f64, annual: f64) -> f64 {
        (gdp * (1.0 + self.per_tick_rate(annual))).max(self.config.gdp_floor)
    }

    /// Military power after one tick of random drift scaled by `multiplier`.
    ///
    /// The drift is a percentage drawn from
    /// `[military_drift_min, military_drift_max)`; the result is clamped to
    /// `[military_min, military_max]`.
    pub fn drift_military<R: Rng + ?Sized>(
        &self,
        military_power: f64,
        multiplier: f64,
        rng: &mut R,
    ) -> f64 {
        let cfg = &self.config;
        let drift = uniform(rng, (cfg.military_drift_min, cfg.military_drift_max)) * multiplier;
        (military_power * (1.0 + drift / 100.0)).clamp(cfg.military_min, cfg.military_max)
    }

    /// Projected effect of trade between `a` and `b`.
    ///
    /// Volume scales with the smaller economy, so smaller economies gain
    /// proportionally more.
    pub fn calculate_trade_impact<R: Rng + ?Sized>(
        &self,
        a: &Nation,
        b: &Nation,
        rng: &mut R,
    ) -> TradeImpact {
        let smaller = a.gdp.min(b.gdp);
        let trade_volume = smaller * uniform(rng, TRADE_VOLUME_RANGE);
        let noise_a = uniform(rng, TRADE_BENEFIT_NOISE);
        let noise_b = uniform(rng, TRADE_BENEFIT_NOISE);

        TradeImpact {
            trade_volume,
            benefit_a: relative(trade_volume, a.gdp) * noise_a,
            benefit_b: relative(trade_volume, b.gdp) * noise_b,
        }
    }

    /// Projected effect of `imposer` sanctioning `target`.
    ///
    /// Both sides are hurt. The target is hurt more, and more so the larger
    /// the imposer's economy is relative to the target's.
    pub fn apply_sanction<R: Rng + ?Sized>(
        &self,
        imposer: &Nation,
        target: &Nation,
        rng: &mut R,
    ) -> SanctionImpact {
        let sanction_impact = imposer.gdp.min(target.gdp) * uniform(rng, SANCTION_SIZE_RANGE);

        let power_ratio = if target.gdp > 0.0 {
            imposer.gdp / target.gdp
        } else {
            DEFAULT_POWER_RATIO
        };
        let power_factor = power_ratio.min(DEFAULT_POWER_RATIO) / DEFAULT_POWER_RATIO;

        let to_target = sanction_impact * 0.5f64.mul_add(power_factor, 0.5);
        let to_imposer = sanction_impact * 0.3 * (-0.5f64).mul_add(power_factor, 1.0);

        SanctionImpact {
            sanction_impact,
            damage_to_target: relative(to_target, target.gdp),
            damage_to_imposer: relative(to_imposer, imposer.gdp),
        }
    }
}

/// Draw uniformly from `[low, high)`. A degenerate range yields `low`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    if low < high {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// `amount / base`, or zero when the base is not positive.
const fn relative(amount: f64, base: f64) -> f64 {
    if base > 0.0 { amount / base } else { 0.0 }
}

#[allow(clippy::cast_precision_loss)]
const fn count_as_f64(count: usize) -> f64 {
    // Nation counts are tiny.
    count as f64
}
