//! Configuration loading and typed config structures for the simulation.
//!
//! The canonical configuration lives in `geopolitics-config.yaml` in the
//! engine's working directory. Every field has a default, so a missing file
//! or an empty document yields a runnable configuration. The constants of the
//! economy model are configurable too; the defaults are the tuned values.

use std::path::Path;

use chrono::NaiveDate;
use geopolitics_types::GameSpeed;
use serde::Deserialize;

use crate::clock;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but violates a constraint.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `geopolitics-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Starting calendar and world-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Scheduler cadence and failure backoff.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Economy model constants.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Narrative event settings.
    #[serde(default)]
    pub events: EventConfig,

    /// Relations and sanctions.
    #[serde(default)]
    pub diplomacy: DiplomacyConfig,

    /// Observer HTTP/WebSocket server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Collaborator connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values afterwards:
    /// - `DATABASE_URL` overrides `infrastructure.postgres_url`
    /// - `DRAGONFLY_URL` (or `REDIS_URL`) overrides `infrastructure.dragonfly_url`
    /// - `OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        config.observer.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file) this does not consult the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.start_date()?;

        if self.timing.tick_interval_ms == 0 {
            return Err(invalid("timing.tick_interval_ms must be at least 1"));
        }
        if self.timing.pause_poll_ms == 0 {
            return Err(invalid("timing.pause_poll_ms must be at least 1"));
        }
        if self.timing.max_error_backoff_ms < self.timing.error_backoff_ms {
            return Err(invalid(
                "timing.max_error_backoff_ms must not be below timing.error_backoff_ms",
            ));
        }
        if self.economy.min_growth_rate > self.economy.max_growth_rate {
            return Err(invalid(
                "economy.min_growth_rate must not exceed economy.max_growth_rate",
            ));
        }
        if self.economy.military_min > self.economy.military_max {
            return Err(invalid(
                "economy.military_min must not exceed economy.military_max",
            ));
        }
        if self.economy.growth_periods_per_year == 0 {
            return Err(invalid("economy.growth_periods_per_year must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.events.base_probability) {
            return Err(invalid("events.base_probability must be within [0, 1]"));
        }
        if self.events.log_capacity == 0 {
            return Err(invalid("events.log_capacity must be at least 1"));
        }
        if self.observer.connection_queue_capacity == 0 {
            return Err(invalid("observer.connection_queue_capacity must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable scenario name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// First calendar date, display or ISO form.
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Speed at startup.
    #[serde(default)]
    pub initial_speed: GameSpeed,

    /// Whether the scheduler starts paused.
    #[serde(default = "default_true")]
    pub start_paused: bool,

    /// Optional RNG seed. Absent means seeded from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl WorldConfig {
    /// The parsed start date.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `start_date` is not a date.
    pub fn start_date(&self) -> Result<NaiveDate, ConfigError> {
        clock::parse_date(&self.start_date).map_err(|e| ConfigError::Invalid {
            reason: format!("world.start_date: {e}"),
        })
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            start_date: default_start_date(),
            initial_speed: GameSpeed::Normal,
            start_paused: true,
            seed: None,
        }
    }
}

/// Scheduler cadence and failure handling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Real-time milliseconds between ticks at `normal` speed.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How long the scheduler waits before re-checking while paused.
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Backoff after the first consecutive tick failure.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Upper bound for the doubling backoff.
    #[serde(default = "default_error_backoff_ms")]
    pub max_error_backoff_ms: u64,

    /// Consecutive failures after which failures are logged at `error`.
    #[serde(default = "default_failure_alert_threshold")]
    pub failure_alert_threshold: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            pause_poll_ms: default_pause_poll_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            max_error_backoff_ms: default_error_backoff_ms(),
            failure_alert_threshold: default_failure_alert_threshold(),
        }
    }
}

/// Economy model constants.
///
/// Rates are annual; the tick applies the per-day equivalent (see
/// [`growth_periods_per_year`](Self::growth_periods_per_year)).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Growth before any adjustment (2.5%).
    #[serde(default = "default_base_growth_rate")]
    pub base_growth_rate: f64,

    /// Lower clamp for the growth rate (-5%).
    #[serde(default = "default_min_growth_rate")]
    pub min_growth_rate: f64,

    /// Upper clamp for the growth rate (10%).
    #[serde(default = "default_max_growth_rate")]
    pub max_growth_rate: f64,

    /// Tax rate above which growth is penalised.
    #[serde(default = "default_tax_baseline")]
    pub tax_baseline: f64,

    /// Growth lost per unit of tax above the baseline.
    #[serde(default = "default_tax_penalty_factor")]
    pub tax_penalty_factor: f64,

    /// Growth gained per unit of research spending.
    #[serde(default = "default_research_bonus_factor")]
    pub research_bonus_factor: f64,

    /// Maximum growth gained per trade partner.
    #[serde(default = "default_trade_boost_factor")]
    pub trade_boost_factor: f64,

    /// Maximum growth lost per sanctioning nation.
    #[serde(default = "default_sanction_penalty_factor")]
    pub sanction_penalty_factor: f64,

    /// Half-width of the uniform growth jitter.
    #[serde(default = "default_growth_jitter")]
    pub growth_jitter: f64,

    /// Number of ticks the annual rate is spread over (365 = one tick per day).
    #[serde(default = "default_growth_periods_per_year")]
    pub growth_periods_per_year: u32,

    /// GDP never falls below this.
    #[serde(default = "default_gdp_floor")]
    pub gdp_floor: f64,

    /// Military power lower bound.
    #[serde(default = "default_military_min")]
    pub military_min: f64,

    /// Military power upper bound.
    #[serde(default = "default_military_max")]
    pub military_max: f64,

    /// Lower bound of the per-tick military drift, in percent.
    #[serde(default = "default_military_drift_min")]
    pub military_drift_min: f64,

    /// Upper bound of the per-tick military drift, in percent.
    #[serde(default = "default_military_drift_max")]
    pub military_drift_max: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_growth_rate: default_base_growth_rate(),
            min_growth_rate: default_min_growth_rate(),
            max_growth_rate: default_max_growth_rate(),
            tax_baseline: default_tax_baseline(),
            tax_penalty_factor: default_tax_penalty_factor(),
            research_bonus_factor: default_research_bonus_factor(),
            trade_boost_factor: default_trade_boost_factor(),
            sanction_penalty_factor: default_sanction_penalty_factor(),
            growth_jitter: default_growth_jitter(),
            growth_periods_per_year: default_growth_periods_per_year(),
            gdp_floor: default_gdp_floor(),
            military_min: default_military_min(),
            military_max: default_military_max(),
            military_drift_min: default_military_drift_min(),
            military_drift_max: default_military_drift_max(),
        }
    }
}

/// Narrative event settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventConfig {
    /// Chance of an event per tick at `normal` speed.
    #[serde(default = "default_event_probability")]
    pub base_probability: f64,

    /// Maximum number of events kept in the log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            base_probability: default_event_probability(),
            log_capacity: default_log_capacity(),
        }
    }
}

/// Relations and sanctions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiplomacyConfig {
    /// A nation sanctions every nation it rates strictly below this.
    #[serde(default = "default_sanction_threshold")]
    pub sanction_threshold: u8,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            sanction_threshold: default_sanction_threshold(),
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_observer_port")]
    pub port: u16,

    /// Outbound frames buffered per connection before it is evicted.
    #[serde(default = "default_connection_queue_capacity")]
    pub connection_queue_capacity: usize,

    /// Enables the raw state-merge endpoint. Only for trusted deployments.
    #[serde(default)]
    pub admin_api_enabled: bool,
}

impl ObserverConfig {
    /// Override the port with `OBSERVER_PORT` when set and valid.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
            connection_queue_capacity: default_connection_queue_capacity(),
            admin_api_enabled: false,
        }
    }
}

/// Collaborator connection strings. Empty means "use the built-in roster".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` catalog URL.
    #[serde(default)]
    pub postgres_url: String,

    /// `Dragonfly`/Redis cache URL.
    #[serde(default)]
    pub dragonfly_url: String,
}

impl InfrastructureConfig {
    /// Override URLs with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.postgres_url = val;
        }
        if let Ok(val) = std::env::var("DRAGONFLY_URL").or_else(|_| std::env::var("REDIS_URL")) {
            self.dragonfly_url = val;
        }
    }

    /// Whether a catalog database is configured.
    pub const fn has_postgres(&self) -> bool {
        !self.postgres_url.is_empty()
    }

    /// Whether a cache is configured.
    pub const fn has_dragonfly(&self) -> bool {
        !self.dragonfly_url.is_empty()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Geopolitics 2025".to_owned()
}

fn default_start_date() -> String {
    "January 1, 2025".to_owned()
}

const fn default_true() -> bool {
    true
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_pause_poll_ms() -> u64 {
    1_000
}

const fn default_error_backoff_ms() -> u64 {
    5_000
}

const fn default_failure_alert_threshold() -> u64 {
    10
}

const fn default_base_growth_rate() -> f64 {
    0.025
}

const fn default_min_growth_rate() -> f64 {
    -0.05
}

const fn default_max_growth_rate() -> f64 {
    0.10
}

const fn default_tax_baseline() -> f64 {
    0.25
}

const fn default_tax_penalty_factor() -> f64 {
    0.1
}

const fn default_research_bonus_factor() -> f64 {
    0.2
}

const fn default_trade_boost_factor() -> f64 {
    0.02
}

const fn default_sanction_penalty_factor() -> f64 {
    0.03
}

const fn default_growth_jitter() -> f64 {
    0.01
}

const fn default_growth_periods_per_year() -> u32 {
    365
}

const fn default_gdp_floor() -> f64 {
    10.0
}

const fn default_military_min() -> f64 {
    10.0
}

const fn default_military_max() -> f64 {
    100.0
}

const fn default_military_drift_min() -> f64 {
    -0.1
}

const fn default_military_drift_max() -> f64 {
    0.2
}

const fn default_event_probability() -> f64 {
    0.01
}

const fn default_log_capacity() -> usize {
    20
}

const fn default_sanction_threshold() -> u8 {
    15
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8000
}

const fn default_connection_queue_capacity() -> usize {
    32
}

fn default_log_level() -> String {
    "info".to_owned()
}
