/// How the turn scheduler decides who acts next.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SchedulerMode {
    /// Everyone acts once per round, fastest first.
    #[default]
    RoundRobin,
    /// Speed fills an action-point gauge; a full gauge grants a turn.
    ActionPoints,
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Scheduler variant, fixed before the match starts.
    pub scheduler: SchedulerMode,

    /// Gauge gained per scheduler tick per point of final speed (action-point mode).
    pub ap_recovery_rate: f64,

    /// Base seed for every random roll (crits, passive triggers).
    pub rng_seed: u64,

    /// Safety stop: the match ends after this many rounds even if both sides live.
    pub max_rounds: u32,

    /// Safety stop for the tick loop.
    pub max_ticks: u64,

    /// Real-time pause between ticks. Zero runs the simulation flat out.
    pub tick_interval_ms: u64,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Independent poison instances one entity may carry.
    pub const MAX_POISON_INSTANCES: usize = 10;
    /// Gauge value that grants a turn in action-point mode.
    pub const ACTION_POINT_THRESHOLD: f64 = 100.0;
    /// Resistance reductions at or below this are not reported.
    pub const RESISTANCE_REPORT_EPSILON: f64 = 0.1;
    /// Crit multiplier used when the caster has no crit component.
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 2.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AP_RECOVERY_RATE: f64 = 0.1;
    pub const DEFAULT_RNG_SEED: u64 = 0x5eed;
    pub const DEFAULT_MAX_ROUNDS: u32 = 50;
    pub const DEFAULT_MAX_TICKS: u64 = 100_000;

    pub fn new() -> Self {
        Self {
            scheduler: SchedulerMode::default(),
            ap_recovery_rate: Self::DEFAULT_AP_RECOVERY_RATE,
            rng_seed: Self::DEFAULT_RNG_SEED,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            tick_interval_ms: 0,
        }
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerMode) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    pub fn with_ap_recovery_rate(mut self, rate: f64) -> Self {
        self.ap_recovery_rate = rate;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_mode_parses_from_env_style_strings() {
        assert_eq!(
            "action_points".parse::<SchedulerMode>().unwrap(),
            SchedulerMode::ActionPoints
        );
        assert_eq!(
            "Round_Robin".parse::<SchedulerMode>().unwrap(),
            SchedulerMode::RoundRobin
        );
        assert!("initiative".parse::<SchedulerMode>().is_err());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = GameConfig::new()
            .with_scheduler(SchedulerMode::ActionPoints)
            .with_seed(7);
        assert_eq!(config.scheduler, SchedulerMode::ActionPoints);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.max_rounds, GameConfig::DEFAULT_MAX_ROUNDS);
    }
}
