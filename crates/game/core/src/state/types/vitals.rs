//! Numeric pools: health, shield, and the spendable resources.

/// Current and maximum hit points.
///
/// The current value is clamped to `[0, max]` on every write. Writes report the
/// change (if any) so the caller can publish a health-changed notification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    hp: f64,
    max_hp: f64,
}

/// A health write that actually moved the value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthChange {
    pub old_hp: f64,
    pub new_hp: f64,
    pub max_hp: f64,
}

impl HealthChange {
    pub fn delta(&self) -> f64 {
        self.new_hp - self.old_hp
    }
}

impl Health {
    pub fn new(max_hp: f64) -> Self {
        let max_hp = max_hp.max(0.0);
        Self { hp: max_hp, max_hp }
    }

    pub fn with_current(max_hp: f64, hp: f64) -> Self {
        let mut health = Self::new(max_hp);
        health.hp = hp.clamp(0.0, health.max_hp);
        health
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn missing(&self) -> f64 {
        self.max_hp - self.hp
    }

    pub fn ratio(&self) -> f64 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            self.hp / self.max_hp
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }

    /// Writes a new value, clamped to `[0, max]`.
    pub fn set(&mut self, value: f64) -> Option<HealthChange> {
        let old_hp = self.hp;
        self.hp = value.clamp(0.0, self.max_hp);
        (self.hp != old_hp).then_some(HealthChange {
            old_hp,
            new_hp: self.hp,
            max_hp: self.max_hp,
        })
    }
}

/// Flat absorption pool consumed before resistances.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shield {
    pub value: f64,
}

impl Shield {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.max(0.0),
        }
    }

    /// Grants stack additively.
    pub fn add(&mut self, amount: f64) {
        self.value += amount.max(0.0);
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mana {
    pub current: f64,
    pub max: f64,
}

impl Mana {
    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Energy {
    pub current: f64,
    pub max: f64,
    /// Restored at the end of each of the owner's turns.
    pub recovery_per_turn: f64,
}

impl Energy {
    pub fn new(max: f64, recovery_per_turn: f64) -> Self {
        Self {
            current: max,
            max,
            recovery_per_turn,
        }
    }
}

/// Charge for ultimate spells, filled by casting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UltimateCharge {
    pub current: f64,
    pub max: f64,
}

impl UltimateCharge {
    pub fn new(max: f64) -> Self {
        Self { current: 0.0, max }
    }
}

/// Base speed. Final speed is this value after stat-query modifiers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed {
    pub base: f64,
}

impl Speed {
    pub fn new(base: f64) -> Self {
        Self { base }
    }
}

/// Action-point gauge used by the action-point scheduler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionGauge {
    pub value: f64,
}
