//! Common error infrastructure for game-core.
//!
//! Event handlers return [`CombatError`]; the bus logs failures with their
//! [`GameError::error_code`] and severity and keeps dispatching. Nothing here is
//! meant to stop a match.
//!
//! # Taxonomy
//!
//! - **Missing data** (unknown spell, effect, item): [`ErrorSeverity::Validation`],
//!   the operation is aborted before any state is touched.
//! - **Insufficient resources**: [`ErrorSeverity::Recoverable`], surfaced to the
//!   player and the actor keeps the turn.
//! - **Store misuse** (removing a multi-instance kind as a singleton):
//!   [`ErrorSeverity::Internal`].

use crate::state::{ComponentKind, EntityId, ResourceKind};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same actor may try again with another action
/// - **Validation**: the request referenced something that does not exist
/// - **Internal**: the engine was asked to do something inconsistent
/// - **Fatal**: reserved for setup failures outside a running match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - retry with a different action.
    ///
    /// Examples: not enough mana, no charges left on an item
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown spell id, target entity not found
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - the engine cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Stable across releases; logs and tests match on it.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Kinds of definition records looked up through the content oracle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataKind {
    Spell,
    StatusEffect,
    Item,
    Passive,
    Character,
}

/// Errors raised while resolving combat events.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CombatError {
    /// The referenced entity does not exist in the world.
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// The entity exists but lacks a component the operation needs.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: ComponentKind,
    },

    /// A definition id did not resolve through the content oracle.
    #[error("unknown {kind} '{id}'")]
    MissingData { kind: DataKind, id: String },

    /// The actor cannot pay for the action.
    #[error("{entity} needs {required} {resource} but has {available}")]
    InsufficientResource {
        entity: EntityId,
        resource: ResourceKind,
        required: f64,
        available: f64,
    },

    /// No content oracle was wired into the environment.
    #[error("content oracle not available")]
    ContentUnavailable,

    /// Multi-instance components cannot be removed through the singleton API.
    #[error("{0} components allow multiple instances and cannot be removed as a singleton")]
    NotSingleton(ComponentKind),
}

impl CombatError {
    pub fn missing(kind: DataKind, id: impl Into<String>) -> Self {
        Self::MissingData {
            kind,
            id: id.into(),
        }
    }
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        use CombatError::*;
        match self {
            InsufficientResource { .. } => ErrorSeverity::Recoverable,
            EntityNotFound(_) | MissingComponent { .. } | MissingData { .. } => {
                ErrorSeverity::Validation
            }
            ContentUnavailable | NotSingleton(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use CombatError::*;
        match self {
            EntityNotFound(_) => "COMBAT_ENTITY_NOT_FOUND",
            MissingComponent { .. } => "COMBAT_MISSING_COMPONENT",
            MissingData { .. } => "COMBAT_MISSING_DATA",
            InsufficientResource { .. } => "COMBAT_INSUFFICIENT_RESOURCE",
            ContentUnavailable => "COMBAT_CONTENT_UNAVAILABLE",
            NotSingleton(_) => "COMBAT_NOT_SINGLETON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_severity() {
        let missing = CombatError::missing(DataKind::Spell, "fireball");
        assert_eq!(missing.severity(), ErrorSeverity::Validation);
        assert_eq!(missing.error_code(), "COMBAT_MISSING_DATA");
        assert_eq!(missing.to_string(), "unknown spell 'fireball'");

        let broke = CombatError::InsufficientResource {
            entity: EntityId(3),
            resource: ResourceKind::Mana,
            required: 40.0,
            available: 10.0,
        };
        assert!(broke.severity().is_recoverable());
        assert_eq!(broke.to_string(), "#3 needs 40 mana but has 10");

        assert!(CombatError::ContentUnavailable.severity().is_internal());
    }
}
