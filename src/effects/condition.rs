//! Conditions gating card bonuses.
//!
//! Conditions are checked against the owning player's current state and,
//! while a raid is being resolved, the kind of location being raided.

use serde::{Deserialize, Serialize};

use crate::catalog::LocationKind;
use crate::core::{PlayerState, Resource};

/// A condition that must hold for a bonus to apply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Always holds.
    #[default]
    Always,

    /// The raid being resolved targets a location of this kind.
    /// Never holds outside a raid.
    LocationKind { kind: LocationKind },

    ArmourAtLeast { amount: u32 },

    TrackAtLeast { amount: u32 },

    CrewAtLeast { count: u32 },

    ResourceAtLeast { resource: Resource, amount: u32 },

    /// All conditions must hold.
    All { conditions: Vec<Condition> },

    /// Condition must not hold.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All {
            conditions: conditions.into_iter().collect(),
        }
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not {
            condition: Box::new(self),
        }
    }
}

/// What a condition is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct ConditionContext<'a> {
    pub player: &'a PlayerState,
    /// Kind of the location being raided, if a raid is being resolved.
    pub raiding: Option<LocationKind>,
}

impl<'a> ConditionContext<'a> {
    /// Context outside a raid.
    pub fn new(player: &'a PlayerState) -> Self {
        Self { player, raiding: None }
    }

    /// Context while raiding a location of `kind`.
    pub fn raid(player: &'a PlayerState, kind: LocationKind) -> Self {
        Self {
            player,
            raiding: Some(kind),
        }
    }
}

/// Evaluator for conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext) -> bool {
        match condition {
            Condition::Always => true,

            Condition::LocationKind { kind } => ctx.raiding == Some(*kind),

            Condition::ArmourAtLeast { amount } => ctx.player.armour >= *amount,

            Condition::TrackAtLeast { amount } => ctx.player.track >= *amount,

            Condition::CrewAtLeast { count } => ctx.player.crew.len() as u32 >= *count,

            Condition::ResourceAtLeast { resource, amount } => ctx.player.resources.get(*resource) >= *amount,

            Condition::All { conditions } => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            Condition::Not { condition } => !Self::evaluate(condition, ctx),
        }
    }
}
