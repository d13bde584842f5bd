//! Effect system.
//!
//! Card and building abilities are closed, tagged variants with one
//! evaluator arm per tag:
//! - `Effect`: one-shot changes (building actions, immediate cards)
//! - `Modifier`, `RaidTrigger`, `EndGameBonus`: standing crew effects,
//!   consulted by hiring, raid resolution and scoring
//! - `Condition`: gates on the acting player's state
//! - `EffectResolver`: executes an `Effect` on game state
//!
//! Catalog JSON names each variant by its snake-case `type`; an unknown
//! type fails catalog parsing instead of being looked up at runtime.

mod condition;
mod effect;
mod resolver;

pub use condition::{Condition, ConditionContext, ConditionEvaluator};
pub use effect::{CardEffect, Effect, EffectType, EndGameBonus, Modifier, PlayerStat, RaidTrigger, Reward};
pub use resolver::{
    building_bonus, crew_modifiers, crew_raid_triggers, hire_cost, hire_discount, EffectContext, EffectResolver,
};
