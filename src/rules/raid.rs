//! Raid resolution.
//!
//! Strength is the sum of:
//! - the printed strength of every crew card
//! - permanent `strength_bonus` modifiers whose condition holds, and
//!   `strength_per` modifiers scaled by the named stat
//! - raid-triggered `strength_bonus` effects whose condition holds
//! - one die per `bonus_dice` of the sub-location, rolled from the
//!   injected `RandomSource`
//!
//! Conditions are evaluated against the raider's state before the raid
//! cost is paid, with the raided location's kind in context. A raid
//! succeeds iff strength reaches the required strength. Success takes all
//! remaining plunder and grants the rewards; failure grants nothing. Both
//! consume the cost and leave the worker on the sub-location until round end.

use smallvec::SmallVec;
use tracing::debug;

use crate::catalog::{Catalog, LocationId, LocationKind, SubLocationDefinition, SubLocationId};
use crate::core::{Fault, GameState, InvariantViolationError, PlayerId, PlayerState, RandomSource, ResourceBag, Violation};
use crate::effects::{
    crew_modifiers, crew_raid_triggers, ConditionContext, ConditionEvaluator, EffectResolver, Modifier, PlayerStat,
    RaidTrigger, Reward,
};
use crate::events::{EventKind, GameEvent, Stat};

/// What a resolved raid rolled and scored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaidOutcome {
    /// Total strength including dice.
    pub strength: u32,
    pub required: u32,
    pub dice: SmallVec<[u32; 4]>,
    pub success: bool,
}

/// Sub-location cost after the crew's `cost_reduction` triggers.
#[must_use]
pub fn raid_cost(catalog: &Catalog, player: &PlayerState, sub: &SubLocationDefinition) -> ResourceBag {
    crew_raid_triggers(catalog, player).fold(sub.cost.clone(), |cost, trigger| match trigger {
        RaidTrigger::CostReduction { resource, amount } => cost.reduced(*resource, *amount),
        _ => cost,
    })
}

/// Strength before dice for a raid on a location of `kind`.
#[must_use]
pub fn base_strength(catalog: &Catalog, player: &PlayerState, kind: LocationKind) -> u32 {
    let ctx = ConditionContext::raid(player, kind);

    let crew: u32 = player
        .crew
        .iter()
        .filter_map(|id| catalog.card(id))
        .map(|card| card.strength)
        .fold(0, u32::saturating_add);

    let modifiers: u32 = crew_modifiers(catalog, player)
        .map(|modifier| match modifier {
            Modifier::StrengthBonus { amount, condition } if ConditionEvaluator::evaluate(condition, &ctx) => *amount,
            Modifier::StrengthPer { stat, per, bonus } => {
                let value = match stat {
                    PlayerStat::Armour => player.armour,
                    PlayerStat::Track => player.track,
                    PlayerStat::Crew => player.crew.len() as u32,
                };
                value.checked_div(*per).unwrap_or(0).saturating_mul(*bonus)
            }
            _ => 0,
        })
        .fold(0, u32::saturating_add);

    let triggers: u32 = crew_raid_triggers(catalog, player)
        .map(|trigger| match trigger {
            RaidTrigger::StrengthBonus { amount, condition } if ConditionEvaluator::evaluate(condition, &ctx) => {
                *amount
            }
            _ => 0,
        })
        .fold(0, u32::saturating_add);

    crew.saturating_add(modifiers).saturating_add(triggers)
}

/// Rewards on success from the crew's raid triggers.
fn triggered_rewards(catalog: &Catalog, player: &PlayerState, kind: LocationKind) -> (ResourceBag, Reward) {
    let ctx = ConditionContext::raid(player, kind);
    let mut plunder = ResourceBag::new();
    let mut reward = Reward::default();
    for trigger in crew_raid_triggers(catalog, player) {
        match trigger {
            RaidTrigger::ExtraPlunder { resources, condition } if ConditionEvaluator::evaluate(condition, &ctx) => {
                for (resource, amount) in resources.iter() {
                    plunder = plunder.with(resource, amount);
                }
            }
            RaidTrigger::BonusReward { reward: bonus, condition } if ConditionEvaluator::evaluate(condition, &ctx) => {
                reward.vp = reward.vp.saturating_add(bonus.vp);
                reward.track = reward.track.saturating_add(bonus.track);
            }
            _ => {}
        }
    }
    (plunder, reward)
}

/// Resolve a raid by `player` with the held worker. Preconditions have
/// already been checked.
pub(crate) fn resolve(
    catalog: &Catalog,
    state: &mut GameState,
    player: PlayerId,
    location: &LocationId,
    sub_location: &SubLocationId,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) -> Result<RaidOutcome, Fault> {
    let loc = catalog
        .raid_location(location)
        .ok_or_else(|| Violation::UnknownLocation(location.clone()))?;
    let sub = loc
        .sub_location(sub_location)
        .ok_or_else(|| Violation::UnknownSubLocation {
            location: location.clone(),
            sub_location: sub_location.clone(),
        })?;
    let subject = format!("{location}/{sub_location}");

    let raider = &state.players[player];
    let base = base_strength(catalog, raider, loc.kind);
    let cost = raid_cost(catalog, raider, sub);
    let (extra_plunder, bonus_reward) = triggered_rewards(catalog, raider, loc.kind);

    EffectResolver::pay(state, player, &cost, &subject, events)?;

    let token = state.players[player].worker.take().ok_or(Violation::NoWorkerInHand)?;
    let spot = state
        .board
        .sub_location_mut(location, sub_location)
        .ok_or_else(|| Violation::UnknownSubLocation {
            location: location.clone(),
            sub_location: sub_location.clone(),
        })?;
    spot.occupant = Some(token);

    events.push(
        GameEvent::new(EventKind::RaidAttempted)
            .with_player(player)
            .with_subject(&subject)
            .with_delta(Stat::Required, i64::from(sub.required_strength)),
    );

    let faces = catalog.rules().die;
    let mut dice = SmallVec::new();
    for _ in 0..sub.bonus_dice {
        let value = rng.roll_die(faces);
        if !faces.contains(value) {
            return Err(InvariantViolationError::new(
                "die_range",
                format!("rolled {value}, die faces are {}..={}", faces.min, faces.max),
            )
            .into());
        }
        events.push(GameEvent::die_rolled(player, &subject, value));
        dice.push(value);
    }

    let strength = dice.iter().fold(base, |total, die| total.saturating_add(*die));
    let success = strength >= sub.required_strength;
    debug!(%player, raid = %subject, strength, required = sub.required_strength, success, "raid resolved");

    let outcome = RaidOutcome {
        strength,
        required: sub.required_strength,
        dice,
        success,
    };

    if !success {
        events.push(
            GameEvent::new(EventKind::RaidFailed)
                .with_player(player)
                .with_subject(&subject)
                .with_delta(Stat::Strength, i64::from(strength))
                .with_delta(Stat::Required, i64::from(sub.required_strength)),
        );
        return Ok(outcome);
    }

    let plunder = state
        .board
        .sub_location_mut(location, sub_location)
        .map(|spot| spot.plunder.drain())
        .unwrap_or_default();
    let vp = sub
        .reward
        .vp
        .saturating_add(loc.vp_for_strength(strength))
        .saturating_add(bonus_reward.vp);
    let track = sub.reward.track.saturating_add(bonus_reward.track);

    events.push(
        GameEvent::new(EventKind::RaidSucceeded)
            .with_player(player)
            .with_subject(&subject)
            .with_delta(Stat::Strength, i64::from(strength))
            .with_delta(Stat::Required, i64::from(sub.required_strength))
            .with_resources(&plunder, 1),
    );
    EffectResolver::gain(state, player, &plunder, &subject, events)?;
    EffectResolver::gain(state, player, &extra_plunder, &subject, events)?;
    EffectResolver::add_vp(state, player, vp, &subject, events)?;
    EffectResolver::advance_track(state, player, track, &subject, events)?;

    Ok(outcome)
}
