//! Effect definitions.
//!
//! Every effect kind is a closed variant; adding a kind means adding a
//! variant and its evaluator arm, and the compiler points at every `match`
//! that has to learn about it.
//!
//! - `Effect`: one-shot changes, run by buildings and immediate cards
//! - `CardEffect`: a card's effect, tagged by when it applies
//! - `Modifier`: standing bonuses of hired crew
//! - `RaidTrigger`: consulted while the owner's crew resolves a raid
//! - `EndGameBonus`: consulted only by scoring

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use crate::catalog::BuildingId;
use crate::core::{Resource, ResourceBag, WorkerColor};

static NOTHING: Effect = Effect::Nothing;

/// An atomic one-shot effect applied to the acting player.
///
/// Catalog JSON uses the snake-case variant name as `type`:
///
/// ```
/// use raiders_engine::effects::Effect;
///
/// let effect: Effect = serde_json::from_str(r#"{ "type": "draw", "count": 2 }"#).unwrap();
/// assert_eq!(effect, Effect::Draw { count: 2 });
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    #[default]
    Nothing,

    Gain { resources: ResourceBag },

    /// Pick the branch matching the colour of the worker involved.
    ByColor { grey: Box<Effect>, black: Box<Effect> },

    /// Pay `give` to receive `receive`. Illegal if `give` is not held.
    Trade { give: ResourceBag, receive: ResourceBag },

    /// Draw from the top of the draw pile, stopping at the hand limit.
    Draw { count: u32 },

    /// Gain armour levels, up to the armour maximum.
    Armour { amount: u32 },

    /// Advance the valkyrie track.
    Track { amount: u32 },

    Victory { amount: u32 },

    /// Every opponent loses up to `amount` of `resource`.
    OpponentsLose { resource: Resource, amount: u32 },

    /// Apply in order.
    All { effects: Vec<Effect> },
}

impl Effect {
    pub fn gain(resource: Resource, amount: u32) -> Self {
        Self::Gain {
            resources: ResourceBag::from_pairs(&[(resource, amount)]),
        }
    }

    pub fn by_color(grey: Effect, black: Effect) -> Self {
        Self::ByColor {
            grey: Box::new(grey),
            black: Box::new(black),
        }
    }

    pub fn trade(give: ResourceBag, receive: ResourceBag) -> Self {
        Self::Trade { give, receive }
    }

    pub fn all(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::All {
            effects: effects.into_iter().collect(),
        }
    }

    /// Resolve colour branches for a worker of `color`.
    #[must_use]
    pub fn for_color(&self, color: Option<WorkerColor>) -> &Effect {
        match (self, color) {
            (Effect::ByColor { grey, .. }, Some(WorkerColor::Grey)) => grey.for_color(color),
            (Effect::ByColor { black, .. }, Some(WorkerColor::Black)) => black.for_color(color),
            (Effect::ByColor { .. }, None) => &NOTHING,
            _ => self,
        }
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Effect::Nothing)
    }

    /// Call `f` on this effect and every nested one, depth first.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Effect)) {
        f(self);
        match self {
            Effect::ByColor { grey, black } => {
                grey.visit(f);
                black.visit(f);
            }
            Effect::All { effects } => {
                for effect in effects {
                    effect.visit(f);
                }
            }
            _ => {}
        }
    }
}

/// When a card effect applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Once, when the card is played.
    Immediate,
    /// Standing modifier while the card is in the crew.
    Permanent,
    /// During raids by the card's owner.
    RaidTriggered,
    /// At scoring.
    EndGame,
}

/// A card's effect, tagged by classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardEffect {
    Immediate { effect: Effect },
    Permanent { modifier: Modifier },
    RaidTriggered { trigger: RaidTrigger },
    EndGame { bonus: EndGameBonus },
}

impl CardEffect {
    #[must_use]
    pub fn effect_type(&self) -> EffectType {
        match self {
            CardEffect::Immediate { .. } => EffectType::Immediate,
            CardEffect::Permanent { .. } => EffectType::Permanent,
            CardEffect::RaidTriggered { .. } => EffectType::RaidTriggered,
            CardEffect::EndGame { .. } => EffectType::EndGame,
        }
    }

    #[must_use]
    pub fn immediate(&self) -> Option<&Effect> {
        match self {
            CardEffect::Immediate { effect } => Some(effect),
            _ => None,
        }
    }

    #[must_use]
    pub fn modifier(&self) -> Option<&Modifier> {
        match self {
            CardEffect::Permanent { modifier } => Some(modifier),
            _ => None,
        }
    }

    #[must_use]
    pub fn raid_trigger(&self) -> Option<&RaidTrigger> {
        match self {
            CardEffect::RaidTriggered { trigger } => Some(trigger),
            _ => None,
        }
    }

    #[must_use]
    pub fn end_game(&self) -> Option<&EndGameBonus> {
        match self {
            CardEffect::EndGame { bonus } => Some(bonus),
            _ => None,
        }
    }
}

/// A player statistic that scales a bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStat {
    Armour,
    Track,
    Crew,
}

/// Standing modifier of a hired card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modifier {
    /// Flat raid strength while `condition` holds.
    StrengthBonus {
        amount: u32,
        #[serde(default)]
        condition: Condition,
    },

    /// `bonus` raid strength for every full `per` points of `stat`.
    StrengthPer { stat: PlayerStat, per: u32, bonus: u32 },

    /// Extra resources whenever the owner places at `building`.
    BuildingBonus { building: BuildingId, resources: ResourceBag },

    /// Silver off every later hire, floored at zero.
    HireDiscount { amount: u32 },
}

/// Raid-time effect of a hired card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RaidTrigger {
    StrengthBonus {
        amount: u32,
        #[serde(default)]
        condition: Condition,
    },

    /// Extra resources on a successful raid.
    ExtraPlunder {
        resources: ResourceBag,
        #[serde(default)]
        condition: Condition,
    },

    /// Extra VP/track on a successful raid.
    BonusReward {
        reward: Reward,
        #[serde(default)]
        condition: Condition,
    },

    /// Cheaper raid cost, floored at zero.
    CostReduction { resource: Resource, amount: u32 },
}

/// End-of-game VP bonus of a hired card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndGameBonus {
    Flat { vp: u32 },
    PerResource { resource: Resource, per: u32, vp: u32 },
    PerCrew { vp: u32 },
    PerOffering { vp: u32 },
    PerArmour { per: u32, vp: u32 },
    PerTrack { per: u32, vp: u32 },
}

impl EndGameBonus {
    /// Divisor of a per-unit bonus, for validation.
    #[must_use]
    pub fn divisor(&self) -> Option<u32> {
        match self {
            EndGameBonus::PerResource { per, .. }
            | EndGameBonus::PerArmour { per, .. }
            | EndGameBonus::PerTrack { per, .. } => Some(*per),
            _ => None,
        }
    }
}

/// VP and track reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Reward {
    pub vp: u32,
    pub track: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocationKind;

    #[test]
    fn test_for_color_picks_branch() {
        let effect = Effect::by_color(
            Effect::gain(Resource::Silver, 1),
            Effect::gain(Resource::Silver, 2),
        );

        assert_eq!(
            effect.for_color(Some(WorkerColor::Black)),
            &Effect::gain(Resource::Silver, 2)
        );
        assert_eq!(
            effect.for_color(Some(WorkerColor::Grey)),
            &Effect::gain(Resource::Silver, 1)
        );
        assert!(effect.for_color(None).is_nothing());

        let plain = Effect::Draw { count: 1 };
        assert_eq!(plain.for_color(Some(WorkerColor::Grey)), &plain);
    }

    #[test]
    fn test_card_effect_json() {
        let json = r#"{
            "type": "raid_triggered",
            "trigger": {
                "type": "strength_bonus",
                "amount": 2,
                "condition": { "type": "location_kind", "kind": "monastery" }
            }
        }"#;
        let effect: CardEffect = serde_json::from_str(json).unwrap();

        assert_eq!(effect.effect_type(), EffectType::RaidTriggered);
        assert_eq!(
            effect.raid_trigger(),
            Some(&RaidTrigger::StrengthBonus {
                amount: 2,
                condition: Condition::LocationKind {
                    kind: LocationKind::Monastery
                },
            })
        );
        assert!(effect.immediate().is_none());
    }

    #[test]
    fn test_condition_defaults_to_always() {
        let json = r#"{ "type": "strength_bonus", "amount": 1 }"#;
        let modifier: Modifier = serde_json::from_str(json).unwrap();

        assert_eq!(
            modifier,
            Modifier::StrengthBonus {
                amount: 1,
                condition: Condition::Always
            }
        );
    }

    #[test]
    fn test_visit_walks_nested() {
        let effect = Effect::all([
            Effect::Draw { count: 1 },
            Effect::by_color(Effect::Nothing, Effect::Victory { amount: 1 }),
        ]);

        let mut seen = 0;
        effect.visit(&mut |_| seen += 1);
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_divisor() {
        assert_eq!(EndGameBonus::PerArmour { per: 2, vp: 1 }.divisor(), Some(2));
        assert_eq!(EndGameBonus::Flat { vp: 3 }.divisor(), None);
    }
}
