//! Catalog definitions: static data for cards, buildings, raid locations,
//! offerings and exchanges.
//!
//! Definitions are immutable once loaded. Runtime state refers to them by
//! id only.

use serde::{Deserialize, Serialize};

use super::ids::{BuildingId, CardId, ExchangeId, LocationId, OfferingId, SubLocationId};
use crate::core::{ResourceBag, WorkerColor};
use crate::effects::{CardEffect, Effect, Reward};

fn one() -> u32 {
    1
}

/// Static townsfolk card definition.
///
/// ## Example
///
/// ```
/// use raiders_engine::catalog::CardDefinition;
/// use raiders_engine::core::WorkerColor;
///
/// let archer = CardDefinition::new("archer", "Archer")
///     .with_cost(2)
///     .with_strength(3)
///     .with_hire_color(WorkerColor::Black);
///
/// assert_eq!(archer.strength, 3);
/// assert_eq!(archer.deck_count, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Silver paid to hire.
    #[serde(default)]
    pub cost: u32,

    /// Raid strength while in the crew.
    #[serde(default)]
    pub strength: u32,

    /// VP credited when hired.
    #[serde(default)]
    pub vp: u32,

    /// Copies in the draw deck.
    #[serde(default = "one")]
    pub deck_count: u32,

    /// Worker colour needed to hire. `None` accepts either.
    #[serde(default)]
    pub hire_color: Option<WorkerColor>,

    /// Heroes cannot be played, and a crew holds at most one.
    #[serde(default)]
    pub hero: bool,

    #[serde(default)]
    pub effect: Option<CardEffect>,
}

impl CardDefinition {
    /// Create a free, strength-0 card with one copy and no effect.
    pub fn new(id: impl Into<CardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost: 0,
            strength: 0,
            vp: 0,
            deck_count: 1,
            hire_color: None,
            hero: false,
            effect: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_strength(mut self, strength: u32) -> Self {
        self.strength = strength;
        self
    }

    #[must_use]
    pub fn with_vp(mut self, vp: u32) -> Self {
        self.vp = vp;
        self
    }

    #[must_use]
    pub fn with_deck_count(mut self, count: u32) -> Self {
        self.deck_count = count;
        self
    }

    #[must_use]
    pub fn with_hire_color(mut self, color: WorkerColor) -> Self {
        self.hire_color = Some(color);
        self
    }

    #[must_use]
    pub fn as_hero(mut self) -> Self {
        self.hero = true;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The effect to run when the card is played, if it has one.
    #[must_use]
    pub fn immediate_effect(&self) -> Option<&Effect> {
        self.effect.as_ref().and_then(CardEffect::immediate)
    }
}

/// Static village building definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    pub id: BuildingId,
    pub name: String,

    /// Maximum tokens at once. `None` is unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,

    /// Only workers of this colour may be placed here.
    #[serde(default)]
    pub color: Option<WorkerColor>,

    /// Neutral token put here at setup.
    #[serde(default)]
    pub starting_worker: Option<WorkerColor>,

    /// Runs for the placing player, with the placed token's colour.
    #[serde(default)]
    pub on_place: Effect,

    /// Runs for the picking player, with the picked token's colour.
    #[serde(default)]
    pub on_pickup: Effect,
}

impl BuildingDefinition {
    /// Create an unrestricted building with no effects.
    pub fn new(id: impl Into<BuildingId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity: None,
            color: None,
            starting_worker: None,
            on_place: Effect::Nothing,
            on_pickup: Effect::Nothing,
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: WorkerColor) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_starting_worker(mut self, color: WorkerColor) -> Self {
        self.starting_worker = Some(color);
        self
    }

    #[must_use]
    pub fn on_place(mut self, effect: Effect) -> Self {
        self.on_place = effect;
        self
    }

    #[must_use]
    pub fn on_pickup(mut self, effect: Effect) -> Self {
        self.on_pickup = effect;
        self
    }
}

/// Kind of raid location. Conditions and end conditions key on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Harbor,
    Outpost,
    Monastery,
    Fortress,
}

/// VP for reaching `min_strength` at a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VpTier {
    pub min_strength: u32,
    pub vp: u32,
}

/// One raid spot within a location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLocationDefinition {
    pub id: SubLocationId,

    /// A raid succeeds when its strength reaches this.
    pub required_strength: u32,

    /// Only workers of this colour may raid here.
    #[serde(default)]
    pub color: Option<WorkerColor>,

    /// Dice added to the raid strength.
    #[serde(default)]
    pub bonus_dice: u32,

    /// Paid to attempt, win or lose.
    #[serde(default)]
    pub cost: ResourceBag,

    /// Stocked at setup; a successful raid takes all that remains.
    pub plunder: ResourceBag,

    #[serde(default)]
    pub reward: Reward,
}

impl SubLocationDefinition {
    pub fn new(id: impl Into<SubLocationId>, required_strength: u32, plunder: ResourceBag) -> Self {
        Self {
            id: id.into(),
            required_strength,
            color: None,
            bonus_dice: 0,
            cost: ResourceBag::new(),
            plunder,
            reward: Reward::default(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: WorkerColor) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_bonus_dice(mut self, dice: u32) -> Self {
        self.bonus_dice = dice;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: ResourceBag) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = reward;
        self
    }
}

/// Static raid location definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidLocationDefinition {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,

    /// Crew size needed to raid here.
    #[serde(default)]
    pub min_crew: u32,

    /// Strength-based VP on success; the best reached tier applies.
    #[serde(default)]
    pub vp_tiers: Vec<VpTier>,

    pub sub_locations: Vec<SubLocationDefinition>,
}

impl RaidLocationDefinition {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            min_crew: 0,
            vp_tiers: Vec::new(),
            sub_locations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_min_crew(mut self, min_crew: u32) -> Self {
        self.min_crew = min_crew;
        self
    }

    #[must_use]
    pub fn with_tier(mut self, min_strength: u32, vp: u32) -> Self {
        self.vp_tiers.push(VpTier { min_strength, vp });
        self
    }

    #[must_use]
    pub fn with_sub_location(mut self, sub: SubLocationDefinition) -> Self {
        self.sub_locations.push(sub);
        self
    }

    #[must_use]
    pub fn sub_location(&self, id: &SubLocationId) -> Option<&SubLocationDefinition> {
        self.sub_locations.iter().find(|s| &s.id == id)
    }

    /// VP of the best tier reached by `strength`, 0 if none.
    ///
    /// ```
    /// use raiders_engine::catalog::{LocationKind, RaidLocationDefinition};
    ///
    /// let fortress = RaidLocationDefinition::new("fortress_1", "Fortress", LocationKind::Fortress)
    ///     .with_tier(10, 2)
    ///     .with_tier(14, 4);
    ///
    /// assert_eq!(fortress.vp_for_strength(9), 0);
    /// assert_eq!(fortress.vp_for_strength(12), 2);
    /// assert_eq!(fortress.vp_for_strength(20), 4);
    /// ```
    #[must_use]
    pub fn vp_for_strength(&self, strength: u32) -> u32 {
        self.vp_tiers
            .iter()
            .filter(|tier| strength >= tier.min_strength)
            .map(|tier| tier.vp)
            .max()
            .unwrap_or(0)
    }
}

/// Static offering tile definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingDefinition {
    pub id: OfferingId,
    pub cost: ResourceBag,
    #[serde(default)]
    pub vp: u32,
    #[serde(default)]
    pub track: u32,
}

/// A resource conversion available through `TakeResources`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDefinition {
    pub id: ExchangeId,
    pub give: ResourceBag,
    pub receive: ResourceBag,
}
