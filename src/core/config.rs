//! Rule-variant configuration.
//!
//! A catalog carries one `RulesConfig` under its `rules` key. Every number the
//! engine would otherwise hardcode (player range, limits, die faces, end
//! conditions, leftover conversions) lives here, so rule variants are data.
//!
//! All fields have defaults, so a catalog may give only the ones it changes:
//!
//! ```
//! use raiders_engine::core::RulesConfig;
//!
//! let rules: RulesConfig = serde_json::from_str(r#"{ "hand_limit": 6 }"#).unwrap();
//! assert_eq!(rules.hand_limit, 6);
//! assert_eq!(rules.crew_limit, RulesConfig::default().crew_limit);
//! ```

use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::resources::{Resource, ResourceBag};
use super::rng::DieFaces;
use super::worker::WorkerColor;
use crate::catalog::LocationKind;

/// Converts leftover resources to victory points at game end:
/// every full `per` units of `resource` score `vp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversion {
    pub resource: Resource,
    pub per: u32,
    pub vp: u32,
}

/// Ends the game once the remaining plunder on all sub-locations of
/// `kind` locations totals at most `at_most`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlunderDepletion {
    pub kind: LocationKind,
    pub at_most: u32,
}

/// Game-end thresholds, checked at round end in field order.
/// `None` disables a condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EndConditions {
    /// Game ends after this round completes.
    pub round_limit: Option<u32>,
    /// Game ends once the unrevealed offering stack has at most this many tiles.
    pub offering_stack_at_most: Option<u32>,
    pub plunder_depleted: Option<PlunderDepletion>,
    /// Game ends once the draw pile (after refill) has at most this many cards.
    pub draw_pile_at_most: Option<u32>,
}

impl Default for EndConditions {
    fn default() -> Self {
        Self {
            round_limit: Some(8),
            offering_stack_at_most: Some(0),
            plunder_depleted: Some(PlunderDepletion {
                kind: LocationKind::Fortress,
                at_most: 1,
            }),
            draw_pile_at_most: None,
        }
    }
}

impl EndConditions {
    /// Only the round limit applies.
    #[must_use]
    pub fn round_limit_only(rounds: u32) -> Self {
        Self {
            round_limit: Some(rounds),
            offering_stack_at_most: None,
            plunder_depleted: None,
            draw_pile_at_most: None,
        }
    }
}

/// Complete rules configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub min_players: usize,
    pub max_players: usize,

    /// Resources every player starts with.
    pub starting_resources: ResourceBag,

    /// Colour of each player's starting token.
    pub starting_worker: WorkerColor,

    /// Cards dealt to each player at setup.
    pub starting_hand_size: u32,

    /// Draws stop once the hand holds this many cards.
    pub hand_limit: u32,

    pub crew_limit: u32,

    pub armour_max: u32,

    /// Price of one armour level.
    pub armour_cost: ResourceBag,

    /// Work turns a player may take per round before being skipped.
    pub work_turns_per_round: u32,

    /// Face-up offerings available to claim.
    pub offering_row_size: u32,

    /// Faces of one raid die.
    pub die: DieFaces,

    pub end_conditions: EndConditions,

    /// Scored in order at game end.
    pub leftover_conversions: Vec<Conversion>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            starting_resources: ResourceBag::from_pairs(&[(Resource::Silver, 2)]),
            starting_worker: WorkerColor::Black,
            starting_hand_size: 5,
            hand_limit: 8,
            crew_limit: 5,
            armour_max: 10,
            armour_cost: ResourceBag::from_pairs(&[(Resource::Silver, 2)]),
            work_turns_per_round: 2,
            offering_row_size: 3,
            die: DieFaces::default(),
            end_conditions: EndConditions::default(),
            leftover_conversions: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Set the allowed player range.
    #[must_use]
    pub fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    #[must_use]
    pub fn with_starting_resources(mut self, resources: ResourceBag) -> Self {
        self.starting_resources = resources;
        self
    }

    #[must_use]
    pub fn with_starting_worker(mut self, color: WorkerColor) -> Self {
        self.starting_worker = color;
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, size: u32) -> Self {
        self.starting_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_hand_limit(mut self, limit: u32) -> Self {
        self.hand_limit = limit;
        self
    }

    #[must_use]
    pub fn with_crew_limit(mut self, limit: u32) -> Self {
        self.crew_limit = limit;
        self
    }

    #[must_use]
    pub fn with_armour(mut self, max: u32, cost: ResourceBag) -> Self {
        self.armour_max = max;
        self.armour_cost = cost;
        self
    }

    #[must_use]
    pub fn with_work_turns_per_round(mut self, turns: u32) -> Self {
        self.work_turns_per_round = turns;
        self
    }

    #[must_use]
    pub fn with_offering_row_size(mut self, size: u32) -> Self {
        self.offering_row_size = size;
        self
    }

    #[must_use]
    pub fn with_die(mut self, die: DieFaces) -> Self {
        self.die = die;
        self
    }

    #[must_use]
    pub fn with_end_conditions(mut self, end_conditions: EndConditions) -> Self {
        self.end_conditions = end_conditions;
        self
    }

    /// Add a leftover-resource conversion.
    #[must_use]
    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.leftover_conversions.push(conversion);
        self
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let out_of_domain = |field: &'static str, detail: String| CatalogError::OutOfDomain {
            entity: "rules".to_string(),
            field,
            detail,
        };

        if self.min_players == 0 || self.min_players > self.max_players || self.max_players > 255 {
            return Err(out_of_domain(
                "min_players",
                format!("player range {}..={} is empty or out of 1..=255", self.min_players, self.max_players),
            ));
        }
        if self.die.min > self.die.max {
            return Err(out_of_domain(
                "die",
                format!("min {} exceeds max {}", self.die.min, self.die.max),
            ));
        }
        if self.hand_limit < self.starting_hand_size {
            return Err(out_of_domain(
                "hand_limit",
                format!("{} is below starting hand size {}", self.hand_limit, self.starting_hand_size),
            ));
        }
        if self.crew_limit == 0 {
            return Err(out_of_domain("crew_limit", "must be at least 1".to_string()));
        }
        if self.work_turns_per_round == 0 {
            return Err(out_of_domain("work_turns_per_round", "must be at least 1".to_string()));
        }
        if self.end_conditions.round_limit == Some(0) {
            return Err(out_of_domain("end_conditions.round_limit", "must be at least 1".to_string()));
        }
        if let Some(conversion) = self.leftover_conversions.iter().find(|c| c.per == 0) {
            return Err(out_of_domain(
                "leftover_conversions",
                format!("{} conversion has a zero divisor", conversion.resource),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let rules = RulesConfig::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.min_players, 2);
        assert_eq!(rules.max_players, 4);
        assert_eq!(rules.starting_resources.get(Resource::Silver), 2);
        assert_eq!(rules.end_conditions.round_limit, Some(8));
    }

    #[test]
    fn test_builder() {
        let rules = RulesConfig::default()
            .with_players(2, 2)
            .with_die(DieFaces::new(0, 5))
            .with_end_conditions(EndConditions::round_limit_only(3))
            .with_conversion(Conversion {
                resource: Resource::Silver,
                per: 3,
                vp: 1,
            });

        assert_eq!(rules.max_players, 2);
        assert_eq!(rules.die, DieFaces::new(0, 5));
        assert_eq!(rules.end_conditions.offering_stack_at_most, None);
        assert_eq!(rules.leftover_conversions.len(), 1);
    }

    #[test]
    fn test_rejects_inverted_die() {
        let rules = RulesConfig::default().with_die(DieFaces::new(6, 1));
        let err = rules.validate().unwrap_err();
        assert!(matches!(err, CatalogError::OutOfDomain { field: "die", .. }));
    }

    #[test]
    fn test_rejects_bad_player_range() {
        assert!(RulesConfig::default().with_players(0, 4).validate().is_err());
        assert!(RulesConfig::default().with_players(3, 2).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_round_limit_and_divisor() {
        let rules = RulesConfig::default().with_end_conditions(EndConditions::round_limit_only(0));
        assert!(rules.validate().is_err());

        let rules = RulesConfig::default().with_conversion(Conversion {
            resource: Resource::Gold,
            per: 0,
            vp: 1,
        });
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_end_conditions_serde() {
        let json = r#"{ "round_limit": 5, "plunder_depleted": null }"#;
        let end: EndConditions = serde_json::from_str(json).unwrap();

        assert_eq!(end.round_limit, Some(5));
        assert_eq!(end.plunder_depleted, None);
        assert_eq!(end.offering_stack_at_most, Some(0));
    }
}
