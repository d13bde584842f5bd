//! Catalog loading, validation and lookup.
//!
//! `Catalog::load` is the only way to build a catalog, and it validates
//! everything up front: ids, cross references and value domains. The rest
//! of the engine can then look definitions up by id and treat a miss as a
//! malformed action, never as malformed data.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use super::definition::{
    BuildingDefinition, CardDefinition, ExchangeDefinition, OfferingDefinition, RaidLocationDefinition,
    SubLocationDefinition,
};
use super::ids::{BuildingId, CardId, ExchangeId, LocationId, OfferingId, SubLocationId};
use crate::core::{CatalogError, RulesConfig};
use crate::effects::{CardEffect, Effect, Modifier};

/// Raw catalog records, one collection per entity kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    #[serde(default)]
    pub rules: RulesConfig,
    pub cards: Vec<CardDefinition>,
    pub buildings: Vec<BuildingDefinition>,
    pub raid_locations: Vec<RaidLocationDefinition>,
    #[serde(default)]
    pub offerings: Vec<OfferingDefinition>,
    #[serde(default)]
    pub exchanges: Vec<ExchangeDefinition>,
}

/// A validated collection kept in load order with an id index.
#[derive(Clone, Debug)]
struct Indexed<K, V> {
    items: Vec<V>,
    index: FxHashMap<K, usize>,
}

impl<K: Eq + Hash + Clone + std::fmt::Display, V> Indexed<K, V> {
    fn build(
        collection: &'static str,
        items: Vec<V>,
        id: impl Fn(&V) -> &K,
    ) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();
        for (position, item) in items.iter().enumerate() {
            let key = id(item);
            if index.insert(key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    collection,
                    id: key.to_string(),
                });
            }
        }
        Ok(Self { items, index })
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.items[i])
    }
}

/// Immutable, validated game data.
///
/// Shared by reference between any number of concurrent games.
///
/// ## Example
///
/// ```
/// use raiders_engine::catalog::{BuildingDefinition, CardDefinition, Catalog, CatalogSource,
///     LocationKind, RaidLocationDefinition, SubLocationDefinition};
/// use raiders_engine::core::{Resource, ResourceBag};
///
/// let source = CatalogSource {
///     cards: vec![CardDefinition::new("archer", "Archer").with_strength(3)],
///     buildings: vec![BuildingDefinition::new("mill", "Mill")],
///     raid_locations: vec![RaidLocationDefinition::new("harbor", "Harbor", LocationKind::Harbor)
///         .with_sub_location(SubLocationDefinition::new("a", 3, ResourceBag::from_pairs(&[(Resource::Gold, 1)])))],
///     ..CatalogSource::default()
/// };
///
/// let catalog = Catalog::load(source).unwrap();
/// assert_eq!(catalog.card(&"archer".into()).map(|c| c.strength), Some(3));
/// ```
#[derive(Clone, Debug)]
pub struct Catalog {
    rules: RulesConfig,
    cards: Indexed<CardId, CardDefinition>,
    buildings: Indexed<BuildingId, BuildingDefinition>,
    raid_locations: Indexed<LocationId, RaidLocationDefinition>,
    offerings: Indexed<OfferingId, OfferingDefinition>,
    exchanges: Indexed<ExchangeId, ExchangeDefinition>,
}

impl Catalog {
    /// Validate and index catalog records.
    pub fn load(source: CatalogSource) -> Result<Self, CatalogError> {
        source.rules.validate()?;

        if source.cards.is_empty() {
            return Err(CatalogError::Empty { collection: "cards" });
        }
        if source.buildings.is_empty() {
            return Err(CatalogError::Empty { collection: "buildings" });
        }
        if source.raid_locations.is_empty() {
            return Err(CatalogError::Empty {
                collection: "raid_locations",
            });
        }

        let catalog = Self {
            cards: Indexed::build("card", source.cards, |c| &c.id)?,
            buildings: Indexed::build("building", source.buildings, |b| &b.id)?,
            raid_locations: Indexed::build("raid location", source.raid_locations, |r| &r.id)?,
            offerings: Indexed::build("offering", source.offerings, |o| &o.id)?,
            exchanges: Indexed::build("exchange", source.exchanges, |e| &e.id)?,
            rules: source.rules,
        };

        for card in catalog.cards() {
            catalog.validate_card(card)?;
        }
        for building in catalog.buildings() {
            catalog.validate_building(building)?;
        }
        for location in catalog.raid_locations() {
            catalog.validate_location(location)?;
        }
        for offering in catalog.offerings() {
            if offering.cost.is_empty() {
                return Err(out_of_domain(&offering.id, "cost", "offering must cost something"));
            }
        }
        for exchange in catalog.exchanges() {
            if exchange.give.is_empty() {
                return Err(out_of_domain(&exchange.id, "give", "exchange must give something"));
            }
        }

        tracing::debug!(
            cards = catalog.cards.items.len(),
            buildings = catalog.buildings.items.len(),
            raid_locations = catalog.raid_locations.items.len(),
            offerings = catalog.offerings.items.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and load a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let source: CatalogSource = serde_json::from_str(json)?;
        Self::load(source)
    }

    /// Copy of the records this catalog was loaded from.
    #[must_use]
    pub fn to_source(&self) -> CatalogSource {
        CatalogSource {
            rules: self.rules.clone(),
            cards: self.cards.items.clone(),
            buildings: self.buildings.items.clone(),
            raid_locations: self.raid_locations.items.clone(),
            offerings: self.offerings.items.clone(),
            exchanges: self.exchanges.items.clone(),
        }
    }

    fn validate_card(&self, card: &CardDefinition) -> Result<(), CatalogError> {
        if card.deck_count == 0 {
            return Err(out_of_domain(&card.id, "deck_count", "must be at least 1"));
        }
        match &card.effect {
            Some(CardEffect::Immediate { effect }) => self.validate_effect(&card.id, effect)?,
            Some(CardEffect::Permanent { modifier }) => match modifier {
                Modifier::StrengthPer { per: 0, .. } => {
                    return Err(out_of_domain(&card.id, "effect.per", "zero divisor"));
                }
                Modifier::BuildingBonus { building, .. } if self.building(building).is_none() => {
                    return Err(CatalogError::DanglingReference {
                        entity: card.id.to_string(),
                        field: "effect.building",
                        id: building.to_string(),
                    });
                }
                _ => {}
            },
            Some(CardEffect::EndGame { bonus }) if bonus.divisor() == Some(0) => {
                return Err(out_of_domain(&card.id, "effect.per", "zero divisor"));
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_building(&self, building: &BuildingDefinition) -> Result<(), CatalogError> {
        if building.capacity == Some(0) {
            return Err(out_of_domain(&building.id, "capacity", "must be at least 1"));
        }
        if let (Some(required), Some(start)) = (building.color, building.starting_worker) {
            if required != start {
                return Err(out_of_domain(
                    &building.id,
                    "starting_worker",
                    format!("{start} worker on a {required}-only building"),
                ));
            }
        }
        self.validate_effect(&building.id, &building.on_place)?;
        self.validate_effect(&building.id, &building.on_pickup)
    }

    fn validate_location(&self, location: &RaidLocationDefinition) -> Result<(), CatalogError> {
        if location.sub_locations.is_empty() {
            return Err(out_of_domain(&location.id, "sub_locations", "must not be empty"));
        }
        if location.min_crew > self.rules.crew_limit {
            return Err(out_of_domain(
                &location.id,
                "min_crew",
                format!("{} exceeds crew limit {}", location.min_crew, self.rules.crew_limit),
            ));
        }
        let mut seen: Vec<&SubLocationId> = Vec::new();
        for sub in &location.sub_locations {
            if seen.contains(&&sub.id) {
                return Err(CatalogError::DuplicateId {
                    collection: "sub-location",
                    id: format!("{}/{}", location.id, sub.id),
                });
            }
            seen.push(&sub.id);
            validate_sub_location(&location.id, sub)?;
        }
        Ok(())
    }

    fn validate_effect(&self, owner: &impl std::fmt::Display, effect: &Effect) -> Result<(), CatalogError> {
        let mut result = Ok(());
        effect.visit(&mut |e| {
            if result.is_err() {
                return;
            }
            if let Effect::Trade { give, .. } = e {
                if give.is_empty() {
                    result = Err(out_of_domain(owner, "trade.give", "trade must give something"));
                }
            }
        });
        result
    }

    // === Lookup ===

    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn building(&self, id: &BuildingId) -> Option<&BuildingDefinition> {
        self.buildings.get(id)
    }

    #[must_use]
    pub fn raid_location(&self, id: &LocationId) -> Option<&RaidLocationDefinition> {
        self.raid_locations.get(id)
    }

    #[must_use]
    pub fn sub_location(&self, location: &LocationId, sub: &SubLocationId) -> Option<&SubLocationDefinition> {
        self.raid_location(location)?.sub_location(sub)
    }

    #[must_use]
    pub fn offering(&self, id: &OfferingId) -> Option<&OfferingDefinition> {
        self.offerings.get(id)
    }

    #[must_use]
    pub fn exchange(&self, id: &ExchangeId) -> Option<&ExchangeDefinition> {
        self.exchanges.get(id)
    }

    // === Iteration (load order) ===

    pub fn cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.items.iter()
    }

    pub fn buildings(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.buildings.items.iter()
    }

    pub fn raid_locations(&self) -> impl Iterator<Item = &RaidLocationDefinition> {
        self.raid_locations.items.iter()
    }

    pub fn offerings(&self) -> impl Iterator<Item = &OfferingDefinition> {
        self.offerings.items.iter()
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &ExchangeDefinition> {
        self.exchanges.items.iter()
    }

    /// Effects of the given crew, in hire order. Unknown ids and cards
    /// without an effect are skipped.
    pub fn crew_effects<'a>(
        &'a self,
        crew: impl IntoIterator<Item = &'a CardId> + 'a,
    ) -> impl Iterator<Item = &'a CardEffect> + 'a {
        crew.into_iter()
            .filter_map(move |id| self.card(id))
            .filter_map(|card| card.effect.as_ref())
    }
}

fn validate_sub_location(location: &LocationId, sub: &SubLocationDefinition) -> Result<(), CatalogError> {
    let entity = format!("{location}/{}", sub.id);
    if sub.plunder.is_empty() {
        return Err(out_of_domain(&entity, "plunder", "must not be empty"));
    }
    if let Some((resource, _)) = sub.plunder.iter().find(|(r, _)| !r.is_plunder()) {
        return Err(out_of_domain(&entity, "plunder", format!("{resource} is not a plunder kind")));
    }
    Ok(())
}

fn out_of_domain(entity: &impl std::fmt::Display, field: &'static str, detail: impl Into<String>) -> CatalogError {
    CatalogError::OutOfDomain {
        entity: entity.to_string(),
        field,
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocationKind;
    use crate::core::{Resource, ResourceBag, WorkerColor};

    fn minimal() -> CatalogSource {
        CatalogSource {
            cards: vec![CardDefinition::new("archer", "Archer").with_strength(3)],
            buildings: vec![BuildingDefinition::new("mill", "Mill")],
            raid_locations: vec![RaidLocationDefinition::new("harbor", "Harbor", LocationKind::Harbor)
                .with_sub_location(SubLocationDefinition::new(
                    "a",
                    3,
                    ResourceBag::from_pairs(&[(Resource::Gold, 1)]),
                ))],
            ..CatalogSource::default()
        }
    }

    #[test]
    fn test_minimal_loads() {
        let catalog = Catalog::load(minimal()).unwrap();

        assert_eq!(catalog.cards().count(), 1);
        assert!(catalog.building(&BuildingId::new("mill")).is_some());
        assert!(catalog
            .sub_location(&LocationId::new("harbor"), &SubLocationId::new("a"))
            .is_some());
        assert!(catalog.offering(&OfferingId::new("x")).is_none());
    }

    #[test]
    fn test_duplicate_card() {
        let mut source = minimal();
        source.cards.push(CardDefinition::new("archer", "Other Archer"));

        let err = Catalog::load(source).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { collection: "card", .. }));
    }

    #[test]
    fn test_duplicate_sub_location() {
        let mut source = minimal();
        source.raid_locations[0]
            .sub_locations
            .push(SubLocationDefinition::new("a", 1, ResourceBag::from_pairs(&[(Resource::Iron, 1)])));

        let err = Catalog::load(source).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateId {
                collection: "sub-location",
                ..
            }
        ));
    }

    #[test]
    fn test_dangling_building_bonus() {
        let mut source = minimal();
        source.cards[0].effect = Some(CardEffect::Permanent {
            modifier: Modifier::BuildingBonus {
                building: BuildingId::new("nowhere"),
                resources: ResourceBag::from_pairs(&[(Resource::Silver, 1)]),
            },
        });

        let err = Catalog::load(source).unwrap_err();
        assert!(matches!(err, CatalogError::DanglingReference { .. }));
    }

    #[test]
    fn test_out_of_domain_values() {
        let mut source = minimal();
        source.buildings[0].capacity = Some(0);
        assert!(matches!(
            Catalog::load(source).unwrap_err(),
            CatalogError::OutOfDomain { field: "capacity", .. }
        ));

        let mut source = minimal();
        source.cards[0].deck_count = 0;
        assert!(matches!(
            Catalog::load(source).unwrap_err(),
            CatalogError::OutOfDomain { field: "deck_count", .. }
        ));

        let mut source = minimal();
        source.raid_locations[0].min_crew = 99;
        assert!(matches!(
            Catalog::load(source).unwrap_err(),
            CatalogError::OutOfDomain { field: "min_crew", .. }
        ));

        let mut source = minimal();
        source.raid_locations[0].sub_locations[0].plunder = ResourceBag::from_pairs(&[(Resource::Silver, 1)]);
        assert!(matches!(
            Catalog::load(source).unwrap_err(),
            CatalogError::OutOfDomain { field: "plunder", .. }
        ));
    }

    #[test]
    fn test_starting_worker_must_fit_colour() {
        let mut source = minimal();
        source.buildings[0] = BuildingDefinition::new("mill", "Mill")
            .with_color(WorkerColor::Black)
            .with_starting_worker(WorkerColor::Grey);

        assert!(Catalog::load(source).is_err());
    }

    #[test]
    fn test_empty_collections() {
        let mut source = minimal();
        source.cards.clear();
        assert!(matches!(
            Catalog::load(source).unwrap_err(),
            CatalogError::Empty { collection: "cards" }
        ));
    }

    #[test]
    fn test_from_json_parse_error() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_source_round_trip() {
        let catalog = Catalog::load(minimal()).unwrap();
        assert_eq!(catalog.to_source(), minimal());
    }

    #[test]
    fn test_crew_effects_skip_plain_cards() {
        let mut source = minimal();
        source.cards.push(CardDefinition::new("monk", "Monk").with_effect(CardEffect::Permanent {
            modifier: Modifier::HireDiscount { amount: 1 },
        }));
        let catalog = Catalog::load(source).unwrap();

        let crew = [CardId::new("archer"), CardId::new("monk")];
        let effects: Vec<_> = catalog.crew_effects(crew.iter()).collect();
        assert_eq!(effects.len(), 1);
    }
}
