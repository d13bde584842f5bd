//! Action legality.
//!
//! `check` runs the structural preconditions of an action (phase, turn
//! bookkeeping, ids, held worker, capacity, costs) and then, for actions
//! whose effects can themselves be unaffordable, simulates the effects on a
//! throwaway clone. `legal_actions` enumerates every candidate the catalog
//! allows for the current phase and keeps those `check` accepts, so the two
//! agree by construction.

use crate::catalog::{BuildingId, Catalog};
use crate::core::{
    Action, ActionKind, Fault, GameState, IllegalActionError, Phase, PlayerState, ResourceBag, ScriptedRng,
    Violation, WorkerColor,
};
use crate::effects::hire_cost;

use super::raid::raid_cost;
use super::transition::perform;

/// Every legal action for the active player.
///
/// Order is fixed by the catalog: buildings, then cards, armour levels,
/// exchanges, offerings, raid spots and finally `EndPhase`.
#[must_use]
pub fn legal_actions(catalog: &Catalog, state: &GameState) -> Vec<Action> {
    candidates(catalog, state)
        .into_iter()
        .filter(|action| is_legal(catalog, state, action))
        .collect()
}

/// Check `action` against `state` without changing it.
pub fn check(catalog: &Catalog, state: &GameState, action: &Action) -> Result<(), IllegalActionError> {
    validate(catalog, state, action).map_err(|violation| IllegalActionError::new(action, violation))
}

#[must_use]
pub fn is_legal(catalog: &Catalog, state: &GameState, action: &Action) -> bool {
    validate(catalog, state, action).is_ok()
}

fn validate(catalog: &Catalog, state: &GameState, action: &Action) -> Result<(), Violation> {
    precheck(catalog, state, action)?;

    if matches!(
        action,
        Action::PlaceWorker { .. } | Action::PickupWorker { .. } | Action::PlayCard { .. }
    ) {
        simulate(catalog, state, action)?;
    }
    Ok(())
}

/// Run the action's effects on a clone and report an illegal outcome.
/// Invariant faults are left for `apply` to surface.
fn simulate(catalog: &Catalog, state: &GameState, action: &Action) -> Result<(), Violation> {
    let mut scratch = state.clone();
    let mut events = Vec::new();
    match perform(catalog, &mut scratch, action, &mut ScriptedRng::default(), &mut events) {
        Err(Fault::Illegal(violation)) => Err(violation),
        Err(Fault::Invariant(_)) | Ok(()) => Ok(()),
    }
}

/// Structural preconditions, checked in a fixed order so the reported
/// violation is stable.
pub(crate) fn precheck(catalog: &Catalog, state: &GameState, action: &Action) -> Result<(), Violation> {
    if state.is_terminal() {
        return Err(Violation::GameOver);
    }

    let kind = action.kind();
    let allowed = match state.phase {
        Phase::Work => kind != ActionKind::Raid,
        Phase::Raid => matches!(kind, ActionKind::Raid | ActionKind::EndPhase),
        Phase::RoundEnd | Phase::GameEnd => false,
    };
    if !allowed {
        return Err(Violation::WrongPhase {
            phase: state.phase,
            action: kind,
        });
    }

    let player = state.active_player();
    if kind.is_free_action() {
        if !player.turn.has_placed() {
            return Err(Violation::NotPlaced);
        }
        if player.turn.has_used(kind) {
            return Err(Violation::ActionAlreadyTaken(kind));
        }
    }

    match action {
        Action::PlaceWorker { building, color } => {
            if let Some(placed) = &player.turn.placed_at {
                return Err(Violation::AlreadyPlaced {
                    building: placed.clone(),
                });
            }
            let held = player.worker.ok_or(Violation::NoWorkerInHand)?;
            if held.color != *color {
                return Err(Violation::WrongWorkerColor {
                    held: held.color,
                    requested: *color,
                });
            }
            let def = catalog
                .building(building)
                .ok_or_else(|| Violation::UnknownBuilding(building.clone()))?;
            check_color(def.color, *color)?;
            if let Some(capacity) = def.capacity {
                if state.board.tokens_at(building).len() >= capacity as usize {
                    return Err(Violation::BuildingFull {
                        building: building.clone(),
                        capacity,
                    });
                }
            }
            // The turn ends with a pickup elsewhere, so another building must hold a token.
            if !pickup_available(catalog, state, building) {
                return Err(Violation::NoPickupAfterPlacing {
                    building: building.clone(),
                });
            }
        }

        Action::PickupWorker { building } => {
            let placed = player.turn.placed_at.as_ref().ok_or(Violation::NotPlaced)?;
            if catalog.building(building).is_none() {
                return Err(Violation::UnknownBuilding(building.clone()));
            }
            if placed == building {
                return Err(Violation::SameBuilding {
                    building: building.clone(),
                });
            }
            if state.board.tokens_at(building).is_empty() {
                return Err(Violation::NothingToPickUp {
                    building: building.clone(),
                });
            }
        }

        Action::PlayCard { card } => {
            let def = catalog.card(card).ok_or_else(|| Violation::UnknownCard(card.clone()))?;
            if !player.has_in_hand(card) {
                return Err(Violation::CardNotInHand(card.clone()));
            }
            if def.hero {
                return Err(Violation::HeroNotPlayable(card.clone()));
            }
            if def.immediate_effect().is_none() {
                return Err(Violation::NoImmediateEffect(card.clone()));
            }
        }

        Action::HireCrew { card } => {
            let def = catalog.card(card).ok_or_else(|| Violation::UnknownCard(card.clone()))?;
            if !player.has_in_hand(card) {
                return Err(Violation::CardNotInHand(card.clone()));
            }
            if player.has_in_crew(card) {
                return Err(Violation::DuplicateCrew(card.clone()));
            }
            let limit = catalog.rules().crew_limit;
            if player.crew.len() >= limit as usize {
                return Err(Violation::CrewFull { limit });
            }
            if def.hero && has_hero(catalog, player) {
                return Err(Violation::HeroLimit(card.clone()));
            }
            if let (Some(required), Some(placed)) = (def.hire_color, player.turn.placed_color) {
                if required != placed {
                    return Err(Violation::HireColorMismatch {
                        card: card.clone(),
                        required,
                        placed,
                    });
                }
            }
            check_funds(player, &hire_cost(catalog, player, def.cost))?;
        }

        Action::BuyArmour { levels } => {
            if *levels == 0 {
                return Err(Violation::ZeroArmourLevels);
            }
            let max = catalog.rules().armour_max;
            if player.armour.saturating_add(*levels) > max {
                return Err(Violation::ArmourMaxed {
                    current: player.armour,
                    requested: *levels,
                    max,
                });
            }
            check_funds(player, &armour_cost(catalog, *levels))?;
        }

        Action::TakeResources { exchange } => {
            let def = catalog
                .exchange(exchange)
                .ok_or_else(|| Violation::UnknownExchange(exchange.clone()))?;
            check_funds(player, &def.give)?;
        }

        Action::ClaimOffering { offering } => {
            let def = catalog
                .offering(offering)
                .ok_or_else(|| Violation::UnknownOffering(offering.clone()))?;
            if !state.board.offering_row.contains(offering) {
                return Err(Violation::OfferingNotAvailable(offering.clone()));
            }
            check_funds(player, &def.cost)?;
        }

        Action::Raid {
            location,
            sub_location,
            color,
        } => {
            let held = player.worker.ok_or(Violation::NoWorkerInHand)?;
            if held.color != *color {
                return Err(Violation::WrongWorkerColor {
                    held: held.color,
                    requested: *color,
                });
            }
            let loc = catalog
                .raid_location(location)
                .ok_or_else(|| Violation::UnknownLocation(location.clone()))?;
            let unknown_sub = || Violation::UnknownSubLocation {
                location: location.clone(),
                sub_location: sub_location.clone(),
            };
            let sub = loc.sub_location(sub_location).ok_or_else(unknown_sub)?;
            let spot = state.board.sub_location(location, sub_location).ok_or_else(unknown_sub)?;
            check_color(sub.color, *color)?;
            if spot.occupant.is_some() {
                return Err(Violation::SubLocationOccupied {
                    location: location.clone(),
                    sub_location: sub_location.clone(),
                });
            }
            if spot.plunder.is_empty() {
                return Err(Violation::SubLocationExhausted {
                    location: location.clone(),
                    sub_location: sub_location.clone(),
                });
            }
            let crew = player.crew.len() as u32;
            if crew < loc.min_crew {
                return Err(Violation::NotEnoughCrew {
                    required: loc.min_crew,
                    crew,
                });
            }
            check_funds(player, &raid_cost(catalog, player, sub))?;
        }

        Action::EndPhase => {
            if state.phase == Phase::Work && player.turn.has_placed() {
                return Err(Violation::PickupPending);
            }
        }
    }

    Ok(())
}

/// Candidate actions for the current phase, before legality filtering.
fn candidates(catalog: &Catalog, state: &GameState) -> Vec<Action> {
    let mut out = Vec::new();
    match state.phase {
        Phase::Work => {
            let placed = state.active_player().turn.has_placed();
            for building in catalog.buildings() {
                if placed {
                    out.push(Action::PickupWorker {
                        building: building.id.clone(),
                    });
                } else {
                    for color in WorkerColor::ALL {
                        out.push(Action::PlaceWorker {
                            building: building.id.clone(),
                            color,
                        });
                    }
                }
            }
            if placed {
                for card in catalog.cards() {
                    out.push(Action::PlayCard { card: card.id.clone() });
                    out.push(Action::HireCrew { card: card.id.clone() });
                }
                for levels in 1..=catalog.rules().armour_max {
                    out.push(Action::BuyArmour { levels });
                }
                for exchange in catalog.exchanges() {
                    out.push(Action::TakeResources {
                        exchange: exchange.id.clone(),
                    });
                }
                for offering in catalog.offerings() {
                    out.push(Action::ClaimOffering {
                        offering: offering.id.clone(),
                    });
                }
            }
        }
        Phase::Raid => {
            for location in catalog.raid_locations() {
                for sub in &location.sub_locations {
                    for color in WorkerColor::ALL {
                        out.push(Action::Raid {
                            location: location.id.clone(),
                            sub_location: sub.id.clone(),
                            color,
                        });
                    }
                }
            }
        }
        Phase::RoundEnd | Phase::GameEnd => return out,
    }
    out.push(Action::EndPhase);
    out
}

/// Some building other than `placed` holds a token to pick up.
fn pickup_available(catalog: &Catalog, state: &GameState, placed: &BuildingId) -> bool {
    catalog
        .buildings()
        .any(|b| b.id != *placed && !state.board.tokens_at(&b.id).is_empty())
}

fn has_hero(catalog: &Catalog, player: &PlayerState) -> bool {
    player.crew.iter().filter_map(|id| catalog.card(id)).any(|c| c.hero)
}

fn check_color(required: Option<WorkerColor>, offered: WorkerColor) -> Result<(), Violation> {
    match required {
        Some(required) if required != offered => Err(Violation::ColorRestricted { required, offered }),
        _ => Ok(()),
    }
}

fn check_funds(player: &PlayerState, cost: &ResourceBag) -> Result<(), Violation> {
    match player.resources.shortfall(cost) {
        Some(shortfall) => Err(shortfall.into()),
        None => Ok(()),
    }
}

/// Price of `levels` armour levels.
pub(crate) fn armour_cost(catalog: &Catalog, levels: u32) -> ResourceBag {
    catalog
        .rules()
        .armour_cost
        .iter()
        .map(|(resource, amount)| (resource, amount.saturating_mul(levels)))
        .collect()
}
