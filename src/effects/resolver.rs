//! Effect resolution: executing effects on game state.
//!
//! The `EffectResolver` applies one `Effect` for one player, mutating the
//! state in place and appending the events it causes. It is always run on
//! the transition's private clone, so a failure part-way through leaves the
//! caller's state untouched.
//!
//! Only `trade` can make an effect fail for a legal reason (the give side
//! is not held). Everything else either succeeds, is capped (armour, hand
//! limit, opponents losing more than they hold), or overflows a counter,
//! which is an invariant violation.

use crate::catalog::{BuildingId, Catalog};
use crate::core::{
    Fault, GameState, InvariantViolationError, PlayerId, PlayerState, Resource, ResourceBag, RulesConfig,
    WorkerColor,
};
use crate::events::{EventKind, GameEvent, Stat};

use super::effect::{Effect, Modifier, RaidTrigger};

/// Who an effect is resolved for and what triggered it.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext<'a> {
    pub rules: &'a RulesConfig,
    pub player: PlayerId,
    /// Colour of the worker involved, for `by_color` branches.
    pub color: Option<WorkerColor>,
    /// Catalog id reported as the subject of emitted events.
    pub subject: &'a str,
}

impl<'a> EffectContext<'a> {
    pub fn new(rules: &'a RulesConfig, player: PlayerId, subject: &'a str) -> Self {
        Self {
            rules,
            player,
            color: None,
            subject,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: WorkerColor) -> Self {
        self.color = Some(color);
        self
    }
}

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply `effect` for `ctx.player`.
    pub fn apply(
        state: &mut GameState,
        effect: &Effect,
        ctx: &EffectContext,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), Fault> {
        match effect {
            Effect::Nothing => Ok(()),

            Effect::Gain { resources } => Self::gain(state, ctx.player, resources, ctx.subject, events),

            Effect::ByColor { .. } => Self::apply(state, effect.for_color(ctx.color), ctx, events),

            Effect::Trade { give, receive } => {
                Self::pay(state, ctx.player, give, ctx.subject, events)?;
                Self::gain(state, ctx.player, receive, ctx.subject, events)
            }

            Effect::Draw { count } => {
                Self::draw(state, ctx.player, *count, ctx.rules.hand_limit, ctx.subject, events);
                Ok(())
            }

            Effect::Armour { amount } => {
                Self::add_armour(state, ctx.player, *amount, ctx.rules.armour_max, ctx.subject, events);
                Ok(())
            }

            Effect::Track { amount } => Self::advance_track(state, ctx.player, *amount, ctx.subject, events),

            Effect::Victory { amount } => Self::add_vp(state, ctx.player, *amount, ctx.subject, events),

            Effect::OpponentsLose { resource, amount } => {
                let opponents: Vec<PlayerId> = state.players.player_ids().filter(|&p| p != ctx.player).collect();
                for opponent in opponents {
                    let lost = state.players[opponent].resources.take_up_to(*resource, *amount);
                    if lost > 0 {
                        events.push(
                            GameEvent::new(EventKind::ResourcesLost)
                                .with_player(opponent)
                                .with_subject(ctx.subject)
                                .with_delta(Stat::Resource(*resource), -i64::from(lost)),
                        );
                    }
                }
                Ok(())
            }

            Effect::All { effects } => {
                for effect in effects {
                    Self::apply(state, effect, ctx, events)?;
                }
                Ok(())
            }
        }
    }

    /// Credit `bag` to `player`.
    pub fn gain(
        state: &mut GameState,
        player: PlayerId,
        bag: &ResourceBag,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), Fault> {
        if bag.is_empty() {
            return Ok(());
        }
        state.players[player].resources.add_bag(bag)?;
        events.push(
            GameEvent::new(EventKind::ResourcesGained)
                .with_player(player)
                .with_subject(subject)
                .with_resources(bag, 1),
        );
        Ok(())
    }

    /// Debit `bag` from `player`. All-or-nothing; a shortfall is illegal.
    pub fn pay(
        state: &mut GameState,
        player: PlayerId,
        bag: &ResourceBag,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), Fault> {
        if bag.is_empty() {
            return Ok(());
        }
        state.players[player].resources.sub_bag(bag)?;
        events.push(
            GameEvent::new(EventKind::ResourcesSpent)
                .with_player(player)
                .with_subject(subject)
                .with_resources(bag, -1),
        );
        Ok(())
    }

    /// Draw up to `count` cards from the top of the draw pile, stopping at
    /// `hand_limit`. Returns the number drawn.
    pub fn draw(
        state: &mut GameState,
        player: PlayerId,
        count: u32,
        hand_limit: u32,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let room = (hand_limit as usize).saturating_sub(state.players[player].hand.len());
        let mut drawn = 0u32;
        while (drawn as usize) < room && drawn < count {
            let Some(card) = state.board.draw() else { break };
            state.players[player].hand.push_back(card);
            drawn += 1;
        }

        let mut event = GameEvent::new(EventKind::CardsDrawn)
            .with_player(player)
            .with_subject(subject)
            .with_delta(Stat::Cards, i64::from(drawn));
        if drawn < count {
            event = event.with_delta(Stat::ShortDraw, i64::from(count - drawn));
        }
        events.push(event);
        drawn
    }

    /// Raise armour by up to `amount`, capped at `max`. Returns the gain.
    pub fn add_armour(
        state: &mut GameState,
        player: PlayerId,
        amount: u32,
        max: u32,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let current = state.players[player].armour;
        let gained = amount.min(max.saturating_sub(current));
        if gained > 0 {
            state.players[player].armour = current + gained;
            events.push(
                GameEvent::new(EventKind::ArmourGained)
                    .with_player(player)
                    .with_subject(subject)
                    .with_delta(Stat::Armour, i64::from(gained)),
            );
        }
        gained
    }

    pub fn advance_track(
        state: &mut GameState,
        player: PlayerId,
        amount: u32,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), Fault> {
        if amount == 0 {
            return Ok(());
        }
        let p = &mut state.players[player];
        p.track = p
            .track
            .checked_add(amount)
            .ok_or_else(|| InvariantViolationError::new("counter_bounds", format!("{player} track overflow")))?;
        events.push(
            GameEvent::new(EventKind::TrackAdvanced)
                .with_player(player)
                .with_subject(subject)
                .with_delta(Stat::Track, i64::from(amount)),
        );
        Ok(())
    }

    pub fn add_vp(
        state: &mut GameState,
        player: PlayerId,
        amount: u32,
        subject: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), Fault> {
        if amount == 0 {
            return Ok(());
        }
        let p = &mut state.players[player];
        p.vp = p
            .vp
            .checked_add(amount)
            .ok_or_else(|| InvariantViolationError::new("counter_bounds", format!("{player} vp overflow")))?;
        events.push(
            GameEvent::new(EventKind::VictoryGained)
                .with_player(player)
                .with_subject(subject)
                .with_delta(Stat::Vp, i64::from(amount)),
        );
        Ok(())
    }
}

// === Crew lookups ===

/// Permanent modifiers of a player's crew, in hire order.
pub fn crew_modifiers<'a>(catalog: &'a Catalog, player: &'a PlayerState) -> impl Iterator<Item = &'a Modifier> + 'a {
    catalog.crew_effects(player.crew.iter()).filter_map(|e| e.modifier())
}

/// Raid triggers of a player's crew, in hire order.
pub fn crew_raid_triggers<'a>(
    catalog: &'a Catalog,
    player: &'a PlayerState,
) -> impl Iterator<Item = &'a RaidTrigger> + 'a {
    catalog.crew_effects(player.crew.iter()).filter_map(|e| e.raid_trigger())
}

/// Extra resources the crew grants for placing at `building`.
pub fn building_bonus(catalog: &Catalog, player: &PlayerState, building: &BuildingId) -> ResourceBag {
    let mut bonus = ResourceBag::new();
    for modifier in crew_modifiers(catalog, player) {
        if let Modifier::BuildingBonus { building: b, resources } = modifier {
            if b == building {
                for (resource, amount) in resources.iter() {
                    bonus = bonus.with(resource, amount);
                }
            }
        }
    }
    bonus
}

/// Silver taken off every hire by the crew's discounts.
pub fn hire_discount(catalog: &Catalog, player: &PlayerState) -> u32 {
    crew_modifiers(catalog, player)
        .filter_map(|m| match m {
            Modifier::HireDiscount { amount } => Some(*amount),
            _ => None,
        })
        .fold(0u32, u32::saturating_add)
}

/// Silver cost of hiring a card with base cost `cost`.
pub fn hire_cost(catalog: &Catalog, player: &PlayerState, cost: u32) -> ResourceBag {
    let silver = cost.saturating_sub(hire_discount(catalog, player));
    ResourceBag::new().with(Resource::Silver, silver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardId;

    fn state() -> GameState {
        let mut state = GameState::empty(3);
        state.players[PlayerId::new(0)].resources = ResourceBag::from_pairs(&[(Resource::Silver, 2)]);
        state.players[PlayerId::new(1)].resources = ResourceBag::from_pairs(&[(Resource::Silver, 3)]);
        for id in ["a", "b", "c"] {
            state.board.draw_pile.push_back(CardId::new(id));
        }
        state
    }

    fn ctx(rules: &RulesConfig) -> EffectContext<'_> {
        EffectContext::new(rules, PlayerId::new(0), "test")
    }

    #[test]
    fn test_gain_emits_event() {
        let rules = RulesConfig::default();
        let mut state = state();
        let mut events = Vec::new();

        EffectResolver::apply(&mut state, &Effect::gain(Resource::Gold, 2), &ctx(&rules), &mut events).unwrap();

        assert_eq!(state.players[PlayerId::new(0)].resources.get(Resource::Gold), 2);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ResourcesGained);
        assert_eq!(events[0].delta(Stat::Resource(Resource::Gold)), 2);
    }

    #[test]
    fn test_trade_shortfall_is_illegal() {
        let rules = RulesConfig::default();
        let mut state = state();
        let mut events = Vec::new();
        let trade = Effect::trade(
            ResourceBag::from_pairs(&[(Resource::Silver, 3)]),
            ResourceBag::from_pairs(&[(Resource::Gold, 1)]),
        );

        let err = EffectResolver::apply(&mut state, &trade, &ctx(&rules), &mut events).unwrap_err();
        assert!(matches!(err, Fault::Illegal(_)));
        assert_eq!(state.players[PlayerId::new(0)].resources.get(Resource::Silver), 2);
    }

    #[test]
    fn test_by_color_uses_context_color() {
        let rules = RulesConfig::default();
        let mut state = state();
        let mut events = Vec::new();
        let effect = Effect::by_color(Effect::gain(Resource::Silver, 1), Effect::gain(Resource::Silver, 5));

        EffectResolver::apply(
            &mut state,
            &effect,
            &ctx(&rules).with_color(WorkerColor::Black),
            &mut events,
        )
        .unwrap();

        assert_eq!(state.players[PlayerId::new(0)].resources.get(Resource::Silver), 7);
    }

    #[test]
    fn test_draw_stops_at_hand_limit_and_reports_short() {
        let rules = RulesConfig::default().with_starting_hand_size(0).with_hand_limit(2);
        let mut state = state();
        let mut events = Vec::new();

        EffectResolver::apply(&mut state, &Effect::Draw { count: 3 }, &ctx(&rules), &mut events).unwrap();

        let hand = &state.players[PlayerId::new(0)].hand;
        assert_eq!(hand.len(), 2);
        assert_eq!(hand[0], CardId::new("c"));
        assert_eq!(events[0].delta(Stat::Cards), 2);
        assert_eq!(events[0].delta(Stat::ShortDraw), 1);
    }

    #[test]
    fn test_armour_capped() {
        let rules = RulesConfig::default().with_armour(3, ResourceBag::new());
        let mut state = state();
        state.players[PlayerId::new(0)].armour = 2;
        let mut events = Vec::new();

        EffectResolver::apply(&mut state, &Effect::Armour { amount: 4 }, &ctx(&rules), &mut events).unwrap();

        assert_eq!(state.players[PlayerId::new(0)].armour, 3);
        assert_eq!(events[0].delta(Stat::Armour), 1);
    }

    #[test]
    fn test_opponents_lose_up_to_amount() {
        let rules = RulesConfig::default();
        let mut state = state();
        let mut events = Vec::new();
        let effect = Effect::OpponentsLose {
            resource: Resource::Silver,
            amount: 2,
        };

        EffectResolver::apply(&mut state, &effect, &ctx(&rules), &mut events).unwrap();

        assert_eq!(state.players[PlayerId::new(0)].resources.get(Resource::Silver), 2);
        assert_eq!(state.players[PlayerId::new(1)].resources.get(Resource::Silver), 1);
        assert_eq!(state.players[PlayerId::new(2)].resources.get(Resource::Silver), 0);
        // Player 2 held nothing, so only one loss event.
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_all_applies_in_order() {
        let rules = RulesConfig::default();
        let mut state = state();
        let mut events = Vec::new();
        let effect = Effect::all([
            Effect::gain(Resource::Silver, 1),
            Effect::trade(
                ResourceBag::from_pairs(&[(Resource::Silver, 3)]),
                ResourceBag::from_pairs(&[(Resource::Gold, 1)]),
            ),
            Effect::Victory { amount: 2 },
            Effect::Track { amount: 1 },
        ]);

        EffectResolver::apply(&mut state, &effect, &ctx(&rules), &mut events).unwrap();

        let p = &state.players[PlayerId::new(0)];
        assert_eq!(p.resources.get(Resource::Silver), 0);
        assert_eq!(p.resources.get(Resource::Gold), 1);
        assert_eq!(p.vp, 2);
        assert_eq!(p.track, 1);
    }

    #[test]
    fn test_vp_overflow_is_invariant() {
        let rules = RulesConfig::default();
        let mut state = state();
        state.players[PlayerId::new(0)].vp = u32::MAX;
        let mut events = Vec::new();

        let err = EffectResolver::apply(&mut state, &Effect::Victory { amount: 1 }, &ctx(&rules), &mut events)
            .unwrap_err();
        assert!(matches!(err, Fault::Invariant(_)));
    }
}
