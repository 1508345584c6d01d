//! The authoritative game session.
//!
//! One `GameSession` owns every piece of truth for one match: the card map,
//! the board, both players' zones and resources, the resolve stack, the
//! event bus, and the RNG. Intents are validated against current state and
//! rejected with an [`IntentError`] before any mutation; server-side faults
//! surface as [`ConsistencyError`] log lines while the session keeps
//! operating best-effort.
//!
//! Sessions are strictly sequential. Nothing here blocks: a card that needs
//! targets leaves its resolve-stack entry suspended and the session simply
//! returns, resuming when the matching `SelectTarget` intent arrives.

use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use crate::board::{Board, MoveDirection, Perspective, Unit, UnitOrder};
use crate::buffs::{BuffClass, BuffStack, Stat};
use crate::cards::{Card, CardDefinition, CardId, CardLibrary, CardScript, CardType, ScriptCondition};
use crate::core::{ConsistencyError, GameRng, IntentError, PlayerId, PlayerPair, Ruleset};
use crate::events::{CardLocation, EventBus, GameEvent, GameEventKind};
use crate::game::{CardMessage, GameId, GameTurnPhase, Intent, Notification, OutboundSink};
use crate::players::{Player, PlayerInGame};
use crate::resolve::{
    CardTarget, ResolveStack, ResolveStackEntry, TargetConstraint, TargetDefinition, TargetType,
};

/// Authoritative state for one match.
pub struct GameSession {
    id: GameId,
    library: CardLibrary,
    phase: GameTurnPhase,
    round: u32,
    board: Board,
    cards: FxHashMap<CardId, Card>,
    players: PlayerPair<PlayerInGame>,
    stack: ResolveStack,
    bus: EventBus,
    rng: GameRng,
    next_card_id: u32,
    outbox: Vec<(PlayerId, Notification)>,
    winner: Option<PlayerId>,
}

impl GameSession {
    /// Create a session. Decklists are card class names; unknown classes are
    /// logged and skipped so one bad decklist entry cannot break a match.
    #[must_use]
    pub fn new(
        id: GameId,
        library: CardLibrary,
        seed: u64,
        usernames: [String; 2],
        decklists: [Vec<String>; 2],
    ) -> Self {
        let [name0, name1] = usernames;
        let mut session = Self {
            id,
            library,
            phase: GameTurnPhase::BeforeGame,
            round: 0,
            board: Board::new(),
            cards: FxHashMap::default(),
            players: PlayerPair::new(|player| {
                let username = if player.index() == 0 { &name0 } else { &name1 };
                PlayerInGame::new(Player::new(player, username.clone()))
            }),
            stack: ResolveStack::new(),
            bus: EventBus::new(),
            rng: GameRng::new(seed),
            next_card_id: 0,
            outbox: Vec::new(),
            winner: None,
        };

        let [decklist0, decklist1] = decklists;
        for (player, decklist) in [(PlayerId::new(0), decklist0), (PlayerId::new(1), decklist1)] {
            for class in decklist {
                if let Some(card_id) = session.create_card(&class, player) {
                    let card_type = session.cards[&card_id].card_type;
                    session.players.get_mut(player).deck.add(card_type, card_id);
                }
            }
        }
        session
    }

    // === Intent entry point ===

    /// Validate and apply one player intent. On success the phase machine is
    /// advanced and any resulting notifications land in the outbox.
    pub fn handle_intent(&mut self, player: PlayerId, intent: Intent) -> Result<(), IntentError> {
        debug!(game = %self.id, %player, ?intent, "handling intent");
        let result = match intent {
            Intent::Init => self.init_player(player),
            Intent::PlayCard { card_id, row_index, slot } => {
                self.play_card(player, card_id, row_index, slot)
            }
            Intent::SelectTarget { target } => self.select_card_target(player, target),
            Intent::AttackOrder { unit, target } => self.attack_order(player, unit, target),
            Intent::MoveOrder { unit, row_index } => self.move_order(player, unit, row_index),
            Intent::EndTurn => self.end_turn(player),
        };
        if let Err(ref err) = result {
            debug!(game = %self.id, %player, %err, "intent rejected");
        } else {
            self.check_victory();
            self.advance_phase();
        }
        result
    }

    fn init_player(&mut self, player: PlayerId) -> Result<(), IntentError> {
        if self.phase != GameTurnPhase::BeforeGame {
            return Err(IntentError::WrongPhase);
        }
        let pig = self.players.get_mut(player);
        if pig.initialized {
            return Err(IntentError::AlreadyInitialized);
        }
        pig.initialized = true;
        if self.players.all(|p| p.initialized) {
            self.start_game();
        }
        Ok(())
    }

    fn start_game(&mut self) {
        info!(game = %self.id, "both players initialized, starting game");
        self.phase = GameTurnPhase::Deploy;
        self.round = 1;
        for player in PlayerId::both() {
            let opponent = self.players[player.opponent()].player.username.clone();
            self.notify(player, Notification::GameStarted { opponent });
        }
        self.notify_both(Notification::PhaseChanged { phase: GameTurnPhase::Deploy });
        self.notify_both(Notification::RoundStarted { round: 1 });
        for player in PlayerId::both() {
            self.players.get_mut(player).deck.shuffle(&mut self.rng);
        }
        for player in PlayerId::both() {
            self.draw_unit_cards(player, Ruleset::STARTING_UNIT_HAND_SIZE);
            self.refill_spell_hand(player);
            self.start_turn(player);
        }
        self.post_event(GameEvent::new(GameEventKind::RoundStarted));
    }

    // === Playing cards ===

    fn play_card(
        &mut self,
        player: PlayerId,
        card_id: CardId,
        row_index: usize,
        slot: usize,
    ) -> Result<(), IntentError> {
        if self.phase != GameTurnPhase::Deploy {
            return Err(IntentError::WrongPhase);
        }
        if self.players[player].turn_ended {
            return Err(IntentError::TurnAlreadyEnded);
        }
        if !self.players[player].hand.contains(card_id) {
            return Err(IntentError::CardNotInHand(card_id));
        }
        let card = self
            .cards
            .get(&card_id)
            .ok_or(IntentError::CardNotInHand(card_id))?;
        if card.owner != player {
            return Err(IntentError::NotOwner { player });
        }
        if !self.players[player].can_afford(card) {
            return Err(IntentError::InsufficientMana);
        }
        let card_type = card.card_type;
        let spell_cost = card.spell_cost;

        if card_type == CardType::Unit {
            if !Perspective::of(player).owns_row(row_index) {
                return Err(IntentError::IllegalRow(row_index));
            }
            let row = self
                .board
                .row(row_index)
                .ok_or(IntentError::IllegalRow(row_index))?;
            if row.is_full() {
                return Err(IntentError::RowFull(row_index));
            }
        }

        self.players.get_mut(player).hand.remove(card_id);
        self.forced_play(card_id, row_index, slot)?;

        // Payment lands after the play step so effect code observes the
        // pre-play mana it was costed against.
        let pig = self.players.get_mut(player);
        match card_type {
            CardType::Unit => pig.unit_mana = pig.unit_mana.saturating_sub(1),
            CardType::Spell => pig.spell_mana = pig.spell_mana.saturating_sub(spell_cost),
        }
        let (unit_mana, spell_mana) = (pig.unit_mana, pig.spell_mana);
        self.notify_both(Notification::ManaChanged { player, unit_mana, spell_mana });
        Ok(())
    }

    /// The cost-free play step shared by hand plays and deck tutoring. The
    /// card must already have left its zone. `row_index`/`slot` are ignored
    /// for spells.
    fn forced_play(
        &mut self,
        card_id: CardId,
        row_index: usize,
        slot: usize,
    ) -> Result<(), IntentError> {
        let card = self
            .cards
            .get(&card_id)
            .ok_or(IntentError::CardNotInHand(card_id))?;
        let owner = card.owner;
        let card_type = card.card_type;
        let message = CardMessage::full(card);

        // Leaving a hidden zone makes the card public.
        self.notify_both(Notification::CardPlayed { player: owner, card: message });

        if card_type == CardType::Unit {
            self.deploy_unit(card_id, owner, row_index, slot)?;
        }

        if let Err(fault) = self
            .stack
            .push(ResolveStackEntry::new(card_id, owner, card_type))
        {
            error!(game = %self.id, %fault, "card resolution refused");
            if card_type == CardType::Spell {
                self.discard_to_graveyard(card_id);
            }
            return Ok(());
        }

        if let Some(definition) = self.definition_of(card_id) {
            for script in &definition.on_play {
                self.run_script(card_id, script, None);
            }
        }
        self.post_event(
            GameEvent::new(GameEventKind::CardPlayed)
                .with_card(card_id)
                .with_player(owner),
        );

        // A script above may have played a further card that is now waiting
        // for targets; this card's targeting then waits its turn.
        if self.stack.current_card() == Some(card_id) {
            self.check_card_targeting();
        } else {
            debug!(game = %self.id, %card_id, "resolution deferred behind a nested card");
        }
        Ok(())
    }

    fn deploy_unit(
        &mut self,
        card_id: CardId,
        owner: PlayerId,
        row_index: usize,
        slot: usize,
    ) -> Result<(), IntentError> {
        self.board
            .insert_unit(row_index, slot, Unit::new(card_id, owner))?;
        let slot = self
            .board
            .find_unit(card_id)
            .map_or(slot, |(_, actual)| actual);
        if let Some(card) = self.cards.get(&card_id) {
            let card = CardMessage::full(card);
            self.notify_both(Notification::UnitCreated { card, row_index, slot });
        }
        self.post_event(
            GameEvent::new(GameEventKind::UnitPlayed)
                .with_card(card_id)
                .with_player(owner)
                .at_location(CardLocation::Board),
        );
        self.post_event(
            GameEvent::new(GameEventKind::EffectUnitDeploy)
                .with_card(card_id)
                .with_player(owner)
                .at_location(CardLocation::Board),
        );
        Ok(())
    }

    // === Targeting ===

    /// Look at the topmost resolution: request targets from its owner if it
    /// still wants some and any are selectable, otherwise finish it.
    fn check_card_targeting(&mut self) {
        let Some(entry) = self.stack.current() else {
            return;
        };
        let card_id = entry.card_id;
        let owner = entry.owner;
        let collected = entry.targets.len();

        let Some(definition) = self.definition_of(card_id) else {
            self.finish_resolving();
            return;
        };
        if collected >= definition.targeting.target_count {
            self.finish_resolving();
            return;
        }
        let valid = self.valid_targets(card_id, owner, &definition.targeting);
        if valid.is_empty() {
            // Nothing selectable; resolve with what was gathered.
            self.finish_resolving();
        } else {
            self.notify(owner, Notification::TargetsRequested { card_id, valid_targets: valid });
        }
    }

    fn select_card_target(
        &mut self,
        player: PlayerId,
        target: CardTarget,
    ) -> Result<(), IntentError> {
        let Some(entry) = self.stack.current() else {
            return Err(IntentError::NoPendingTarget { player });
        };
        if entry.owner != player {
            return Err(IntentError::NoPendingTarget { player });
        }
        let card_id = entry.card_id;

        let Some(definition) = self.definition_of(card_id) else {
            error!(game = %self.id, fault = %ConsistencyError::UnknownCard(card_id), "resolving card lost its template");
            self.finish_resolving();
            return Ok(());
        };
        let valid = self.valid_targets(card_id, player, &definition.targeting);
        if !valid.contains(&target) {
            self.notify(
                player,
                Notification::TargetsRequested { card_id, valid_targets: valid },
            );
            return Err(IntentError::InvalidTarget);
        }

        if let Some(entry) = self.stack.current_mut() {
            entry.targets.push(target);
        }
        for script in &definition.on_target_selected {
            self.run_script(card_id, script, Some(target));
        }

        // A selection script may have played a further card that is now
        // collecting its own targets; this card's resolution resumes when
        // the nested entry unwinds.
        if self.stack.current_card() != Some(card_id) {
            debug!(game = %self.id, %card_id, "resolution deferred behind a nested card");
            return Ok(());
        }

        let collected = self.stack.current().map_or(0, |e| e.targets.len());
        if collected >= definition.targeting.target_count {
            self.finish_resolving();
            return Ok(());
        }
        let remaining = self.valid_targets(card_id, player, &definition.targeting);
        if remaining.is_empty() {
            self.finish_resolving();
        } else {
            self.notify(
                player,
                Notification::TargetsRequested { card_id, valid_targets: remaining },
            );
        }
        Ok(())
    }

    /// Pop the top resolution, run its confirmed scripts, and give the next
    /// suspended entry a chance to continue.
    fn finish_resolving(&mut self) {
        let entry = match self.stack.pop() {
            Ok(entry) => entry,
            Err(fault) => {
                error!(game = %self.id, %fault, "finish_resolving on an empty stack");
                return;
            }
        };

        let targets: Vec<Option<CardTarget>> = if entry.targets.is_empty() {
            vec![None]
        } else {
            entry.targets.iter().copied().map(Some).collect()
        };
        if let Some(definition) = self.definition_of(entry.card_id) {
            for script in &definition.on_targets_confirmed {
                for target in &targets {
                    self.run_script(entry.card_id, script, *target);
                }
            }
        }

        if entry.card_type == CardType::Spell {
            self.discard_to_graveyard(entry.card_id);
            self.notify_both(Notification::CardResolved { card_id: entry.card_id });
        }

        if !self.stack.is_empty() {
            self.check_card_targeting();
        }
    }

    fn valid_targets(
        &self,
        card_id: CardId,
        owner: PlayerId,
        targeting: &TargetDefinition,
    ) -> Vec<CardTarget> {
        let selected: Vec<CardTarget> = self
            .stack
            .current()
            .filter(|e| e.card_id == card_id)
            .map(|e| e.targets.to_vec())
            .unwrap_or_default();

        let mut valid = Vec::new();
        let push = |candidate: CardTarget, valid: &mut Vec<CardTarget>| {
            if !selected.contains(&candidate) && !valid.contains(&candidate) {
                valid.push(candidate);
            }
        };

        for rule in &targeting.rules {
            match rule.target_type {
                TargetType::Unit => {
                    for row in self.board.rows() {
                        for unit in row.iter() {
                            let ok = rule.constraints.iter().all(|constraint| {
                                self.unit_satisfies(*constraint, owner, card_id, unit)
                            });
                            if ok {
                                push(CardTarget::Unit { card_id: unit.card_id }, &mut valid);
                            }
                        }
                    }
                }
                TargetType::Row => {
                    for row_index in 0..Ruleset::BOARD_ROW_COUNT {
                        push(CardTarget::Row { row_index }, &mut valid);
                    }
                }
                TargetType::Card => {
                    if rule.constraints.contains(&TargetConstraint::InOwnersUnitDeck) {
                        for id in self.players[owner].deck.unit_cards() {
                            push(CardTarget::Card { card_id: id }, &mut valid);
                        }
                    }
                }
            }
        }
        valid
    }

    fn unit_satisfies(
        &self,
        constraint: TargetConstraint,
        owner: PlayerId,
        source: CardId,
        unit: &Unit,
    ) -> bool {
        match constraint {
            TargetConstraint::EnemyUnit => unit.owner != owner,
            TargetConstraint::AlliedUnit => unit.owner == owner,
            TargetConstraint::NotSelf => unit.card_id != source,
            TargetConstraint::InOwnersUnitDeck => false,
        }
    }

    // === Script interpreter ===

    fn run_script(&mut self, source: CardId, script: &CardScript, target: Option<CardTarget>) {
        match script {
            CardScript::GainPower { amount } => {
                if let Some(card) = self.cards.get_mut(&source) {
                    card.add_power(*amount);
                    let power = card.power();
                    self.notify_both(Notification::PowerChanged { card_id: source, power });
                }
            }
            CardScript::DealDamageToTarget { amount, bonus_per_buff } => {
                let Some(CardTarget::Unit { card_id }) = target else {
                    debug!(game = %self.id, %source, "damage script has no unit target");
                    return;
                };
                let Some(owner) = self.card_owner(source) else {
                    return;
                };
                let mut total = *amount;
                if let Some(class) = bonus_per_buff {
                    let units: Vec<CardId> = self.board.units_of(owner).collect();
                    total += units
                        .iter()
                        .filter_map(|id| self.cards.get(id))
                        .map(|c| c.buffs.intensity(*class))
                        .sum::<i32>();
                }
                self.damage_unit(card_id, total);
            }
            CardScript::AddBuffToTarget { class } => {
                let Some(CardTarget::Unit { card_id }) = target else {
                    debug!(game = %self.id, %source, "buff script has no unit target");
                    return;
                };
                self.add_buff(card_id, *class, source);
            }
            CardScript::AddBuffToAdjacentAllies { class, count } => {
                for ally in self.board.adjacent_allies(source) {
                    for _ in 0..*count {
                        self.add_buff(ally, *class, source);
                    }
                }
            }
            CardScript::SummonToken { class } => self.summon_token(source, class),
            CardScript::SummonTargetFromDeck => {
                let Some(CardTarget::Card { card_id }) = target else {
                    debug!(game = %self.id, %source, "tutor script has no card target");
                    return;
                };
                self.summon_from_deck(source, card_id);
            }
            CardScript::DrawUnitCards { count } => {
                if let Some(owner) = self.card_owner(source) {
                    self.draw_unit_cards(owner, *count);
                }
            }
            CardScript::DealMoraleDamage { amount } => {
                if let Some(owner) = self.card_owner(source) {
                    self.deal_morale_damage(owner.opponent(), *amount);
                }
            }
            CardScript::Conditional { condition, then } => {
                if let Some(owner) = self.card_owner(source) {
                    if self.condition_holds(*condition, owner) {
                        self.run_script(source, then, target);
                    }
                }
            }
        }
    }

    fn condition_holds(&self, condition: ScriptCondition, owner: PlayerId) -> bool {
        match condition {
            ScriptCondition::OwnBoardPowerBelowOpponent => {
                self.board.total_power(owner, &self.cards)
                    < self.board.total_power(owner.opponent(), &self.cards)
            }
            ScriptCondition::OwnMoraleBelowOpponent => {
                self.players[owner].morale < self.players[owner.opponent()].morale
            }
        }
    }

    // === Units, damage, buffs ===

    fn damage_unit(&mut self, card_id: CardId, amount: i32) {
        let Some(card) = self.cards.get_mut(&card_id) else {
            error!(game = %self.id, fault = %ConsistencyError::UnknownCard(card_id), "damage target vanished");
            return;
        };
        // Armor soaks damage before power does.
        let through = (amount - card.armor()).max(0);
        card.take_damage(through);
        let power = card.power();
        self.notify_both(Notification::PowerChanged { card_id, power });
        if power <= 0 {
            self.destroy_unit(card_id);
        }
    }

    fn destroy_unit(&mut self, card_id: CardId) {
        let Some(unit) = self.board.unit(card_id).copied() else {
            error!(game = %self.id, fault = %ConsistencyError::UnitOnNoRow(card_id), "destroying a unit that is not on a row");
            return;
        };
        let owner = unit.owner;
        // Callbacks observe the dying unit still on its row, so effects like
        // adjacency still resolve against its final position.
        self.post_event(
            GameEvent::new(GameEventKind::UnitDestroyed)
                .with_card(card_id)
                .with_player(owner)
                .at_location(CardLocation::Board),
        );
        self.bus.remove_for_owner(card_id);
        self.board.remove_unit(card_id);
        // Buffs die with their unit; the graveyard copy keeps base stats only.
        if let Some(card) = self.cards.get_mut(&card_id) {
            card.buffs = BuffStack::new();
        }
        self.discard_to_graveyard(card_id);
        self.notify_both(Notification::UnitDestroyed { card_id });
        // A fallen unit costs its owner morale.
        self.deal_morale_damage(owner, 1);
    }

    fn deal_morale_damage(&mut self, player: PlayerId, amount: i32) {
        self.players.get_mut(player).take_morale_damage(amount);
        let morale = self.players[player].morale;
        self.notify_both(Notification::MoraleChanged { player, morale });
    }

    fn add_buff(&mut self, card_id: CardId, class: BuffClass, source: CardId) {
        let Some(card) = self.cards.get_mut(&card_id) else {
            return;
        };
        card.buffs.add(class, Some(source));
        let power = card.power();
        self.notify_both(Notification::BuffAdded { card_id, class });
        if class.stat_bonus() == Some(Stat::Power) {
            self.notify_both(Notification::PowerChanged { card_id, power });
        }
    }

    fn summon_token(&mut self, source: CardId, class: &str) {
        let Some(owner) = self.card_owner(source) else {
            return;
        };
        let front = Perspective::of(owner).front_row();
        let (full, slot) = match self.board.row(front) {
            Some(row) => (row.is_full(), row.len()),
            None => (true, 0),
        };
        if full {
            debug!(game = %self.id, %owner, class, "front row full, token fizzles");
            return;
        }
        let Some(card_id) = self.create_card(class, owner) else {
            return;
        };
        if let Err(err) = self.deploy_unit(card_id, owner, front, slot) {
            debug!(game = %self.id, %err, "token deployment skipped");
        }
    }

    fn summon_from_deck(&mut self, source: CardId, card_id: CardId) {
        let Some(owner) = self.card_owner(source) else {
            return;
        };
        if !self.players.get_mut(owner).deck.remove(card_id) {
            debug!(game = %self.id, %card_id, "tutored card is no longer in the deck");
            return;
        }
        let front = Perspective::of(owner).front_row();
        let slot = self.board.row(front).map_or(0, |row| row.len());
        if let Err(err) = self.forced_play(card_id, front, slot) {
            debug!(game = %self.id, %err, "tutored play skipped");
            self.discard_to_graveyard(card_id);
        }
    }

    // === Skirmish orders ===

    fn attack_order(
        &mut self,
        player: PlayerId,
        unit_id: CardId,
        target_id: CardId,
    ) -> Result<(), IntentError> {
        if self.phase != GameTurnPhase::Skirmish {
            return Err(IntentError::WrongPhase);
        }
        let unit = self
            .board
            .unit(unit_id)
            .ok_or(IntentError::UnitNotFound(unit_id))?;
        if unit.owner != player {
            return Err(IntentError::NotOwner { player });
        }
        let target = self
            .board
            .unit(target_id)
            .ok_or(IntentError::UnitNotFound(target_id))?;
        if target.owner == player {
            return Err(IntentError::InvalidTarget);
        }
        let range = self.cards.get(&unit_id).map_or(0, |c| c.attack_range());
        if !self.board.in_attack_range(unit_id, target_id, range) {
            return Err(IntentError::OutOfRange);
        }

        let order = UnitOrder::Attack { target: target_id };
        if let Some(unit) = self.board.unit_mut(unit_id) {
            unit.order = Some(order);
        }
        self.notify_both(Notification::UnitOrderSet { card_id: unit_id, order });
        Ok(())
    }

    fn move_order(
        &mut self,
        player: PlayerId,
        unit_id: CardId,
        row_index: usize,
    ) -> Result<(), IntentError> {
        if self.phase != GameTurnPhase::Skirmish {
            return Err(IntentError::WrongPhase);
        }
        let (current_row, _) = self
            .board
            .find_unit(unit_id)
            .ok_or(IntentError::UnitNotFound(unit_id))?;
        let unit = self
            .board
            .unit(unit_id)
            .ok_or(IntentError::UnitNotFound(unit_id))?;
        if unit.owner != player {
            return Err(IntentError::NotOwner { player });
        }
        if row_index >= Ruleset::BOARD_ROW_COUNT {
            return Err(IntentError::IllegalRow(row_index));
        }

        let reach = 1 + self
            .cards
            .get(&unit_id)
            .map_or(0, |c| c.buffs.intensity(BuffClass::ExtraMove).max(0)) as usize;
        let distance = current_row.abs_diff(row_index);
        if distance == 0 || distance > reach {
            return Err(IntentError::IllegalMove);
        }
        // Units hold ground or advance; retreating is not a legal order.
        if Perspective::of(player).direction_of(current_row, row_index) == MoveDirection::Back {
            return Err(IntentError::IllegalMove);
        }

        let order = UnitOrder::Move { row_index };
        if let Some(unit) = self.board.unit_mut(unit_id) {
            unit.order = Some(order);
        }
        self.notify_both(Notification::UnitOrderSet { card_id: unit_id, order });
        Ok(())
    }

    // === Turn and phase flow ===

    fn end_turn(&mut self, player: PlayerId) -> Result<(), IntentError> {
        if !self.phase.is_active() {
            return Err(IntentError::WrongPhase);
        }
        let pig = self.players.get_mut(player);
        if pig.turn_ended {
            return Err(IntentError::TurnAlreadyEnded);
        }
        pig.end_turn();
        self.notify_both(Notification::TurnEnded { player });
        self.post_event(GameEvent::new(GameEventKind::TurnEnded).with_player(player));
        Ok(())
    }

    fn start_turn(&mut self, player: PlayerId) {
        let pig = self.players.get_mut(player);
        pig.start_turn();
        let (unit_mana, spell_mana) = (pig.unit_mana, pig.spell_mana);
        self.notify_both(Notification::TurnStarted { player });
        self.notify_both(Notification::ManaChanged { player, unit_mana, spell_mana });
        self.post_event(GameEvent::new(GameEventKind::TurnStarted).with_player(player));
    }

    /// Recomputed after every successful intent: the deploy phase ends when
    /// neither player has a play left, the skirmish when both declared done.
    fn advance_phase(&mut self) {
        match self.phase {
            GameTurnPhase::Deploy => {
                // A suspended resolution pins the phase.
                if !self.stack.is_empty() {
                    return;
                }
                let both_done = PlayerId::both()
                    .all(|player| self.players[player].deploy_finished(&self.cards));
                if both_done {
                    self.enter_skirmish();
                }
            }
            GameTurnPhase::Skirmish => {
                if self.players.all(|p| p.turn_ended) {
                    self.end_round();
                }
            }
            GameTurnPhase::BeforeGame | GameTurnPhase::GameOver => {}
        }
    }

    fn enter_skirmish(&mut self) {
        debug!(game = %self.id, round = self.round, "entering skirmish");
        self.phase = GameTurnPhase::Skirmish;
        for (_, pig) in self.players.iter_mut() {
            pig.turn_ended = false;
        }
        self.notify_both(Notification::PhaseChanged { phase: GameTurnPhase::Skirmish });
    }

    fn end_round(&mut self) {
        info!(game = %self.id, round = self.round, "executing skirmish orders and ending round");
        self.tick_turn_buffs();
        self.execute_orders();
        self.tick_round_buffs();
        self.post_event(GameEvent::new(GameEventKind::RoundEnded));
        self.discard_transient_cards();

        self.check_victory();
        if self.phase == GameTurnPhase::GameOver {
            return;
        }

        self.round += 1;
        self.phase = GameTurnPhase::Deploy;
        self.notify_both(Notification::PhaseChanged { phase: GameTurnPhase::Deploy });
        self.notify_both(Notification::RoundStarted { round: self.round });
        self.post_event(GameEvent::new(GameEventKind::RoundStarted));
        for player in PlayerId::both() {
            self.draw_unit_cards(player, 1);
            self.refill_spell_hand(player);
            self.start_turn(player);
        }
    }

    /// Run all queued orders: every attack lands before any unit moves, and
    /// within each group units act in row-major board order.
    fn execute_orders(&mut self) {
        let mut attacks = Vec::new();
        let mut moves = Vec::new();
        for row in self.board.rows() {
            for unit in row.iter() {
                match unit.order {
                    Some(UnitOrder::Attack { target }) => attacks.push((unit.card_id, target)),
                    Some(UnitOrder::Move { row_index }) => moves.push((unit.card_id, row_index)),
                    None => {}
                }
            }
        }
        for (attacker, target) in attacks {
            self.perform_attack(attacker, target);
        }
        for (unit_id, row_index) in moves {
            self.perform_move(unit_id, row_index);
        }
    }

    fn perform_attack(&mut self, attacker: CardId, target: CardId) {
        // The attacker may have died earlier this skirmish.
        if self.board.unit(attacker).is_none() {
            return;
        }
        if self.board.unit(target).is_none() {
            // Stale order against a dead unit.
            if let Some(unit) = self.board.unit_mut(attacker) {
                unit.order = None;
            }
            return;
        }
        let Some(card) = self.cards.get(&attacker) else {
            error!(game = %self.id, fault = %ConsistencyError::UnknownCard(attacker), "attacker has no card");
            return;
        };
        let attack = card.attack();
        let range = card.attack_range();
        if attack <= 0 || !self.board.in_attack_range(attacker, target, range) {
            return;
        }
        self.damage_unit(target, attack);
        // Attack orders persist across rounds until the target dies.
        if self.board.unit(target).is_none() {
            if let Some(unit) = self.board.unit_mut(attacker) {
                unit.order = None;
            }
        }
    }

    fn perform_move(&mut self, unit_id: CardId, row_index: usize) {
        if self.board.unit(unit_id).is_none() {
            return;
        }
        if let Some(unit) = self.board.unit_mut(unit_id) {
            unit.order = None;
        }
        match self.board.relocate(unit_id, row_index) {
            Ok(()) => {
                if let Some((row_index, slot)) = self.board.find_unit(unit_id) {
                    self.notify_both(Notification::UnitMoved { card_id: unit_id, row_index, slot });
                }
                let player = self.board.unit(unit_id).map(|u| u.owner);
                let mut event = GameEvent::new(GameEventKind::UnitMoved)
                    .with_card(unit_id)
                    .at_location(CardLocation::Board);
                if let Some(player) = player {
                    event = event.with_player(player);
                }
                self.post_event(event);
            }
            Err(err) => {
                // The destination may have filled since the order was given.
                debug!(game = %self.id, %unit_id, %err, "move order skipped");
            }
        }
    }

    fn tick_turn_buffs(&mut self) {
        let ids = self.board_card_ids();
        for id in ids {
            let expired = match self.cards.get_mut(&id) {
                Some(card) => card.buffs.tick_turn(),
                None => continue,
            };
            for class in expired {
                debug!(game = %self.id, card = %id, ?class, "turn buff expired");
            }
        }
    }

    fn tick_round_buffs(&mut self) {
        let ids = self.board_card_ids();
        for id in ids {
            let expired = match self.cards.get_mut(&id) {
                Some(card) => card.buffs.tick_round(),
                None => continue,
            };
            for class in expired {
                debug!(game = %self.id, card = %id, ?class, "round buff expired");
            }
        }
    }

    /// Only on-board units carry live buffs, so the sweeps look at the rows.
    fn board_card_ids(&self) -> Vec<CardId> {
        self.board
            .rows()
            .flat_map(|row| row.iter().map(|u| u.card_id))
            .collect()
    }

    fn discard_transient_cards(&mut self) {
        for player in PlayerId::both() {
            let in_hand: Vec<CardId> = self.players[player].hand.all_cards().collect();
            for card_id in in_hand {
                let transient = self.cards.get(&card_id).is_some_and(|c| c.transient);
                if !transient {
                    continue;
                }
                self.players.get_mut(player).hand.remove(card_id);
                self.discard_to_graveyard(card_id);
                self.notify_both(Notification::CardDiscarded { player, card_id });
            }
        }
    }

    fn check_victory(&mut self) {
        if self.phase == GameTurnPhase::GameOver {
            return;
        }
        let first_lost = self.players[PlayerId::new(0)].is_defeated();
        let second_lost = self.players[PlayerId::new(1)].is_defeated();
        if !first_lost && !second_lost {
            return;
        }
        self.phase = GameTurnPhase::GameOver;
        self.winner = match (first_lost, second_lost) {
            (true, true) => None,
            (true, false) => Some(PlayerId::new(1)),
            (false, true) => Some(PlayerId::new(0)),
            (false, false) => unreachable!(),
        };
        info!(game = %self.id, winner = ?self.winner, "game over");
        self.notify_both(Notification::GameOver { winner: self.winner });
    }

    /// Tear the match down because `leaver` disconnected or conceded. Works
    /// in any phase, including mid-resolution; the opponent wins unless the
    /// game was already decided.
    pub fn abort(&mut self, leaver: PlayerId) {
        if self.phase == GameTurnPhase::GameOver {
            return;
        }
        info!(game = %self.id, %leaver, "aborting game");
        self.phase = GameTurnPhase::GameOver;
        self.winner = Some(leaver.opponent());
        self.notify_both(Notification::GameOver { winner: self.winner });
    }

    // === Cards and zones ===

    fn create_card(&mut self, class: &str, owner: PlayerId) -> Option<CardId> {
        let Some(definition) = self.library.get(class) else {
            warn!(game = %self.id, %owner, class, "unknown card class");
            return None;
        };
        let definition = definition.clone();
        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        let (card, callbacks) = definition.instantiate(id, owner);
        self.cards.insert(id, card);
        for callback in callbacks {
            self.bus.register(callback);
        }
        Some(id)
    }

    fn definition_of(&self, card_id: CardId) -> Option<CardDefinition> {
        let class = &self.cards.get(&card_id)?.class;
        self.library.get(class).cloned()
    }

    fn card_owner(&self, card_id: CardId) -> Option<PlayerId> {
        self.cards.get(&card_id).map(|c| c.owner)
    }

    fn discard_to_graveyard(&mut self, card_id: CardId) {
        let Some(owner) = self.card_owner(card_id) else {
            error!(game = %self.id, fault = %ConsistencyError::UnknownCard(card_id), "discarding unknown card");
            return;
        };
        self.players.get_mut(owner).graveyard.add(card_id);
    }

    fn draw_unit_cards(&mut self, player: PlayerId, count: usize) {
        for _ in 0..count {
            if self.players[player].hand.unit_hand_full() {
                debug!(game = %self.id, %player, "unit hand full, draw skipped");
                break;
            }
            let Some(card_id) = self.players.get_mut(player).deck.draw_unit() else {
                break;
            };
            self.players.get_mut(player).hand.add(CardType::Unit, card_id);
            self.notify_card_drawn(player, card_id);
            self.post_event(
                GameEvent::new(GameEventKind::CardDrawn)
                    .with_card(card_id)
                    .with_player(player)
                    .at_location(CardLocation::Hand),
            );
        }
    }

    fn refill_spell_hand(&mut self, player: PlayerId) {
        while self.players[player].hand.spell_count() < Ruleset::SPELL_HAND_REFILL_TO {
            let Some(card_id) = self.players.get_mut(player).deck.draw_spell() else {
                break;
            };
            self.players.get_mut(player).hand.add(CardType::Spell, card_id);
            self.notify_card_drawn(player, card_id);
            self.post_event(
                GameEvent::new(GameEventKind::CardDrawn)
                    .with_card(card_id)
                    .with_player(player)
                    .at_location(CardLocation::Hand),
            );
        }
    }

    fn notify_card_drawn(&mut self, player: PlayerId, card_id: CardId) {
        let Some(card) = self.cards.get(&card_id) else {
            return;
        };
        let to_owner = CardMessage::for_viewer(card, player);
        let to_opponent = CardMessage::for_viewer(card, player.opponent());
        self.notify(player, Notification::CardDrawn { player, card: to_owner });
        self.notify(player.opponent(), Notification::CardDrawn { player, card: to_opponent });
    }

    // === Events ===

    /// Publish an event: matching callbacks run immediately, in registration
    /// order, and may post further events.
    fn post_event(&mut self, event: GameEvent) {
        let registrations = self.bus.registrations_for(event.kind);
        for callback in registrations {
            let Some(owner_player) = self.card_owner(callback.owner) else {
                continue;
            };
            if !callback.matches(&event, owner_player) {
                continue;
            }
            for script in &callback.scripts {
                self.run_script(callback.owner, script, None);
            }
        }
    }

    // === Notifications ===

    fn notify(&mut self, player: PlayerId, notification: Notification) {
        self.outbox.push((player, notification));
    }

    fn notify_both(&mut self, notification: Notification) {
        self.outbox.push((PlayerId::new(0), notification.clone()));
        self.outbox.push((PlayerId::new(1), notification));
    }

    /// Take every queued notification, in emission order.
    pub fn drain_outbox(&mut self) -> Vec<(PlayerId, Notification)> {
        std::mem::take(&mut self.outbox)
    }

    /// Push every queued notification into a sink.
    pub fn flush_into(&mut self, sink: &mut impl OutboundSink) {
        for (player, notification) in self.outbox.drain(..) {
            sink.send(player, &notification);
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> GameTurnPhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards.get(&card_id)
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerInGame {
        &self.players[player]
    }

    /// The card and owner of the pending target request, if one is open.
    #[must_use]
    pub fn awaiting_target(&self) -> Option<(CardId, PlayerId)> {
        self.stack.current().map(|e| (e.card_id, e.owner))
    }
}
