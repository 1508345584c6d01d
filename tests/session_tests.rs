//! Session lifecycle: initialization, deploy plays, skirmish orders, round
//! flow, and hidden-information redaction.

mod common;

use common::*;
use duelcore::{
    CardMessage, CardTarget, GameTurnPhase, Intent, IntentError, Notification, Ruleset, UnitOrder,
};

fn golem_decks() -> [Vec<String>; 2] {
    [deck_of("unitStoneGolem", 12), deck_of("unitStoneGolem", 12)]
}

#[test]
fn game_starts_when_both_players_initialize() {
    let mut session = session_with(golem_decks());
    assert_eq!(session.phase(), GameTurnPhase::BeforeGame);

    session.handle_intent(alice(), Intent::Init).unwrap();
    assert_eq!(session.phase(), GameTurnPhase::BeforeGame);

    session.handle_intent(bob(), Intent::Init).unwrap();
    assert_eq!(session.phase(), GameTurnPhase::Deploy);
    assert_eq!(session.round(), 1);

    for player in [alice(), bob()] {
        let pig = session.player(player);
        assert_eq!(pig.hand.unit_count(), Ruleset::STARTING_UNIT_HAND_SIZE);
        assert_eq!(pig.unit_mana, Ruleset::UNIT_MANA_PER_TURN);
        assert_eq!(pig.spell_mana, Ruleset::SPELL_MANA_PER_TURN);
        assert_eq!(pig.morale, Ruleset::STARTING_MORALE);
    }

    let sent = session.drain_outbox();
    assert!(sent
        .iter()
        .any(|(p, n)| *p == alice() && matches!(n, Notification::GameStarted { opponent } if opponent == "bob")));
    assert!(sent
        .iter()
        .any(|(_, n)| matches!(n, Notification::RoundStarted { round: 1 })));
}

#[test]
fn duplicate_init_is_rejected() {
    let mut session = session_with(golem_decks());
    session.handle_intent(alice(), Intent::Init).unwrap();

    assert_eq!(
        session.handle_intent(alice(), Intent::Init),
        Err(IntentError::AlreadyInitialized)
    );

    session.handle_intent(bob(), Intent::Init).unwrap();
    assert_eq!(
        session.handle_intent(bob(), Intent::Init),
        Err(IntentError::WrongPhase)
    );
}

#[test]
fn gameplay_intents_rejected_before_start() {
    let mut session = session_with(golem_decks());
    let result = session.handle_intent(
        alice(),
        Intent::PlayCard { card_id: duelcore::CardId::new(0), row_index: 2, slot: 0 },
    );
    assert_eq!(result, Err(IntentError::WrongPhase));
}

#[test]
fn playing_a_unit_costs_one_unit_mana() {
    let mut session = started_session(golem_decks());
    let golem = card_in_hand(&session, alice(), "unitStoneGolem");
    session.drain_outbox();

    play(&mut session, alice(), golem, 2, 0);

    assert_eq!(session.board().find_unit(golem), Some((2, 0)));
    assert_eq!(session.player(alice()).unit_mana, Ruleset::UNIT_MANA_PER_TURN - 1);
    assert!(!session.player(alice()).hand.contains(golem));

    let sent = session.drain_outbox();
    assert!(sent
        .iter()
        .any(|(_, n)| matches!(n, Notification::UnitCreated { row_index: 2, slot: 0, .. })));
    assert!(sent.iter().any(|(_, n)| matches!(
        n,
        Notification::ManaChanged { unit_mana, .. } if *unit_mana == Ruleset::UNIT_MANA_PER_TURN - 1
    )));
}

#[test]
fn units_only_deploy_into_own_territory() {
    let mut session = started_session(golem_decks());
    let golem = card_in_hand(&session, alice(), "unitStoneGolem");

    let into_enemy = session.handle_intent(
        alice(),
        Intent::PlayCard { card_id: golem, row_index: 3, slot: 0 },
    );
    assert_eq!(into_enemy, Err(IntentError::IllegalRow(3)));

    let off_board = session.handle_intent(
        alice(),
        Intent::PlayCard { card_id: golem, row_index: 6, slot: 0 },
    );
    assert_eq!(off_board, Err(IntentError::IllegalRow(6)));

    // Nothing was consumed
    assert!(session.player(alice()).hand.contains(golem));
    assert_eq!(session.player(alice()).unit_mana, Ruleset::UNIT_MANA_PER_TURN);
}

#[test]
fn unit_plays_stop_when_mana_runs_out() {
    let mut session = started_session(golem_decks());

    for _ in 0..Ruleset::UNIT_MANA_PER_TURN {
        let golem = card_in_hand(&session, alice(), "unitStoneGolem");
        play(&mut session, alice(), golem, 2, 0);
    }

    let fourth = card_in_hand(&session, alice(), "unitStoneGolem");
    let result = session.handle_intent(
        alice(),
        Intent::PlayCard { card_id: fourth, row_index: 2, slot: 0 },
    );
    assert_eq!(result, Err(IntentError::InsufficientMana));
}

#[test]
fn playing_a_foreign_card_is_rejected() {
    let mut session = started_session(golem_decks());
    let bobs_golem = card_in_hand(&session, bob(), "unitStoneGolem");

    let result = session.handle_intent(
        alice(),
        Intent::PlayCard { card_id: bobs_golem, row_index: 2, slot: 0 },
    );
    assert_eq!(result, Err(IntentError::CardNotInHand(bobs_golem)));
}

#[test]
fn ending_the_turn_twice_is_rejected() {
    let mut session = started_session(golem_decks());

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    assert_eq!(
        session.handle_intent(alice(), Intent::EndTurn),
        Err(IntentError::TurnAlreadyEnded)
    );
    // Bob has not ended, the deploy continues
    assert_eq!(session.phase(), GameTurnPhase::Deploy);
}

#[test]
fn round_flows_deploy_skirmish_deploy() {
    let mut session = started_session(golem_decks());

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();
    assert_eq!(session.phase(), GameTurnPhase::Skirmish);

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();

    assert_eq!(session.phase(), GameTurnPhase::Deploy);
    assert_eq!(session.round(), 2);
    for player in [alice(), bob()] {
        let pig = session.player(player);
        assert!(!pig.turn_ended);
        assert_eq!(pig.unit_mana, Ruleset::UNIT_MANA_PER_TURN);
        // One unit card drawn at the round boundary
        assert_eq!(pig.hand.unit_count(), Ruleset::STARTING_UNIT_HAND_SIZE + 1);
    }
}

#[test]
fn queued_attacks_execute_at_round_end() {
    let mut session = started_session(golem_decks());
    let attacker = card_in_hand(&session, alice(), "unitStoneGolem");
    let defender = card_in_hand(&session, bob(), "unitStoneGolem");
    play(&mut session, alice(), attacker, 2, 0);
    play(&mut session, bob(), defender, 3, 0);

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();
    assert_eq!(session.phase(), GameTurnPhase::Skirmish);

    session
        .handle_intent(alice(), Intent::AttackOrder { unit: attacker, target: defender })
        .unwrap();
    session
        .handle_intent(bob(), Intent::AttackOrder { unit: defender, target: attacker })
        .unwrap();

    // Orders are queued, nothing has happened yet
    assert_eq!(session.card(defender).unwrap().power(), 8);

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();

    // Golem: 2 attack against 1 armor leaves 1 damage each way
    assert_eq!(session.card(defender).unwrap().power(), 7);
    assert_eq!(session.card(attacker).unwrap().power(), 7);

    // Attack orders persist while the target lives
    assert_eq!(
        session.board().unit(attacker).unwrap().order,
        Some(UnitOrder::Attack { target: defender })
    );
}

#[test]
fn attack_orders_respect_range_and_ownership() {
    let mut session = started_session(golem_decks());
    let near = card_in_hand(&session, alice(), "unitStoneGolem");
    play(&mut session, alice(), near, 2, 0);
    let far = card_in_hand(&session, alice(), "unitStoneGolem");
    play(&mut session, alice(), far, 1, 0);
    let enemy = card_in_hand(&session, bob(), "unitStoneGolem");
    play(&mut session, bob(), enemy, 3, 0);

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();

    // Row 2 is occupied, so row 1 is two steps from row 3
    assert_eq!(
        session.handle_intent(alice(), Intent::AttackOrder { unit: far, target: enemy }),
        Err(IntentError::OutOfRange)
    );
    // Attacking an ally is never valid
    assert_eq!(
        session.handle_intent(alice(), Intent::AttackOrder { unit: near, target: far }),
        Err(IntentError::InvalidTarget)
    );
    // Ordering an enemy unit around is not allowed
    assert_eq!(
        session.handle_intent(alice(), Intent::AttackOrder { unit: enemy, target: near }),
        Err(IntentError::NotOwner { player: alice() })
    );
    // During deploy no orders are accepted
    let mut deploy_session = started_session(golem_decks());
    assert_eq!(
        deploy_session.handle_intent(alice(), Intent::AttackOrder { unit: near, target: enemy }),
        Err(IntentError::WrongPhase)
    );
}

#[test]
fn move_orders_advance_but_never_retreat() {
    let mut session = started_session(golem_decks());
    let golem = card_in_hand(&session, alice(), "unitStoneGolem");
    play(&mut session, alice(), golem, 1, 0);

    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();

    assert_eq!(
        session.handle_intent(alice(), Intent::MoveOrder { unit: golem, row_index: 0 }),
        Err(IntentError::IllegalMove)
    );
    assert_eq!(
        session.handle_intent(alice(), Intent::MoveOrder { unit: golem, row_index: 1 }),
        Err(IntentError::IllegalMove)
    );
    assert_eq!(
        session.handle_intent(alice(), Intent::MoveOrder { unit: golem, row_index: 4 }),
        Err(IntentError::IllegalMove)
    );

    session
        .handle_intent(alice(), Intent::MoveOrder { unit: golem, row_index: 2 })
        .unwrap();
    session.drain_outbox();
    session.handle_intent(alice(), Intent::EndTurn).unwrap();
    session.handle_intent(bob(), Intent::EndTurn).unwrap();

    assert_eq!(session.board().find_unit(golem), Some((2, 0)));
    // Move orders are one-shot
    assert_eq!(session.board().unit(golem).unwrap().order, None);
    let sent = session.drain_outbox();
    assert!(sent
        .iter()
        .any(|(_, n)| matches!(n, Notification::UnitMoved { row_index: 2, .. })));
}

#[test]
fn opponents_see_drawn_cards_redacted() {
    let mut session = session_with(golem_decks());
    session.handle_intent(alice(), Intent::Init).unwrap();
    session.handle_intent(bob(), Intent::Init).unwrap();

    let sent = session.drain_outbox();
    let mut full_to_owner = 0;
    let mut hidden_to_opponent = 0;
    for (recipient, notification) in &sent {
        if let Notification::CardDrawn { player, card } = notification {
            match card {
                CardMessage::Full { .. } => {
                    assert_eq!(recipient, player, "full card view leaked to the opponent");
                    full_to_owner += 1;
                }
                CardMessage::Hidden { .. } => {
                    assert_eq!(*recipient, player.opponent());
                    hidden_to_opponent += 1;
                }
            }
        }
    }
    assert_eq!(full_to_owner, hidden_to_opponent);
    assert!(full_to_owner >= 2 * Ruleset::STARTING_UNIT_HAND_SIZE);
}

#[test]
fn abort_ends_the_game_even_mid_resolution() {
    let mut session = started_session([
        deck_of("unitStoneGolem", 10),
        [deck_of("unitStoneGolem", 6), deck_of("spellShadowSpark", 4)].concat(),
    ]);
    let golem = card_in_hand(&session, alice(), "unitStoneGolem");
    play(&mut session, alice(), golem, 2, 0);
    let spark = card_in_hand(&session, bob(), "spellShadowSpark");
    play(&mut session, bob(), spark, 0, 0);
    assert!(session.awaiting_target().is_some());
    session.drain_outbox();

    session.abort(bob());

    assert_eq!(session.phase(), GameTurnPhase::GameOver);
    assert_eq!(session.winner(), Some(alice()));
    let sent = session.drain_outbox();
    assert!(sent
        .iter()
        .any(|(_, n)| matches!(n, Notification::GameOver { winner } if *winner == Some(alice()))));

    // A terminal session rejects further gameplay
    assert_eq!(
        session.handle_intent(alice(), Intent::EndTurn),
        Err(IntentError::WrongPhase)
    );
}

#[test]
fn select_target_without_pending_request_is_rejected() {
    let mut session = started_session(golem_decks());
    let result = session.handle_intent(
        alice(),
        Intent::SelectTarget { target: CardTarget::Row { row_index: 0 } },
    );
    assert_eq!(result, Err(IntentError::NoPendingTarget { player: alice() }));
}
