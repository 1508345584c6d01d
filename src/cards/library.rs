//! Card template library.
//!
//! Templates are registered under their class name and instantiated into
//! [`Card`]s on demand. A template bundles base stats, the play/targeting
//! script hooks, and the event callback registrations the instance should
//! carry; the library is a plain value the session owns, not a global.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::buffs::BuffClass;
use crate::cards::{Card, CardId, CardScript, CardType, ScriptCondition};
use crate::core::PlayerId;
use crate::events::{CallbackCondition, CardLocation, EventCallback, GameEventKind};
use crate::resolve::{TargetConstraint, TargetDefinition, TargetRule, TargetType};

/// An event callback as declared by a template. The owning card id is not
/// known until instantiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackDefinition {
    pub kind: GameEventKind,
    pub location: Option<CardLocation>,
    pub condition: CallbackCondition,
    pub scripts: Vec<CardScript>,
}

impl CallbackDefinition {
    #[must_use]
    pub fn new(kind: GameEventKind) -> Self {
        Self {
            kind,
            location: None,
            condition: CallbackCondition::Always,
            scripts: Vec::new(),
        }
    }

    /// Restrict to events whose triggering entity was in `location`
    /// (builder pattern).
    #[must_use]
    pub fn at_location(mut self, location: CardLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the match condition (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: CallbackCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Append a script to run on match (builder pattern).
    #[must_use]
    pub fn run(mut self, script: CardScript) -> Self {
        self.scripts.push(script);
        self
    }

    fn bind(&self, owner: CardId) -> EventCallback {
        EventCallback {
            owner,
            kind: self.kind,
            location: self.location,
            condition: self.condition,
            scripts: self.scripts.clone(),
        }
    }
}

/// A card template: everything shared by all instances of one class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub class: String,
    pub card_type: CardType,
    pub base_power: i32,
    pub base_attack: i32,
    pub base_attack_range: u32,
    pub base_armor: i32,
    pub spell_cost: u32,

    /// Scripts run when the card's play resolution begins.
    pub on_play: Vec<CardScript>,

    /// Targets the card demands after its play step.
    pub targeting: TargetDefinition,

    /// Scripts run once per confirmed target selection.
    pub on_target_selected: Vec<CardScript>,

    /// Scripts run once all required targets are in.
    pub on_targets_confirmed: Vec<CardScript>,

    /// Event bus registrations every instance carries.
    pub callbacks: Vec<CallbackDefinition>,
}

impl CardDefinition {
    /// Start a unit template with its stat line.
    #[must_use]
    pub fn unit(
        class: impl Into<String>,
        power: i32,
        attack: i32,
        attack_range: u32,
        armor: i32,
    ) -> Self {
        Self {
            class: class.into(),
            card_type: CardType::Unit,
            base_power: power,
            base_attack: attack,
            base_attack_range: attack_range,
            base_armor: armor,
            spell_cost: 0,
            on_play: Vec::new(),
            targeting: TargetDefinition::none(),
            on_target_selected: Vec::new(),
            on_targets_confirmed: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Start a spell template with its mana cost.
    #[must_use]
    pub fn spell(class: impl Into<String>, spell_cost: u32) -> Self {
        Self {
            class: class.into(),
            card_type: CardType::Spell,
            base_power: 0,
            base_attack: 0,
            base_attack_range: 0,
            base_armor: 0,
            spell_cost,
            on_play: Vec::new(),
            targeting: TargetDefinition::none(),
            on_target_selected: Vec::new(),
            on_targets_confirmed: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Append an on-play script (builder pattern).
    #[must_use]
    pub fn on_play(mut self, script: CardScript) -> Self {
        self.on_play.push(script);
        self
    }

    /// Set the targeting demand (builder pattern).
    #[must_use]
    pub fn targeting(mut self, targeting: TargetDefinition) -> Self {
        self.targeting = targeting;
        self
    }

    /// Append a per-selection script (builder pattern).
    #[must_use]
    pub fn on_target_selected(mut self, script: CardScript) -> Self {
        self.on_target_selected.push(script);
        self
    }

    /// Append an all-targets-confirmed script (builder pattern).
    #[must_use]
    pub fn on_targets_confirmed(mut self, script: CardScript) -> Self {
        self.on_targets_confirmed.push(script);
        self
    }

    /// Append a callback registration (builder pattern).
    #[must_use]
    pub fn callback(mut self, callback: CallbackDefinition) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Instantiate this template for `owner`, producing the card and the
    /// event registrations it carries.
    #[must_use]
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> (Card, Vec<EventCallback>) {
        let mut card = Card::new(
            id,
            self.class.clone(),
            self.card_type,
            owner,
            self.base_power,
            self.base_attack,
            self.base_attack_range,
            self.base_armor,
        );
        card.spell_cost = self.spell_cost;

        let callbacks = self.callbacks.iter().map(|cb| cb.bind(id)).collect();
        (card, callbacks)
    }
}

/// Registry of card templates, keyed by class name.
#[derive(Clone, Debug, Default)]
pub struct CardLibrary {
    definitions: FxHashMap<String, CardDefinition>,
}

impl CardLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The library with the stock card set registered.
    #[must_use]
    pub fn with_default_cards() -> Self {
        let mut library = Self::new();
        for definition in default_cards() {
            library.register(definition);
        }
        library
    }

    /// Register a template. A later registration under the same class name
    /// replaces the earlier one.
    pub fn register(&mut self, definition: CardDefinition) {
        self.definitions.insert(definition.class.clone(), definition);
    }

    /// Look up a template by class name.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&CardDefinition> {
        self.definitions.get(class)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// The stock card set.
fn default_cards() -> Vec<CardDefinition> {
    vec![
        // Plain stat stick.
        CardDefinition::unit("unitStoneGolem", 8, 2, 1, 1),
        // Gains power on deploy when its side is behind on board power, and
        // again when its owner is behind on morale.
        CardDefinition::unit("unitForestScout", 4, 2, 1, 0).callback(
            CallbackDefinition::new(GameEventKind::EffectUnitDeploy)
                .when(CallbackCondition::TriggeringCardIsSelf)
                .run(CardScript::Conditional {
                    condition: ScriptCondition::OwnBoardPowerBelowOpponent,
                    then: Box::new(CardScript::GainPower { amount: 7 }),
                })
                .run(CardScript::Conditional {
                    condition: ScriptCondition::OwnMoraleBelowOpponent,
                    then: Box::new(CardScript::GainPower { amount: 3 }),
                }),
        ),
        // Fragile; shatters into armor for its neighbors when it dies.
        CardDefinition::unit("unitIceSkinCrystal", 3, 0, 1, 0).callback(
            CallbackDefinition::new(GameEventKind::UnitDestroyed)
                .at_location(CardLocation::Board)
                .when(CallbackCondition::TriggeringCardIsSelf)
                .run(CardScript::AddBuffToAdjacentAllies {
                    class: BuffClass::DecayingArmor,
                    count: 2,
                }),
        ),
        // Token summoned by spellShadowSpark; not part of any deck.
        CardDefinition::unit("unitShadowspawn", 2, 1, 1, 0),
        // Damages an enemy unit, scaling with accumulated spark buffs, then
        // leaves a token behind.
        CardDefinition::spell("spellShadowSpark", 2)
            .targeting(TargetDefinition::single_rule(
                1,
                TargetRule::new(TargetType::Unit).require(TargetConstraint::EnemyUnit),
            ))
            .on_targets_confirmed(CardScript::DealDamageToTarget {
                amount: 3,
                bonus_per_buff: Some(BuffClass::SparkDamage),
            })
            .on_targets_confirmed(CardScript::SummonToken {
                class: "unitShadowspawn".into(),
            }),
        // Tutors a unit out of the owner's deck straight onto the board.
        CardDefinition::spell("heroRavenCaller", 3)
            .targeting(TargetDefinition::single_rule(
                1,
                TargetRule::new(TargetType::Card).require(TargetConstraint::InOwnersUnitDeck),
            ))
            .on_targets_confirmed(CardScript::SummonTargetFromDeck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cards_registered() {
        let library = CardLibrary::with_default_cards();

        assert_eq!(library.len(), 6);
        for class in [
            "unitStoneGolem",
            "unitForestScout",
            "unitIceSkinCrystal",
            "unitShadowspawn",
            "spellShadowSpark",
            "heroRavenCaller",
        ] {
            assert!(library.get(class).is_some(), "missing {class}");
        }
    }

    #[test]
    fn test_instantiate_unit() {
        let library = CardLibrary::with_default_cards();
        let def = library.get("unitIceSkinCrystal").unwrap();

        let (card, callbacks) = def.instantiate(CardId::new(10), PlayerId::new(1));

        assert_eq!(card.id, CardId::new(10));
        assert_eq!(card.owner, PlayerId::new(1));
        assert_eq!(card.card_type, CardType::Unit);
        assert_eq!(card.power(), 3);
        assert_eq!(card.armor(), 0);

        assert_eq!(callbacks.len(), 1);
        assert_eq!(callbacks[0].owner, CardId::new(10));
        assert_eq!(callbacks[0].kind, GameEventKind::UnitDestroyed);
        assert_eq!(callbacks[0].location, Some(CardLocation::Board));
    }

    #[test]
    fn test_instantiate_spell_cost() {
        let library = CardLibrary::with_default_cards();
        let def = library.get("spellShadowSpark").unwrap();

        let (card, callbacks) = def.instantiate(CardId::new(3), PlayerId::new(0));

        assert_eq!(card.card_type, CardType::Spell);
        assert_eq!(card.spell_cost, 2);
        assert!(callbacks.is_empty());
        assert_eq!(def.targeting.target_count, 1);
    }

    #[test]
    fn test_register_replaces() {
        let mut library = CardLibrary::new();
        library.register(CardDefinition::unit("unitStoneGolem", 8, 2, 1, 1));
        library.register(CardDefinition::unit("unitStoneGolem", 9, 2, 1, 1));

        assert_eq!(library.len(), 1);
        assert_eq!(library.get("unitStoneGolem").unwrap().base_power, 9);
    }
}
