//! Timed stat modifiers and event hooks attached to cards.
//!
//! Every card owns a [`BuffStack`]. Repeated applications of the same buff
//! class combine according to that class's declared [`BuffStackType`]:
//! intensity accumulates, or duration refreshes, never both silently.
//! Finite durations are decremented by the turn/round sweeps and the buff is
//! destroyed when its duration reaches zero; within one sweep, expiry order
//! is buff-creation order so effect interactions stay deterministic.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;

/// Stat a buff can contribute to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stat {
    Power,
    Attack,
    AttackRange,
    Armor,
}

/// How repeated applications of the same buff class combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffStackType {
    /// Each application adds one intensity; duration is left alone.
    AddIntensity,
    /// Each application resets duration to the base; intensity is left alone.
    RefreshDuration,
}

/// How long a buff lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffDuration {
    /// Expires after this many turn boundaries.
    Turns(u32),
    /// Expires after this many round boundaries.
    Rounds(u32),
    /// Never expires on its own.
    Infinite,
}

/// The fixed set of buff classes the engine knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffClass {
    /// +1 armor per intensity, gone at the end of the turn.
    DecayingArmor,
    /// One extra row of movement per intensity this turn.
    ExtraMove,
    /// Amplifies allied spark damage; persists for the round.
    SparkDamage,
    /// Flat +1 power per intensity, permanent.
    Strength,
}

impl BuffClass {
    /// Stacking policy for this class.
    #[must_use]
    pub const fn stack_type(self) -> BuffStackType {
        match self {
            BuffClass::DecayingArmor => BuffStackType::AddIntensity,
            BuffClass::ExtraMove => BuffStackType::AddIntensity,
            BuffClass::SparkDamage => BuffStackType::AddIntensity,
            BuffClass::Strength => BuffStackType::RefreshDuration,
        }
    }

    /// Duration a fresh application starts with.
    #[must_use]
    pub const fn base_duration(self) -> BuffDuration {
        match self {
            BuffClass::DecayingArmor => BuffDuration::Turns(1),
            BuffClass::ExtraMove => BuffDuration::Turns(1),
            BuffClass::SparkDamage => BuffDuration::Rounds(1),
            BuffClass::Strength => BuffDuration::Infinite,
        }
    }

    /// Stat this class contributes to, if any, per point of intensity.
    #[must_use]
    pub const fn stat_bonus(self) -> Option<Stat> {
        match self {
            BuffClass::DecayingArmor => Some(Stat::Armor),
            BuffClass::Strength => Some(Stat::Power),
            BuffClass::ExtraMove | BuffClass::SparkDamage => None,
        }
    }
}

/// One live modifier on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub class: BuffClass,
    /// Integer magnitude; meaning depends on the class.
    pub intensity: i32,
    pub duration: BuffDuration,
    /// The card whose effect created this buff.
    pub source: Option<CardId>,
}

/// Per-card registry of buffs, kept in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffStack {
    buffs: Vec<Buff>,
}

impl BuffStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a buff of `class`, combining with an existing buff of the same
    /// class according to the class's stack type.
    pub fn add(&mut self, class: BuffClass, source: Option<CardId>) {
        if let Some(existing) = self.buffs.iter_mut().find(|b| b.class == class) {
            match class.stack_type() {
                BuffStackType::AddIntensity => existing.intensity += 1,
                BuffStackType::RefreshDuration => existing.duration = class.base_duration(),
            }
            return;
        }

        self.buffs.push(Buff {
            class,
            intensity: 1,
            duration: class.base_duration(),
            source,
        });
    }

    /// Whether any buff of `class` is present.
    #[must_use]
    pub fn has(&self, class: BuffClass) -> bool {
        self.buffs.iter().any(|b| b.class == class)
    }

    /// Total intensity of all buffs of `class`.
    #[must_use]
    pub fn intensity(&self, class: BuffClass) -> i32 {
        self.buffs
            .iter()
            .filter(|b| b.class == class)
            .map(|b| b.intensity)
            .sum()
    }

    /// Combined contribution of all buffs to the given stat.
    #[must_use]
    pub fn stat_bonus(&self, stat: Stat) -> i32 {
        self.buffs
            .iter()
            .filter(|b| b.class.stat_bonus() == Some(stat))
            .map(|b| b.intensity)
            .sum()
    }

    /// Current duration of the buff of `class`, if present.
    #[must_use]
    pub fn duration(&self, class: BuffClass) -> Option<BuffDuration> {
        self.buffs.iter().find(|b| b.class == class).map(|b| b.duration)
    }

    /// Number of distinct live buffs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    /// Whether no buffs are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// Iterate buffs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    /// Turn-boundary sweep: decrement turn-scoped durations and expire buffs
    /// that reach zero. Returns the expired classes in creation order.
    pub fn tick_turn(&mut self) -> Vec<BuffClass> {
        self.tick(|duration| match duration {
            BuffDuration::Turns(n) => BuffDuration::Turns(n.saturating_sub(1)),
            other => other,
        })
    }

    /// Round-boundary sweep, the round-scoped counterpart of [`tick_turn`].
    ///
    /// [`tick_turn`]: BuffStack::tick_turn
    pub fn tick_round(&mut self) -> Vec<BuffClass> {
        self.tick(|duration| match duration {
            BuffDuration::Rounds(n) => BuffDuration::Rounds(n.saturating_sub(1)),
            other => other,
        })
    }

    fn tick(&mut self, step: impl Fn(BuffDuration) -> BuffDuration) -> Vec<BuffClass> {
        for buff in &mut self.buffs {
            buff.duration = step(buff.duration);
        }

        let mut expired = Vec::new();
        self.buffs.retain(|b| {
            let dead = matches!(b.duration, BuffDuration::Turns(0) | BuffDuration::Rounds(0));
            if dead {
                expired.push(b.class);
            }
            !dead
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_intensity_stacking() {
        let mut stack = BuffStack::new();

        for _ in 0..4 {
            stack.add(BuffClass::DecayingArmor, None);
        }

        // N applications = N x per-application intensity, one buff entry
        assert_eq!(stack.intensity(BuffClass::DecayingArmor), 4);
        assert_eq!(stack.len(), 1);
        assert_eq!(
            stack.duration(BuffClass::DecayingArmor),
            Some(BuffDuration::Turns(1))
        );
    }

    #[test]
    fn test_refresh_duration_stacking() {
        let mut stack = BuffStack::new();

        for _ in 0..3 {
            stack.add(BuffClass::Strength, None);
        }

        // Duration resets to base, intensity never accumulates
        assert_eq!(stack.intensity(BuffClass::Strength), 1);
        assert_eq!(stack.duration(BuffClass::Strength), Some(BuffDuration::Infinite));
    }

    #[test]
    fn test_stat_bonus() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::DecayingArmor, None);
        stack.add(BuffClass::DecayingArmor, None);
        stack.add(BuffClass::ExtraMove, None);

        assert_eq!(stack.stat_bonus(Stat::Armor), 2);
        assert_eq!(stack.stat_bonus(Stat::Power), 0);
    }

    #[test]
    fn test_turn_tick_expiry() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::DecayingArmor, None);
        stack.add(BuffClass::SparkDamage, None);

        let expired = stack.tick_turn();

        assert_eq!(expired, vec![BuffClass::DecayingArmor]);
        assert!(!stack.has(BuffClass::DecayingArmor));
        // Round-scoped buff survives turn boundaries
        assert!(stack.has(BuffClass::SparkDamage));
    }

    #[test]
    fn test_round_tick_expiry() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::SparkDamage, None);
        stack.add(BuffClass::Strength, None);

        let expired = stack.tick_round();

        assert_eq!(expired, vec![BuffClass::SparkDamage]);
        assert!(stack.has(BuffClass::Strength));
    }

    #[test]
    fn test_infinite_never_expires() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::Strength, None);

        for _ in 0..10 {
            assert!(stack.tick_turn().is_empty());
            assert!(stack.tick_round().is_empty());
        }
        assert!(stack.has(BuffClass::Strength));
    }

    #[test]
    fn test_expiry_is_creation_ordered() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::ExtraMove, None);
        stack.add(BuffClass::DecayingArmor, None);

        let expired = stack.tick_turn();
        assert_eq!(expired, vec![BuffClass::ExtraMove, BuffClass::DecayingArmor]);
    }

    #[test]
    fn test_source_recorded() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::DecayingArmor, Some(CardId(7)));

        let buff = stack.iter().next().unwrap();
        assert_eq!(buff.source, Some(CardId(7)));
    }

    #[test]
    fn test_serialization() {
        let mut stack = BuffStack::new();
        stack.add(BuffClass::SparkDamage, Some(CardId(3)));

        let json = serde_json::to_string(&stack).unwrap();
        let deserialized: BuffStack = serde_json::from_str(&json).unwrap();
        assert_eq!(stack, deserialized);
    }
}
