//! A module for defining AI behaviors for enemy units.

use crate::battle::battlefield::Battlefield;
use crate::unit::{Side, UnitId};

/// A trait for any system that picks the ally an enemy attacks.
/// Forced targeting is applied afterwards by the damage pipeline, not here.
pub trait Behavior: std::fmt::Debug {
    fn choose_target(&self, enemy: UnitId, battlefield: &Battlefield) -> Option<UnitId>;
}

/// Always attacks the ally with the least current health, first in roster order on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestHealth;

impl Behavior for LowestHealth {
    fn choose_target(&self, _enemy: UnitId, battlefield: &Battlefield) -> Option<UnitId> {
        battlefield.lowest_hp(Side::Ally)
    }
}

/// Always attacks the ally with the most current health.
#[derive(Debug, Clone, Copy, Default)]
pub struct Healthiest;

impl Behavior for Healthiest {
    fn choose_target(&self, _enemy: UnitId, battlefield: &Battlefield) -> Option<UnitId> {
        battlefield.healthiest(Side::Ally)
    }
}
