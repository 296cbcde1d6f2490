//! Conjured creatures and their hit points.
//!
//! An [`Encounter`] owns the active roster. Summons are created in batches from
//! a [`Creature`] template, take damage and healing individually, and leave the
//! roster for good the moment they reach 0 HP.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::combat::{count_for_challenge_rating, extract_attack_profiles, roll_attack};
use crate::{AdMode, AttackProfile, AttackRollResult, Creature, Dice};

/// Summons laid out per row when a batch is placed.
const GRID_COLUMNS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error("no active summon with id '{0}'")]
    UnknownSummon(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonedCreature {
    pub id: String,
    pub source_creature_id: String,
    pub name: String,
    /// 1-based position within its conjure batch.
    pub index: u32,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack_profiles: Vec<AttackProfile>,
    pub selected: bool,
    pub position: Position,
}

impl SummonedCreature {
    /// Returns true if this hit took the summon to 0 HP.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_sub(amount);
        before > 0 && self.current_hp == 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
    }

    pub fn is_active(&self) -> bool {
        self.current_hp > 0
    }
}

/// Hit point change reported by [`Encounter::apply_damage`] and
/// [`Encounter::apply_heal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpChange {
    pub id: String,
    pub before: u32,
    pub after: u32,
    pub removed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Encounter {
    roster: Vec<SummonedCreature>,
    next_serial: u64,
}

impl Encounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summon `count` copies of `creature`, or the challenge-rating derived
    /// number when `count` is `None`. Attack profiles are re-read from the
    /// creature's text for every batch.
    pub fn conjure(&mut self, creature: &Creature, count: Option<u32>) -> &[SummonedCreature] {
        let count = count
            .unwrap_or_else(|| creature.cr.as_deref().map_or(1, count_for_challenge_rating))
            .max(1);
        let max_hp = creature.max_hp().unwrap_or(1).max(1);
        let profiles = extract_attack_profiles(creature);

        let start = self.roster.len();
        for index in 1..=count {
            self.next_serial += 1;
            let slot = index - 1;
            self.roster.push(SummonedCreature {
                id: format!("{}-{}", creature.id, self.next_serial),
                source_creature_id: creature.id.clone(),
                name: format!("{} {}", creature.name, index),
                index,
                max_hp,
                current_hp: max_hp,
                attack_profiles: profiles.clone(),
                selected: false,
                position: Position {
                    x: (slot % GRID_COLUMNS) as f32,
                    y: (slot / GRID_COLUMNS) as f32,
                },
            });
        }
        info!(creature = %creature.id, count, max_hp, "conjured");
        &self.roster[start..]
    }

    pub fn roster(&self) -> &[SummonedCreature] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SummonedCreature> {
        self.roster.iter().find(|s| s.id == id)
    }

    fn position_of(&self, id: &str) -> Result<usize, EncounterError> {
        self.roster
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EncounterError::UnknownSummon(id.to_string()))
    }

    /// Subtract `amount`, floored at 0. A summon at 0 HP is removed.
    pub fn apply_damage(&mut self, id: &str, amount: u32) -> Result<HpChange, EncounterError> {
        let at = self.position_of(id)?;
        let summon = &mut self.roster[at];
        let before = summon.current_hp;
        summon.take_damage(amount);
        let change = HpChange {
            id: summon.id.clone(),
            before,
            after: summon.current_hp,
            removed: !summon.is_active(),
        };
        debug!(id, before, after = change.after, "[HP] damage applied");
        if change.removed {
            let gone = self.roster.remove(at);
            info!(id = %gone.id, "summon dropped to 0 HP and left the roster");
        }
        Ok(change)
    }

    /// Add `amount`, capped at the summon's maximum.
    pub fn apply_heal(&mut self, id: &str, amount: u32) -> Result<HpChange, EncounterError> {
        let at = self.position_of(id)?;
        let summon = &mut self.roster[at];
        let before = summon.current_hp;
        summon.heal(amount);
        debug!(id, before, after = summon.current_hp, "[HEAL] healing applied");
        Ok(HpChange { id: summon.id.clone(), before, after: summon.current_hp, removed: false })
    }

    /// Damage every selected summon; removals happen as in [`Self::apply_damage`].
    pub fn apply_damage_to_selected(&mut self, amount: u32) -> Vec<HpChange> {
        let ids: Vec<String> = self.selected().map(|s| s.id.clone()).collect();
        ids.iter().filter_map(|id| self.apply_damage(id, amount).ok()).collect()
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), EncounterError> {
        let at = self.position_of(id)?;
        self.roster[at].selected = selected;
        Ok(())
    }

    pub fn toggle_selected(&mut self, id: &str) -> Result<bool, EncounterError> {
        let at = self.position_of(id)?;
        let summon = &mut self.roster[at];
        summon.selected = !summon.selected;
        Ok(summon.selected)
    }

    pub fn select_all(&mut self) {
        self.roster.iter_mut().for_each(|s| s.selected = true);
    }

    pub fn clear_selection(&mut self) {
        self.roster.iter_mut().for_each(|s| s.selected = false);
    }

    pub fn selected(&self) -> impl Iterator<Item = &SummonedCreature> {
        self.roster.iter().filter(|s| s.selected)
    }

    pub fn move_to(&mut self, id: &str, position: Position) -> Result<(), EncounterError> {
        let at = self.position_of(id)?;
        self.roster[at].position = position;
        Ok(())
    }

    /// Each selected summon rolls its first attack. Summons without one sit out.
    pub fn attack_with_selected(
        &self,
        dice: &mut Dice,
        mode: AdMode,
    ) -> Vec<(String, AttackRollResult)> {
        self.selected()
            .filter_map(|s| s.attack_profiles.first().map(|p| (s, p)))
            .map(|(summon, profile)| (summon.id.clone(), roll_attack(dice, profile, mode)))
            .collect()
    }

    /// Dismiss every summon.
    pub fn reset(&mut self) {
        self.roster.clear();
    }
}
