use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::roller::MAX_DICE_PER_TERM;
use crate::statblock::{rules, Creature, Entry};
use crate::{AdMode, Dice};

static DAMAGE_EXPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)d(\d+)(?:([-+])(\d+))?").expect("valid regex"));

/// A rollable attack read from an action description. Recomputed on demand,
/// never stored on the creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub name: String,
    pub attack_bonus: i32,
    pub damage_dice_expression: String,
    pub damage_average: i32,
    pub damage_type: String,
}

/// `XdY±Z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageExpression {
    pub dice_count: u32,
    pub dice_faces: u32,
    pub modifier: i32,
}

impl Default for DamageExpression {
    fn default() -> Self {
        Self { dice_count: 1, dice_faces: 6, modifier: 0 }
    }
}

impl fmt::Display for DamageExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.dice_faces)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRollResult {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    pub damage_type: String,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRollResult {
    pub final_die: u32,
    pub die_a: u32,
    pub die_b: Option<u32>,
    pub attack_bonus: i32,
    pub total: i32,
    pub is_critical: bool,
    pub is_fumble: bool,
    /// Rolled whether or not the attack would land; no AC is consulted here.
    pub damage: DamageRollResult,
}

/// Attack profiles from `creature.actions`, or from its traits when it has no
/// actions at all. Entries without a readable `+N to hit` are skipped.
pub fn extract_attack_profiles(creature: &Creature) -> Vec<AttackProfile> {
    let source = if creature.actions.is_empty() { &creature.traits } else { &creature.actions };
    let profiles: Vec<AttackProfile> = source.iter().filter_map(profile_from_entry).collect();
    debug!(id = %creature.id, count = profiles.len(), "extracted attack profiles");
    profiles
}

fn profile_from_entry(entry: &Entry) -> Option<AttackProfile> {
    if !entry.description.contains("to hit") {
        return None;
    }
    let attack_bonus = rules::attack_bonus(&entry.description)?.parse().ok()?;
    let hit = rules::hit_damage(&entry.description);
    Some(AttackProfile {
        name: entry.name.clone(),
        attack_bonus,
        damage_dice_expression: hit.as_ref().map(|h| h.dice.clone()).unwrap_or_default(),
        damage_average: hit.as_ref().and_then(|h| h.average.parse().ok()).unwrap_or(0),
        damage_type: hit.map(|h| h.damage_type).unwrap_or_default(),
    })
}

/// Reads the first `XdY`, `XdY+Z` or `XdY-Z` in `text`, ignoring whitespace.
/// Anything unreadable, or more than [`MAX_DICE_PER_TERM`] dice, is `1d6`.
pub fn parse_damage_expression(text: &str) -> DamageExpression {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(caps) = DAMAGE_EXPR_RE.captures(&compact) else {
        return DamageExpression::default();
    };
    let (Ok(dice_count), Ok(dice_faces)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return DamageExpression::default();
    };
    if dice_count == 0 || dice_faces == 0 || dice_count > MAX_DICE_PER_TERM {
        return DamageExpression::default();
    }
    let modifier = match (caps.get(3), caps.get(4).and_then(|m| m.as_str().parse::<i32>().ok())) {
        (Some(sign), Some(value)) if sign.as_str() == "-" => -value,
        (Some(_), Some(value)) => value,
        _ => 0,
    };
    DamageExpression { dice_count, dice_faces, modifier }
}

/// Roll the profile's damage. A critical doubles the number of dice; the flat
/// modifier is added once either way.
pub fn roll_damage(
    dice: &mut Dice,
    profile: &AttackProfile,
    is_critical: bool,
) -> DamageRollResult {
    let expr = parse_damage_expression(&profile.damage_dice_expression);
    let count = expr.dice_count.saturating_mul(if is_critical { 2 } else { 1 });
    let rolls: Vec<u32> = (0..count).map(|_| dice.roll(expr.dice_faces)).collect();
    let dice_total = rolls.iter().fold(0u32, |acc, r| acc.saturating_add(*r));
    DamageRollResult {
        total: i32::try_from(dice_total).unwrap_or(i32::MAX).saturating_add(expr.modifier),
        rolls,
        modifier: expr.modifier,
        damage_type: profile.damage_type.clone(),
        is_critical,
    }
}

/// Roll one d20 attack under `mode` and always attach a damage roll.
pub fn roll_attack(dice: &mut Dice, profile: &AttackProfile, mode: AdMode) -> AttackRollResult {
    let draw = dice.d20_draw(mode);
    let is_critical = draw.kept == 20;
    let damage = roll_damage(dice, profile, is_critical);
    AttackRollResult {
        final_die: draw.kept,
        die_a: draw.die_a,
        die_b: draw.die_b,
        attack_bonus: profile.attack_bonus,
        total: draw.kept as i32 + profile.attack_bonus,
        is_critical,
        is_fumble: draw.kept == 1,
        damage,
    }
}
