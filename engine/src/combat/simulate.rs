use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AttackProfile, CombatError};
use crate::{AdMode, Dice};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerAttackerResult {
    /// 1-based position in the volley.
    pub attacker: u32,
    pub die_a: u32,
    pub die_b: Option<u32>,
    pub final_die: u32,
    pub total: i32,
    pub hit: bool,
    pub critical: bool,
    pub damage: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attack: String,
    pub mode: AdMode,
    pub target_ac: i32,
    pub rolls: Vec<PerAttackerResult>,
    pub hits: u32,
    pub misses: u32,
    pub critical_hits: u32,
    pub total_damage: i32,
}

/// Every attacker makes one d20 roll against `target_ac`. A natural 20 always
/// hits. Hits deal the profile's average damage, doubled on a critical; no
/// damage dice are rolled on this path.
pub fn simulate_attacks(
    dice: &mut Dice,
    profile: Option<&AttackProfile>,
    num_attackers: u32,
    mode: AdMode,
    target_ac: i32,
) -> Result<AttackReport, CombatError> {
    let profile = profile.ok_or(CombatError::NoAttack)?;
    if num_attackers == 0 {
        return Err(CombatError::NoAttackers);
    }

    let mut report = AttackReport {
        attack: profile.name.clone(),
        mode,
        target_ac,
        rolls: Vec::with_capacity(num_attackers as usize),
        hits: 0,
        misses: 0,
        critical_hits: 0,
        total_damage: 0,
    };

    for attacker in 1..=num_attackers {
        let draw = dice.d20_draw(mode);
        let total = draw.kept as i32 + profile.attack_bonus;
        let critical = draw.kept == 20;
        let hit = critical || total >= target_ac;
        let damage = match (hit, critical) {
            (true, true) => profile.damage_average.saturating_mul(2),
            (true, false) => profile.damage_average,
            (false, _) => 0,
        };

        if hit {
            report.hits += 1;
        } else {
            report.misses += 1;
        }
        if critical {
            report.critical_hits += 1;
        }
        report.total_damage = report.total_damage.saturating_add(damage);
        report.rolls.push(PerAttackerResult {
            attacker,
            die_a: draw.die_a,
            die_b: draw.die_b,
            final_die: draw.kept,
            total,
            hit,
            critical,
            damage,
        });
    }

    info!(
        attack = %report.attack,
        attackers = num_attackers,
        hits = report.hits,
        crits = report.critical_hits,
        damage = report.total_damage,
        "volley simulated"
    );
    Ok(report)
}
