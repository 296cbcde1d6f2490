//! Attack resolution for parsed creatures: pulling attack formulas out of
//! action text, rolling single attacks, and simulating a volley from many
//! identical attackers.

use thiserror::Error;

mod attack;
mod challenge;
mod simulate;

pub use attack::{
    extract_attack_profiles, parse_damage_expression, roll_attack, roll_damage, AttackProfile,
    AttackRollResult, DamageExpression, DamageRollResult,
};
pub use challenge::{challenge_value, count_for_challenge_rating};
pub use simulate::{simulate_attacks, AttackReport, PerAttackerResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no attack available to roll")]
    NoAttack,
    #[error("at least one attacker is required")]
    NoAttackers,
}
