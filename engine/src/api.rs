use std::fs;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::combat::{simulate_attacks, AttackProfile, AttackReport, PerAttackerResult};
use crate::content::builtin_bestiary;
use crate::encounter::Encounter;
use crate::statblock::{Creature, StatblockParser};
use crate::store::{import_markdown, MemoryStore};
use crate::{AdMode, Dice};

const DEFAULT_BESTIARY: &str = "beasts";
const DEFAULT_TARGET_AC: i32 = 10;

fn default_target_ac() -> i32 {
    DEFAULT_TARGET_AC
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VolleyConfig {
    /// Markdown bestiary on disk; takes precedence over `bestiary_id`.
    #[serde(default)]
    pub bestiary_path: Option<String>,
    /// Built-in bestiary, `beasts` when neither source is given.
    #[serde(default)]
    pub bestiary_id: Option<String>,
    /// Creature id or name.
    pub creature: String,
    /// Attack name; the first attack when omitted.
    #[serde(default)]
    pub attack: Option<String>,
    /// Number summoned; derived from challenge rating when omitted.
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub mode: AdMode,
    #[serde(default = "default_target_ac")]
    pub target_ac: i32,
    /// Fixed RNG seed; OS entropy when omitted.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Environment given to parsed creatures; the parser default when omitted.
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VolleyResult {
    pub creature: String,
    pub summoned: u32,
    pub attack: AttackProfile,
    pub report: AttackReport,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VolleyStats {
    pub samples: u32,
    pub summoned: u32,
    pub mean_hits: f64,
    pub mean_damage: f64,
    pub min_damage: i32,
    pub max_damage: i32,
    pub volleys_with_crit: u32,
}

/// Parse a bestiary from `path`, or from the built-in `id` when no path is given.
pub fn load_bestiary(
    parser: &StatblockParser,
    path: Option<&str>,
    id: Option<&str>,
) -> Result<MemoryStore> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read bestiary markdown: {}", path))?,
        None => {
            let id = id.unwrap_or(DEFAULT_BESTIARY);
            builtin_bestiary(id)
                .ok_or_else(|| anyhow::anyhow!("no built-in bestiary '{}'", id))?
                .to_string()
        }
    };
    let mut store = MemoryStore::new();
    if import_markdown(&mut store, parser, &text) == 0 {
        bail!("no creatures found in bestiary");
    }
    Ok(store)
}

/// Pick an attack by case-insensitive name (trailing `.` ignored), or the first.
pub fn find_attack<'a>(
    profiles: &'a [AttackProfile],
    name: Option<&str>,
) -> Option<&'a AttackProfile> {
    match name {
        None => profiles.first(),
        Some(name) => {
            let wanted = name.trim().trim_end_matches('.');
            profiles
                .iter()
                .find(|p| p.name.trim_end_matches('.').eq_ignore_ascii_case(wanted))
        }
    }
}

/// Load the configured bestiary and pick out the configured creature.
pub fn load_creature(cfg: &VolleyConfig) -> Result<Creature> {
    let parser = match &cfg.environment {
        Some(environment) => StatblockParser::with_environment(environment.clone()),
        None => StatblockParser::new(),
    };
    let store = load_bestiary(&parser, cfg.bestiary_path.as_deref(), cfg.bestiary_id.as_deref())?;
    store
        .find(&cfg.creature)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("creature '{}' not found", cfg.creature))
}

/// Conjure the configured creature and have every copy attack once.
pub fn simulate_volley(cfg: VolleyConfig) -> Result<VolleyResult> {
    let creature = load_creature(&cfg)?;
    let mut dice = cfg.seed.map_or_else(Dice::from_entropy, Dice::from_seed);
    run_volley(&cfg, &creature, &mut dice)
}

/// Repeat the volley `samples` times on consecutive seeds and summarise.
pub fn simulate_volley_many(cfg: VolleyConfig, samples: u32) -> Result<VolleyStats> {
    if samples == 0 {
        bail!("samples must be at least 1");
    }
    let mut total_hits = 0u64;
    let mut total_damage = 0i64;
    let mut min_damage = i32::MAX;
    let mut max_damage = i32::MIN;
    let mut volleys_with_crit = 0u32;
    let mut summoned = 0u32;

    let creature = load_creature(&cfg)?;
    for i in 0..samples {
        let mut dice = cfg
            .seed
            .map_or_else(Dice::from_entropy, |seed| Dice::from_seed(seed.wrapping_add(i as u64)));
        let res = run_volley(&cfg, &creature, &mut dice)?;
        summoned = res.summoned;
        total_hits += res.report.hits as u64;
        total_damage += res.report.total_damage as i64;
        min_damage = min_damage.min(res.report.total_damage);
        max_damage = max_damage.max(res.report.total_damage);
        if res.report.critical_hits > 0 {
            volleys_with_crit += 1;
        }
    }

    Ok(VolleyStats {
        samples,
        summoned,
        mean_hits: total_hits as f64 / samples as f64,
        mean_damage: total_damage as f64 / samples as f64,
        min_damage,
        max_damage,
        volleys_with_crit,
    })
}

fn run_volley(cfg: &VolleyConfig, creature: &Creature, dice: &mut Dice) -> Result<VolleyResult> {
    let mut encounter = Encounter::new();
    let summoned = encounter.conjure(creature, cfg.count);
    let count = summoned.len() as u32;
    let profiles = summoned
        .first()
        .map(|s| s.attack_profiles.clone())
        .unwrap_or_default();
    if profiles.is_empty() {
        bail!("{} has no attacks", creature.name);
    }
    let attack = find_attack(&profiles, cfg.attack.as_deref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "attack '{}' not found on {}",
                cfg.attack.as_deref().unwrap_or_default(),
                creature.name
            )
        })?;

    let report = simulate_attacks(dice, Some(&attack), count, cfg.mode, cfg.target_ac)?;

    let mut log = Vec::with_capacity(report.rolls.len() + 2);
    log.push(format!(
        "[START] {}× {} use {} ({} to hit, {} {}) vs AC {} [{:?}]",
        count,
        creature.name,
        attack.name,
        format_modifier(attack.attack_bonus),
        attack.damage_average,
        if attack.damage_type.is_empty() { "damage" } else { attack.damage_type.as_str() },
        cfg.target_ac,
        cfg.mode
    ));
    for roll in &report.rolls {
        let name = format!("{} {}", creature.name, roll.attacker);
        log.push(describe_attacker(&name, roll, cfg.target_ac));
    }
    log.push(format!(
        "[END] hits={} misses={} crits={} damage={}",
        report.hits, report.misses, report.critical_hits, report.total_damage
    ));

    Ok(VolleyResult { creature: creature.id.clone(), summoned: count, attack, report, log })
}

fn format_d20_sequence(die_a: u32, die_b: Option<u32>, kept: u32) -> String {
    match die_b {
        None => format!("d20={} (keep={})", die_a, kept),
        Some(b) => format!("d20={} vs d20={} (keep={})", die_a, b, kept),
    }
}

pub fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.abs())
    }
}

/// One combat log line for a single attacker in a volley.
pub fn describe_attacker(name: &str, roll: &PerAttackerResult, target_ac: i32) -> String {
    let rolls = format_d20_sequence(roll.die_a, roll.die_b, roll.final_die);
    let outcome = if roll.critical {
        "CRIT!"
    } else if roll.hit {
        "HIT"
    } else if roll.final_die == 1 {
        "MISS (NAT1)"
    } else {
        "MISS"
    };
    let mark = if roll.hit { "✔" } else { "✖" };
    format!(
        "[ATTACK][{}] {} → {} to-hit={} vs AC={} {} dmg={}",
        name, rolls, outcome, roll.total, target_ac, mark, roll.damage
    )
}
