//! Line- and text-level extraction rules used by the statblock scan.
//!
//! Each rule looks at one line (or one entry description) and returns `None`
//! when it does not apply, so the scan can try them in turn.

use std::sync::LazyLock;

use regex::Regex;

use super::{Abilities, AbilityScore};

pub const BLOCK_HEADER: &str = ">## ";
pub const END_OF_STATBLOCK: &str = "null";
const FIELD_OPEN: &str = ">- **";
const ENTRY_MARKER: &str = ">***";
const SECTION_MARKER: &str = ">###";
const ABILITY_HEADER: &str = "|STR|DEX|CON|INT|WIS|CHA|";

static ATTACK_BONUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d+) to hit").expect("valid regex"));
static HIT_DAMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Hit: (\d+) \(([^)]+)\) ([a-z]+) damage").expect("valid regex")
});
static SUBTITLE_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+([^(]+?)\s*(?:\(([^)]*)\))?\s*$").expect("valid regex")
});
static ABILITY_CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(?:\(\s*([+-]?)\s*(\d+)\s*\))?").expect("valid regex")
});
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));

/// Which collection `>***Name***` entries are currently appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Traits,
    Actions,
    Reactions,
    LegendaryActions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub size: String,
    pub creature_type: String,
    pub subtype: Option<String>,
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitDamage {
    pub average: String,
    pub dice: String,
    pub damage_type: String,
}

/// Lowercase the name and replace every character outside `[a-z0-9]` with `-`.
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

/// `>- **Armor Class** 13 (natural armor)` → `("Armor Class", "13 (natural armor)")`.
pub fn labelled_field(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(FIELD_OPEN)?;
    let (label, value) = rest.split_once("**")?;
    Some((label.trim(), value.trim()))
}

/// Splits `1/4 (50 XP)` into the rating and the experience value.
pub fn parse_challenge(value: &str) -> (String, Option<String>) {
    match value.split_once('(') {
        Some((cr, rest)) => {
            let xp = rest
                .split(')')
                .next()
                .unwrap_or_default()
                .trim()
                .trim_end_matches("XP")
                .trim();
            let xp = (!xp.is_empty()).then(|| xp.to_string());
            (cr.trim().to_string(), xp)
        }
        None => (value.trim().to_string(), None),
    }
}

/// `>*Medium humanoid (goblinoid), neutral evil*`
pub fn parse_subtitle(line: &str) -> Option<Subtitle> {
    let inner = line.strip_prefix('>')?.trim().trim_matches('*').trim();
    let (head, alignment) = match inner.split_once(',') {
        Some((head, alignment)) => (head, Some(alignment.trim())),
        None => (inner, None),
    };
    let caps = SUBTITLE_HEAD_RE.captures(head.trim())?;
    Some(Subtitle {
        size: caps[1].to_string(),
        creature_type: caps[2].trim().to_string(),
        subtype: caps.get(3).map(|m| m.as_str().trim().to_string()).filter(|s| !s.is_empty()),
        alignment: alignment.filter(|a| !a.is_empty()).map(str::to_string),
    })
}

pub fn is_ability_header(line: &str) -> bool {
    let compact: String = line
        .trim_start_matches('>')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    compact.to_ascii_uppercase().starts_with(ABILITY_HEADER)
}

/// `11 (+0)` → score 11, modifier 0. A cell without a readable modifier
/// derives one from the score; an unreadable cell is the 10 (+0) default.
pub fn parse_ability_cell(cell: &str) -> AbilityScore {
    let cell = cell.trim().replace('\u{2212}', "-");
    let Some(caps) = ABILITY_CELL_RE.captures(&cell) else {
        return AbilityScore::default();
    };
    let Ok(score) = caps[1].parse::<i32>() else {
        return AbilityScore::default();
    };
    match caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok()) {
        Some(magnitude) => {
            let sign = if caps.get(2).is_some_and(|s| s.as_str() == "-") { -1 } else { 1 };
            AbilityScore::new(score, sign * magnitude)
        }
        None => AbilityScore::from_score(score),
    }
}

/// Reads six pipe-delimited cells in STR, DEX, CON, INT, WIS, CHA order.
pub fn parse_ability_row(line: &str) -> Option<Abilities> {
    let cells: Vec<&str> = line
        .trim_start_matches('>')
        .trim()
        .trim_matches('|')
        .split('|')
        .collect();
    if cells.len() < 6 {
        return None;
    }
    let mut scores = [AbilityScore::default(); 6];
    for (slot, cell) in scores.iter_mut().zip(cells) {
        *slot = parse_ability_cell(cell);
    }
    Some(Abilities::from_array(scores))
}

/// `>***Bite.*** Melee Weapon Attack: ...` → `("Bite.", "Melee Weapon Attack: ...")`.
pub fn parse_named_entry(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(ENTRY_MARKER)?;
    let (name, description) = rest.split_once("***")?;
    Some((name.trim().to_string(), description.trim().to_string()))
}

pub fn section_header(line: &str) -> Option<Section> {
    let title = line.strip_prefix(SECTION_MARKER)?.trim();
    match title {
        "Actions" => Some(Section::Actions),
        "Reactions" => Some(Section::Reactions),
        "Legendary Actions" => Some(Section::LegendaryActions),
        _ => None,
    }
}

pub fn is_weapon_attack(description: &str) -> bool {
    description.contains("Melee Weapon Attack:") || description.contains("Ranged Weapon Attack:")
}

/// Digits of `+4 to hit`.
pub fn attack_bonus(description: &str) -> Option<String> {
    ATTACK_BONUS_RE.captures(description).map(|caps| caps[1].to_string())
}

/// `Hit: 5 (2d4) piercing damage`
pub fn hit_damage(description: &str) -> Option<HitDamage> {
    let caps = HIT_DAMAGE_RE.captures(description)?;
    Some(HitDamage {
        average: caps[1].to_string(),
        dice: caps[2].to_string(),
        damage_type: caps[3].to_string(),
    })
}

pub fn leading_integer(text: &str) -> Option<u32> {
    LEADING_INT_RE.captures(text).and_then(|caps| caps[1].parse().ok())
}
