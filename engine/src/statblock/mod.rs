//! Creature statblocks parsed from homebrew-style markdown.
//!
//! A block opens with `>## Name`, carries `>- **Label** value` fields, an
//! ability table, `>***Entry.*** text` entries grouped under `>### Actions`
//! style headers and ends with a bare `null` line. An optional flavour section
//! headed `## Name` may follow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ability_mod;

mod parser;
pub mod rules;

pub use parser::{parse, StatblockParser, DEFAULT_ENVIRONMENT};
pub use rules::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub score: i32,
    pub modifier: i32,
}

impl AbilityScore {
    pub fn new(score: i32, modifier: i32) -> Self {
        Self { score, modifier }
    }

    pub fn from_score(score: i32) -> Self {
        Self { score, modifier: ability_mod(score) }
    }
}

impl Default for AbilityScore {
    fn default() -> Self {
        Self::from_score(10)
    }
}

impl fmt::Display for AbilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:+})", self.score, self.modifier)
    }
}

/// The six ability scores in table order. Missing scores read as 10 (+0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub str_: AbilityScore,
    pub dex: AbilityScore,
    pub con: AbilityScore,
    pub int_: AbilityScore,
    pub wis: AbilityScore,
    pub cha: AbilityScore,
}

impl Abilities {
    pub fn from_array([str_, dex, con, int_, wis, cha]: [AbilityScore; 6]) -> Self {
        Self { str_, dex, con, int_, wis, cha }
    }

    pub fn as_array(&self) -> [AbilityScore; 6] {
        [self.str_, self.dex, self.con, self.int_, self.wis, self.cha]
    }
}

/// A named trait, action, reaction or legendary action.
///
/// The attack fields keep the text exactly as written in the statblock; the
/// combat layer turns them into numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_bonus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_average: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dice_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), ..Self::default() }
    }
}

/// One parsed statblock. Only `id` and `name` are guaranteed; everything else
/// is whatever the source text happened to provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "type")]
    pub creature_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub alignment: Option<String>,
    #[serde(default)]
    pub armor_class: Option<String>,
    #[serde(default)]
    pub hit_points: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub abilities: Abilities,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub senses: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub damage_resistances: Option<String>,
    #[serde(default)]
    pub damage_vulnerabilities: Option<String>,
    #[serde(default)]
    pub damage_immunities: Option<String>,
    #[serde(default)]
    pub condition_immunities: Option<String>,
    #[serde(default)]
    pub cr: Option<String>,
    #[serde(default)]
    pub xp: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub traits: Vec<Entry>,
    #[serde(default)]
    pub actions: Vec<Entry>,
    #[serde(default)]
    pub reactions: Vec<Entry>,
    #[serde(default)]
    pub legendary_actions: Vec<Entry>,
}

impl Creature {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            size: None,
            creature_type: None,
            subtype: None,
            alignment: None,
            armor_class: None,
            hit_points: None,
            speed: None,
            abilities: Abilities::default(),
            skills: None,
            senses: None,
            languages: None,
            damage_resistances: None,
            damage_vulnerabilities: None,
            damage_immunities: None,
            condition_immunities: None,
            cr: None,
            xp: None,
            environment: None,
            description: None,
            traits: Vec::new(),
            actions: Vec::new(),
            reactions: Vec::new(),
            legendary_actions: Vec::new(),
        }
    }

    /// Leading integer of the hit point text, e.g. 11 for `"11 (2d8 + 2)"`.
    pub fn max_hp(&self) -> Option<u32> {
        self.hit_points.as_deref().and_then(rules::leading_integer)
    }
}
