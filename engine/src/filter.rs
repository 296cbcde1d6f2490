//! Browse filters over a bestiary.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::combat::challenge_value;
use crate::Creature;

/// All set criteria must match. Text comparisons ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureFilter {
    pub name_contains: Option<String>,
    pub size: Option<String>,
    pub creature_type: Option<String>,
    pub environment: Option<String>,
    pub min_cr: Option<f64>,
    pub max_cr: Option<f64>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn field_equals(field: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => field.is_some_and(|f| f.eq_ignore_ascii_case(wanted.trim())),
    }
}

impl CreatureFilter {
    pub fn matches(&self, creature: &Creature) -> bool {
        if let Some(needle) = &self.name_contains {
            if !contains_ignore_case(&creature.name, needle) {
                return false;
            }
        }
        if !field_equals(creature.size.as_deref(), self.size.as_deref())
            || !field_equals(creature.creature_type.as_deref(), self.creature_type.as_deref())
        {
            return false;
        }
        if let Some(env) = &self.environment {
            if !creature.environment.as_deref().is_some_and(|e| contains_ignore_case(e, env)) {
                return false;
            }
        }
        if self.min_cr.is_some() || self.max_cr.is_some() {
            let Some(cr) = creature.cr.as_deref().and_then(challenge_value) else {
                return false;
            };
            if self.min_cr.is_some_and(|min| cr < min) || self.max_cr.is_some_and(|max| cr > max) {
                return false;
            }
        }
        true
    }

    /// Matching creatures, in input order.
    pub fn apply<'a>(
        &self,
        creatures: impl IntoIterator<Item = &'a Creature>,
    ) -> Vec<&'a Creature> {
        creatures.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Ascending CR (unreadable ratings last), then name.
pub fn sort_by_cr_then_name(creatures: &mut [&Creature]) {
    creatures.sort_by(|a, b| {
        let ca = a.cr.as_deref().and_then(challenge_value);
        let cb = b.cr.as_deref().and_then(challenge_value);
        let by_cr = match (ca, cb) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_cr.then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beast(name: &str, cr: Option<&str>, size: &str) -> Creature {
        let mut c = Creature::new(name);
        c.cr = cr.map(str::to_string);
        c.size = Some(size.to_string());
        c.creature_type = Some("beast".to_string());
        c.environment = Some("Forest, Hill".to_string());
        c
    }

    #[test]
    fn filters_by_cr_range_and_size() {
        let all = vec![
            beast("Wolf", Some("1/4"), "Medium"),
            beast("Brown Bear", Some("1"), "Large"),
            beast("Mystery", None, "Medium"),
        ];
        let filter = CreatureFilter { max_cr: Some(0.5), ..Default::default() };
        let names: Vec<_> = filter.apply(&all).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Wolf"]);

        let filter = CreatureFilter { size: Some("medium".into()), ..Default::default() };
        assert_eq!(filter.apply(&all).len(), 2);
    }

    #[test]
    fn filters_by_text() {
        let wolf = beast("Dire Wolf", Some("1"), "Large");
        let by_name = CreatureFilter { name_contains: Some("WOLF".into()), ..Default::default() };
        assert!(by_name.matches(&wolf));
        let by_env = CreatureFilter { environment: Some("desert".into()), ..Default::default() };
        assert!(!by_env.matches(&wolf));
        let by_type = CreatureFilter { creature_type: Some("Beast".into()), ..Default::default() };
        assert!(by_type.matches(&wolf));
    }

    #[test]
    fn sorts_unknown_cr_last() {
        let all = vec![
            beast("Mystery", None, "Medium"),
            beast("Brown Bear", Some("1"), "Large"),
            beast("Wolf", Some("1/4"), "Medium"),
            beast("Cat", Some("0"), "Tiny"),
        ];
        let mut refs: Vec<&Creature> = all.iter().collect();
        sort_by_cr_then_name(&mut refs);
        let names: Vec<_> = refs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Wolf", "Brown Bear", "Mystery"]);
    }
}
