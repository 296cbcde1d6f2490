use std::collections::HashMap;

pub fn builtin_bestiaries() -> HashMap<&'static str, &'static str> {
    HashMap::from([("beasts", include_str!("../content/beasts.md"))])
}

pub fn builtin_bestiary(id: &str) -> Option<&'static str> {
    builtin_bestiaries().get(id).copied()
}
