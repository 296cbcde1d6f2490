//! Key-value storage for parsed creatures, keyed by `Creature::id`.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::statblock::StatblockParser;
use crate::Creature;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("creature '{0}' not found")]
    NotFound(String),
}

pub trait CreatureStore {
    /// Insert or replace by id.
    fn put(&mut self, creature: Creature);
    fn get(&self, id: &str) -> Result<Creature, StoreError>;
    fn get_all(&self) -> Vec<Creature>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// In-process store. `get_all` returns creatures in first-insertion order; a
/// replaced creature keeps its original slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    creatures: IndexMap<String, Creature>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Find by id, falling back to a case-insensitive name match.
    pub fn find(&self, key: &str) -> Option<&Creature> {
        self.creatures
            .get(key)
            .or_else(|| self.creatures.values().find(|c| c.name.eq_ignore_ascii_case(key.trim())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }
}

impl CreatureStore for MemoryStore {
    fn put(&mut self, creature: Creature) {
        self.creatures.insert(creature.id.clone(), creature);
    }

    fn get(&self, id: &str) -> Result<Creature, StoreError> {
        self.creatures.get(id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_all(&self) -> Vec<Creature> {
        self.creatures.values().cloned().collect()
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.creatures
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Parse `text` and put every creature into `store`. Returns how many were
/// parsed; re-importing the same creature replaces it.
pub fn import_markdown(
    store: &mut impl CreatureStore,
    parser: &StatblockParser,
    text: &str,
) -> usize {
    let creatures = parser.parse(text);
    let count = creatures.len();
    for creature in creatures {
        store.put(creature);
    }
    debug!(count, "imported creatures");
    count
}
