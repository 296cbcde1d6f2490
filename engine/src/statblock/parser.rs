use tracing::{debug, warn};

use super::rules::{self, Section, BLOCK_HEADER, END_OF_STATBLOCK};
use super::{Creature, Entry};

/// Environment assigned to every creature whose subtitle line was read.
pub const DEFAULT_ENVIRONMENT: &str = "Any";

/// Where the scan is relative to the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first block header, or after a flavour section closed.
    Idle,
    /// Inside the `>` quoted statblock, routing entries to `Section`.
    Statblock(Section),
    /// Saw the `null` sentinel; waiting for `## Name` to open the flavour text.
    AwaitingDescription,
    /// Collecting flavour text until `___` or the next `## ` heading.
    Description,
}

#[derive(Debug, Clone)]
pub struct StatblockParser {
    default_environment: String,
}

impl Default for StatblockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatblockParser {
    pub fn new() -> Self {
        Self { default_environment: DEFAULT_ENVIRONMENT.to_string() }
    }

    pub fn with_environment(environment: impl Into<String>) -> Self {
        Self { default_environment: environment.into() }
    }

    /// Parse every block in `text`, in order of appearance. A leading byte
    /// order mark is ignored.
    pub fn parse(&self, text: &str) -> Vec<Creature> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let mut scan = Scan::new(&self.default_environment);
        let mut at = 0;
        while at < lines.len() {
            at += scan.step(&lines, at);
        }
        let creatures = scan.finish();
        debug!(count = creatures.len(), "parsed statblocks");
        creatures
    }
}

/// Parse with the default environment.
pub fn parse(text: &str) -> Vec<Creature> {
    StatblockParser::new().parse(text)
}

struct Scan<'a> {
    environment: &'a str,
    state: State,
    current: Option<Creature>,
    output: Vec<Creature>,
}

impl<'a> Scan<'a> {
    fn new(environment: &'a str) -> Self {
        Self { environment, state: State::Idle, current: None, output: Vec::new() }
    }

    /// Handle the line at `at` and return how many lines were consumed.
    fn step(&mut self, lines: &[&str], at: usize) -> usize {
        let line = lines[at];
        if let Some(name) = line.strip_prefix(BLOCK_HEADER) {
            self.open_block(name.trim());
            return 1;
        }
        match self.state {
            State::Idle => 1,
            State::Statblock(section) => self.statblock_line(section, lines, at),
            State::AwaitingDescription => {
                self.awaiting_description(line);
                1
            }
            State::Description => {
                self.description_line(line);
                1
            }
        }
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "statblock scan transition");
            self.state = next;
        }
    }

    fn open_block(&mut self, name: &str) {
        self.flush();
        if name.is_empty() {
            warn!("block header without a name; skipping block");
            self.transition(State::Idle);
            return;
        }
        self.current = Some(Creature::new(name));
        self.transition(State::Statblock(Section::Traits));
    }

    fn flush(&mut self) {
        if let Some(creature) = self.current.take() {
            debug!(id = %creature.id, actions = creature.actions.len(), "statblock complete");
            self.output.push(creature);
        }
    }

    fn statblock_line(&mut self, section: Section, lines: &[&str], at: usize) -> usize {
        let line = lines[at];
        if line.trim() == END_OF_STATBLOCK {
            self.transition(State::AwaitingDescription);
            return 1;
        }
        if let Some(next) = rules::section_header(line) {
            self.transition(State::Statblock(next));
            return 1;
        }
        let Some(creature) = self.current.as_mut() else {
            return 1;
        };

        if rules::is_ability_header(line) {
            // header, alignment divider, values
            match lines.get(at + 2).and_then(|row| rules::parse_ability_row(row)) {
                Some(abilities) => creature.abilities = abilities,
                None => warn!(id = %creature.id, "unreadable ability table; keeping defaults"),
            }
            return 3;
        }

        if let Some((name, description)) = rules::parse_named_entry(line) {
            let entry = build_entry(section, name, description);
            match section {
                Section::Traits => creature.traits.push(entry),
                Section::Actions => creature.actions.push(entry),
                Section::Reactions => creature.reactions.push(entry),
                Section::LegendaryActions => creature.legendary_actions.push(entry),
            }
            return 1;
        }

        if let Some((label, value)) = rules::labelled_field(line) {
            apply_field(creature, label, value);
            return 1;
        }

        if line.starts_with(">*") && creature.size.is_none() {
            if let Some(subtitle) = rules::parse_subtitle(line) {
                creature.size = Some(subtitle.size);
                creature.creature_type = Some(subtitle.creature_type);
                creature.subtype = subtitle.subtype;
                creature.alignment = subtitle.alignment;
                creature.environment = Some(self.environment.to_string());
            }
        }
        1
    }

    fn awaiting_description(&mut self, line: &str) {
        let Some(title) = line.strip_prefix("## ") else {
            return;
        };
        if self.current.as_ref().is_some_and(|c| c.name == title.trim()) {
            self.transition(State::Description);
        }
    }

    fn description_line(&mut self, line: &str) {
        if line.starts_with("___") || line.starts_with("## ") {
            self.transition(State::Idle);
            return;
        }
        let text = line.trim();
        if text.is_empty() {
            return;
        }
        if let Some(creature) = self.current.as_mut() {
            match creature.description.as_mut() {
                Some(description) => {
                    description.push('\n');
                    description.push_str(text);
                }
                None => creature.description = Some(text.to_string()),
            }
        }
    }

    fn finish(mut self) -> Vec<Creature> {
        self.flush();
        self.output
    }
}

fn build_entry(section: Section, name: String, description: String) -> Entry {
    let mut entry = Entry::new(name, description);
    if section != Section::Traits && rules::is_weapon_attack(&entry.description) {
        entry.attack_bonus = rules::attack_bonus(&entry.description);
        if let Some(hit) = rules::hit_damage(&entry.description) {
            entry.damage_average = Some(hit.average);
            entry.damage_dice_expression = Some(hit.dice);
            entry.damage_type = Some(hit.damage_type);
        }
    }
    entry
}

fn apply_field(creature: &mut Creature, label: &str, value: &str) {
    let value = value.to_string();
    match label {
        "Armor Class" => creature.armor_class = Some(value),
        "Hit Points" => creature.hit_points = Some(value),
        "Speed" => creature.speed = Some(value),
        "Skills" => creature.skills = Some(value),
        "Senses" => creature.senses = Some(value),
        "Languages" => creature.languages = Some(value),
        "Challenge" => {
            let (cr, xp) = rules::parse_challenge(&value);
            creature.cr = Some(cr);
            creature.xp = xp;
        }
        "Damage Resistances" => creature.damage_resistances = Some(value),
        "Damage Vulnerabilities" => creature.damage_vulnerabilities = Some(value),
        "Damage Immunities" => creature.damage_immunities = Some(value),
        "Condition Immunities" => creature.condition_immunities = Some(value),
        _ => {}
    }
}
