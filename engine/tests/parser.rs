use engine::content::builtin_bestiary;
use engine::statblock::StatblockParser;
use engine::{parse, slugify, AbilityScore, Abilities, Encounter};
use proptest::prelude::*;

const TEST_WOLF: &str = "\
>## Test Wolf
>*Medium beast, unaligned*
>___
>- **Hit Points** 11 (2d8 + 2)
>### Actions
>***Bite.*** Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (2d4) piercing damage.
null
";

fn block(name: &str, body: &str) -> String {
    format!(">## {}\n>*Small beast, unaligned*\n{}\nnull\n\n", name, body)
}

#[test]
fn test_wolf_end_to_end() {
    let creatures = parse(TEST_WOLF);
    assert_eq!(creatures.len(), 1);
    let wolf = &creatures[0];
    assert_eq!(wolf.id, "test-wolf");
    assert_eq!(wolf.name, "Test Wolf");
    assert!(wolf.hit_points.as_deref().unwrap().starts_with("11 (2d8 + 2)"));
    assert_eq!(wolf.actions.len(), 1);
    let bite = &wolf.actions[0];
    assert_eq!(bite.name, "Bite.");
    assert_eq!(bite.attack_bonus.as_deref(), Some("4"));
    assert_eq!(bite.damage_average.as_deref(), Some("5"));
    assert_eq!(bite.damage_dice_expression.as_deref(), Some("2d4"));
    assert_eq!(bite.damage_type.as_deref(), Some("piercing"));

    let mut encounter = Encounter::new();
    let summoned = encounter.conjure(wolf, None);
    assert_eq!(summoned.len(), 1);
    assert_eq!(summoned[0].max_hp, 11);
    assert_eq!(summoned[0].current_hp, 11);
}

#[test]
fn blocks_come_back_in_source_order() {
    let text = [
        block("Alpha", ">- **Armor Class** 12"),
        block("Beta", &format!(">***Long.*** {}", "words ".repeat(200))),
        block("Gamma", ""),
    ]
    .concat();
    let names: Vec<_> = parse(&text).into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn missing_ability_table_defaults_to_ten() {
    let creature = &parse(&block("Blob", ">- **Speed** 10 ft."))[0];
    assert_eq!(creature.abilities, Abilities::default());
    for score in creature.abilities.as_array() {
        assert_eq!(score, AbilityScore::new(10, 0));
    }
}

#[test]
fn ability_table_reads_the_row_two_lines_down() {
    let text = block(
        "Hawk",
        ">|STR|DEX|CON|INT|WIS|CHA|\n>|:---:|:---:|:---:|:---:|:---:|:---:|\n>|5 (-3)|16 (+3)|8 (-1)|2 (-4)|14 (+2)|6 (-2)|",
    );
    let hawk = &parse(&text)[0];
    assert_eq!(hawk.abilities.str_, AbilityScore::new(5, -3));
    assert_eq!(hawk.abilities.dex, AbilityScore::new(16, 3));
    assert_eq!(hawk.abilities.wis, AbilityScore::new(14, 2));
}

#[test]
fn fields_subtitle_and_sections_are_routed() {
    let text = "\
>## Owlbear Cub
>*Medium monstrosity (young), unaligned*
>- **Armor Class** 13 (natural armor)
>- **Speed** 30 ft.
>- **Senses** darkvision 60 ft.
>- **Languages** —
>- **Damage Resistances** cold
>- **Damage Vulnerabilities** fire
>- **Damage Immunities** poison
>- **Condition Immunities** charmed
>- **Challenge** 1/2 (100 XP)
>***Keen Sight.*** Melee Weapon Attack: +9 to hit, but it is a trait.
>### Actions
>***Claw.*** Melee Weapon Attack: +5 to hit, reach 5 ft. Hit: 6 (1d8 + 2) slashing damage.
>### Reactions
>***Flinch.*** The cub recoils.
>### Legendary Actions
>***Screech.*** Ranged Weapon Attack: +3 to hit, range 60 ft. Hit: 4 (1d6 + 1) thunder damage.
null
";
    let cub = &parse(text)[0];
    assert_eq!(cub.size.as_deref(), Some("Medium"));
    assert_eq!(cub.creature_type.as_deref(), Some("monstrosity"));
    assert_eq!(cub.subtype.as_deref(), Some("young"));
    assert_eq!(cub.alignment.as_deref(), Some("unaligned"));
    assert_eq!(cub.environment.as_deref(), Some("Any"));
    assert_eq!(cub.armor_class.as_deref(), Some("13 (natural armor)"));
    assert_eq!(cub.damage_resistances.as_deref(), Some("cold"));
    assert_eq!(cub.damage_vulnerabilities.as_deref(), Some("fire"));
    assert_eq!(cub.damage_immunities.as_deref(), Some("poison"));
    assert_eq!(cub.condition_immunities.as_deref(), Some("charmed"));
    assert_eq!(cub.cr.as_deref(), Some("1/2"));
    assert_eq!(cub.xp.as_deref(), Some("100"));

    assert_eq!(cub.traits.len(), 1);
    assert_eq!(cub.traits[0].attack_bonus, None, "traits never carry attack fields");
    assert_eq!(cub.actions[0].damage_dice_expression.as_deref(), Some("1d8 + 2"));
    assert_eq!(cub.reactions.len(), 1);
    assert_eq!(cub.reactions[0].attack_bonus, None);
    assert_eq!(cub.legendary_actions[0].damage_type.as_deref(), Some("thunder"));
}

#[test]
fn description_follows_the_matching_heading() {
    let text = "\
>## Mole
>*Tiny beast, unaligned*
null

## Mole
Moles dig.

They are rarely seen.
___
Not part of it.
";
    let mole = &parse(text)[0];
    assert_eq!(mole.description.as_deref(), Some("Moles dig.\nThey are rarely seen."));
}

#[test]
fn description_needs_the_creatures_own_heading() {
    let text = ">## Mole\nnull\n## Badger\nBadgers are not moles.\n";
    assert_eq!(parse(text)[0].description, None);
}

#[test]
fn lines_after_a_block_ends_are_ignored() {
    let text = ">## Newt\nnull\n>- **Armor Class** 99\n";
    assert_eq!(parse(text)[0].armor_class, None);
}

#[test]
fn text_without_headers_yields_nothing() {
    assert!(parse("").is_empty());
    assert!(parse("# Just a title\nsome prose\nnull\n").is_empty());
    assert!(parse(">## \n>- **Speed** 5 ft.\n").is_empty());
}

#[test]
fn reparsing_is_idempotent() {
    let text = builtin_bestiary("beasts").unwrap();
    assert_eq!(parse(text), parse(text));
}

#[test]
fn custom_environment_is_applied() {
    let parser = StatblockParser::with_environment("Underdark");
    let creature = &parser.parse(TEST_WOLF)[0];
    assert_eq!(creature.environment.as_deref(), Some("Underdark"));
}

#[test]
fn builtin_bestiary_parses() {
    let creatures = parse(builtin_bestiary("beasts").unwrap());
    let ids: Vec<_> = creatures.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["cat", "wolf", "giant-spider", "brown-bear", "giant-elk"]);

    let wolf = &creatures[1];
    assert_eq!(wolf.cr.as_deref(), Some("1/4"));
    assert_eq!(wolf.abilities.dex, AbilityScore::new(15, 2));
    assert_eq!(wolf.traits.len(), 2);
    assert!(wolf.description.as_deref().unwrap().contains('\n'));

    let elk = &creatures[4];
    assert_eq!(elk.reactions.len(), 1);
    assert_eq!(elk.actions.len(), 2);
}

proptest! {
    #[test]
    fn slug_is_idempotent_and_clean(name in "\\PC{1,40}") {
        let once = slugify(&name);
        prop_assert_eq!(slugify(&once), once.clone());
        prop_assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!once.is_empty());
    }
}

#[test]
fn byte_order_mark_does_not_hide_the_first_block() {
    let text = format!("\u{FEFF}{}", TEST_WOLF);
    let creatures = parse(&text);
    assert_eq!(creatures.len(), 1);
    assert_eq!(creatures[0].id, "test-wolf");
}
