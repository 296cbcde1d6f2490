use engine::api::describe_attacker;
use engine::{
    count_for_challenge_rating, simulate_attacks, AdMode, AttackProfile, CombatError, Dice,
    PerAttackerResult,
};

fn bite(bonus: i32, average: i32) -> AttackProfile {
    AttackProfile {
        name: "Bite.".into(),
        attack_bonus: bonus,
        damage_dice_expression: "2d4 + 2".into(),
        damage_average: average,
        damage_type: "piercing".into(),
    }
}

#[test]
fn cr_maps_to_summon_count() {
    assert_eq!(count_for_challenge_rating("1/4"), 8);
    assert_eq!(count_for_challenge_rating("1/2"), 4);
    assert_eq!(count_for_challenge_rating("1"), 2);
    assert_eq!(count_for_challenge_rating("2"), 1);
    assert_eq!(count_for_challenge_rating("3"), 1);
    assert_eq!(count_for_challenge_rating("1/8"), 8);
    assert_eq!(count_for_challenge_rating("n/a"), 1);
}

#[test]
fn total_equal_to_ac_hits() {
    let mut dice = Dice::from_scripted(vec![10]);
    let report = simulate_attacks(&mut dice, Some(&bite(5, 7)), 1, AdMode::Normal, 15).unwrap();
    let roll = &report.rolls[0];
    assert_eq!(roll.total, 15);
    assert!(roll.hit);
    assert_eq!(report.total_damage, 7);
}

#[test]
fn one_below_ac_misses() {
    let mut dice = Dice::from_scripted(vec![9]);
    let report = simulate_attacks(&mut dice, Some(&bite(5, 7)), 1, AdMode::Normal, 15).unwrap();
    assert_eq!(report.rolls[0].total, 14);
    assert!(!report.rolls[0].hit);
    assert_eq!((report.hits, report.misses, report.total_damage), (0, 1, 0));
}

#[test]
fn natural_twenty_always_hits_for_double_average() {
    let mut dice = Dice::from_scripted(vec![20]);
    let report = simulate_attacks(&mut dice, Some(&bite(5, 7)), 1, AdMode::Normal, 30).unwrap();
    assert!(report.rolls[0].hit);
    assert!(report.rolls[0].critical);
    assert_eq!(report.critical_hits, 1);
    assert_eq!(report.total_damage, 14);
}

#[test]
fn aggregates_over_many_attackers() {
    // attacker 1: 20 (crit), 2: 12 hit, 3: 3 miss, 4: 1 miss
    let mut dice = Dice::from_scripted(vec![20, 12, 3, 1]);
    let report = simulate_attacks(&mut dice, Some(&bite(4, 7)), 4, AdMode::Normal, 13).unwrap();
    assert_eq!(report.rolls.len(), 4);
    assert_eq!(report.hits, 2);
    assert_eq!(report.misses, 2);
    assert_eq!(report.critical_hits, 1);
    assert_eq!(report.total_damage, 21);
    let attackers: Vec<u32> = report.rolls.iter().map(|r| r.attacker).collect();
    assert_eq!(attackers, vec![1, 2, 3, 4]);
}

#[test]
fn advantage_keeps_the_higher_die() {
    let mut dice = Dice::from_scripted(vec![4, 15, 18, 2]);
    let report = simulate_attacks(&mut dice, Some(&bite(2, 5)), 2, AdMode::Advantage, 10).unwrap();
    assert_eq!(report.rolls[0].final_die, 15);
    assert_eq!(report.rolls[0].die_b, Some(15));
    assert_eq!(report.rolls[1].final_die, 18);

    let mut dice = Dice::from_scripted(vec![4, 15]);
    let report = simulate_attacks(&mut dice, Some(&bite(2, 5)), 1, AdMode::Disadvantage, 10).unwrap();
    assert_eq!(report.rolls[0].final_die, 4);
    assert!(!report.rolls[0].hit);
}

#[test]
fn hit_counts_always_add_up() {
    let mut dice = Dice::from_seed(2024);
    for n in [1, 2, 4, 8, 50] {
        let report = simulate_attacks(&mut dice, Some(&bite(4, 7)), n, AdMode::Normal, 13).unwrap();
        assert_eq!(report.hits + report.misses, n);
        assert!(report.critical_hits <= report.hits);
        assert_eq!(report.total_damage, 7 * (report.hits + report.critical_hits) as i32);
    }
}

#[test]
fn missing_profile_is_an_error() {
    let mut dice = Dice::from_seed(1);
    assert_eq!(
        simulate_attacks(&mut dice, None, 3, AdMode::Normal, 12),
        Err(CombatError::NoAttack)
    );
    assert_eq!(
        simulate_attacks(&mut dice, Some(&bite(1, 1)), 0, AdMode::Normal, 12),
        Err(CombatError::NoAttackers)
    );
}

#[test]
fn attacker_log_line() {
    let roll = PerAttackerResult {
        attacker: 1,
        die_a: 12,
        die_b: Some(5),
        final_die: 12,
        total: 16,
        hit: true,
        critical: false,
        damage: 7,
    };
    insta::assert_snapshot!(
        describe_attacker("Wolf 1", &roll, 13),
        @"[ATTACK][Wolf 1] d20=12 vs d20=5 (keep=12) → HIT to-hit=16 vs AC=13 ✔ dmg=7"
    );
}

#[test]
fn dice_modes_and_bounds() {
    let mut dice = Dice::from_seed(123);
    for _ in 0..200 {
        let draw = dice.d20_draw(AdMode::Advantage);
        let b = draw.die_b.unwrap();
        assert_eq!(draw.kept, draw.die_a.max(b));
        assert!((1..=20).contains(&draw.kept));
        assert!((1..=12).contains(&dice.roll(12)));
    }
    assert_eq!(engine::ability_mod(9), -1);
    assert_eq!(engine::ability_mod(12), 1);
}

#[test]
fn seeded_dice_are_reproducible() {
    let mut a = Dice::from_seed(99);
    let mut b = Dice::from_seed(99);
    let ra: Vec<u32> = (0..20).map(|_| a.d20(AdMode::Normal)).collect();
    let rb: Vec<u32> = (0..20).map(|_| b.d20(AdMode::Normal)).collect();
    assert_eq!(ra, rb);
}

#[test]
fn huge_average_damage_saturates() {
    let mut dice = Dice::from_scripted(vec![20]);
    let report = simulate_attacks(&mut dice, Some(&bite(0, 2_000_000_000)), 3, AdMode::Normal, 10).unwrap();
    assert_eq!(report.critical_hits, 3);
    assert!(report.rolls.iter().all(|r| r.damage == i32::MAX));
    assert_eq!(report.total_damage, i32::MAX);
}
