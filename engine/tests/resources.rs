use std::sync::Arc;

use proptest::prelude::*;
use sheet_engine::{Character, Dice, NewCharacter, Pool, ResourcePool, Rules, Stat};

fn caster() -> Character {
    // int 16, dex 10, str 6
    Character::create(
        NewCharacter::new("Mira", Stat::Int, Stat::Dex),
        Arc::new(Rules::default()),
        &mut Dice::average(),
    )
    .unwrap()
}

#[test]
fn baseline_pools_follow_stats() {
    let c = caster();
    assert_eq!(c.resources().sorcery, ResourcePool { current: 3, max: 3 });
    assert_eq!(c.resources().finesse, ResourcePool { current: 0, max: 0 });
    assert_eq!(c.resources().combat_maneuver, ResourcePool { current: 0, max: 0 });

    let rogue = Character::create(
        NewCharacter::new("Nib", Stat::Dex, Stat::Str),
        Arc::new(Rules::default()),
        &mut Dice::average(),
    )
    .unwrap();
    assert_eq!(rogue.resources().finesse, ResourcePool { current: 1, max: 1 });
    assert_eq!(rogue.resources().sorcery.max, 0);

    let fighter = Character::create(
        NewCharacter::new("Brom", Stat::Str, Stat::Int),
        Arc::new(Rules::default()),
        &mut Dice::average(),
    )
    .unwrap();
    assert_eq!(fighter.resources().combat_maneuver, ResourcePool { current: 1, max: 1 });
    assert_eq!(fighter.resources().sorcery.max, 0);
}

#[test]
fn spending_an_empty_pool_changes_nothing() {
    let mut c = caster();
    assert!(!c.spend(Pool::Finesse));
    assert_eq!(c.resources().finesse, ResourcePool { current: 0, max: 0 });

    assert!(c.spend(Pool::Sorcery));
    assert!(c.spend(Pool::Sorcery));
    assert!(c.spend(Pool::Sorcery));
    let before = *c.resources();
    assert!(!c.spend(Pool::Sorcery));
    assert_eq!(*c.resources(), before);
}

#[test]
fn short_rest_restores_half_rounded_up() {
    let mut c = caster();
    for _ in 0..3 {
        c.spend(Pool::Sorcery);
    }
    c.short_rest();
    assert_eq!(c.resources().sorcery.current, 2);
    c.short_rest();
    assert_eq!(c.resources().sorcery.current, 3);
}

#[test]
fn long_rest_fills_every_pool() {
    let mut c = caster();
    c.spend(Pool::Sorcery);
    c.spend(Pool::Sorcery);
    c.long_rest();
    for pool in Pool::ALL {
        let p = c.resources().pool(pool);
        assert_eq!(p.current, p.max);
    }
}

#[test]
fn pool_names_parse() {
    assert_eq!("combat-maneuver".parse::<Pool>().unwrap(), Pool::CombatManeuver);
    assert_eq!("Sorcery".parse::<Pool>().unwrap(), Pool::Sorcery);
    assert!("mana".parse::<Pool>().is_err());
}

#[derive(Clone, Debug)]
enum Op {
    Spend(Pool),
    ShortRest,
    LongRest,
    StartLevelUp,
    Allocate(Stat),
    LevelUp(Stat),
    Override(Stat, i32),
    ToggleOverrides(bool),
}

fn pool() -> impl Strategy<Value = Pool> {
    prop_oneof![
        Just(Pool::Sorcery),
        Just(Pool::Finesse),
        Just(Pool::CombatManeuver)
    ]
}

fn stat() -> impl Strategy<Value = Stat> {
    prop_oneof![Just(Stat::Str), Just(Stat::Dex), Just(Stat::Int)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        pool().prop_map(Op::Spend),
        Just(Op::ShortRest),
        Just(Op::LongRest),
        Just(Op::StartLevelUp),
        stat().prop_map(Op::Allocate),
        stat().prop_map(Op::LevelUp),
        (stat(), -20..20i32).prop_map(|(s, d)| Op::Override(s, d)),
        any::<bool>().prop_map(Op::ToggleOverrides),
    ]
}

proptest! {
    #[test]
    fn pools_never_exceed_max(
        high in stat(),
        ops in prop::collection::vec(op(), 0..60),
        seed in any::<u64>(),
    ) {
        let mid = Stat::ALL.into_iter().find(|s| *s != high).unwrap();
        let mut dice = Dice::from_seed(seed);
        let mut c = Character::create(
            NewCharacter::new("Prop", high, mid),
            Arc::new(Rules::default()),
            &mut dice,
        )
        .unwrap();
        let mut choices = 0;
        for op in ops {
            match op {
                Op::Spend(p) => { c.spend(p); }
                Op::ShortRest => c.short_rest(),
                Op::LongRest => c.long_rest(),
                Op::StartLevelUp => { c.start_level_up(&mut dice); }
                Op::Allocate(s) => { c.allocate_point(s); }
                Op::LevelUp(s) => { c.level_up(s, &mut dice); }
                Op::Override(s, d) => { c.set_stat_modifier(s, d); }
                Op::ToggleOverrides(on) => c.set_use_stat_overrides(on),
            }
            for p in Pool::ALL {
                let pool = c.resources().pool(p);
                prop_assert!(pool.current >= 0);
                prop_assert!(pool.current <= pool.max);
            }
            prop_assert!(c.level_up_choices().len() >= choices);
            choices = c.level_up_choices().len();
            prop_assert_eq!(c.hp_rolls().len(), c.level() as usize);
        }
    }
}
