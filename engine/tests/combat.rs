use std::sync::Arc;

use sheet_engine::{
    ArmorType, Character, Dice, ItemId, NewCharacter, NewItem, Pool, Rejection, Rules, Stat,
    WeaponKind,
};

fn create(high: Stat, mid: Stat) -> Character {
    Character::create(
        NewCharacter::new("Test", high, mid),
        Arc::new(Rules::default()),
        &mut Dice::average(),
    )
    .unwrap()
}

fn wield(c: &mut Character, name: &str, kind: WeaponKind) -> ItemId {
    let id = c.add_item(NewItem::weapon(name, kind)).unwrap();
    c.equip(id).unwrap();
    id
}

#[test]
fn average_main_hand_damage_with_longsword() {
    let mut c = create(Stat::Str, Stat::Dex);
    wield(&mut c, "Longsword", WeaponKind::OneHand);
    let mut dice = Dice::average();
    // d8 -> 4, str 16 -> +3, no enchantment
    assert_eq!(c.main_hand_damage_roll(&mut dice), Some(7.0));
    // d20 -> 10, +3, level 1
    assert_eq!(c.main_hand_attack_roll(&mut dice), Some(14.0));
}

#[test]
fn unarmored_ac_is_base_plus_dex() {
    let c = create(Stat::Dex, Stat::Str);
    assert_eq!(c.armor_class(), 16);
}

#[test]
fn ac_stacks_armor_shield_and_enchantments() {
    let mut c = create(Stat::Dex, Stat::Str);
    let leather = c
        .add_item(NewItem::armor("Leather", ArmorType::Light).with_enchantment(1))
        .unwrap();
    let shield = c.add_item(NewItem::shield("Buckler")).unwrap();
    c.equip(leather).unwrap();
    assert_eq!(c.armor_class(), 16 + 1 + 1);
    c.equip(shield).unwrap();
    assert_eq!(c.armor_class(), 16 + 1 + 1 + 2);
    c.set_enchantment(shield, -2).unwrap();
    assert_eq!(c.armor_class(), 16 + 1 + 1 + 2 - 2);
}

#[test]
fn equipment_dex_bonus_feeds_ac_once() {
    let mut c = create(Stat::Dex, Stat::Str);
    let gloves = c
        .add_item(NewItem::accessory("Gloves").with_stat_bonus(Stat::Dex, 2))
        .unwrap();
    c.equip(gloves).unwrap();
    // dex 18 -> +4
    assert_eq!(c.armor_class(), 17);
}

#[test]
fn off_hand_skips_level_and_stat_damage() {
    let mut c = create(Stat::Str, Stat::Dex);
    wield(&mut c, "Main", WeaponKind::OneHand);
    let off = wield(&mut c, "Off", WeaponKind::OneHand);
    c.set_enchantment(off, 1).unwrap();
    let mut dice = Dice::average();
    assert_eq!(c.off_hand_attack_roll(&mut dice), Some(10.0 + 3.0 + 1.0));
    assert_eq!(c.off_hand_damage_roll(&mut dice), Some(4.0 + 1.0));
}

#[test]
fn weapon_kind_picks_the_stat() {
    let mut dice = Dice::average();

    let mut mage = create(Stat::Int, Stat::Dex);
    wield(&mut mage, "Staff", WeaponKind::Staff);
    assert_eq!(mage.main_hand_damage_roll(&mut dice), Some(3.0 + 3.0));

    let mut archer = create(Stat::Dex, Stat::Int);
    wield(&mut archer, "Bow", WeaponKind::Ranged);
    assert_eq!(archer.main_hand_attack_roll(&mut dice), Some(10.0 + 3.0 + 1.0));

    let mut brute = create(Stat::Dex, Stat::Int);
    wield(&mut brute, "Club", WeaponKind::OneHand);
    // str 6 -> -2
    assert_eq!(brute.main_hand_damage_roll(&mut dice), Some(4.0 - 2.0));
}

#[test]
fn empty_hands_roll_nothing() {
    let c = create(Stat::Str, Stat::Dex);
    let mut dice = Dice::average();
    assert_eq!(c.main_hand_attack_roll(&mut dice), None);
    assert_eq!(c.off_hand_damage_roll(&mut dice), None);
}

#[test]
fn average_queries_are_repeatable_and_scripted_dice_are_used() {
    let mut c = create(Stat::Str, Stat::Dex);
    let sword = wield(&mut c, "Sword", WeaponKind::OneHand);
    c.set_enchantment(sword, 2).unwrap();
    let mut dice = Dice::average();
    let first = c.main_hand_attack_roll(&mut dice);
    assert_eq!(c.main_hand_attack_roll(&mut dice), first);

    let mut scripted = Dice::from_scripted(vec![15, 5]);
    assert_eq!(c.main_hand_attack_roll(&mut scripted), Some(15.0 + 3.0 + 1.0 + 2.0));
    assert_eq!(c.main_hand_damage_roll(&mut scripted), Some(5.0 + 3.0 + 2.0));
}

#[test]
fn hit_points_reflect_current_total() {
    let mut c = create(Stat::Str, Stat::Dex);
    let mut dice = Dice::average();
    assert_eq!(c.hit_points(), 9.0);
    c.level_up(Stat::Dex, &mut dice);
    assert_eq!(c.hit_points(), 18.0);
}

#[test]
fn sneak_attack_costs_a_point_and_assassination_is_free() {
    let mut c = create(Stat::Dex, Stat::Str);
    wield(&mut c, "Rapier", WeaponKind::Finesse);
    let mut dice = Dice::average();

    let hit = c.sneak_attack(&mut dice).unwrap().unwrap();
    assert_eq!(hit.extra_dice, 1);
    assert_eq!(hit.damage, 6.0 + 3.0);
    assert!(hit.spent_point);
    assert_eq!(c.resources().finesse.current, 0);

    let err = c.sneak_attack(&mut dice).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NoPointsLeft(Pool::Finesse)));

    let free = c.assassinate(&mut dice).unwrap().unwrap();
    assert_eq!((free.extra_dice, free.damage), (0, 6.0));

    c.long_rest();
    let free = c.assassinate(&mut dice).unwrap().unwrap();
    assert_eq!(free.extra_dice, 2);
    assert_eq!(free.damage, 6.0 + 6.0);
    assert!(!free.spent_point);
    assert_eq!(c.resources().finesse.current, 1);
}

#[test]
fn off_hand_sneak_uses_one_die_fewer() {
    let mut c = create(Stat::Dex, Stat::Str);
    let mut dice = Dice::average();
    c.level_up(Stat::Dex, &mut dice);
    c.level_up(Stat::Dex, &mut dice);
    assert_eq!(c.resources().finesse.current, 2);
    wield(&mut c, "Rapier", WeaponKind::Finesse);
    wield(&mut c, "Dagger", WeaponKind::Finesse);

    let off = c.off_hand_sneak_attack(&mut dice).unwrap().unwrap();
    assert_eq!(off.extra_dice, 1);
    assert_eq!(off.damage, 3.0 + 3.0);
    assert_eq!(c.resources().finesse.current, 1);

    // dex 20 -> +5
    let main = c.sneak_attack(&mut dice).unwrap().unwrap();
    assert_eq!(main.extra_dice, 1);
    assert_eq!(main.damage, 3.0 + 5.0 + 3.0);
    assert_eq!(c.resources().finesse.current, 0);
}

#[test]
fn sneak_without_weapon_spends_nothing() {
    let mut c = create(Stat::Dex, Stat::Str);
    let mut dice = Dice::average();
    assert_eq!(c.sneak_attack(&mut dice).unwrap(), None);
    assert_eq!(c.resources().finesse.current, 1);
}
