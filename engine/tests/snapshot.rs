use std::sync::Arc;

use serde_json::{json, Value};
use sheet_engine::{
    Character, Dice, NewCharacter, NewItem, Pool, Rules, SheetError, Stat, WeaponKind,
};

fn rules() -> Arc<Rules> {
    Arc::new(Rules::default())
}

fn seasoned() -> Character {
    let mut dice = Dice::average();
    let mut c = Character::create(
        NewCharacter::new("Brannoc", Stat::Str, Stat::Dex).with_race("dwarf", vec![]),
        rules(),
        &mut dice,
    )
    .unwrap();
    let axe = c
        .add_item(NewItem::weapon("Axe", WeaponKind::OneHand).with_enchantment(1))
        .unwrap();
    c.add_item(NewItem::shield("Shield")).unwrap();
    c.equip(axe).unwrap();
    c.level_up(Stat::Dex, &mut dice);
    c.start_level_up(&mut dice);
    c.allocate_point(Stat::Int);
    c.set_stat_modifier(Stat::Int, 2);
    c.set_use_stat_overrides(true);
    c.spend(Pool::CombatManeuver);
    c
}

fn as_value(c: &Character) -> Value {
    serde_json::from_str(&c.to_json().unwrap()).unwrap()
}

fn corrupt(value: Value) -> String {
    match Character::from_json(&value.to_string(), rules()) {
        Err(SheetError::CorruptSnapshot(reason)) => reason,
        other => panic!("expected a corrupt snapshot, got {:?}", other),
    }
}

#[test]
fn round_trip_restores_every_field() {
    let original = seasoned();
    let restored = Character::from_json(&original.to_json().unwrap(), rules()).unwrap();
    assert_eq!(restored.snapshot(), original.snapshot());
    assert_eq!(restored.pending_level_up_points(), 1);
    assert_eq!(restored.level(), 3);
    assert_eq!(restored.effective_stat(Stat::Int), original.effective_stat(Stat::Int));
    assert_eq!(restored.armor_class(), original.armor_class());
}

#[test]
fn restored_character_keeps_playing() {
    let mut restored = Character::from_json(&seasoned().to_json().unwrap(), rules()).unwrap();
    assert!(restored.allocate_point(Stat::Int));
    assert_eq!(restored.pending_level_up_points(), 0);
    assert_eq!(restored.level_up_choices(), &[Stat::Dex, Stat::Dex, Stat::Int, Stat::Int]);
}

#[test]
fn snapshot_json_uses_plain_field_names() {
    let value = as_value(&seasoned());
    assert_eq!(value["version"], json!(1));
    assert_eq!(value["race"], json!("dwarf"));
    assert_eq!(value["base_stats"]["str"], json!(18));
    assert_eq!(value["use_stat_overrides"], json!(true));
    assert_eq!(value["inventory"]["items"][0]["kind"]["weapon_type"], json!("one-hand"));
}

#[test]
fn level_and_hp_history_must_agree() {
    let mut value = as_value(&seasoned());
    value["level"] = json!(0);
    assert!(corrupt(value).contains("level"));

    let mut value = as_value(&seasoned());
    value["hp_rolls"] = json!([9.0]);
    assert!(corrupt(value).contains("hp rolls"));
}

#[test]
fn out_of_range_values_are_refused() {
    let mut value = as_value(&seasoned());
    value["base_stats"]["dex"] = json!(31);
    corrupt(value);

    let mut value = as_value(&seasoned());
    value["stat_modifiers"]["str"] = json!(i32::MAX);
    assert!(corrupt(value).contains("override"));

    let mut value = as_value(&seasoned());
    value["resources"]["finesse"]["current"] = json!(5);
    assert!(corrupt(value).contains("finesse"));

    let mut value = as_value(&seasoned());
    value["inventory"]["items"][0]["enchantment"] = json!(7);
    assert!(corrupt(value).contains("enchantment"));

    let mut value = as_value(&seasoned());
    value["version"] = json!(99);
    assert!(corrupt(value).contains("version"));
}

#[test]
fn shield_beside_two_hander_is_refused() {
    let mut value = as_value(&seasoned());
    value["inventory"]["items"][0]["kind"]["weapon_type"] = json!("two-hand");
    value["inventory"]["items"][1]["equipped"] = json!(true);
    value["inventory"]["items"][1]["slot"] = json!("shield");
    assert!(corrupt(value).contains("two-handed"));
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = Character::from_json("{ not json", rules()).unwrap_err();
    assert!(matches!(err, SheetError::Json(_)));
}
