use std::sync::{Arc, Mutex};

use sheet_engine::{
    Character, Dice, ItemId, NewCharacter, NewItem, Pool, Rules, SheetEvent, Slot, Stat,
    WeaponKind,
};

fn create() -> Character {
    Character::create(
        NewCharacter::new("Watched", Stat::Str, Stat::Dex),
        Arc::new(Rules::default()),
        &mut Dice::average(),
    )
    .unwrap()
}

fn record(c: &mut Character) -> Arc<Mutex<Vec<SheetEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    c.subscribe(Box::new(move |event: &SheetEvent| {
        sink.lock().unwrap().push(event.clone());
    }));
    log
}

#[test]
fn inventory_changes_are_announced() {
    let mut c = create();
    let log = record(&mut c);
    let first = c.add_item(NewItem::weapon("Sword", WeaponKind::OneHand)).unwrap();
    let big = c.add_item(NewItem::weapon("Maul", WeaponKind::TwoHand)).unwrap();
    c.equip(first).unwrap();
    c.equip(big).unwrap();
    c.modify_enchantment(big, 2).unwrap();
    c.unequip(big).unwrap();
    c.remove_item(first).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            SheetEvent::ItemAdded(first),
            SheetEvent::ItemAdded(big),
            SheetEvent::Equipped { id: first, slot: Some(Slot::MainHand), evicted: vec![] },
            SheetEvent::Equipped { id: big, slot: Some(Slot::MainHand), evicted: vec![first] },
            SheetEvent::Enchanted { id: big, level: 2 },
            SheetEvent::Unequipped(big),
            SheetEvent::ItemRemoved(first),
        ]
    );
}

#[test]
fn rejected_operations_stay_silent() {
    let mut c = create();
    let log = record(&mut c);
    assert!(c.equip(ItemId(42)).is_err());
    assert!(c.add_item(NewItem::shield("Cursed").with_enchantment(-9)).is_err());
    assert!(!c.spend(Pool::Sorcery));
    assert!(!c.allocate_point(Stat::Dex));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn resource_and_override_events() {
    let mut c = create();
    let log = record(&mut c);
    assert!(c.spend(Pool::CombatManeuver));
    c.short_rest();
    c.long_rest();
    c.set_stat_modifier(Stat::Dex, 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            SheetEvent::Spent(Pool::CombatManeuver),
            SheetEvent::ShortRest,
            SheetEvent::LongRest,
            SheetEvent::StatOverridesChanged,
        ]
    );
}

#[test]
fn unsubscribed_listener_hears_nothing_more() {
    let mut c = create();
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let id = c.subscribe(Box::new(move |_: &SheetEvent| *sink.lock().unwrap() += 1));
    c.long_rest();
    assert!(c.unsubscribe(id));
    assert!(!c.unsubscribe(id));
    c.long_rest();
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn listeners_belong_to_one_character() {
    let mut watched = create();
    let mut other = create();
    let log = record(&mut watched);
    other.long_rest();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn reset_keeps_subscribers_and_wipes_the_sheet() {
    let mut c = create();
    let mut dice = Dice::average();
    c.add_item(NewItem::accessory("Ring")).unwrap();
    c.level_up(Stat::Str, &mut dice);
    let log = record(&mut c);

    c.reset(NewCharacter::new("Fresh", Stat::Int, Stat::Dex), &mut dice)
        .unwrap();
    assert_eq!(c.name(), "Fresh");
    assert_eq!(c.level(), 1);
    assert!(c.inventory().items().is_empty());
    assert_eq!(*log.lock().unwrap(), vec![SheetEvent::Reset]);

    c.long_rest();
    assert_eq!(log.lock().unwrap().len(), 2);
}
