//! Inventory flow integration test
//!
//! Полный жизненный цикл через intent-события на живом App:
//! pick → equip (со swap-back) → unequip (с fallback на drop) →
//! save/load round-trip.

use bevy::prelude::*;
use fogfall_simulation::inventory::spawn_character_inventories;
use fogfall_simulation::*;

/// Helper: App + персонаж с main-инвентарём заданной ёмкости
fn create_inventory_app(main_capacity: usize) -> (App, Entity, Entity) {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin);

    let owner = app.world_mut().spawn_empty().id();
    let main = app
        .world_mut()
        .resource_scope(|world, mut registry: Mut<InventoryRegistry>| {
            let mut commands = world.commands();
            spawn_character_inventories(&mut commands, &mut registry, owner, "p1", main_capacity)
        });
    // Flush отложенных spawn'ов
    app.update();
    (app, owner, main)
}

fn held_entity(app: &App, owner: Entity) -> Entity {
    app.world()
        .resource::<InventoryRegistry>()
        .resolve(owner, "held")
        .expect("held-инвентарь зарегистрирован при спавне")
}

fn slot_item(app: &App, inventory: Entity, index: usize) -> Option<ItemId> {
    app.world()
        .get::<Inventory>(inventory)
        .unwrap()
        .slot(index)
        .map(|stack| stack.item_id.clone())
}

fn pick(app: &mut App, inventory: Entity, item: &str, quantity: u32) {
    app.world_mut().send_event(PickItemIntent {
        inventory,
        item_id: item.into(),
        quantity,
    });
    app.update();
}

#[test]
fn test_pick_stacks_and_reports_content_changed() {
    let (mut app, _, main) = create_inventory_app(4);

    let mut cursor = app
        .world()
        .resource::<Events<ContentChanged>>()
        .get_cursor();

    pick(&mut app, main, "ration", 6);
    pick(&mut app, main, "ration", 6);

    let inventory = app.world().get::<Inventory>(main).unwrap();
    assert_eq!(inventory.slot(0).unwrap().quantity, 10);
    assert_eq!(inventory.slot(1).unwrap().quantity, 2);

    let events = app.world().resource::<Events<ContentChanged>>();
    assert_eq!(cursor.read(events).count(), 2);
}

#[test]
fn test_pick_into_full_inventory_emits_error() {
    let (mut app, _, main) = create_inventory_app(1);

    pick(&mut app, main, "spear", 1);

    let mut cursor = app
        .world()
        .resource::<Events<InventoryError>>()
        .get_cursor();
    pick(&mut app, main, "bow", 1);

    let events = app.world().resource::<Events<InventoryError>>();
    let errors: Vec<_> = cursor.read(events).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, InventoryErrorKind::InventoryFull);

    // Состояние не тронуто
    assert_eq!(slot_item(&app, main, 0), Some("spear".into()));
}

#[test]
fn test_equip_then_swap_back() {
    let (mut app, owner, main) = create_inventory_app(4);
    let held = held_entity(&app, owner);

    pick(&mut app, main, "spear", 1);
    pick(&mut app, main, "bow", 1);

    // Equip spear из слота 0
    app.world_mut().send_event(EquipItemIntent {
        inventory: main,
        index: 0,
    });
    app.update();

    assert_eq!(slot_item(&app, held, 0), Some("spear".into()));
    assert_eq!(slot_item(&app, main, 0), None);

    // Equip bow: spear выселяется обратно в main
    app.world_mut().send_event(EquipItemIntent {
        inventory: main,
        index: 1,
    });
    app.update();

    assert_eq!(slot_item(&app, held, 0), Some("bow".into()));
    assert_eq!(
        app.world()
            .get::<Inventory>(main)
            .unwrap()
            .quantity_of(&"spear".into()),
        1,
        "spear вернулся в main при swap-back"
    );
}

#[test]
fn test_equip_from_equipment_inventory_is_rejected() {
    let (mut app, owner, main) = create_inventory_app(4);
    let held = held_entity(&app, owner);

    pick(&mut app, main, "spear", 1);
    app.world_mut().send_event(EquipItemIntent {
        inventory: main,
        index: 0,
    });
    app.update();

    let mut cursor = app
        .world()
        .resource::<Events<InventoryError>>()
        .get_cursor();

    // Equip валиден только для Main-инвентарей
    app.world_mut().send_event(EquipItemIntent {
        inventory: held,
        index: 0,
    });
    app.update();

    let events = app.world().resource::<Events<InventoryError>>();
    let errors: Vec<_> = cursor.read(events).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, InventoryErrorKind::InvalidOperation);
    assert_eq!(slot_item(&app, held, 0), Some("spear".into()));
}

#[test]
fn test_unequip_into_full_main_drops_to_ground() {
    let (mut app, owner, main) = create_inventory_app(2);
    let held = held_entity(&app, owner);

    pick(&mut app, main, "spear", 1);
    app.world_mut().send_event(EquipItemIntent {
        inventory: main,
        index: 0,
    });
    app.update();

    // Забиваем main под завязку
    pick(&mut app, main, "ration", 10);
    pick(&mut app, main, "ancient_totem", 1);
    assert!(app.world().get::<Inventory>(main).unwrap().is_full());

    let mut cursor = app.world().resource::<Events<ItemDropped>>().get_cursor();

    app.world_mut().send_event(UnequipItemIntent {
        inventory: held,
        index: 0,
    });
    app.update();

    // Предмет не потерян: ушёл ground-spawn collaborator'у
    let events = app.world().resource::<Events<ItemDropped>>();
    let drops: Vec<_> = cursor.read(events).collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].stack.item_id, "spear".into());
    assert_eq!(slot_item(&app, held, 0), None);
}

#[test]
fn test_use_consumable_decrements_and_reports_effect() {
    let (mut app, _, main) = create_inventory_app(4);

    pick(&mut app, main, "poultice", 3);

    let mut cursor = app.world().resource::<Events<ItemUsed>>().get_cursor();
    app.world_mut().send_event(UseItemIntent {
        inventory: main,
        index: 0,
    });
    app.update();

    let events = app.world().resource::<Events<ItemUsed>>();
    let used: Vec<_> = cursor.read(events).collect();
    assert_eq!(used.len(), 1);
    assert_eq!(
        used[0].effect,
        Some(UseEffect::RestoreHealth { amount: 50 })
    );

    let inventory = app.world().get::<Inventory>(main).unwrap();
    assert_eq!(inventory.slot(0).unwrap().quantity, 2);
}

#[test]
fn test_use_non_usable_item_is_silent_noop() {
    let (mut app, _, main) = create_inventory_app(4);
    pick(&mut app, main, "spear", 1);

    let mut used_cursor = app.world().resource::<Events<ItemUsed>>().get_cursor();
    let mut error_cursor = app
        .world()
        .resource::<Events<InventoryError>>()
        .get_cursor();

    app.world_mut().send_event(UseItemIntent {
        inventory: main,
        index: 0,
    });
    app.update();

    assert_eq!(
        used_cursor
            .read(app.world().resource::<Events<ItemUsed>>())
            .count(),
        0
    );
    assert_eq!(
        error_cursor
            .read(app.world().resource::<Events<InventoryError>>())
            .count(),
        0
    );
    assert_eq!(slot_item(&app, main, 0), Some("spear".into()));
}

#[test]
fn test_save_load_roundtrip_restores_ids_and_quantities() {
    let (mut app, _, main) = create_inventory_app(4);

    pick(&mut app, main, "ration", 7);
    pick(&mut app, main, "spear", 1);

    app.world_mut().send_event(SaveGameIntent);
    app.update();

    // Портим состояние после сохранения
    app.world_mut().send_event(RemoveItemIntent {
        inventory: main,
        index: 0,
        quantity: 7,
    });
    app.world_mut().send_event(DropItemIntent {
        inventory: main,
        index: 1,
    });
    app.update();
    assert!(app.world().get::<Inventory>(main).unwrap().is_empty());

    app.world_mut().send_event(LoadGameIntent);
    app.update();

    let inventory = app.world().get::<Inventory>(main).unwrap();
    assert_eq!(inventory.slot(0).unwrap().item_id, "ration".into());
    assert_eq!(inventory.slot(0).unwrap().quantity, 7);
    assert_eq!(inventory.slot(1).unwrap().item_id, "spear".into());
    assert_eq!(inventory.slot(1).unwrap().quantity, 1);
}
