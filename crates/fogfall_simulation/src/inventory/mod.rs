//! Inventory module — lifecycle management
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - UI/хост шлёт intent-события
//! - Systems обрабатывают intents (мутируют `Inventory` компоненты)
//! - Notification-события уходят обратно в UI (перерисовка, звуки)
//!
//! **Инвентари персонажа:**
//! - main (сетка N слотов) + по одному equipment-инвентарю ёмкости 1
//!   на слот экипировки (held, hat, top, bottom, ammunition)
//! - Каждый — отдельная ECS-сущность; `InventoryRegistry` резолвит
//!   (owner, имя слота) → Entity при equip/unequip
//!
//! **Persistence:**
//! - `SaveGameIntent`/`LoadGameIntent` гоняют persistent-инвентари
//!   через keyed blob store (см. `persistence`)

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::inventory::{Inventory, InventoryKind};
use crate::item_system::ItemDefinitions;
use crate::SimSet;

pub mod events;
pub mod persistence;
pub mod systems;

// Re-exports
pub use events::*;
pub use persistence::{
    apply_serialized, decode, encode, save_key, serialize_inventory, MemorySaveStore,
    PersistenceError, SaveSlots, SaveStore, SerializedInventory, SerializedSlot,
};
pub use systems::*;

/// Слоты экипировки персонажа (equipment-инвентари ёмкости 1)
pub const EQUIPMENT_SLOTS: [&str; 5] = ["held", "hat", "top", "bottom", "ammunition"];

/// Ёмкость main-инвентаря по умолчанию
pub const DEFAULT_MAIN_CAPACITY: usize = 12;

// ============================================================================
// InventoryRegistry
// ============================================================================

/// Индекс (owner, имя инвентаря) → ECS-сущность инвентаря
#[derive(Resource, Default)]
pub struct InventoryRegistry {
    by_owner: HashMap<(Entity, String), Entity>,
}

impl InventoryRegistry {
    pub fn register(&mut self, owner: Entity, name: &str, inventory: Entity) {
        self.by_owner.insert((owner, name.to_string()), inventory);
    }

    pub fn resolve(&self, owner: Entity, name: &str) -> Option<Entity> {
        self.by_owner.get(&(owner, name.to_string())).copied()
    }

    /// Снести все записи владельца (смерть персонажа)
    pub fn unregister_owner(&mut self, owner: Entity) {
        self.by_owner.retain(|(o, _), _| *o != owner);
    }
}

/// Создать полный набор инвентарей персонажа
///
/// `prefix` делает имена (и ключи сохранений) уникальными между
/// персонажами: "{prefix}.main", "{prefix}.held", ...
/// Возвращает сущность main-инвентаря.
pub fn spawn_character_inventories(
    commands: &mut Commands,
    registry: &mut InventoryRegistry,
    owner: Entity,
    prefix: &str,
    main_capacity: usize,
) -> Entity {
    let main = commands
        .spawn(
            Inventory::new(format!("{prefix}.main"), InventoryKind::Main, main_capacity)
                .with_owner(owner),
        )
        .id();
    registry.register(owner, "main", main);

    for slot in EQUIPMENT_SLOTS {
        let equipment = commands
            .spawn(Inventory::equipment(format!("{prefix}.{slot}")).with_owner(owner))
            .id();
        registry.register(owner, slot, equipment);
    }

    main
}

// ============================================================================
// Plugin
// ============================================================================

/// Inventory plugin (slot ops + equip lifecycle + persistence)
pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<InventoryRegistry>()
            .init_resource::<SaveSlots>()
            // Каталог предметов не перетираем, если хост уже вставил свой
            .add_event::<PickItemIntent>()
            .add_event::<MoveItemIntent>()
            .add_event::<RemoveItemIntent>()
            .add_event::<UseItemIntent>()
            .add_event::<EquipItemIntent>()
            .add_event::<UnequipItemIntent>()
            .add_event::<DropItemIntent>()
            .add_event::<SaveGameIntent>()
            .add_event::<LoadGameIntent>()
            .add_event::<ContentChanged>()
            .add_event::<ItemUsed>()
            .add_event::<ItemEquipped>()
            .add_event::<ItemUnEquipped>()
            .add_event::<InventoryError>()
            .add_event::<ItemDropped>()
            // Systems
            .add_systems(
                Update,
                (
                    persistence::load_inventories,
                    process_pick_item,
                    process_move_item,
                    process_remove_item,
                    process_use_item,
                    process_equip_item,
                    process_unequip_item,
                    process_drop_item,
                    persistence::save_inventories,
                )
                    .chain()
                    .in_set(SimSet::Inventory),
            );

        if !app.world().contains_resource::<ItemDefinitions>() {
            app.insert_resource(ItemDefinitions::default());
        }
    }
}
