//! Inventory system implementations
//!
//! # Systems
//!
//! **Slot ops:**
//! - `process_pick_item` — подбор в инвентарь (top-up + spill)
//! - `process_move_item` — перенос/обмен слотов
//! - `process_remove_item` — снятие количества
//!
//! **Item ops:**
//! - `process_use_item` — применение consumable
//! - `process_equip_item` — экипировка со swap-back
//! - `process_unequip_item` — снятие с fallback на drop
//! - `process_drop_item` — выброс на землю
//!
//! Ошибки — это события, не паники: UI слушает `InventoryError`
//! и играет фидбек, само состояние при отказе не трогается.

use bevy::prelude::*;

use crate::components::inventory::{AddOutcome, Inventory, InventoryKind, MoveOutcome};
use crate::inventory::events::*;
use crate::inventory::InventoryRegistry;
use crate::item_system::{ItemDefinition, ItemDefinitions};
use crate::logger::{log, log_error, log_warning};

// ============================================================================
// Pick
// ============================================================================

/// Подбор предмета в инвентарь
pub fn process_pick_item(
    mut intents: EventReader<PickItemIntent>,
    mut inventories: Query<&mut Inventory>,
    defs: Res<ItemDefinitions>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = inventories.get_mut(intent.inventory) else {
            log_error(&format!("Entity {:?} missing Inventory", intent.inventory));
            continue;
        };

        let Some(def) = defs.get(&intent.item_id) else {
            log_warning(&format!(
                "'{}': the item you want to add is unknown: {}",
                inventory.name, intent.item_id
            ));
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: 0,
                kind: InventoryErrorKind::InvalidArgument,
            });
            continue;
        };

        match inventory.add_item(def, intent.quantity) {
            AddOutcome::Added => {
                content_changed.write(ContentChanged {
                    inventory: intent.inventory,
                });
            }
            AddOutcome::Full => {
                errors.write(InventoryError {
                    inventory: intent.inventory,
                    index: 0,
                    kind: InventoryErrorKind::InventoryFull,
                });
            }
            AddOutcome::Rejected => {
                errors.write(InventoryError {
                    inventory: intent.inventory,
                    index: 0,
                    kind: InventoryErrorKind::InvalidArgument,
                });
            }
        }
    }
}

// ============================================================================
// Move
// ============================================================================

/// Перенос/обмен слотов внутри инвентаря
pub fn process_move_item(
    mut intents: EventReader<MoveItemIntent>,
    mut inventories: Query<&mut Inventory>,
    defs: Res<ItemDefinitions>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = inventories.get_mut(intent.inventory) else {
            continue;
        };

        let outcome = inventory.move_item(intent.start, intent.end, &defs);
        match outcome {
            MoveOutcome::Moved | MoveOutcome::Swapped => {
                content_changed.write(ContentChanged {
                    inventory: intent.inventory,
                });
            }
            MoveOutcome::EmptySource => {
                log_warning("you're trying to move an empty slot");
                errors.write(InventoryError {
                    inventory: intent.inventory,
                    index: intent.start,
                    kind: InventoryErrorKind::InvalidOperation,
                });
            }
            MoveOutcome::Blocked => {
                errors.write(InventoryError {
                    inventory: intent.inventory,
                    index: intent.end,
                    kind: InventoryErrorKind::SlotBlocked,
                });
            }
            MoveOutcome::OutOfBounds => {
                errors.write(InventoryError {
                    inventory: intent.inventory,
                    index: intent.start,
                    kind: InventoryErrorKind::InvalidOperation,
                });
            }
        }
    }
}

// ============================================================================
// Remove
// ============================================================================

/// Снятие количества из слота
pub fn process_remove_item(
    mut intents: EventReader<RemoveItemIntent>,
    mut inventories: Query<&mut Inventory>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = inventories.get_mut(intent.inventory) else {
            continue;
        };

        if inventory.remove_item(intent.index, intent.quantity) {
            content_changed.write(ContentChanged {
                inventory: intent.inventory,
            });
        } else {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind: InventoryErrorKind::InvalidOperation,
            });
        }
    }
}

// ============================================================================
// Use
// ============================================================================

/// Применение предмета
///
/// Не-usable предмет — тихий отказ без события: UI просто не реагирует
/// на клик по мечу в сетке.
pub fn process_use_item(
    mut intents: EventReader<UseItemIntent>,
    mut inventories: Query<&mut Inventory>,
    defs: Res<ItemDefinitions>,
    mut used: EventWriter<ItemUsed>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = inventories.get_mut(intent.inventory) else {
            continue;
        };

        let Some(stack) = inventory.slot(intent.index) else {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind: InventoryErrorKind::InvalidOperation,
            });
            continue;
        };

        let Some(def) = defs.get(&stack.item_id) else {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind: InventoryErrorKind::InvalidArgument,
            });
            continue;
        };
        if !def.usable {
            continue;
        }

        let item_id = def.id.clone();
        let effect = def.use_effect.clone();
        inventory.remove_item(intent.index, 1);

        used.write(ItemUsed {
            inventory: intent.inventory,
            index: intent.index,
            item_id,
            effect,
        });
        content_changed.write(ContentChanged {
            inventory: intent.inventory,
        });
    }
}

// ============================================================================
// Equip
// ============================================================================

/// Экипировка из Main-инвентаря в equipment-слот владельца
///
/// Все валидации до первой мутации: отказ никогда не оставляет
/// инвентарь в полусостоянии.
pub fn process_equip_item(
    mut intents: EventReader<EquipItemIntent>,
    mut inventories: Query<&mut Inventory>,
    registry: Res<InventoryRegistry>,
    defs: Res<ItemDefinitions>,
    mut equipped: EventWriter<ItemEquipped>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let fail = |errors: &mut EventWriter<InventoryError>, kind| {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind,
            });
        };

        // --- Валидации на read-only доступе ---
        let Ok(source) = inventories.get(intent.inventory) else {
            continue;
        };
        if source.kind != InventoryKind::Main {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        }
        let Some(stack) = source.slot(intent.index).cloned() else {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        };
        let Some(def) = defs.get(&stack.item_id).cloned() else {
            fail(&mut errors, InventoryErrorKind::InvalidArgument);
            continue;
        };
        if !def.equippable || !def.movable {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        }
        let target_entity = def
            .target_equipment
            .as_deref()
            .and_then(|name| source.owner.and_then(|owner| registry.resolve(owner, name)));
        let Some(target_entity) = target_entity else {
            log_warning(&format!(
                "'{}': target equipment inventory couldn't be found",
                def.name
            ));
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        };

        let Ok([mut source, mut target]) =
            inventories.get_many_mut([intent.inventory, target_entity])
        else {
            continue;
        };

        // --- Swap-back: занятый моно-слот выселяется в источник ---
        let mut evicted: Option<(crate::components::inventory::ItemStack, ItemDefinition)> = None;
        if target.capacity() == 1 {
            if let Some(old) = target.slot(0).cloned() {
                let Some(old_def) = defs.get(&old.item_id).cloned() else {
                    fail(&mut errors, InventoryErrorKind::InvalidArgument);
                    continue;
                };
                if !(def.swappable && old_def.movable && old_def.swappable) {
                    fail(&mut errors, InventoryErrorKind::SlotBlocked);
                    continue;
                }
                evicted = Some((old, old_def));
            }
            if stack.quantity > def.max_stack {
                fail(&mut errors, InventoryErrorKind::InventoryFull);
                continue;
            }
        } else if !target.can_accept(&def, stack.quantity) {
            fail(&mut errors, InventoryErrorKind::InventoryFull);
            continue;
        }

        // --- Мутации ---
        if evicted.is_some() {
            target.clear();
        }
        source.take_slot(intent.index);
        target.add_item(&def, stack.quantity);
        if let Some((old, old_def)) = evicted {
            source.add_item(&old_def, old.quantity);
        }

        log(&format!("✅ Equipped {} → '{}'", def.name, target.name));
        equipped.write(ItemEquipped {
            source: intent.inventory,
            equipment: target_entity,
            item_id: def.id.clone(),
            quantity: stack.quantity,
        });
        content_changed.write(ContentChanged {
            inventory: intent.inventory,
        });
        content_changed.write(ContentChanged {
            inventory: target_entity,
        });
    }
}

// ============================================================================
// Unequip
// ============================================================================

/// Снятие из Equipment-инвентаря обратно в target-инвентарь
///
/// Переполненный target не теряет предмет: владение уходит
/// ground-spawn collaborator'у событием `ItemDropped`.
pub fn process_unequip_item(
    mut intents: EventReader<UnequipItemIntent>,
    mut inventories: Query<&mut Inventory>,
    registry: Res<InventoryRegistry>,
    defs: Res<ItemDefinitions>,
    mut unequipped: EventWriter<ItemUnEquipped>,
    mut dropped: EventWriter<ItemDropped>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let fail = |errors: &mut EventWriter<InventoryError>, kind| {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind,
            });
        };

        let Ok(source) = inventories.get(intent.inventory) else {
            continue;
        };
        if source.kind != InventoryKind::Equipment {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        }
        let Some(stack) = source.slot(intent.index).cloned() else {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        };
        let Some(def) = defs.get(&stack.item_id).cloned() else {
            fail(&mut errors, InventoryErrorKind::InvalidArgument);
            continue;
        };
        let target_entity = def
            .target_inventory
            .as_deref()
            .and_then(|name| source.owner.and_then(|owner| registry.resolve(owner, name)));
        let Some(target_entity) = target_entity else {
            fail(&mut errors, InventoryErrorKind::InvalidOperation);
            continue;
        };

        let Ok([mut source, mut target]) =
            inventories.get_many_mut([intent.inventory, target_entity])
        else {
            continue;
        };

        if target.can_accept(&def, stack.quantity) {
            source.take_slot(intent.index);
            target.add_item(&def, stack.quantity);

            unequipped.write(ItemUnEquipped {
                equipment: intent.inventory,
                item_id: def.id.clone(),
                quantity: stack.quantity,
            });
            content_changed.write(ContentChanged {
                inventory: target_entity,
            });
        } else {
            // Target полон — предмет уезжает на землю
            let taken = source.take_slot(intent.index).unwrap_or(stack);
            log(&format!("🗑️ '{}' full, dropping {}", target.name, def.name));
            unequipped.write(ItemUnEquipped {
                equipment: intent.inventory,
                item_id: def.id.clone(),
                quantity: taken.quantity,
            });
            dropped.write(ItemDropped {
                inventory: intent.inventory,
                index: intent.index,
                stack: taken,
            });
        }
        content_changed.write(ContentChanged {
            inventory: intent.inventory,
        });
    }
}

// ============================================================================
// Drop
// ============================================================================

/// Выброс стека на землю
pub fn process_drop_item(
    mut intents: EventReader<DropItemIntent>,
    mut inventories: Query<&mut Inventory>,
    mut dropped: EventWriter<ItemDropped>,
    mut content_changed: EventWriter<ContentChanged>,
    mut errors: EventWriter<InventoryError>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = inventories.get_mut(intent.inventory) else {
            continue;
        };

        let Some(stack) = inventory.take_slot(intent.index) else {
            errors.write(InventoryError {
                inventory: intent.inventory,
                index: intent.index,
                kind: InventoryErrorKind::InvalidOperation,
            });
            continue;
        };

        dropped.write(ItemDropped {
            inventory: intent.inventory,
            index: intent.index,
            stack,
        });
        content_changed.write(ContentChanged {
            inventory: intent.inventory,
        });
    }
}
