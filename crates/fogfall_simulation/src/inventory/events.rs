//! Inventory system events
//!
//! # Architecture
//!
//! **Intents (вход, от UI/хоста):**
//! - `PickItemIntent` → подобрать предмет в инвентарь
//! - `MoveItemIntent` → перенести/обменять слоты
//! - `RemoveItemIntent` → убрать количество из слота
//! - `UseItemIntent` → применить consumable
//! - `EquipItemIntent` / `UnequipItemIntent` → экипировка
//! - `DropItemIntent` → выбросить на землю
//! - `SaveGameIntent` / `LoadGameIntent` → persistence round-trip
//!
//! **Notifications (выход, для UI):**
//! - fire-and-forget, очередь дренируется раз в тик, доставка
//!   не-более-одного-раза на emit; подтверждений и backpressure нет

use bevy::prelude::*;

use crate::components::inventory::ItemStack;
use crate::item_system::{ItemId, UseEffect};

// ============================================================================
// Intent events
// ============================================================================

/// Подобрать `quantity` единиц предмета в инвентарь
///
/// # Flow
/// 1. Резолв definition по id (неизвестный id → `InventoryError`)
/// 2. Top-up существующих стеков, остаток в свободные слоты
/// 3. `ContentChanged` при любой успешной мутации
#[derive(Event, Clone, Debug)]
pub struct PickItemIntent {
    pub inventory: Entity,
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Перенести стек из слота `start` в слот `end`
#[derive(Event, Clone, Debug)]
pub struct MoveItemIntent {
    pub inventory: Entity,
    pub start: usize,
    pub end: usize,
}

/// Убрать `quantity` единиц из слота `index`
#[derive(Event, Clone, Debug)]
pub struct RemoveItemIntent {
    pub inventory: Entity,
    pub index: usize,
    pub quantity: u32,
}

/// Применить предмет из слота `index`
///
/// # Flow
/// 1. Пустой слот → `InventoryError`
/// 2. Не-usable предмет → тихий отказ (ни события, ни мутации)
/// 3. Иначе минус одна единица + `ItemUsed` с эффектом для хоста
#[derive(Event, Clone, Debug)]
pub struct UseItemIntent {
    pub inventory: Entity,
    pub index: usize,
}

/// Экипировать предмет из слота `index` Main-инвентаря
///
/// # Flow
/// 1. Валидации: Main-тип, слот занят, equippable, movable,
///    целевой equipment-инвентарь резолвится
/// 2. Занятый equipment-слот: swappable-предмет выселяется обратно
///    в источник (swap-back) до размещения нового
/// 3. `ItemEquipped` при успехе, `InventoryError` + ноль мутаций при отказе
#[derive(Event, Clone, Debug)]
pub struct EquipItemIntent {
    pub inventory: Entity,
    pub index: usize,
}

/// Снять предмет из слота `index` Equipment-инвентаря
///
/// Возврат в объявленный target-инвентарь; при переполнении предмет
/// уходит наружу событием `ItemDropped`, не теряется.
#[derive(Event, Clone, Debug)]
pub struct UnequipItemIntent {
    pub inventory: Entity,
    pub index: usize,
}

/// Выбросить стек из слота `index` на землю
#[derive(Event, Clone, Debug)]
pub struct DropItemIntent {
    pub inventory: Entity,
    pub index: usize,
}

/// Сохранить все persistent-инвентари в blob store
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct SaveGameIntent;

/// Загрузить все persistent-инвентари из blob store
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct LoadGameIntent;

// ============================================================================
// Notification events
// ============================================================================

/// Содержимое инвентаря изменилось (UI перерисовывает сетку)
#[derive(Event, Clone, Debug)]
pub struct ContentChanged {
    pub inventory: Entity,
}

/// Предмет применён; эффект исполняет внешний collaborator
#[derive(Event, Clone, Debug)]
pub struct ItemUsed {
    pub inventory: Entity,
    pub index: usize,
    pub item_id: ItemId,
    pub effect: Option<UseEffect>,
}

/// Предмет экипирован в equipment-инвентарь
#[derive(Event, Clone, Debug)]
pub struct ItemEquipped {
    pub source: Entity,
    pub equipment: Entity,
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Предмет снят из equipment-инвентаря
#[derive(Event, Clone, Debug)]
pub struct ItemUnEquipped {
    pub equipment: Entity,
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Причина отказа (для UI-фидбека: звук "инвентарь полон" и т.п.)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InventoryErrorKind {
    /// Неизвестный item id или нулевое количество
    InvalidArgument,
    /// Свободных слотов нет
    InventoryFull,
    /// Операция не применима (пустой слот, не тот тип инвентаря)
    InvalidOperation,
    /// Назначение занято и обмен запрещён
    SlotBlocked,
}

/// Операция отклонена; мутаций не было
#[derive(Event, Clone, Debug)]
pub struct InventoryError {
    pub inventory: Entity,
    pub index: usize,
    pub kind: InventoryErrorKind,
}

/// Стек передан ground-spawn collaborator'у (владение ушло наружу)
#[derive(Event, Clone, Debug)]
pub struct ItemDropped {
    pub inventory: Entity,
    pub index: usize,
    pub stack: ItemStack,
}
