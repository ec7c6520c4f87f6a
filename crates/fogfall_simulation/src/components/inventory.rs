//! Слотовый инвентарь — state machine слота
//!
//! # Архитектура
//!
//! **Inventory** — компонент-контейнер фиксированной ёмкости:
//! - Каждый инвентарь это отдельная ECS-сущность (main + equipment-слоты
//!   персонажа), индекс по (owner, name) держит `InventoryRegistry`
//! - Слот: `Empty → Occupied(stack) → Empty`, переходы только через
//!   add/move/remove/take
//! - Equipment-инвентари обычно ёмкости 1 (один слот под held/hat/...)
//!
//! **ItemStack** — содержимое слота:
//! - item id + количество, инвариант `1 ≤ quantity ≤ max_stack`
//! - Принадлежит ровно одному инвентарю; перемещение всегда передаёт
//!   владение, никогда не разделяет его
//!
//! Методы здесь чистые (ни событий, ни логов): системы из `inventory::systems`
//! переводят исходы в уведомления для UI.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::item_system::{ItemDefinition, ItemDefinitions, ItemId};

// ============================================================================
// ItemStack
// ============================================================================

/// Содержимое занятого слота
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

// ============================================================================
// InventoryKind
// ============================================================================

/// Тип инвентаря
///
/// Main — обычный. Equipment — привязан к слоту экипировки,
/// equip идёт только из Main, unequip только из Equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryKind {
    Main,
    Equipment,
}

// ============================================================================
// Исходы операций
// ============================================================================

/// Исход `add_item`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// Хотя бы одна единица легла в инвентарь
    Added,
    /// Свободных слотов нет, состояние не изменилось
    Full,
    /// Нулевое количество — вызов отброшен без мутации
    Rejected,
}

impl AddOutcome {
    pub fn is_added(self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

/// Исход `move_item`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Перенос в пустой слот
    Moved,
    /// Обмен двух swappable-предметов
    Swapped,
    /// Источник пуст
    EmptySource,
    /// Назначение занято и обмен не разрешён
    Blocked,
    /// Индекс вне ёмкости
    OutOfBounds,
}

impl MoveOutcome {
    pub fn is_mutation(self) -> bool {
        matches!(self, MoveOutcome::Moved | MoveOutcome::Swapped)
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// Inventory component (контейнер слотов)
#[derive(Component, Debug)]
pub struct Inventory {
    /// Имя инвентаря ("main", "held", "hat", ...)
    pub name: String,
    pub kind: InventoryKind,
    /// Персонаж-владелец (для резолва equipment-инвентарей того же владельца)
    pub owner: Option<Entity>,
    /// Участвует ли в save/load
    pub persistent: bool,
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Создать пустой инвентарь заданной ёмкости
    pub fn new(name: impl Into<String>, kind: InventoryKind, capacity: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: None,
            persistent: true,
            slots: vec![None; capacity],
        }
    }

    /// Equipment-инвентарь ёмкости 1
    pub fn equipment(name: impl Into<String>) -> Self {
        Self::new(name, InventoryKind::Equipment, 1)
    }

    pub fn with_owner(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    // ------------------------------------------------------------------
    // Доступ к слотам
    // ------------------------------------------------------------------

    /// Ёмкость фиксирована после конструирования (меняется только `resize`)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Получить стек в слоте (immutable)
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)?.as_ref()
    }

    /// Установить стек в слот (вне ёмкости — no-op)
    pub fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = stack;
        }
    }

    /// Take стек из слота (ownership transfer)
    pub fn take_slot(&mut self, index: usize) -> Option<ItemStack> {
        self.slots.get_mut(index)?.take()
    }

    /// Итератор по всем слотам в порядке индексов
    pub fn slots(&self) -> impl Iterator<Item = Option<&ItemStack>> {
        self.slots.iter().map(|s| s.as_ref())
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity() - self.filled_slots()
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.filled_slots() == 0
    }

    /// Первый свободный слот
    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    /// Индексы слотов с данным item id
    pub fn slots_with(&self, item_id: &ItemId) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().is_some_and(|stack| stack.item_id == *item_id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Суммарное количество единиц данного item id
    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.slots_with(item_id)
            .iter()
            .filter_map(|&i| self.slot(i))
            .map(|s| s.quantity)
            .sum()
    }

    /// Хватит ли места под `quantity` единиц `def` (свободные слоты
    /// плюс недобор в существующих стеках того же id)
    pub fn can_accept(&self, def: &ItemDefinition, quantity: u32) -> bool {
        let mut room = self.free_slots() as u32 * def.max_stack;
        if def.is_stackable() {
            for index in self.slots_with(&def.id) {
                if let Some(stack) = self.slot(index) {
                    room += def.max_stack.saturating_sub(stack.quantity);
                }
            }
        }
        room >= quantity
    }

    /// Опустошить все слоты, ёмкость не меняется
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Явное изменение ёмкости; лишние хвостовые слоты отбрасываются
    pub fn resize(&mut self, new_capacity: usize) {
        self.slots.resize(new_capacity, None);
    }

    // ------------------------------------------------------------------
    // Операции
    // ------------------------------------------------------------------

    /// Добавить `quantity` единиц предмета `def`
    ///
    /// Сначала досыпаем в существующие неполные стеки того же id (если
    /// предмет стекается), остаток раскладываем кусками по `max_stack`
    /// в свободные слоты начиная с первого. Если слоты кончились до того,
    /// как легла хоть одна единица — `Full` без мутации.
    pub fn add_item(&mut self, def: &ItemDefinition, quantity: u32) -> AddOutcome {
        if quantity == 0 {
            return AddOutcome::Rejected;
        }

        let mut remaining = quantity;
        let mut added = false;

        // Top-up существующих стеков
        if def.is_stackable() {
            for index in self.slots_with(&def.id) {
                if remaining == 0 {
                    break;
                }
                let Some(stack) = self.slots[index].as_mut() else {
                    continue;
                };
                if stack.quantity >= def.max_stack {
                    continue;
                }
                let room = def.max_stack - stack.quantity;
                let take = room.min(remaining);
                stack.quantity += take;
                remaining -= take;
                added = true;
            }
        }

        // Остаток — новыми стеками в свободные слоты
        while remaining > 0 {
            let Some(index) = self.first_free_slot() else {
                break;
            };
            let take = remaining.min(def.max_stack);
            self.slots[index] = Some(ItemStack::new(def.id.clone(), take));
            remaining -= take;
            added = true;
        }

        if added {
            AddOutcome::Added
        } else {
            AddOutcome::Full
        }
    }

    /// Перенести стек из `start` в `end`
    ///
    /// Пустое назначение — перенос; занятое — обмен, только если оба
    /// предмета swappable. Иначе ничего не двигается.
    pub fn move_item(
        &mut self,
        start: usize,
        end: usize,
        defs: &ItemDefinitions,
    ) -> MoveOutcome {
        if start >= self.capacity() || end >= self.capacity() {
            return MoveOutcome::OutOfBounds;
        }
        if self.slots[start].is_none() {
            return MoveOutcome::EmptySource;
        }
        if start == end {
            return MoveOutcome::Blocked;
        }

        if self.slots[end].is_none() {
            self.slots[end] = self.slots[start].take();
            return MoveOutcome::Moved;
        }

        let swappable = |index: usize| {
            self.slots[index]
                .as_ref()
                .and_then(|stack| defs.get(&stack.item_id))
                .is_some_and(|def| def.swappable)
        };
        if swappable(start) && swappable(end) {
            self.slots.swap(start, end);
            MoveOutcome::Swapped
        } else {
            MoveOutcome::Blocked
        }
    }

    /// Убрать `quantity` единиц из слота `index`
    ///
    /// Стек, ушедший в ноль, освобождает слот. Пустой слот или индекс
    /// вне ёмкости — no-op failure.
    pub fn remove_item(&mut self, index: usize, quantity: u32) -> bool {
        let Some(Some(stack)) = self.slots.get_mut(index) else {
            return false;
        };
        stack.quantity = stack.quantity.saturating_sub(quantity);
        if stack.quantity == 0 {
            self.slots[index] = None;
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_system::ItemDefinitions;

    fn defs() -> ItemDefinitions {
        ItemDefinitions::default()
    }

    #[test]
    fn test_add_then_remove_restores_empty_state() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 4);

        assert_eq!(inv.add_item(ration, ration.max_stack), AddOutcome::Added);
        assert_eq!(inv.filled_slots(), 1);
        assert_eq!(inv.slot(0).unwrap().quantity, ration.max_stack);

        assert!(inv.remove_item(0, ration.max_stack));
        assert!(inv.is_empty());
        assert!(inv.slot(0).is_none());
    }

    #[test]
    fn test_add_tops_up_existing_stack_before_new_slot() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap(); // max_stack 10
        let mut inv = Inventory::new("main", InventoryKind::Main, 4);

        inv.add_item(ration, 6);
        inv.add_item(ration, 6);

        // 6 + 4 досыпано в слот 0, остаток 2 новым стеком
        assert_eq!(inv.slot(0).unwrap().quantity, 10);
        assert_eq!(inv.slot(1).unwrap().quantity, 2);
        assert_eq!(inv.quantity_of(&"ration".into()), 12);
    }

    #[test]
    fn test_add_spills_into_max_stack_chunks() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 4);

        assert_eq!(inv.add_item(ration, 25), AddOutcome::Added);
        assert_eq!(inv.slot(0).unwrap().quantity, 10);
        assert_eq!(inv.slot(1).unwrap().quantity, 10);
        assert_eq!(inv.slot(2).unwrap().quantity, 5);
        assert_eq!(inv.filled_slots(), 3);
    }

    #[test]
    fn test_full_inventory_rejects_without_mutation() {
        let defs = defs();
        let spear = defs.get(&"spear".into()).unwrap(); // max_stack 1
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);

        assert_eq!(inv.add_item(spear, 1), AddOutcome::Added);
        assert_eq!(inv.add_item(spear, 1), AddOutcome::Added);
        assert!(inv.is_full());

        let before: Vec<_> = inv.slots().map(|s| s.cloned()).collect();
        assert_eq!(inv.add_item(spear, 1), AddOutcome::Full);
        let after: Vec<_> = inv.slots().map(|s| s.cloned()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filled_slots_never_exceed_capacity() {
        let defs = defs();
        let scrap = defs.get(&"scrap".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 3);

        for _ in 0..20 {
            inv.add_item(scrap, 37);
            assert!(inv.filled_slots() <= inv.capacity());
        }
    }

    #[test]
    fn test_move_to_empty_slot() {
        let defs = defs();
        let spear = defs.get(&"spear".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 3);
        inv.add_item(spear, 1);

        assert_eq!(inv.move_item(0, 2, &defs), MoveOutcome::Moved);
        assert!(inv.slot(0).is_none());
        assert_eq!(inv.slot(2).unwrap().item_id, "spear".into());
    }

    #[test]
    fn test_move_swap_symmetry() {
        let defs = defs();
        let spear = defs.get(&"spear".into()).unwrap();
        let bow = defs.get(&"bow".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        inv.add_item(spear, 1);
        inv.add_item(bow, 1);

        let before: Vec<_> = inv.slots().map(|s| s.cloned()).collect();
        assert_eq!(inv.move_item(0, 1, &defs), MoveOutcome::Swapped);
        assert_eq!(inv.move_item(1, 0, &defs), MoveOutcome::Swapped);
        let after: Vec<_> = inv.slots().map(|s| s.cloned()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_blocked_by_unswappable_item() {
        let defs = defs();
        let spear = defs.get(&"spear".into()).unwrap();
        let totem = defs.get(&"ancient_totem".into()).unwrap(); // swappable = false
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        inv.add_item(spear, 1);
        inv.add_item(totem, 1);

        assert_eq!(inv.move_item(0, 1, &defs), MoveOutcome::Blocked);
        assert_eq!(inv.slot(0).unwrap().item_id, "spear".into());
        assert_eq!(inv.slot(1).unwrap().item_id, "ancient_totem".into());
    }

    #[test]
    fn test_move_from_empty_slot_fails() {
        let defs = defs();
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        assert_eq!(inv.move_item(0, 1, &defs), MoveOutcome::EmptySource);
    }

    #[test]
    fn test_remove_partial_keeps_stack() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        inv.add_item(ration, 7);

        assert!(inv.remove_item(0, 3));
        assert_eq!(inv.slot(0).unwrap().quantity, 4);

        // Снятие больше остатка уходит в ноль и чистит слот
        assert!(inv.remove_item(0, 100));
        assert!(inv.slot(0).is_none());
    }

    #[test]
    fn test_remove_out_of_bounds_is_noop() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        inv.add_item(ration, 1);

        assert!(!inv.remove_item(5, 1));
        assert!(!inv.remove_item(1, 1)); // пустой слот
        assert_eq!(inv.quantity_of(&"ration".into()), 1);
    }

    #[test]
    fn test_can_accept_counts_stackable_room() {
        let defs = defs();
        let ration = defs.get(&"ration".into()).unwrap(); // max_stack 10
        let spear = defs.get(&"spear".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 2);
        inv.add_item(ration, 8);
        inv.add_item(spear, 1);

        // Свободных слотов нет, но в стеке рациона есть недобор 2
        assert!(inv.is_full());
        assert!(inv.can_accept(ration, 2));
        assert!(!inv.can_accept(ration, 3));
        assert!(!inv.can_accept(spear, 1));
    }

    #[test]
    fn test_resize_drops_tail() {
        let defs = defs();
        let spear = defs.get(&"spear".into()).unwrap();
        let bow = defs.get(&"bow".into()).unwrap();
        let mut inv = Inventory::new("main", InventoryKind::Main, 3);
        inv.add_item(spear, 1);
        inv.add_item(bow, 1);

        inv.resize(1);
        assert_eq!(inv.capacity(), 1);
        assert_eq!(inv.slot(0).unwrap().item_id, "spear".into());
    }
}
