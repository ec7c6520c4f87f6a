//! Item System — каталог предметов
//!
//! # Архитектура
//!
//! **ItemDefinition** — статический blueprint (id + kind + capabilities):
//! - Хранится в `ItemDefinitions` resource (HashMap lookup)
//! - Immutable данные (name, max_stack, флаги, целевые инвентари)
//! - Создаются hardcoded в `ItemDefinitions::default()` или грузятся из RON
//!
//! **ItemStack** (см. `components::inventory`) — runtime содержимое слота:
//! - Ссылается на `ItemDefinition` через `ItemId`
//! - Mutable state только quantity
//!
//! **UseEffect** — эффект применения consumable:
//! - Диспатч по данным, без наследования; сам эффект исполняет внешний
//!   collaborator, ядро лишь сообщает событием что применить
//!
//! # Пример использования
//!
//! ```rust
//! use fogfall_simulation::item_system::{ItemDefinitions, ItemId};
//!
//! let defs = ItemDefinitions::default();
//! let ration = defs.get(&ItemId::from("ration")).unwrap();
//! assert!(ration.usable);
//! assert_eq!(ration.max_stack, 10);
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ItemId
// ============================================================================

/// Item identifier (unique string ID)
///
/// # Examples
/// - "ration"
/// - "spear"
/// - "chestplate"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ItemKind
// ============================================================================

/// Тип предмета (категория)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Weapon (держится в руке, слот "held")
    Weapon,
    /// Armor (hat / top / bottom)
    Armor,
    /// Ammunition (стекается, слот "ammunition")
    Ammunition,
    /// Consumable (ration, water, poultice)
    Consumable,
    /// Craft material (для обмена на рынке)
    Material,
    /// Quest item
    Quest,
}

// ============================================================================
// UseEffect
// ============================================================================

/// Эффект применения предмета
///
/// Ядро не трогает здоровье/ресурсы само: эффект уезжает наружу
/// в `ItemUsed` событии, исполняет его хост.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UseEffect {
    /// Восстановить HP
    RestoreHealth { amount: u32 },
    /// Восстановить еду
    RestoreFood { amount: u32 },
    /// Восстановить воду
    RestoreWater { amount: u32 },
}

// ============================================================================
// ItemDefinition (статические данные)
// ============================================================================

/// Static item definition (blueprint)
///
/// Capabilities — плоские флаги вместо виртуальных методов предмета:
/// usable/equippable/movable/swappable плюс имена целевых инвентарей.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique ID
    pub id: ItemId,
    /// Локализованное название
    pub name: String,
    /// Тип предмета
    pub kind: ItemKind,
    /// Максимум единиц в одном слоте (1 = не стекается)
    pub max_stack: u32,

    // === Capabilities ===
    /// Можно применить (consumable)
    pub usable: bool,
    /// Можно экипировать
    pub equippable: bool,
    /// Можно перемещать между слотами
    pub movable: bool,
    /// Можно менять местами с другим предметом
    pub swappable: bool,

    // === Target inventories ===
    /// Имя equipment-инвентаря, куда предмет экипируется
    pub target_equipment: Option<String>,
    /// Имя инвентаря, куда предмет возвращается при unequip
    pub target_inventory: Option<String>,

    // === Consumable-specific ===
    /// Эффект применения
    pub use_effect: Option<UseEffect>,
}

impl ItemDefinition {
    /// Предмет стекается (может лежать в слоте больше одной единицы)
    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }
}

// ============================================================================
// ItemDefinitions (Resource)
// ============================================================================

/// Item definitions lookup table (resource)
///
/// Хранит все статические данные предметов. Создаётся один раз при запуске
/// (hardcoded defaults или из RON файла).
#[derive(Resource, Clone, Debug)]
pub struct ItemDefinitions {
    definitions: HashMap<ItemId, ItemDefinition>,
}

impl ItemDefinitions {
    /// Создать пустой каталог
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Получить definition по ID
    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }

    /// Добавить definition
    pub fn add(&mut self, definition: ItemDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    /// Получить все IDs
    pub fn all_ids(&self) -> Vec<&ItemId> {
        self.definitions.keys().collect()
    }

    /// Загрузить каталог из RON-текста (замещает текущее содержимое)
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        let list: Vec<ItemDefinition> = ron::from_str(source)?;
        let mut defs = Self::new();
        for def in list {
            defs.add(def);
        }
        Ok(defs)
    }
}

impl Default for ItemDefinitions {
    /// Hardcoded definitions (базовые items клиента)
    fn default() -> Self {
        let mut defs = Self::new();

        // === CONSUMABLES ===

        defs.add(ItemDefinition {
            id: "ration".into(),
            name: "Ration".to_string(),
            kind: ItemKind::Consumable,
            max_stack: 10,
            usable: true,
            equippable: false,
            movable: true,
            swappable: true,
            target_equipment: None,
            target_inventory: None,
            use_effect: Some(UseEffect::RestoreFood { amount: 30 }),
        });

        defs.add(ItemDefinition {
            id: "waterskin".into(),
            name: "Waterskin".to_string(),
            kind: ItemKind::Consumable,
            max_stack: 10,
            usable: true,
            equippable: false,
            movable: true,
            swappable: true,
            target_equipment: None,
            target_inventory: None,
            use_effect: Some(UseEffect::RestoreWater { amount: 30 }),
        });

        defs.add(ItemDefinition {
            id: "poultice".into(),
            name: "Poultice".to_string(),
            kind: ItemKind::Consumable,
            max_stack: 5,
            usable: true,
            equippable: false,
            movable: true,
            swappable: true,
            target_equipment: None,
            target_inventory: None,
            use_effect: Some(UseEffect::RestoreHealth { amount: 50 }),
        });

        // === WEAPONS (слот "held") ===

        defs.add(ItemDefinition {
            id: "spear".into(),
            name: "Spear".to_string(),
            kind: ItemKind::Weapon,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("held".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        defs.add(ItemDefinition {
            id: "bow".into(),
            name: "Bow".to_string(),
            kind: ItemKind::Weapon,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("held".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        defs.add(ItemDefinition {
            id: "wand".into(),
            name: "Wand".to_string(),
            kind: ItemKind::Weapon,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("held".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        // === ARMOR ===

        defs.add(ItemDefinition {
            id: "hat".into(),
            name: "Hat".to_string(),
            kind: ItemKind::Armor,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("hat".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        defs.add(ItemDefinition {
            id: "chestplate".into(),
            name: "Chestplate".to_string(),
            kind: ItemKind::Armor,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("top".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        defs.add(ItemDefinition {
            id: "platelegs".into(),
            name: "Platelegs".to_string(),
            kind: ItemKind::Armor,
            max_stack: 1,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("bottom".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        // === AMMUNITION ===

        defs.add(ItemDefinition {
            id: "arrow".into(),
            name: "Arrow".to_string(),
            kind: ItemKind::Ammunition,
            max_stack: 20,
            usable: false,
            equippable: true,
            movable: true,
            swappable: true,
            target_equipment: Some("ammunition".to_string()),
            target_inventory: Some("main".to_string()),
            use_effect: None,
        });

        // === MATERIALS ===

        defs.add(ItemDefinition {
            id: "scrap".into(),
            name: "Scrap".to_string(),
            kind: ItemKind::Material,
            max_stack: 50,
            usable: false,
            equippable: false,
            movable: true,
            swappable: true,
            target_equipment: None,
            target_inventory: None,
            use_effect: None,
        });

        // Quest-предмет: прибит к слоту, не двигается и не меняется местами
        defs.add(ItemDefinition {
            id: "ancient_totem".into(),
            name: "Ancient Totem".to_string(),
            kind: ItemKind::Quest,
            max_stack: 1,
            usable: false,
            equippable: false,
            movable: false,
            swappable: false,
            target_equipment: None,
            target_inventory: None,
            use_effect: None,
        });

        defs
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_definitions_default() {
        let defs = ItemDefinitions::default();

        // Consumables
        assert!(defs.get(&"ration".into()).is_some());
        assert!(defs.get(&"waterskin".into()).is_some());
        assert!(defs.get(&"poultice".into()).is_some());

        // Weapons
        assert!(defs.get(&"spear".into()).is_some());
        assert!(defs.get(&"bow".into()).is_some());

        // Armor
        assert!(defs.get(&"hat".into()).is_some());
        assert!(defs.get(&"chestplate".into()).is_some());
        assert!(defs.get(&"platelegs".into()).is_some());

        assert!(defs.get(&"unknown".into()).is_none());
    }

    #[test]
    fn test_capabilities() {
        let defs = ItemDefinitions::default();

        let ration = defs.get(&"ration".into()).unwrap();
        assert!(ration.usable);
        assert!(!ration.equippable);
        assert!(ration.is_stackable());

        let spear = defs.get(&"spear".into()).unwrap();
        assert!(spear.equippable);
        assert!(!spear.is_stackable());
        assert_eq!(spear.target_equipment.as_deref(), Some("held"));
        assert_eq!(spear.target_inventory.as_deref(), Some("main"));

        let totem = defs.get(&"ancient_totem".into()).unwrap();
        assert!(!totem.movable);
        assert!(!totem.swappable);
    }

    #[test]
    fn test_from_ron_roundtrip() {
        let defs = ItemDefinitions::default();
        let spear = defs.get(&"spear".into()).unwrap();

        let ron_text = ron::to_string(&vec![spear.clone()]).unwrap();
        let loaded = ItemDefinitions::from_ron(&ron_text).unwrap();

        let back = loaded.get(&"spear".into()).unwrap();
        assert_eq!(back.name, "Spear");
        assert_eq!(back.target_equipment.as_deref(), Some("held"));
    }
}
