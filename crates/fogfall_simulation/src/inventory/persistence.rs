//! Persistence round-trip инвентарей
//!
//! Инвентарь сериализуется в плоский blob `{kind, slots: [(id | null, qty)]}`
//! (RON) и уезжает во внешний keyed byte-blob store. При загрузке definitions
//! ре-резолвятся по id через каталог: неизвестный id оставляет слот пустым
//! с warning'ом, остальное восстанавливается с точностью до (id, quantity).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::components::inventory::{Inventory, InventoryKind, ItemStack};
use crate::inventory::events::{ContentChanged, LoadGameIntent, SaveGameIntent};
use crate::item_system::{ItemDefinitions, ItemId};
use crate::logger::{log, log_warning};

// ============================================================================
// SaveStore (внешний collaborator)
// ============================================================================

/// Keyed byte-blob store
///
/// Хост подменяет на дисковый/облачный; по умолчанию in-memory.
pub trait SaveStore: Send + Sync {
    fn save(&mut self, key: &str, blob: Vec<u8>);
    fn load(&self, key: &str) -> Option<Vec<u8>>;
    fn delete(&mut self, key: &str);
}

/// In-memory store (тесты, headless прогоны)
#[derive(Default)]
pub struct MemorySaveStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl SaveStore for MemorySaveStore {
    fn save(&mut self, key: &str, blob: Vec<u8>) {
        self.blobs.insert(key.to_string(), blob);
    }

    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.get(key).cloned()
    }

    fn delete(&mut self, key: &str) {
        self.blobs.remove(key);
    }
}

/// Resource-обёртка над текущим store
#[derive(Resource)]
pub struct SaveSlots {
    store: Box<dyn SaveStore>,
}

impl Default for SaveSlots {
    fn default() -> Self {
        Self {
            store: Box::new(MemorySaveStore::default()),
        }
    }
}

impl SaveSlots {
    pub fn new(store: Box<dyn SaveStore>) -> Self {
        Self { store }
    }

    pub fn save(&mut self, key: &str, blob: Vec<u8>) {
        self.store.save(key, blob);
    }

    pub fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.store.load(key)
    }

    pub fn delete(&mut self, key: &str) {
        self.store.delete(key);
    }
}

/// Ключ blob'а инвентаря в store
pub fn save_key(inventory_name: &str) -> String {
    format!("{}.inventory", inventory_name)
}

// ============================================================================
// Wire model
// ============================================================================

/// Слот в blob'е; `item_id == None` — пустой слот
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedSlot {
    pub item_id: Option<ItemId>,
    pub quantity: u32,
}

/// Плоское содержимое одного инвентаря
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedInventory {
    pub kind: InventoryKind,
    pub slots: Vec<SerializedSlot>,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("blob not found: {0}")]
    MissingBlob(String),
    #[error("inventory encode failed: {0}")]
    Encode(#[from] ron::Error),
    #[error("inventory decode failed: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("inventory blob is not valid utf-8")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Снять плоскую копию содержимого
pub fn serialize_inventory(inventory: &Inventory) -> SerializedInventory {
    SerializedInventory {
        kind: inventory.kind,
        slots: inventory
            .slots()
            .map(|slot| match slot {
                Some(stack) => SerializedSlot {
                    item_id: Some(stack.item_id.clone()),
                    quantity: stack.quantity,
                },
                None => SerializedSlot {
                    item_id: None,
                    quantity: 0,
                },
            })
            .collect(),
    }
}

/// SerializedInventory → байты (RON)
pub fn encode(serialized: &SerializedInventory) -> Result<Vec<u8>, PersistenceError> {
    Ok(ron::to_string(serialized)?.into_bytes())
}

/// Байты → SerializedInventory
pub fn decode(blob: &[u8]) -> Result<SerializedInventory, PersistenceError> {
    let text = std::str::from_utf8(blob)?;
    Ok(ron::from_str(text)?)
}

/// Восстановить содержимое инвентаря из blob'а
///
/// Ёмкость подгоняется под сохранённую. Runtime-поля (owner, имя,
/// persistent-флаг) blob не трогает.
pub fn apply_serialized(
    inventory: &mut Inventory,
    serialized: &SerializedInventory,
    defs: &ItemDefinitions,
) {
    inventory.kind = serialized.kind;
    inventory.resize(serialized.slots.len());
    for (index, slot) in serialized.slots.iter().enumerate() {
        let stack = match &slot.item_id {
            Some(id) => match defs.get(id) {
                Some(def) => Some(ItemStack::new(def.id.clone(), slot.quantity)),
                None => {
                    log_warning(&format!(
                        "inventory '{}': unknown item id '{}' in save blob, slot {} left empty",
                        inventory.name, id, index
                    ));
                    None
                }
            },
            None => None,
        };
        inventory.set_slot(index, stack);
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Сохранить все persistent-инвентари по `SaveGameIntent`
pub fn save_inventories(
    mut intents: EventReader<SaveGameIntent>,
    inventories: Query<&Inventory>,
    mut slots: ResMut<SaveSlots>,
) {
    for _ in intents.read() {
        let mut saved = 0usize;
        for inventory in inventories.iter() {
            if !inventory.persistent {
                continue;
            }
            match encode(&serialize_inventory(inventory)) {
                Ok(blob) => {
                    slots.save(&save_key(&inventory.name), blob);
                    saved += 1;
                }
                Err(err) => {
                    log_warning(&format!(
                        "inventory '{}' not saved: {}",
                        inventory.name, err
                    ));
                }
            }
        }
        log(&format!("💾 Saved {} inventories", saved));
    }
}

/// Загрузить persistent-инвентари по `LoadGameIntent`
///
/// Инвентарь без blob'а остаётся как есть (первый запуск).
pub fn load_inventories(
    mut intents: EventReader<LoadGameIntent>,
    mut inventories: Query<(Entity, &mut Inventory)>,
    defs: Res<ItemDefinitions>,
    slots: Res<SaveSlots>,
    mut content_changed: EventWriter<ContentChanged>,
) {
    for _ in intents.read() {
        for (entity, mut inventory) in inventories.iter_mut() {
            if !inventory.persistent {
                continue;
            }
            let Some(blob) = slots.load(&save_key(&inventory.name)) else {
                continue;
            };
            match decode(&blob) {
                Ok(serialized) => {
                    apply_serialized(&mut inventory, &serialized, &defs);
                    content_changed.write(ContentChanged { inventory: entity });
                }
                Err(err) => {
                    log_warning(&format!(
                        "inventory '{}' not loaded: {}",
                        inventory.name, err
                    ));
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
