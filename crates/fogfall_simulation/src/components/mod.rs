//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - entity: roster-сущности (EntityKey, EntityKind, LiveData, Skin, Removed)
//! - inventory: слотовый контейнер предметов (Inventory, ItemStack)

pub mod entity;
pub mod inventory;

// Re-exports для удобного импорта
pub use entity::*;
pub use inventory::*;
