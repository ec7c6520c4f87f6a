//! Компоненты roster-сущностей: EntityKey, LiveData, Skin, Removed

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Строковый id сущности из snapshot-пакета (стабилен на весь replay)
#[derive(Component, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityKey(pub String);

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Вид сущности — id живёт либо в players, либо в npcs, никогда в обоих
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Npc,
}

/// Имя команды (у NPC отсутствует)
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct TeamName(pub String);

/// Счётчики сущности из пакета (для leaderboard и player info)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Число побеждённых игроков
    #[serde(default)]
    pub player_defeats: u32,
    /// Время жизни в тиках
    #[serde(default)]
    pub time_alive: u32,
    #[serde(default)]
    pub gold: f32,
    #[serde(default)]
    pub damage_taken: f32,
}

/// Живое состояние сущности — перезаписывается из каждого пакета
///
/// Структурных изменений diff не делает: позиция и счётчики, больше ничего.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct LiveData {
    /// Тайловая позиция (row, col)
    pub row: i32,
    pub col: i32,
    pub alive: bool,
    pub metrics: Metrics,
}

/// Косметика, выданная при создании (у игроков — от команды)
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Skin {
    pub skin_id: u32,
    /// Hex-цвет имени, например "#e07a5f"
    pub color: String,
}

/// Маркер: сущность пропала из snapshot'а, view снесён
///
/// Ставится ровно один раз; запись в ростере остаётся для исторических
/// lookup'ов, под тем же id сущность не возрождается.
#[derive(Component, Debug, Default)]
pub struct Removed;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_data_default() {
        let data = LiveData::default();
        assert!(!data.alive);
        assert_eq!(data.metrics.player_defeats, 0);
    }

    #[test]
    fn test_entity_key_from_str() {
        let key = EntityKey::from("17");
        assert_eq!(key.0, "17");
    }
}
