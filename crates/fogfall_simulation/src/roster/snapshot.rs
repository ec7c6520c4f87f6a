//! Snapshot-пакеты replay-потока
//!
//! Сетевой/replay-слой отдаёт раз в тик неизменяемый словарь
//! `{entity id → состояние}` отдельно для игроков и NPC. Модель ниже —
//! только поля, которые ядро реально потребляет; остальной мусор пакета
//! serde молча игнорирует.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::components::entity::Metrics;

/// База сущности: тайловая позиция + идентичность
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseState {
    pub r: i32,
    pub c: i32,
    /// Имя команды (игроки) либо имя NPC
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Номер популяции — ключ metrics-таблиц финала
    #[serde(default)]
    pub population: u32,
}

/// Состояние одной сущности в пакете
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub base: BaseState,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub metrics: Metrics,
}

/// Конфиг матча, приходящий нулевым пакетом
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Шаг старта сжатия тумана
    #[serde(rename = "PLAYER_DEATH_FOG", default = "default_fog_start")]
    pub fog_start_step: u32,
    /// Полурадиус финального безопасного квадрата
    #[serde(rename = "PLAYER_DEATH_FOG_FINAL_SIZE", default = "default_final_size")]
    pub final_safe_radius: u32,
    /// Тайлов за шаг (1/16 = тайл за 16 шагов)
    #[serde(rename = "PLAYER_DEATH_FOG_SPEED", default = "default_fog_speed")]
    pub shrink_rate: f32,
}

fn default_fog_start() -> u32 {
    240
}

fn default_final_size() -> u32 {
    15
}

fn default_fog_speed() -> f32 {
    1.0 / 16.0
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            fog_start_step: default_fog_start(),
            final_safe_radius: default_final_size(),
            shrink_rate: default_fog_speed(),
        }
    }
}

/// Финальные метрики команды (ключ таблицы — популяция)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalTeamMetrics {
    #[serde(rename = "AliveScore", default)]
    pub alive_score: f32,
    #[serde(rename = "DefeatScore", default)]
    pub defeat_score: f32,
    #[serde(rename = "TotalScore", default)]
    pub total_score: f32,
    #[serde(rename = "TimeAlive", default)]
    pub time_alive: f32,
    #[serde(rename = "Gold", default)]
    pub gold: f32,
    #[serde(rename = "DamageTaken", default)]
    pub damage_taken: f32,
}

/// Один snapshot мира
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Packet {
    /// Толщина лавовой рамки
    #[serde(default)]
    pub border: u32,
    /// Сторона карты
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub player: HashMap<String, EntityState>,
    #[serde(default)]
    pub npc: HashMap<String, EntityState>,
    #[serde(default)]
    pub config: Option<ReplayConfig>,
    /// Присутствует только в пакетах конца матча
    #[serde(default)]
    pub final_metrics: Option<HashMap<u32, FinalTeamMetrics>>,
}

/// Пакет доставлен (ровно один на тик от replay-слоя)
#[derive(Event, Clone, Debug)]
pub struct SnapshotReceived {
    pub step: u32,
    pub packet: Packet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_deserializes_with_missing_fields() {
        let packet: Packet = ron::from_str("(border: 16, size: 160)").unwrap();
        assert!(packet.player.is_empty());
        assert!(packet.npc.is_empty());
        assert!(packet.config.is_none());
    }

    #[test]
    fn test_replay_config_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.fog_start_step, 240);
        assert_eq!(config.final_safe_radius, 15);
        assert!((config.shrink_rate - 1.0 / 16.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entity_state_roundtrip() {
        let state = EntityState {
            base: BaseState {
                r: 40,
                c: 12,
                name: "TeamRed".to_string(),
                color: "#aa3322".to_string(),
                population: 3,
            },
            alive: true,
            metrics: Metrics {
                player_defeats: 2,
                time_alive: 500,
                gold: 31.0,
                damage_taken: 120.5,
            },
        };

        let text = ron::to_string(&state).unwrap();
        let back: EntityState = ron::from_str(&text).unwrap();
        assert_eq!(state, back);
    }
}
