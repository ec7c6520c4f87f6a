//! Entity/Team roster — bookkeeping сущностей replay
//!
//! # Архитектура
//!
//! Сущности живут как ECS-entity; `Roster` resource держит индексы
//! id → Entity (players и npcs раздельно, id никогда в обоих сразу),
//! таблицу команд и skin-пулы.
//!
//! **Команды:** создаются при первом появлении имени в пакете; skin и
//! цвет разыгрываются один раз из пула без возврата и наследуются всеми
//! будущими участниками. Исчерпанный пул перед следующим розыгрышем
//! пополняется до исходного набора (косметическая коллизия допустима).
//!
//! **Удаление:** запись из индекса не выбрасывается — исторические
//! lookup'ы (leaderboard мёртвых команд) продолжают работать.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

pub mod snapshot;
pub mod stats;
pub mod systems;

pub use snapshot::{
    BaseState, EntityState, FinalTeamMetrics, Packet, ReplayConfig, SnapshotReceived,
};
pub use stats::{team_standings, FinalMetrics, TeamStanding};
pub use systems::{reconcile_snapshots, EntityDespawned, EntitySpawned, TeamAdded};

use crate::SimSet;

/// Skin-пул игроков (id 5 зарезервирован под спец-скин наблюдателя)
pub const PLAYER_SKIN_IDS: [u32; 15] = [1, 2, 3, 4, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];

/// Skin-пул NPC
pub const NPC_SKIN_IDS: [u32; 2] = [1, 2];

/// Цвет имени по skin id (палитра пешек оригинального клиента)
pub fn skin_color(skin_id: u32) -> &'static str {
    const PALETTE: [&str; 16] = [
        "#e07a5f", "#3d8ab5", "#81b29a", "#f2cc8f", "#9b5de5", "#00bbf9", "#00f5d4", "#fee440",
        "#f15bb5", "#ef476f", "#ffd166", "#06d6a0", "#118ab2", "#8338ec", "#fb5607", "#ff006e",
    ];
    PALETTE[(skin_id as usize).saturating_sub(1) % PALETTE.len()]
}

/// Цвет имени NPC по первой букве имени
pub fn npc_name_color(name: &str) -> &'static str {
    const PALETTE: [&str; 6] = [
        "#c0c0c0", "#d9b98a", "#a3c1da", "#b5a3da", "#9fd9a3", "#daa3a3",
    ];
    let initial = name
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase() as usize)
        .unwrap_or(0);
    PALETTE[initial % PALETTE.len()]
}

// ============================================================================
// Team
// ============================================================================

/// Команда: общая косметика + участники
#[derive(Clone, Debug)]
pub struct Team {
    pub name: String,
    /// Номер популяции (ключ metrics-таблиц финала)
    pub population: u32,
    /// Общий skin всех участников, разыгран при создании
    pub skin_id: u32,
    pub color: String,
    pub members: Vec<Entity>,
}

impl Team {
    pub fn add_member(&mut self, entity: Entity) {
        self.members.push(entity);
    }
}

// ============================================================================
// Roster
// ============================================================================

/// Индексы сущностей и команд текущего replay
#[derive(Resource, Debug)]
pub struct Roster {
    players: HashMap<String, Entity>,
    npcs: HashMap<String, Entity>,
    removed: HashSet<String>,
    /// Имена команд в порядке появления
    teams: Vec<String>,
    team_map: HashMap<String, Team>,
    population_map: HashMap<u32, String>,
    player_skin_pool: Vec<u32>,
    npc_skin_pool: Vec<u32>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            players: HashMap::new(),
            npcs: HashMap::new(),
            removed: HashSet::new(),
            teams: Vec::new(),
            team_map: HashMap::new(),
            population_map: HashMap::new(),
            player_skin_pool: PLAYER_SKIN_IDS.to_vec(),
            npc_skin_pool: NPC_SKIN_IDS.to_vec(),
        }
    }
}

/// Розыгрыш без возврата; пустой пул пополняется до исходного набора
fn draw_from_pool(pool: &mut Vec<u32>, refill: &[u32], rng: &mut ChaCha8Rng) -> u32 {
    if pool.is_empty() {
        pool.extend_from_slice(refill);
    }
    let index = rng.gen_range(0..pool.len());
    pool.remove(index)
}

impl Roster {
    // ------------------------------------------------------------------
    // Индексы сущностей
    // ------------------------------------------------------------------

    pub fn player(&self, key: &str) -> Option<Entity> {
        self.players.get(key).copied()
    }

    pub fn npc(&self, key: &str) -> Option<Entity> {
        self.npcs.get(key).copied()
    }

    /// Lookup по обоим индексам (игроки приоритетнее)
    pub fn entity_by_key(&self, key: &str) -> Option<Entity> {
        self.players
            .get(key)
            .or_else(|| self.npcs.get(key))
            .copied()
    }

    /// Зарегистрировать игрока; возвращает вытесненную запись при коллизии
    pub fn insert_player(&mut self, key: &str, entity: Entity) -> Option<Entity> {
        self.players.insert(key.to_string(), entity)
    }

    /// Зарегистрировать NPC; возвращает вытесненную запись при коллизии
    pub fn insert_npc(&mut self, key: &str, entity: Entity) -> Option<Entity> {
        self.npcs.insert(key.to_string(), entity)
    }

    pub fn player_keys(&self) -> impl Iterator<Item = &String> {
        self.players.keys()
    }

    pub fn npc_keys(&self) -> impl Iterator<Item = &String> {
        self.npcs.keys()
    }

    // ------------------------------------------------------------------
    // Удаление
    // ------------------------------------------------------------------

    /// Пометить удалённой; true только в первый раз (идемпотентно)
    pub fn mark_removed(&mut self, key: &str) -> bool {
        self.removed.insert(key.to_string())
    }

    pub fn is_removed(&self, key: &str) -> bool {
        self.removed.contains(key)
    }

    // ------------------------------------------------------------------
    // Команды
    // ------------------------------------------------------------------

    /// Создать команду при первом появлении имени; true если создана
    ///
    /// Розыгрыш skin'а происходит только здесь — все дальнейшие участники
    /// наследуют готовую косметику.
    pub fn ensure_team(&mut self, name: &str, population: u32, rng: &mut ChaCha8Rng) -> bool {
        if self.team_map.contains_key(name) {
            return false;
        }

        let skin_id = draw_from_pool(&mut self.player_skin_pool, &PLAYER_SKIN_IDS, rng);
        let team = Team {
            name: name.to_string(),
            population,
            skin_id,
            color: skin_color(skin_id).to_string(),
            members: Vec::new(),
        };

        self.teams.push(name.to_string());
        self.population_map.insert(population, name.to_string());
        self.team_map.insert(name.to_string(), team);
        true
    }

    pub fn add_team_member(&mut self, name: &str, entity: Entity) {
        if let Some(team) = self.team_map.get_mut(name) {
            team.add_member(entity);
        }
    }

    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.team_map.get(name)
    }

    pub fn team_by_population(&self, population: u32) -> Option<&Team> {
        self.population_map
            .get(&population)
            .and_then(|name| self.team_map.get(name))
    }

    pub fn team_names(&self) -> &[String] {
        &self.teams
    }

    /// Skin NPC (отдельный пул, те же правила пополнения)
    pub fn draw_npc_skin(&mut self, rng: &mut ChaCha8Rng) -> u32 {
        draw_from_pool(&mut self.npc_skin_pool, &NPC_SKIN_IDS, rng)
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Roster plugin (snapshot reconciliation + teams + standings)
pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Roster>()
            .init_resource::<FinalMetrics>()
            .add_event::<SnapshotReceived>()
            .add_event::<EntitySpawned>()
            .add_event::<EntityDespawned>()
            .add_event::<TeamAdded>()
            .add_systems(Update, reconcile_snapshots.in_set(SimSet::Roster));
    }
}

// ============================================================================
// Tests
// ============================================================================
