//! FOGFALL Simulation Core
//!
//! ECS-ядро клиента battle-royale replay на Bevy 0.16 (strategic layer).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (roster, inventory, death fog geometry)
//! - Хост-движок = tactical layer (рендер, UI, загрузка ассетов)
//!
//! Три подсистемы, независимые друг от друга внутри тика:
//! - `roster` — entity/team bookkeeping по входящим snapshot-пакетам
//! - `inventory` — слотовый инвентарь (stack/move/equip/persist)
//! - `zone` — геометрия сжимающейся безопасной зоны (death fog)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod inventory;
pub mod item_system;
pub mod logger;
pub mod roster;
pub mod zone;

// Re-export базовых типов для удобства
pub use components::*;
pub use inventory::{
    ContentChanged, DropItemIntent, EquipItemIntent, InventoryError, InventoryErrorKind,
    InventoryPlugin, InventoryRegistry, ItemDropped, ItemEquipped, ItemUnEquipped, ItemUsed,
    LoadGameIntent, MoveItemIntent, PickItemIntent, RemoveItemIntent, SaveGameIntent,
    UnequipItemIntent, UseItemIntent,
};
pub use item_system::{ItemDefinition, ItemDefinitions, ItemId, ItemKind, UseEffect};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use roster::{
    team_standings, EntityDespawned, EntitySpawned, FinalMetrics, Roster, RosterPlugin, Team,
    TeamAdded, TeamStanding,
};
pub use roster::snapshot::{BaseState, EntityState, Packet, ReplayConfig, SnapshotReceived};
pub use zone::{
    fog_polygon, polygon_area, DeathFog, DiamondAnchors, FogCleared, FogOutlineChanged,
    StepChanged, ZoneConfig, ZonePlugin, FOG_COLOR, FOG_OUTLINE_POINTS,
};

/// Порядок подсистем внутри одного тика: сначала reconcile ростера,
/// затем шаг зоны. Инвентарь от них не зависит и идёт после ростера.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Roster,
    Inventory,
    Zone,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Детерминистичный RNG (seed по умолчанию, уже вставленный seed не трогаем)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                Update,
                (SimSet::Roster, SimSet::Inventory, SimSet::Zone).chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((RosterPlugin, InventoryPlugin, ZonePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Все розыгрыши skin pool идут через него: один replay при одном seed
/// раскрашивается одинаково между прогонами.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}
