//! Roster reconciliation
//!
//! # System
//!
//! `reconcile_snapshots` — дифф пакета против текущего ростера:
//! - новый id → создать сущность, выдать команду/косметику, событие
//!   `EntitySpawned` (+ `TeamAdded` для свежей команды)
//! - знакомый id → перезаписать `LiveData`, без структурных изменений
//! - пропавший id → ровно один раз пометить `Removed` и отдать
//!   `EntityDespawned` (view-слой сносит презентацию); запись в индексе
//!   остаётся, под тем же id сущность не возрождается

use bevy::prelude::*;

use crate::components::entity::{EntityKey, EntityKind, LiveData, Removed, Skin, TeamName};
use crate::logger::{log, log_warning};
use crate::roster::snapshot::{EntityState, SnapshotReceived};
use crate::roster::stats::FinalMetrics;
use crate::roster::{npc_name_color, skin_color, Roster};
use crate::DeterministicRng;

// ============================================================================
// View events
// ============================================================================

/// Сущность появилась — view-слой поднимает презентацию
#[derive(Event, Clone, Debug)]
pub struct EntitySpawned {
    pub key: String,
    pub entity: Entity,
    pub kind: EntityKind,
}

/// Сущность пропала из snapshot'а — view-слой сносит презентацию
#[derive(Event, Clone, Debug)]
pub struct EntityDespawned {
    pub key: String,
    pub entity: Entity,
}

/// Первая встреча команды (scoreboard добавляет строку)
#[derive(Event, Clone, Debug)]
pub struct TeamAdded {
    pub name: String,
}

// ============================================================================
// Reconcile
// ============================================================================

fn live_data(state: &EntityState) -> LiveData {
    LiveData {
        row: state.base.r,
        col: state.base.c,
        alive: state.alive,
        metrics: state.metrics,
    }
}

/// Дифф пакета против ростера (раз в тик, до шага зоны)
pub fn reconcile_snapshots(
    mut commands: Commands,
    mut packets: EventReader<SnapshotReceived>,
    mut roster: ResMut<Roster>,
    mut rng: ResMut<DeterministicRng>,
    mut live: Query<&mut LiveData>,
    mut final_metrics: ResMut<FinalMetrics>,
    mut spawned: EventWriter<EntitySpawned>,
    mut despawned: EventWriter<EntityDespawned>,
    mut team_added: EventWriter<TeamAdded>,
) {
    for snapshot in packets.read() {
        let packet = &snapshot.packet;

        // --- Players: create / update ---
        for (key, state) in &packet.player {
            match roster.player(key) {
                None => {
                    let entity = create_player(
                        &mut commands,
                        &mut roster,
                        &mut rng,
                        key,
                        state,
                        &mut team_added,
                    );
                    spawned.write(EntitySpawned {
                        key: key.clone(),
                        entity,
                        kind: EntityKind::Player,
                    });
                }
                Some(entity) => update_entity(&mut commands, &mut live, entity, state),
            }
        }

        // --- NPCs: create / update ---
        for (key, state) in &packet.npc {
            match roster.npc(key) {
                None => {
                    let entity = create_npc(&mut commands, &mut roster, &mut rng, key, state);
                    spawned.write(EntitySpawned {
                        key: key.clone(),
                        entity,
                        kind: EntityKind::Npc,
                    });
                }
                Some(entity) => update_entity(&mut commands, &mut live, entity, state),
            }
        }

        // --- Пропавшие из пакета: снос view, ровно один раз ---
        let gone_players: Vec<String> = roster
            .player_keys()
            .filter(|key| !packet.player.contains_key(*key))
            .cloned()
            .collect();
        let gone_npcs: Vec<String> = roster
            .npc_keys()
            .filter(|key| !packet.npc.contains_key(*key))
            .cloned()
            .collect();

        for key in gone_players.into_iter().chain(gone_npcs) {
            if !roster.mark_removed(&key) {
                continue;
            }
            if let Some(entity) = roster.entity_by_key(&key) {
                commands.entity(entity).insert(Removed);
                despawned.write(EntityDespawned {
                    key: key.clone(),
                    entity,
                });
            }
        }

        // --- Финальные метрики конца матча ---
        if let Some(table) = &packet.final_metrics {
            final_metrics.by_population = table.clone();
            final_metrics.is_end = true;
            log("🏁 Final metrics received, match ended");
        }
    }
}

/// Перезапись живых данных; свежесозданная (ещё не flushed) сущность
/// получает компонент через insert
fn update_entity(
    commands: &mut Commands,
    live: &mut Query<&mut LiveData>,
    entity: Entity,
    state: &EntityState,
) {
    match live.get_mut(entity) {
        Ok(mut data) => *data = live_data(state),
        Err(_) => {
            commands.entity(entity).insert(live_data(state));
        }
    }
}

fn create_player(
    commands: &mut Commands,
    roster: &mut Roster,
    rng: &mut DeterministicRng,
    key: &str,
    state: &EntityState,
    team_added: &mut EventWriter<TeamAdded>,
) -> Entity {
    let team_name = state.base.name.clone();

    if roster.ensure_team(&team_name, state.base.population, &mut rng.rng) {
        team_added.write(TeamAdded {
            name: team_name.clone(),
        });
    }
    // Команда только что гарантирована — unwrap безопасен
    let (skin_id, color) = {
        let team = roster.team_by_name(&team_name).unwrap();
        (team.skin_id, team.color.clone())
    };

    let entity = commands
        .spawn((
            EntityKey(key.to_string()),
            EntityKind::Player,
            TeamName(team_name.clone()),
            Skin { skin_id, color },
            live_data(state),
        ))
        .id();

    roster.add_team_member(&team_name, entity);
    if let Some(stale) = roster.insert_player(key, entity) {
        // Открытый вопрос формата: коллизию id решаем как last-snapshot-wins
        log_warning(&format!(
            "player id collision: {} (stale entity {:?} overwritten)",
            key, stale
        ));
    }
    entity
}

fn create_npc(
    commands: &mut Commands,
    roster: &mut Roster,
    rng: &mut DeterministicRng,
    key: &str,
    state: &EntityState,
) -> Entity {
    let skin_id = roster.draw_npc_skin(&mut rng.rng);
    let color = npc_name_color(&state.base.name).to_string();

    let entity = commands
        .spawn((
            EntityKey(key.to_string()),
            EntityKind::Npc,
            Skin { skin_id, color },
            live_data(state),
        ))
        .id();

    if let Some(stale) = roster.insert_npc(key, entity) {
        log_warning(&format!(
            "npc id collision: {} (stale entity {:?} overwritten)",
            key, stale
        ));
    }
    entity
}
