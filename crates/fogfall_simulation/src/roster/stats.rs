//! Team standings — агрегированная статистика команд
//!
//! До конца матча собираем по живым данным участников; после — берём
//! финальные metrics-таблицы пакета по номеру популяции команды.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::entity::LiveData;
use crate::roster::snapshot::FinalTeamMetrics;
use crate::roster::Roster;

/// Финальные метрики матча (появляются с последним пакетом)
#[derive(Resource, Debug, Default)]
pub struct FinalMetrics {
    pub by_population: HashMap<u32, FinalTeamMetrics>,
    pub is_end: bool,
}

/// Строка scoreboard'а
#[derive(Clone, Debug, PartialEq)]
pub struct TeamStanding {
    /// 1-based, по убыванию score
    pub rank: u32,
    pub team_name: String,
    /// defeats + alive
    pub score: f32,
    pub alive: f32,
    pub defeats: f32,
    pub gold: f32,
    pub damage_taken: f32,
    pub is_end: bool,
}

/// Статистика всех команд, отсортированная по score с рангами
pub fn team_standings(world: &mut World) -> Vec<TeamStanding> {
    let (is_end, final_table) = match world.get_resource::<FinalMetrics>() {
        Some(metrics) => (metrics.is_end, metrics.by_population.clone()),
        None => (false, HashMap::new()),
    };

    let teams: Vec<(String, u32, Vec<Entity>)> = {
        let roster = world.resource::<Roster>();
        roster
            .team_names()
            .iter()
            .filter_map(|name| roster.team_by_name(name))
            .map(|team| (team.name.clone(), team.population, team.members.clone()))
            .collect()
    };

    let mut items: Vec<TeamStanding> = teams
        .into_iter()
        .map(|(name, population, members)| {
            if is_end {
                let metrics = final_table.get(&population).cloned().unwrap_or_default();
                TeamStanding {
                    rank: 0,
                    team_name: name,
                    score: metrics.defeat_score + metrics.alive_score,
                    alive: metrics.alive_score,
                    defeats: metrics.defeat_score,
                    gold: metrics.gold,
                    damage_taken: metrics.damage_taken,
                    is_end: true,
                }
            } else {
                live_standing(world, name, &members)
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (index, item) in items.iter_mut().enumerate() {
        item.rank = (index + 1) as u32;
    }
    items
}

fn live_standing(world: &World, team_name: String, members: &[Entity]) -> TeamStanding {
    let mut max_alive = 0u32;
    let mut total_defeats = 0u32;
    let mut gold = 0.0f32;
    let mut damage_taken = 0.0f32;

    for &entity in members {
        let Some(data) = world.get::<LiveData>(entity) else {
            continue;
        };
        max_alive = max_alive.max(data.metrics.time_alive);
        total_defeats += data.metrics.player_defeats;
        gold += data.metrics.gold;
        damage_taken += data.metrics.damage_taken;
    }

    // Формат replay засчитывает командный defeat каждому участнику,
    // сумма по команде делится пополам
    let defeats = total_defeats as f32 / 2.0;
    let alive = max_alive as f32;

    TeamStanding {
        rank: 0,
        team_name,
        score: defeats + alive,
        alive,
        defeats,
        gold,
        damage_taken,
        is_end: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Metrics;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn_member(world: &mut World, defeats: u32, time_alive: u32, gold: f32) -> Entity {
        world
            .spawn(LiveData {
                row: 0,
                col: 0,
                alive: true,
                metrics: Metrics {
                    player_defeats: defeats,
                    time_alive,
                    gold,
                    damage_taken: 10.0,
                },
            })
            .id()
    }

    #[test]
    fn test_live_standings_aggregate_and_rank() {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let a1 = spawn_member(&mut world, 4, 100, 5.0);
        let a2 = spawn_member(&mut world, 2, 300, 7.0);
        let b1 = spawn_member(&mut world, 0, 50, 1.0);

        let mut roster = Roster::default();
        roster.ensure_team("Alpha", 1, &mut rng);
        roster.ensure_team("Beta", 2, &mut rng);
        roster.add_team_member("Alpha", a1);
        roster.add_team_member("Alpha", a2);
        roster.add_team_member("Beta", b1);
        world.insert_resource(roster);

        let standings = team_standings(&mut world);
        assert_eq!(standings.len(), 2);

        // Alpha: defeats (4+2)/2 = 3, alive = max(100, 300) = 300
        let alpha = &standings[0];
        assert_eq!(alpha.team_name, "Alpha");
        assert_eq!(alpha.rank, 1);
        assert_eq!(alpha.defeats, 3.0);
        assert_eq!(alpha.alive, 300.0);
        assert_eq!(alpha.score, 303.0);
        assert_eq!(alpha.gold, 12.0);

        let beta = &standings[1];
        assert_eq!(beta.rank, 2);
        assert_eq!(beta.score, 50.0);
    }

    #[test]
    fn test_final_metrics_override_live_data() {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let a1 = spawn_member(&mut world, 10, 999, 50.0);
        let mut roster = Roster::default();
        roster.ensure_team("Alpha", 7, &mut rng);
        roster.add_team_member("Alpha", a1);
        world.insert_resource(roster);

        let mut table = HashMap::new();
        table.insert(
            7,
            FinalTeamMetrics {
                alive_score: 8.0,
                defeat_score: 1.5,
                total_score: 9.5,
                time_alive: 800.0,
                gold: 34.0,
                damage_taken: 1026.9,
            },
        );
        world.insert_resource(FinalMetrics {
            by_population: table,
            is_end: true,
        });

        let standings = team_standings(&mut world);
        assert_eq!(standings[0].score, 9.5);
        assert_eq!(standings[0].gold, 34.0);
        assert!(standings[0].is_end);
    }
}
