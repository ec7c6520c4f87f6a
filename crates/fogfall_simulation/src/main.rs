//! Headless прогон FOGFALL
//!
//! Гоняет синтетический поток пакетов без рендера: дым-тест ростера,
//! зоны и scoreboard'а.

use fogfall_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting FOGFALL headless replay (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    for step in 0..600 {
        let packet = synthetic_packet(step);
        app.world_mut().send_event(SnapshotReceived { step, packet });
        app.world_mut().send_event(StepChanged { step });
        app.update();

        if step % 100 == 0 {
            let fog = app.world().resource::<DeathFog>();
            println!(
                "Step {}: fog {}/{} ({} redraws)",
                step,
                fog.fog_step(),
                fog.max_step(),
                fog.redraws()
            );
        }
    }

    println!("--- Standings ---");
    for standing in team_standings(app.world_mut()) {
        println!(
            "#{} {:<10} score {:>6.1} (defeats {:.1}, gold {:.0})",
            standing.rank, standing.team_name, standing.score, standing.defeats, standing.gold
        );
    }
}

fn entity_state(r: i32, c: i32, team: &str, population: u32, defeats: u32, step: u32) -> EntityState {
    EntityState {
        base: BaseState {
            r,
            c,
            name: team.to_string(),
            color: String::new(),
            population,
        },
        alive: true,
        metrics: Metrics {
            player_defeats: defeats,
            time_alive: step,
            gold: (step / 10) as f32,
            damage_taken: step as f32 * 0.5,
        },
    }
}

fn synthetic_packet(step: u32) -> Packet {
    let mut packet = Packet {
        border: 16,
        size: 160,
        ..Default::default()
    };

    packet
        .player
        .insert("1".into(), entity_state(10, 10, "Crimson", 1, 2, step));
    packet
        .player
        .insert("2".into(), entity_state(11, 10, "Crimson", 1, 0, step));
    packet
        .player
        .insert("3".into(), entity_state(40, 40, "Cobalt", 2, 4, step));
    // Игрок 4 выбывает на шаге 300
    if step < 300 {
        packet
            .player
            .insert("4".into(), entity_state(41, 40, "Cobalt", 2, 1, step));
    }

    packet
        .npc
        .insert("n1".into(), entity_state(5, 80, "Rat", 0, 0, step));
    packet
        .npc
        .insert("n2".into(), entity_state(90, 12, "Wolf", 0, 0, step));

    packet
}
