//! Replay driver — host-scheduler симуляции
//!
//! Читает записанный replay (RON: seed + список пакетов), тик за тиком
//! скармливает пакеты и replay-клок симуляции и в конце печатает
//! scoreboard. Никакого рендера: роль движка-хозяина здесь играет
//! обычный цикл.
//!
//! Запуск: `fogfall_replay match.replay.ron`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fogfall_simulation::*;

/// Один кадр записи: replay-клок + snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub step: u32,
    pub packet: Packet,
}

/// Записанный матч
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayFile {
    /// Seed раскраски команд (skin-пул)
    pub seed: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("usage: fogfall_replay <match.replay.ron>")]
    MissingArgument,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed replay file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("replay has no frames")]
    Empty,
}

fn parse_replay(text: &str) -> Result<ReplayFile, ReplayError> {
    let replay: ReplayFile = ron::from_str(text)?;
    if replay.frames.is_empty() {
        return Err(ReplayError::Empty);
    }
    Ok(replay)
}

fn load_replay(path: &Path) -> Result<ReplayFile, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_replay(&text)
}

/// Конфиг зоны из нулевого кадра записи
fn zone_config(replay: &ReplayFile) -> ZoneConfig {
    let first = &replay.frames[0].packet;
    let mut config = ZoneConfig::default();

    if first.size > 0 {
        config.map_size = first.size;
        config.border_size = first.border;
    }
    if let Some(fog) = &first.config {
        config.fog_start_step = fog.fog_start_step;
        config.final_safe_radius = fog.final_safe_radius;
        config.shrink_rate = fog.shrink_rate;
    }
    config
}

fn run(path: &Path) -> Result<(), ReplayError> {
    let replay = load_replay(path)?;
    let frames = replay.frames.len();

    let mut app = create_headless_app(replay.seed);
    app.insert_resource(zone_config(&replay));
    app.add_plugins(SimulationPlugin);

    for frame in replay.frames {
        app.world_mut().send_event(SnapshotReceived {
            step: frame.step,
            packet: frame.packet,
        });
        app.world_mut().send_event(StepChanged { step: frame.step });
        app.update();
    }

    let fog = app.world().resource::<DeathFog>();
    println!(
        "Replayed {} frames, fog {}/{} ({} outline redraws)",
        frames,
        fog.fog_step(),
        fog.max_step(),
        fog.redraws()
    );

    println!("--- Standings ---");
    for standing in team_standings(app.world_mut()) {
        println!(
            "#{:<3} {:<16} score {:>8.1}  defeats {:>5.1}  gold {:>6.0}  dmg {:>8.1}",
            standing.rank,
            standing.team_name,
            standing.score,
            standing.defeats,
            standing.gold,
            standing.damage_taken
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("{}", ReplayError::MissingArgument);
        return ExitCode::FAILURE;
    };

    match run(Path::new(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("replay failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_file_roundtrip() {
        let replay = ReplayFile {
            seed: 7,
            frames: vec![ReplayFrame {
                step: 0,
                packet: Packet {
                    border: 16,
                    size: 160,
                    ..Default::default()
                },
            }],
        };

        let text = ron::to_string(&replay).unwrap();
        let back: ReplayFile = ron::from_str(&text).unwrap();
        assert_eq!(back.seed, 7);
        assert_eq!(back.frames.len(), 1);
        assert_eq!(back.frames[0].packet.size, 160);
    }

    #[test]
    fn test_zone_config_from_first_frame() {
        let replay = ReplayFile {
            seed: 0,
            frames: vec![ReplayFrame {
                step: 0,
                packet: Packet {
                    border: 8,
                    size: 96,
                    config: Some(ReplayConfig {
                        fog_start_step: 100,
                        final_safe_radius: 10,
                        shrink_rate: 0.25,
                    }),
                    ..Default::default()
                },
            }],
        };

        let config = zone_config(&replay);
        assert_eq!(config.map_size, 96);
        assert_eq!(config.border_size, 8);
        assert_eq!(config.fog_start_step, 100);
        // (96 - 16 - 20) / 2
        assert_eq!(config.max_step(), 30);
    }

    #[test]
    fn test_empty_replay_is_rejected() {
        let result = parse_replay("(seed: 1, frames: [])");
        assert!(matches!(result, Err(ReplayError::Empty)));
    }

    #[test]
    fn test_garbage_replay_is_a_parse_error() {
        let result = parse_replay("not a replay at all");
        assert!(matches!(result, Err(ReplayError::Parse(_))));
    }
}
