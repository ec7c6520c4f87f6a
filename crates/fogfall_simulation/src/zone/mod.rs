//! Death fog — сжимающаяся безопасная зона
//!
//! # Архитектура
//!
//! Внешний replay-клок шлёт `StepChanged`; зона пересчитывает уровень
//! сжатия `fog_step` и, только если он вырос, регенерирует 11-вершинный
//! контур и отдаёт его рендеру событием `FogOutlineChanged`. До старта
//! тумана уходит `FogCleared` — карта целиком безопасна.
//!
//! Ошибочных состояний нет: функция тотальна над любыми step'ами,
//! `fog_step` не убывает и ограничен `max_step` (финальный безопасный
//! квадрат со стороной 2 * final_safe_radius).

use bevy::prelude::*;

use crate::logger::log;
use crate::SimSet;

pub mod geometry;

pub use geometry::{fog_polygon, polygon_area, DiamondAnchors, FOG_OUTLINE_POINTS};

/// Заливка зоны тумана (RGBA), цвет из оригинального клиента
pub const FOG_COLOR: [u8; 4] = [0x0d, 0x43, 0x05, 0x80];

// ============================================================================
// ZoneConfig
// ============================================================================

/// Константы карты и тумана
///
/// Дефолты — значения реального матча; replay-файл может переопределить
/// их своим config-блоком до старта симуляции.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ZoneConfig {
    /// Сторона карты в тайлах (вместе с лавовой рамкой)
    pub map_size: u32,
    /// Толщина лавовой рамки
    pub border_size: u32,
    /// Шаг, с которого туман начинает сжиматься
    pub fog_start_step: u32,
    /// Полурадиус финального безопасного квадрата
    pub final_safe_radius: u32,
    /// Скорость сжатия: тайлов за шаг (1/16 = тайл за 16 шагов)
    pub shrink_rate: f32,
    /// Полуразмер тайла-ромба в пикселях изометрии
    pub half_rhombus: Vec2,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            map_size: 160,
            border_size: 16,
            fog_start_step: 240,
            final_safe_radius: 15,
            shrink_rate: 1.0 / 16.0,
            half_rhombus: Vec2::new(32.0, 16.0),
        }
    }
}

impl ZoneConfig {
    /// Сторона игрового поля без рамки
    pub fn playable(&self) -> u32 {
        self.map_size - self.border_size * 2
    }

    /// Максимум шагов сжатия до финального квадрата
    pub fn max_step(&self) -> u32 {
        (self.map_size - self.border_size * 2 - self.final_safe_radius * 2) / 2
    }
}

// ============================================================================
// Events
// ============================================================================

/// Replay-клок продвинулся (вход от внешнего scheduler'а)
#[derive(Event, Clone, Copy, Debug)]
pub struct StepChanged {
    pub step: u32,
}

/// Новый контур тумана для рендера (fire-and-forget)
#[derive(Event, Clone, Debug)]
pub struct FogOutlineChanged {
    pub points: [Vec2; FOG_OUTLINE_POINTS],
    pub color: [u8; 4],
}

/// Туман ещё не стартовал — рендер стирает геометрию
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct FogCleared;

// ============================================================================
// DeathFog
// ============================================================================

/// Результат продвижения клока
#[derive(Clone, Debug, PartialEq)]
pub enum FogUpdate {
    /// Тот же step или тот же fog_step — перерисовка не нужна
    Unchanged,
    /// До старта тумана: стереть геометрию
    Cleared,
    /// fog_step вырос: новый контур
    Outline([Vec2; FOG_OUTLINE_POINTS]),
}

/// Состояние зоны тумана
#[derive(Resource, Debug)]
pub struct DeathFog {
    anchors: DiamondAnchors,
    half_rhombus: Vec2,
    fog_start_step: u32,
    shrink_rate: f32,
    max_step: u32,
    cur_replay_step: Option<u32>,
    cur_fog_step: u32,
    redraws: u64,
}

impl DeathFog {
    pub fn new(config: &ZoneConfig) -> Self {
        Self {
            anchors: DiamondAnchors::from_map(config.playable(), config.half_rhombus),
            half_rhombus: config.half_rhombus,
            fog_start_step: config.fog_start_step,
            shrink_rate: config.shrink_rate,
            max_step: config.max_step(),
            cur_replay_step: None,
            cur_fog_step: 0,
            redraws: 0,
        }
    }

    /// Пересобрать под новый конфиг (replay-файл переопределил карту)
    pub fn reset(&mut self, config: &ZoneConfig) {
        *self = Self::new(config);
    }

    pub fn fog_step(&self) -> u32 {
        self.cur_fog_step
    }

    pub fn max_step(&self) -> u32 {
        self.max_step
    }

    pub fn anchors(&self) -> &DiamondAnchors {
        &self.anchors
    }

    /// Счётчик регенераций контура (probe для тестов идемпотентности)
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Продвинуть replay-клок
    ///
    /// Идемпотентно по step: повторный вызов с тем же значением ничего
    /// не пересчитывает.
    pub fn advance(&mut self, step: u32) -> FogUpdate {
        if self.cur_replay_step == Some(step) {
            return FogUpdate::Unchanged;
        }
        self.cur_replay_step = Some(step);

        if step < self.fog_start_step {
            return FogUpdate::Cleared;
        }

        // Максимум шагов ограничен финальным безопасным квадратом
        let fog_step = ((step - self.fog_start_step + 1) as f32 * self.shrink_rate).floor() as u32;
        let fog_step = fog_step.min(self.max_step);

        if fog_step == self.cur_fog_step {
            return FogUpdate::Unchanged;
        }

        self.cur_fog_step = fog_step;
        self.redraws += 1;
        FogUpdate::Outline(fog_polygon(&self.anchors, fog_step, self.half_rhombus))
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Продвижение зоны по `StepChanged`
pub fn advance_death_fog(
    mut steps: EventReader<StepChanged>,
    mut fog: ResMut<DeathFog>,
    mut outlines: EventWriter<FogOutlineChanged>,
    mut cleared: EventWriter<FogCleared>,
) {
    for event in steps.read() {
        match fog.advance(event.step) {
            FogUpdate::Unchanged => {}
            FogUpdate::Cleared => {
                cleared.write(FogCleared);
            }
            FogUpdate::Outline(points) => {
                log(&format!(
                    "☁️ Fog step {} / {} (step {})",
                    fog.fog_step(),
                    fog.max_step(),
                    event.step
                ));
                outlines.write(FogOutlineChanged {
                    points,
                    color: FOG_COLOR,
                });
            }
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Zone plugin (death fog geometry)
pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ZoneConfig>() {
            app.insert_resource(ZoneConfig::default());
        }
        let config = *app.world().resource::<ZoneConfig>();

        app.insert_resource(DeathFog::new(&config))
            .add_event::<StepChanged>()
            .add_event::<FogOutlineChanged>()
            .add_event::<FogCleared>()
            .add_systems(Update, advance_death_fog.in_set(SimSet::Zone));
    }
}

// ============================================================================
// Tests
// ============================================================================
