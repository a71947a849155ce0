//! Motion integrators — per-archetype velocity/gravity state machines
//!
//! Все варианты интегрируют раз за fixed tick в одном порядке:
//! (a) записать сохранённый gravity scale в тело;
//! (b) ветвление по sensor флагам → горизонтальное/вертикальное ускорение;
//! (c) clamp к настроенным границам;
//! (d) запись velocity в тело.
//!
//! Каждый архетип разделён на immutable *Config (tunables, serde) и
//! mutable *State (runtime) — tunables не перезаписываются на лету.

use bevy::prelude::*;

pub mod critter;
pub mod intent;
pub mod leaper;
pub mod player;
pub mod wall_crawler;

pub use critter::{critter_motion, CritterConfig, CritterState};
pub use intent::PlayerIntent;
pub use leaper::{leaper_motion, LeaperConfig, LeaperState};
pub use player::{
    player_horizontal_motion, player_vertical_motion, PlayerMotionConfig, PlayerMotionState,
};
pub use wall_crawler::{wall_crawler_motion, WallCrawlerConfig, WallCrawlerState};

/// Декремент всех окон (coyote, jump buffer, dash duration) за один tick.
/// Оригинал списывает фиксированные 0.1 за fixed tick, не wall-clock delta.
pub const TIMER_DECAY_PER_TICK: f32 = 0.1;

/// Событие: патрульный враг сменил направление движения
/// (потребляется визуальными компонентами хоста)
#[derive(Event, Debug, Clone)]
pub struct PatrolDirectionChanged {
    pub entity: Entity,
    /// Знаковая горизонтальная скорость после смены
    pub direction: f32,
}

/// Событие: игрок начал/закончил dash
#[derive(Event, Debug, Clone)]
pub struct DashStateChanged {
    pub entity: Entity,
    pub dashing: bool,
}

/// Шаг к target не дальше чем на max_delta (аналог Mathf.MoveTowards)
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
