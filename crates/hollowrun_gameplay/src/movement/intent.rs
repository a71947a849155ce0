//! Intent — общий словарь команд движения
//!
//! Транзиентная per-tick структура: InputIntentMapper заполняет её для
//! игрока, AI agents пишут директивы напрямую в state своих архетипов
//! (leap/move_forward/move_backward/dash/walk). Не персистится — каждый
//! tick пересобирается заново.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-tick intent игрока
///
/// *_pressed / *_released — edges (один tick), *_held — уровни.
#[derive(Component, Debug, Clone, Copy, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PlayerIntent {
    /// Горизонтальная ось ∈ {-1, 0, +1}
    pub horizontal: f32,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub run_held: bool,
    /// Edge, уже gated по dash ability (см. input mapper)
    pub dash_pressed: bool,
    pub fire_pressed: bool,
    pub alt_fire_pressed: bool,
}

impl PlayerIntent {
    /// Сбрасывает edges, сохраняя уровни (вызывается mapper'ом в начале tick'а)
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.jump_released = false;
        self.dash_pressed = false;
        self.fire_pressed = false;
        self.alt_fire_pressed = false;
    }
}
