//! Leaper — прыгающий враг
//!
//! На земле постоянно подпрыгивает мелкими hop'ами и медленно дрейфует в
//! facing; по директиве агента (или от стены) исполняет большой leap.
//! Горизонтальное движение управляется директивами [`LeaperState::move_forward`]
//! и [`LeaperState::move_backward`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::PhysicsBody;
use crate::movement::PatrolDirectionChanged;
use crate::sensors::SensorState;

/// Tunables Leaper'а
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct LeaperConfig {
    pub speed: f32,
    pub speed_clamp: f32,
    pub hop_force: f32,
    pub hop_clamp: f32,
    pub jump_force: f32,
    pub gravity_scale: f32,
}

impl Default for LeaperConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            speed_clamp: 2.0,
            hop_force: 7.0,
            hop_clamp: 7.0,
            jump_force: 14.0,
            gravity_scale: 3.0,
        }
    }
}

/// Runtime state Leaper'а
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LeaperState {
    pub moving_forward: bool,
    pub can_jump: bool,
    pub horizontal_speed: f32,
    pub vertical_speed: f32,
    pub gravity: f32,
    pub reported_direction: f32,
}

impl Default for LeaperState {
    fn default() -> Self {
        Self {
            moving_forward: true,
            can_jump: false,
            horizontal_speed: 0.0,
            vertical_speed: 0.0,
            gravity: 3.0,
            reported_direction: 0.0,
        }
    }
}

impl LeaperState {
    /// Директива агента: большой прыжок на ближайшем контакте с землёй
    pub fn leap(&mut self) {
        self.can_jump = true;
    }

    /// Директива агента: дрейф в сторону минусовой оси
    pub fn move_forward(&mut self) {
        self.moving_forward = true;
    }

    /// Директива агента: дрейф в сторону плюсовой оси
    pub fn move_backward(&mut self) {
        self.moving_forward = false;
    }

    /// Разворот патруля (контакт с другим врагом)
    pub fn flip_direction(&mut self) {
        self.moving_forward = !self.moving_forward;
    }

    /// Один fixed tick
    pub fn tick(
        &mut self,
        cfg: &LeaperConfig,
        sensors: &SensorState,
        body_gravity: &mut f32,
        velocity: &mut Vec2,
    ) -> Option<f32> {
        *body_gravity = self.gravity;

        if sensors.grounded {
            self.gravity = cfg.gravity_scale;

            if self.moving_forward {
                self.horizontal_speed -= cfg.speed;
            } else {
                self.horizontal_speed += cfg.speed;
            }
            self.horizontal_speed = self.horizontal_speed.clamp(-cfg.speed_clamp, cfg.speed_clamp);

            // Постоянный мелкий hop на земле
            self.vertical_speed += cfg.hop_force;
            self.vertical_speed = self.vertical_speed.clamp(-cfg.hop_clamp, cfg.hop_clamp);

            // Заряд от стены сработает только на следующем tick'е; сам заряд
            // держится пока есть контакт с землёй
            if self.can_jump {
                self.vertical_speed = cfg.jump_force;
            }
            if sensors.left_walled || sensors.right_walled {
                self.can_jump = true;
            }

            // Упёрлись в стену при нулевой измеренной скорости — разворот
            if velocity.x == 0.0 && sensors.right_walled {
                self.moving_forward = true;
            } else if velocity.x == 0.0 && sensors.left_walled {
                self.moving_forward = false;
            }

            velocity.x = self.horizontal_speed;
            velocity.y = self.vertical_speed;
        } else {
            self.can_jump = false;
        }

        if self.horizontal_speed != self.reported_direction {
            self.reported_direction = self.horizontal_speed;
            Some(self.reported_direction)
        } else {
            None
        }
    }
}

/// Система: движение всех Leaper'ов
pub fn leaper_motion(
    mut query: Query<(Entity, &LeaperConfig, &SensorState, &mut LeaperState, &mut PhysicsBody)>,
    mut direction_events: EventWriter<PatrolDirectionChanged>,
) {
    for (entity, cfg, sensors, mut state, mut body) in query.iter_mut() {
        let mut velocity = body.velocity;
        let mut gravity = body.gravity_scale;
        let changed = state.tick(cfg, sensors, &mut gravity, &mut velocity);
        body.velocity = velocity;
        body.gravity_scale = gravity;

        if let Some(direction) = changed {
            direction_events.write(PatrolDirectionChanged { entity, direction });
        }
    }
}
