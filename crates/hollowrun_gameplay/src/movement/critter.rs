//! Critter — наземный патрульный integrator
//!
//! Ходит с фиксированной скоростью в текущем facing, разворачивается при
//! контакте с врагом и при упоре в стену (stall detection по измеренной
//! velocity), авто-прыгает когда стена запрашивает прыжок на земле.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::PhysicsBody;
use crate::movement::PatrolDirectionChanged;
use crate::sensors::SensorState;

/// Tunables Critter'а
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct CritterConfig {
    pub speed: f32,
    pub speed_clamp: f32,
    pub jump_force: f32,
    pub gravity_scale: f32,
}

impl Default for CritterConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            speed_clamp: 5.0,
            jump_force: 10.0,
            gravity_scale: 3.0,
        }
    }
}

/// Runtime state Critter'а
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CritterState {
    /// Facing патруля: forward аккумулирует скорость со знаком минус
    /// (унаследовано от оригинала — см. DESIGN.md)
    pub moving_forward: bool,
    pub can_jump: bool,
    pub horizontal_speed: f32,
    pub gravity: f32,
    /// Последняя скорость, о которой нотифицированы подписчики
    pub reported_direction: f32,
}

impl Default for CritterState {
    fn default() -> Self {
        Self {
            moving_forward: false,
            can_jump: false,
            horizontal_speed: 0.0,
            gravity: 3.0,
            reported_direction: 0.0,
        }
    }
}

impl CritterState {
    /// Разворот патруля (контакт с другим врагом)
    pub fn flip_direction(&mut self) {
        self.moving_forward = !self.moving_forward;
    }

    /// Один fixed tick. Возвращает новую скорость для нотификации, если
    /// направление изменилось.
    pub fn tick(
        &mut self,
        cfg: &CritterConfig,
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
        }

        if sensors.left_walled || sensors.right_walled {
            self.can_jump = true;
        }
        if !sensors.grounded {
            self.can_jump = false;
        }
        if self.can_jump {
            velocity.y = cfg.jump_force;
        }

        // Stall detection: команда есть, а измеренная скорость ~0 — упёрлись,
        // разворачиваемся и заряжаем прыжок
        if (velocity.x <= 0.0 && velocity.x > -1.0) && self.horizontal_speed > 0.0 {
            self.can_jump = true;
            self.moving_forward = true;
        } else if (velocity.x >= 0.0 && velocity.x < 1.0) && self.horizontal_speed < 0.0 {
            self.can_jump = true;
            self.moving_forward = false;
        }

        velocity.x = self.horizontal_speed;

        if self.horizontal_speed != self.reported_direction {
            self.reported_direction = self.horizontal_speed;
            Some(self.reported_direction)
        } else {
            None
        }
    }
}

/// Система: движение всех Critter'ов
pub fn critter_motion(
    mut query: Query<(Entity, &CritterConfig, &SensorState, &mut CritterState, &mut PhysicsBody)>,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded() -> SensorState {
        SensorState {
            grounded: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_forward_facing_accumulates_negative() {
        // Сценарий из наблюдаемого поведения: facing=forward, speed=5,
        // clamp=5, grounded, стен нет → за один tick скорость -5
        let cfg = CritterConfig::default();
        let mut state = CritterState {
            moving_forward: true,
            ..Default::default()
        };
        let mut velocity = Vec2::new(-2.0, 0.0);
        let mut gravity = cfg.gravity_scale;

        state.tick(&cfg, &grounded(), &mut gravity, &mut velocity);

        assert_eq!(velocity.x, -5.0);
        assert!(state.moving_forward);
    }

    #[test]
    fn test_backward_facing_accumulates_positive() {
        let cfg = CritterConfig::default();
        let mut state = CritterState::default();
        let mut velocity = Vec2::new(2.0, 0.0);
        let mut gravity = cfg.gravity_scale;

        state.tick(&cfg, &grounded(), &mut gravity, &mut velocity);
        assert_eq!(velocity.x, 5.0);
    }

    #[test]
    fn test_clamp_holds_over_many_ticks() {
        let cfg = CritterConfig::default();
        let mut state = CritterState::default();
        let mut velocity = Vec2::new(5.0, 0.0);
        let mut gravity = cfg.gravity_scale;

        for _ in 0..20 {
            state.tick(&cfg, &grounded(), &mut gravity, &mut velocity);
            assert!(velocity.x.abs() <= cfg.speed_clamp);
        }
    }

    #[test]
    fn test_wall_contact_arms_jump() {
        let cfg = CritterConfig::default();
        let mut state = CritterState::default();
        let mut velocity = Vec2::new(5.0, 0.0);
        let mut gravity = cfg.gravity_scale;

        let walled = SensorState {
            grounded: true,
            right_walled: true,
            ..Default::default()
        };
        state.tick(&cfg, &walled, &mut gravity, &mut velocity);

        assert!(state.can_jump);
        assert_eq!(velocity.y, cfg.jump_force);
    }

    #[test]
    fn test_airborne_disarms_jump() {
        let cfg = CritterConfig::default();
        let mut state = CritterState {
            can_jump: true,
            ..Default::default()
        };
        let mut velocity = Vec2::new(3.0, 4.0);
        let mut gravity = cfg.gravity_scale;

        state.tick(&cfg, &SensorState::default(), &mut gravity, &mut velocity);

        assert!(!state.can_jump);
        assert_eq!(velocity.y, 4.0);
    }

    #[test]
    fn test_stall_flips_direction() {
        let cfg = CritterConfig::default();
        let mut state = CritterState::default();
        state.horizontal_speed = 5.0; // команда вправо
        let mut velocity = Vec2::ZERO; // а тело стоит — упёрлись
        let mut gravity = cfg.gravity_scale;

        let airborne_by_wall = SensorState {
            grounded: true,
            ..Default::default()
        };
        state.tick(&cfg, &airborne_by_wall, &mut gravity, &mut velocity);

        assert!(state.moving_forward);
        assert!(state.can_jump);
    }

    #[test]
    fn test_direction_change_notified_once() {
        let cfg = CritterConfig::default();
        let mut state = CritterState::default();
        let mut velocity = Vec2::new(5.0, 0.0);
        let mut gravity = cfg.gravity_scale;

        let first = state.tick(&cfg, &grounded(), &mut gravity, &mut velocity);
        assert_eq!(first, Some(5.0));

        // Скорость не меняется — нотификации нет
        let second = state.tick(&cfg, &grounded(), &mut gravity, &mut velocity);
        assert_eq!(second, None);
    }
}
