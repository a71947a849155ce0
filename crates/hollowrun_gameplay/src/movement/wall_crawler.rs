//! WallCrawler — враг, ползающий по полу, потолку и стенам
//!
//! Четыре каскадные ветки по контактным флагам, НЕ взаимоисключающие:
//! в углу срабатывают обе, и более поздняя ветка дописывает скорость
//! поверх ранней. На потолке и стенах гравитация обнуляется, чтобы тело
//! прилипало к поверхности. Директивы агента: [`WallCrawlerState::dash`]
//! ускоряет, [`WallCrawlerState::walk`] возвращает базовый темп.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::PhysicsBody;
use crate::sensors::SensorState;

/// Tunables WallCrawler'а
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct WallCrawlerConfig {
    pub walk_speed: f32,
    pub walk_speed_clamp: f32,
    pub dash_speed: f32,
    pub dash_speed_clamp: f32,
    pub gravity_scale: f32,
}

impl Default for WallCrawlerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            walk_speed_clamp: 5.0,
            dash_speed: 10.0,
            dash_speed_clamp: 10.0,
            gravity_scale: 3.0,
        }
    }
}

/// Runtime state WallCrawler'а
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct WallCrawlerState {
    pub moving_forward: bool,
    /// Активный темп: база или dash, переключается директивами агента
    pub active_speed: f32,
    pub active_clamp: f32,
    pub horizontal_speed: f32,
    pub vertical_speed: f32,
    pub gravity: f32,
}

impl Default for WallCrawlerState {
    fn default() -> Self {
        Self {
            moving_forward: false,
            active_speed: 5.0,
            active_clamp: 5.0,
            horizontal_speed: 0.0,
            vertical_speed: 0.0,
            gravity: 3.0,
        }
    }
}

impl WallCrawlerState {
    pub fn for_config(cfg: &WallCrawlerConfig) -> Self {
        Self {
            active_speed: cfg.walk_speed,
            active_clamp: cfg.walk_speed_clamp,
            gravity: cfg.gravity_scale,
            ..Default::default()
        }
    }

    pub fn move_forward(&mut self) {
        self.moving_forward = true;
    }

    pub fn move_backward(&mut self) {
        self.moving_forward = false;
    }

    /// Директива агента: рывок к цели
    pub fn dash(&mut self, cfg: &WallCrawlerConfig) {
        self.active_speed = cfg.dash_speed;
        self.active_clamp = cfg.dash_speed_clamp;
    }

    /// Директива агента: цель потеряна, базовый темп
    pub fn walk(&mut self, cfg: &WallCrawlerConfig) {
        self.active_speed = cfg.walk_speed;
        self.active_clamp = cfg.walk_speed_clamp;
    }

    /// Разворот патруля (контакт с другим врагом)
    pub fn flip_direction(&mut self) {
        self.moving_forward = !self.moving_forward;
    }

    /// Один fixed tick. Ветки идут в фиксированном порядке
    /// пол → потолок → левая стена → правая стена.
    pub fn tick(&mut self, sensors: &SensorState, gravity_reset: f32, body_gravity: &mut f32, velocity: &mut Vec2) {
        *body_gravity = self.gravity;

        let speed = self.active_speed;
        let clamp = self.active_clamp;

        if sensors.grounded {
            self.gravity = gravity_reset;
            self.vertical_speed = (self.vertical_speed - speed / 2.0).clamp(-clamp, clamp);

            if self.moving_forward {
                self.horizontal_speed = (self.horizontal_speed + speed).clamp(-clamp, clamp);
            } else {
                self.horizontal_speed = (self.horizontal_speed - speed).clamp(-clamp, clamp);
            }

            // Вертикаль на полу отдаём телу как есть
            velocity.x = self.horizontal_speed;
        }

        if sensors.roofed {
            self.gravity = 0.0;
            self.vertical_speed = (self.vertical_speed + speed / 2.0).clamp(-clamp, clamp);

            if self.moving_forward {
                self.horizontal_speed = (self.horizontal_speed - speed).clamp(-clamp, clamp);
                if sensors.left_walled {
                    self.gravity = gravity_reset;
                }
            } else {
                self.horizontal_speed = (self.horizontal_speed + speed).clamp(-clamp, clamp);
                if sensors.right_walled {
                    self.gravity = gravity_reset;
                }
            }

            *velocity = Vec2::new(self.horizontal_speed, self.vertical_speed);
        }

        if sensors.left_walled {
            self.gravity = 0.0;
            self.horizontal_speed = (self.horizontal_speed - speed / 2.0).clamp(-clamp, clamp);

            if self.moving_forward {
                self.vertical_speed = (self.vertical_speed - speed).clamp(-clamp, clamp);
            } else {
                self.vertical_speed = (self.vertical_speed + speed).clamp(-clamp, clamp);
            }

            *velocity = Vec2::new(self.horizontal_speed, self.vertical_speed);
        }

        if sensors.right_walled {
            self.horizontal_speed = (self.horizontal_speed + speed / 2.0).clamp(-clamp, clamp);

            if !sensors.roofed {
                self.gravity = 0.0;
            }

            if self.moving_forward {
                self.vertical_speed = (self.vertical_speed + speed).clamp(-clamp, clamp);
            } else {
                self.vertical_speed = (self.vertical_speed - speed).clamp(-clamp, clamp);
            }

            *velocity = Vec2::new(self.horizontal_speed, self.vertical_speed);
        }

        // В свободном падении (или зажат между двумя стенами) гравитация
        // возвращается
        if !sensors.grounded && !sensors.roofed && sensors.left_walled == sensors.right_walled {
            self.gravity = gravity_reset;
        }
    }
}

/// Система: движение всех WallCrawler'ов
pub fn wall_crawler_motion(
    mut query: Query<(&WallCrawlerConfig, &SensorState, &mut WallCrawlerState, &mut PhysicsBody)>,
) {
    for (cfg, sensors, mut state, mut body) in query.iter_mut() {
        let mut velocity = body.velocity;
        let mut gravity = body.gravity_scale;
        state.tick(sensors, cfg.gravity_scale, &mut gravity, &mut velocity);
        body.velocity = velocity;
        body.gravity_scale = gravity;
    }
}
