//! Player motion — горизонтальный и вертикальный integrators
//!
//! Горизонталь: разгон к input направлению, торможение stop-force на
//! нейтрали, run mode, dash (фиксированная скорость × facing, гравитация
//! подвешена, длительность в tick'ах).
//!
//! Вертикаль: coyote time, jump buffering, double jump, early jump-cancel,
//! fall gravity multiplier, jump-hang окно, max fall clamp.
//!
//! Логика tick'а вынесена в чистые методы PlayerMotionState — системы лишь
//! тонкие обёртки (unit-тесты гоняют методы напрямую, без App).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Abilities, Facing, PhysicsBody, Player};
use crate::movement::{move_towards, DashStateChanged, PlayerIntent, TIMER_DECAY_PER_TICK};
use crate::sensors::SensorState;

/// Tunables игрока (immutable, загружаются хостом)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PlayerMotionConfig {
    // Горизонталь
    pub move_speed: f32,
    pub move_speed_clamp: f32,
    /// Run mode подменяет и скорость и clamp одним значением
    pub run_speed_clamp: f32,
    pub stop_force: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,

    // Вертикаль
    pub jump_height: f32,
    pub double_jump_height: f32,
    /// Авто-hop на земле при включённом double jump
    pub hop_height: f32,
    pub jump_stop_force: f32,
    pub jump_buffer_window: f32,
    pub coyote_window: f32,
    pub coyote_multiplier: f32,
    pub jump_hang_threshold: f32,
    pub jump_hang_gravity_multiplier: f32,

    // Гравитация
    pub gravity_scale: f32,
    pub fall_gravity_multiplier: f32,
    pub max_fall_speed: f32,
}

impl Default for PlayerMotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            move_speed_clamp: 5.0,
            run_speed_clamp: 10.0,
            stop_force: 10.0,
            dash_speed: 10.0,
            dash_duration: 1.0,
            jump_height: 11.0,
            double_jump_height: 11.0,
            hop_height: 5.5,
            jump_stop_force: 5.5,
            jump_buffer_window: 0.7,
            coyote_window: 0.7,
            coyote_multiplier: 1.1,
            jump_hang_threshold: 0.5,
            jump_hang_gravity_multiplier: 1.5,
            gravity_scale: 1.0,
            fall_gravity_multiplier: 2.0,
            max_fall_speed: 25.0,
        }
    }
}

/// Runtime state игрока
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerMotionState {
    pub horizontal_speed: f32,
    pub vertical_speed: f32,
    /// Gravity scale на СЛЕДУЮЩИЙ шаг физики (записывается в тело в начале
    /// вертикального tick'а, потом пересчитывается)
    pub gravity: f32,
    pub is_dashing: bool,
    pub dash_timer: f32,
    pub tried_to_jump: bool,
    pub ended_jump_early: bool,
    pub jump_buffer_timer: f32,
    pub coyote_timer: f32,
    pub coyote_jumped: bool,
    pub has_double_jumped: bool,
}

/// Исход горизонтального tick'а: сменился ли dash state (для события)
pub type DashToggle = Option<bool>;

impl PlayerMotionState {
    /// Горизонтальный integrator. Пишет velocity.x (и velocity.y = 0 во
    /// время dash). Возвращает dash-переход для нотификации.
    pub fn horizontal_tick(
        &mut self,
        cfg: &PlayerMotionConfig,
        intent: &PlayerIntent,
        sensors: &SensorState,
        facing_sign: f32,
        velocity: &mut Vec2,
    ) -> DashToggle {
        let supported = sensors.grounded || sensors.enemy_below;
        let mut toggle = None;

        // Dash edge: направление фиксируется по текущему facing
        if intent.dash_pressed {
            self.is_dashing = true;
            toggle = Some(true);
            self.horizontal_speed = cfg.dash_speed * facing_sign;
        }

        if self.is_dashing {
            self.dash_timer -= TIMER_DECAY_PER_TICK;
            if self.dash_timer <= 0.0 {
                self.is_dashing = false;
                toggle = Some(false);
            }
            // Горизонталь залочена, вертикаль обнулена на всю длительность
            velocity.x = self.horizontal_speed;
            velocity.y = 0.0;
        } else {
            // Dash перезаряжается только с опоры
            if supported {
                self.dash_timer = cfg.dash_duration;
            }

            let (speed, clamp) = if intent.run_held {
                (cfg.run_speed_clamp, cfg.run_speed_clamp)
            } else {
                (cfg.move_speed, cfg.move_speed_clamp)
            };

            if intent.horizontal != 0.0 {
                self.horizontal_speed += intent.horizontal * speed;
                self.horizontal_speed = self.horizontal_speed.clamp(-clamp, clamp);
            } else {
                self.horizontal_speed = move_towards(self.horizontal_speed, 0.0, cfg.stop_force);
            }

            velocity.x = self.horizontal_speed;
        }

        toggle
    }

    /// Вертикальный integrator. body_gravity — gravity scale тела, velocity
    /// — текущая velocity тела (y-компонента читается как измеренная).
    pub fn vertical_tick(
        &mut self,
        cfg: &PlayerMotionConfig,
        intent: &PlayerIntent,
        sensors: &SensorState,
        abilities: &Abilities,
        body_gravity: &mut f32,
        velocity: &mut Vec2,
    ) {
        // (a) сохранённый gravity scale уходит в тело до пересчёта
        *body_gravity = self.gravity;

        if self.is_dashing {
            self.gravity = 0.0;
            return;
        }

        self.gravity = cfg.gravity_scale;
        let supported = sensors.grounded || sensors.enemy_below;

        if supported {
            // Reset conditions
            self.coyote_timer = cfg.coyote_window;
            self.coyote_jumped = false;
            self.ended_jump_early = false;

            if abilities.double_jump {
                if self.has_double_jumped {
                    self.has_double_jumped = false;
                }
                // Авто-hop при движении — наблюдаемое поведение, сохранено
                if intent.horizontal != 0.0 {
                    self.vertical_speed = cfg.hop_height;
                    velocity.y = self.vertical_speed;
                }
            }
        } else {
            self.coyote_timer -= TIMER_DECAY_PER_TICK;
            if self.tried_to_jump {
                self.jump_buffer_timer -= TIMER_DECAY_PER_TICK;
            }
            if self.coyote_timer <= 0.0 {
                self.coyote_timer = 0.0;
            }
            if self.jump_buffer_timer <= 0.0 {
                self.jump_buffer_timer = 0.0;
            }
        }

        // Jump press: заряжает buffer; в воздухе помечает отложенную попытку;
        // прямой прыжок проходит с опоры или по double jump
        if intent.jump_pressed {
            self.jump_buffer_timer = cfg.jump_buffer_window;
            if !supported {
                self.tried_to_jump = true;
            }

            if supported || (abilities.double_jump && !self.has_double_jumped) {
                self.vertical_speed = cfg.jump_height;

                if !supported {
                    self.vertical_speed = cfg.double_jump_height;
                    self.has_double_jumped = true;
                    velocity.y = 0.0;
                }

                velocity.y = self.vertical_speed;
            }
        }

        if intent.jump_released && !supported && velocity.y > 0.0 {
            self.ended_jump_early = true;
        }

        // Buffer: ранний запрос срабатывает на приземлении
        if self.tried_to_jump && supported {
            if self.jump_buffer_timer > 0.0 {
                self.vertical_speed = cfg.jump_height;
                velocity.y = self.vertical_speed;
            }
            self.tried_to_jump = false;
        }
        // Coyote: запрос в воздухе в пределах окна, ровно один раз
        else if self.tried_to_jump && !supported {
            if self.coyote_timer > 0.0 && !self.coyote_jumped {
                self.vertical_speed = cfg.jump_height;
                velocity.y = self.vertical_speed * cfg.coyote_multiplier;
                self.coyote_jumped = true;
                self.tried_to_jump = false;
            }
        }

        // Early cancel: отпускание на подъёме срезает скорость один раз
        if self.ended_jump_early && velocity.y > 0.0 {
            velocity.y -= cfg.jump_stop_force;
            self.ended_jump_early = false;
        }

        // Ускоренное падение
        if velocity.y < 0.0 && !sensors.enemy_below {
            self.gravity = cfg.gravity_scale * cfg.fall_gravity_multiplier;
        }

        // Max fall clamp
        velocity.y = velocity.y.max(-cfg.max_fall_speed);

        // Jump hang: у вершины дуги гравитация ослаблена
        if !supported && velocity.y.abs() < cfg.jump_hang_threshold {
            self.gravity *= cfg.jump_hang_gravity_multiplier;
        }
    }
}

/// Система: горизонтальное движение игрока + facing + dash нотификации
pub fn player_horizontal_motion(
    mut query: Query<
        (
            Entity,
            &PlayerMotionConfig,
            &PlayerIntent,
            &SensorState,
            &mut Facing,
            &mut PlayerMotionState,
            &mut PhysicsBody,
        ),
        With<Player>,
    >,
    mut dash_events: EventWriter<DashStateChanged>,
) {
    for (entity, cfg, intent, sensors, mut facing, mut state, mut body) in query.iter_mut() {
        // Facing по знаку измеренной скорости (на нуле сохраняется)
        if let Some(new_facing) = Facing::from_velocity_x(body.velocity.x) {
            if *facing != new_facing {
                *facing = new_facing;
            }
        }

        let mut velocity = body.velocity;
        let toggle = state.horizontal_tick(cfg, intent, sensors, facing.sign(), &mut velocity);
        body.velocity = velocity;

        if let Some(dashing) = toggle {
            dash_events.write(DashStateChanged { entity, dashing });
        }
    }
}

/// Система: вертикальное движение игрока
pub fn player_vertical_motion(
    mut query: Query<
        (
            &PlayerMotionConfig,
            &PlayerIntent,
            &SensorState,
            &Abilities,
            &mut PlayerMotionState,
            &mut PhysicsBody,
        ),
        With<Player>,
    >,
) {
    for (cfg, intent, sensors, abilities, mut state, mut body) in query.iter_mut() {
        let mut velocity = body.velocity;
        let mut gravity = body.gravity_scale;
        state.vertical_tick(cfg, intent, sensors, abilities, &mut gravity, &mut velocity);
        body.velocity = velocity;
        body.gravity_scale = gravity;
    }
}
