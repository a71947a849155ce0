//! Host input → intent mapping
//!
//! Host engine кладёт сырой кадр ввода в [`InputFrame`] перед симуляцией;
//! mapper раз в fixed tick переводит уровни кнопок в edge-triggered intents
//! игрока. Edge'ы считаются против кадра предыдущего tick'а, так что
//! intents не зависят от частоты опроса хоста.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Abilities, Player};
use crate::movement::PlayerIntent;

/// Сырой кадр ввода от хоста: уровни, не edge'ы
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Горизонтальная ось, [-1, 1]
    pub horizontal: f32,
    pub jump_held: bool,
    pub run_held: bool,
    pub dash_held: bool,
    pub fire_held: bool,
    pub alt_fire_held: bool,
}

/// Кадр предыдущего tick'а для edge-детекции
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PrevInputFrame(pub InputFrame);

/// Горизонтальная ось сменила значение (для визуала/анимаций хоста)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HorizontalInputChanged {
    pub horizontal: f32,
}

/// Система: intents всем игрокам из текущего кадра ввода
pub fn map_input_intents(
    frame: Res<InputFrame>,
    mut prev: ResMut<PrevInputFrame>,
    mut players: Query<(&Abilities, &mut PlayerIntent), With<Player>>,
    mut axis_events: EventWriter<HorizontalInputChanged>,
) {
    let jump_pressed = frame.jump_held && !prev.0.jump_held;
    let jump_released = !frame.jump_held && prev.0.jump_held;
    let dash_edge = frame.dash_held && !prev.0.dash_held;
    let fire_pressed = frame.fire_held && !prev.0.fire_held;
    let alt_fire_pressed = frame.alt_fire_held && !prev.0.alt_fire_held;

    if frame.horizontal != prev.0.horizontal {
        axis_events.write(HorizontalInputChanged {
            horizontal: frame.horizontal,
        });
    }

    for (abilities, mut intent) in players.iter_mut() {
        intent.horizontal = frame.horizontal;
        intent.run_held = frame.run_held;
        intent.jump_pressed = jump_pressed;
        intent.jump_released = jump_released;
        // Dash открывается power-up'ом
        intent.dash_pressed = dash_edge && abilities.dash;
        intent.fire_pressed = fire_pressed;
        intent.alt_fire_pressed = alt_fire_pressed && abilities.alt_fire;
    }

    prev.0 = *frame;
}
