//! Уровневый glue: spawn points, порталы, death barriers, power-ups
//!
//! Всё триггерное здесь работает по enter-edge'у: регион помнит, кто был
//! внутри на прошлом tick'е, и срабатывает только на вход. Выход из региона
//! ничего не стоит.

pub mod spawn;

pub use spawn::{
    spawn_critter, spawn_leaper, spawn_platform, spawn_player, spawn_wall_crawler,
    validate_actor_setup,
};

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Abilities, BodyExtents, Player};
use crate::combat::Health;
use crate::sensors::probes::Aabb;

/// Точка возрождения; позиция берётся из её Transform
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint;

/// Привязка игрока к его точке возрождения
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct SpawnAnchor {
    pub point: Entity,
}

/// Триггерный регион в мировых координатах
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct TriggerRegion {
    pub half_extents: Vec2,
}

impl Default for TriggerRegion {
    fn default() -> Self {
        Self {
            half_extents: Vec2::splat(0.5),
        }
    }
}

/// Куда ведёт портал
#[derive(Component, Debug, Clone, Reflect)]
pub enum PortalDestination {
    /// Телепорт к entity со SpawnPoint
    Teleport(Entity),
    /// Запрос смены сцены хосту
    Scene(String),
}

/// Барьер смерти: возврат игрока на точку возрождения без урона
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct DeathBarrier {
    pub spawn_point: Entity,
}

/// Вид power-up'а
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum PowerUpKind {
    DoubleJump,
    Dash,
    UpSize,
}

/// Подбираемый power-up; потребляется первым вошедшим игроком
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
}

/// Запрос смены сцены к host engine
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneChangeRequest {
    pub scene: String,
}

impl SceneChangeRequest {
    pub fn scene(name: &str) -> Self {
        Self {
            scene: name.to_string(),
        }
    }
}

/// Игрок вошёл в триггерный регион
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEntered {
    pub trigger: Entity,
    pub player: Entity,
}

/// Память входов предыдущего tick'а
#[derive(Resource, Debug, Default)]
pub struct TriggerTracker {
    inside: HashSet<(Entity, Entity)>,
}

/// Система: enter-edge'ы игроков по всем триггерным регионам
pub fn detect_trigger_entries(
    mut tracker: ResMut<TriggerTracker>,
    triggers: Query<(Entity, &Transform, &TriggerRegion)>,
    players: Query<(Entity, &Transform, &BodyExtents), With<Player>>,
    mut entry_events: EventWriter<TriggerEntered>,
) {
    let mut current = HashSet::new();
    for (trigger, trigger_transform, region) in triggers.iter() {
        let trigger_box =
            Aabb::from_center_half(trigger_transform.translation.truncate(), region.half_extents);
        for (player, player_transform, extents) in players.iter() {
            let player_box =
                Aabb::from_center_half(player_transform.translation.truncate(), extents.half);
            if trigger_box.intersects(&player_box) {
                let key = (trigger, player);
                current.insert(key);
                if !tracker.inside.contains(&key) {
                    entry_events.write(TriggerEntered { trigger, player });
                }
            }
        }
    }
    tracker.inside = current;
}

/// Система: порталы — телепорт или запрос сцены
pub fn process_portals(
    mut entry_events: EventReader<TriggerEntered>,
    portals: Query<&PortalDestination>,
    spawn_points: Query<&Transform, (With<SpawnPoint>, Without<Player>)>,
    mut players: Query<&mut Transform, With<Player>>,
    mut scene_events: EventWriter<SceneChangeRequest>,
) {
    for entry in entry_events.read() {
        let Ok(destination) = portals.get(entry.trigger) else {
            continue;
        };
        match destination {
            PortalDestination::Scene(name) => {
                scene_events.write(SceneChangeRequest::scene(name));
            }
            PortalDestination::Teleport(point) => {
                if let (Ok(point_transform), Ok(mut player_transform)) =
                    (spawn_points.get(*point), players.get_mut(entry.player))
                {
                    player_transform.translation = point_transform.translation;
                }
            }
        }
    }
}

/// Система: барьеры смерти возвращают игрока на spawn point
pub fn process_death_barriers(
    mut entry_events: EventReader<TriggerEntered>,
    barriers: Query<&DeathBarrier>,
    spawn_points: Query<&Transform, (With<SpawnPoint>, Without<Player>)>,
    mut players: Query<&mut Transform, With<Player>>,
) {
    for entry in entry_events.read() {
        let Ok(barrier) = barriers.get(entry.trigger) else {
            continue;
        };
        if let (Ok(point_transform), Ok(mut player_transform)) =
            (spawn_points.get(barrier.spawn_point), players.get_mut(entry.player))
        {
            player_transform.translation = point_transform.translation;
        }
    }
}

/// Система: подбор power-up'ов
pub fn process_power_ups(
    mut commands: Commands,
    mut entry_events: EventReader<TriggerEntered>,
    power_ups: Query<&PowerUp>,
    mut players: Query<(&mut Abilities, &mut Health), With<Player>>,
) {
    let mut consumed = HashSet::new();
    for entry in entry_events.read() {
        if consumed.contains(&entry.trigger) {
            continue;
        }
        let Ok(power_up) = power_ups.get(entry.trigger) else {
            continue;
        };
        let Ok((mut abilities, mut health)) = players.get_mut(entry.player) else {
            continue;
        };

        match power_up.kind {
            PowerUpKind::DoubleJump => abilities.double_jump = true,
            PowerUpKind::Dash => abilities.dash = true,
            PowerUpKind::UpSize => health.up_size = true,
        }

        consumed.insert(entry.trigger);
        commands.entity(entry.trigger).despawn();
    }
}
