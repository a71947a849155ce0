//! Spawn helpers: полные наборы компонентов для акторов и геометрии
//!
//! Единственное место, где собираются bundles. Неполный актор — это
//! ошибка уровня, validate_actor_setup снимает таких при спавне.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::ai::{LeaperAgent, WallCrawlerAgent};
use crate::combat::{ContactDamage, Health, KnockbackConfig};
use crate::components::{
    Abilities, Actor, Archetype, BodyExtents, Facing, Player, PhysicsBody,
};
use crate::logger::log_error;
use crate::movement::{
    CritterConfig, CritterState, LeaperConfig, LeaperState, PlayerIntent, PlayerMotionConfig,
    PlayerMotionState, WallCrawlerConfig, WallCrawlerState,
};
use crate::physics;
use crate::sensors::probes::StaticGeometry;
use crate::sensors::{SensorShape, SensorState};
use crate::shooting::ProjectileLauncher;
use crate::stage::SpawnAnchor;

const ACTOR_HALF_EXTENTS: Vec2 = Vec2::splat(0.5);

/// Спавн игрока, привязанного к точке возрождения
pub fn spawn_player(commands: &mut Commands, position: Vec2, spawn_point: Entity) -> Entity {
    commands
        .spawn((
            (
                Transform::from_translation(position.extend(0.0)),
                Actor::new(Archetype::Player),
                Player,
                Facing::default(),
                PhysicsBody::default(),
                BodyExtents { half: ACTOR_HALF_EXTENTS },
                SensorShape::new(ACTOR_HALF_EXTENTS),
                SensorState::default(),
                Abilities::default(),
                PlayerIntent::default(),
            ),
            (
                PlayerMotionConfig::default(),
                PlayerMotionState::default(),
                KnockbackConfig::default(),
                Health::default(),
                ProjectileLauncher::default(),
                SpawnAnchor { point: spawn_point },
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::cuboid(ACTOR_HALF_EXTENTS.x, ACTOR_HALF_EXTENTS.y),
                Velocity::default(),
                GravityScale(1.0),
                physics::player_groups(),
            ),
        ))
        .id()
}

/// Спавн Critter'а
pub fn spawn_critter(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            (
                Transform::from_translation(position.extend(0.0)),
                Actor::new(Archetype::Critter),
                PhysicsBody {
                    gravity_scale: 3.0,
                    ..Default::default()
                },
                BodyExtents { half: ACTOR_HALF_EXTENTS },
                SensorShape::new(ACTOR_HALF_EXTENTS),
                SensorState::default(),
                CritterConfig::default(),
                CritterState::default(),
                ContactDamage::default(),
                Health::default(),
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::cuboid(ACTOR_HALF_EXTENTS.x, ACTOR_HALF_EXTENTS.y),
                Velocity::default(),
                GravityScale(3.0),
                physics::enemy_groups(),
            ),
        ))
        .id()
}

/// Спавн Leaper'а вместе с его агентом
pub fn spawn_leaper(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            (
                Transform::from_translation(position.extend(0.0)),
                Actor::new(Archetype::Leaper),
                PhysicsBody {
                    gravity_scale: 3.0,
                    ..Default::default()
                },
                BodyExtents { half: ACTOR_HALF_EXTENTS },
                SensorShape::new(ACTOR_HALF_EXTENTS),
                SensorState::default(),
                LeaperConfig::default(),
                LeaperState::default(),
                LeaperAgent::default(),
                ContactDamage::default(),
            ),
            (
                Health::default(),
                RigidBody::KinematicPositionBased,
                Collider::cuboid(ACTOR_HALF_EXTENTS.x, ACTOR_HALF_EXTENTS.y),
                Velocity::default(),
                GravityScale(3.0),
                physics::enemy_groups(),
            ),
        ))
        .id()
}

/// Спавн WallCrawler'а вместе с его агентом
pub fn spawn_wall_crawler(commands: &mut Commands, position: Vec2) -> Entity {
    let cfg = WallCrawlerConfig::default();
    let state = WallCrawlerState::for_config(&cfg);
    commands
        .spawn((
            (
                Transform::from_translation(position.extend(0.0)),
                Actor::new(Archetype::WallCrawler),
                PhysicsBody {
                    gravity_scale: 3.0,
                    ..Default::default()
                },
                BodyExtents { half: ACTOR_HALF_EXTENTS },
                SensorShape::new(ACTOR_HALF_EXTENTS),
                SensorState::default(),
                cfg,
                state,
                WallCrawlerAgent::default(),
                ContactDamage::default(),
            ),
            (
                Health::default(),
                RigidBody::KinematicPositionBased,
                Collider::cuboid(ACTOR_HALF_EXTENTS.x, ACTOR_HALF_EXTENTS.y),
                Velocity::default(),
                GravityScale(3.0),
                physics::enemy_groups(),
            ),
        ))
        .id()
}

/// Спавн статичной платформы: rapier-коллайдер + регистрация в headless
/// probe-геометрии
pub fn spawn_platform(
    commands: &mut Commands,
    geometry: &mut StaticGeometry,
    center: Vec2,
    half: Vec2,
) -> Entity {
    geometry.add_solid(center, half);
    commands
        .spawn((
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            physics::solid_groups(),
        ))
        .id()
}

/// Система: валидация свежих акторов
///
/// Актор без тела или сенсоров молча ломает tick loop, поэтому снимаем
/// его сразу и громко.
pub fn validate_actor_setup(
    mut commands: Commands,
    fresh: Query<
        (Entity, &Actor, Option<&PhysicsBody>, Option<&SensorState>, Option<&BodyExtents>),
        Added<Actor>,
    >,
) {
    for (entity, actor, body, sensors, extents) in fresh.iter() {
        let mut missing: Vec<&str> = Vec::new();
        if body.is_none() {
            missing.push("PhysicsBody");
        }
        if sensors.is_none() {
            missing.push("SensorState");
        }
        if extents.is_none() {
            missing.push("BodyExtents");
        }
        if !missing.is_empty() {
            log_error(&format!(
                "{:?} ({:?}) spawned without {}, despawning",
                entity,
                actor.archetype,
                missing.join(", ")
            ));
            commands.entity(entity).despawn();
        }
    }
}
