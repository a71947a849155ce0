//! Стрельба игрока и полёт снарядов
//!
//! Снаряд — самостоятельный актор с прямолинейным полётом вдоль facing.
//! Alt-выстрел берёт тот же снаряд и умножает его параметры.

use bevy::prelude::*;

use crate::combat::Health;
use crate::components::{Actor, BodyExtents, Facing, Player};
use crate::movement::PlayerIntent;
use crate::physics::TICK_DT;
use crate::sensors::probes::{Aabb, StaticGeometry};

/// Параметры пусковой установки игрока
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ProjectileLauncher {
    /// Смещение точки вылета от центра тела (x отражается по facing)
    pub muzzle_offset: Vec2,
    pub projectile_speed: f32,
    pub projectile_mass: f32,
    pub projectile_damage: f32,
    pub projectile_half_extents: Vec2,
    pub alt_speed_multiplier: f32,
    pub alt_mass_multiplier: f32,
    pub alt_damage_multiplier: f32,
}

impl Default for ProjectileLauncher {
    fn default() -> Self {
        Self {
            muzzle_offset: Vec2::new(0.7, 0.0),
            projectile_speed: 20.0,
            projectile_mass: 1.0,
            projectile_damage: 1.0,
            projectile_half_extents: Vec2::splat(0.1),
            alt_speed_multiplier: 2.0,
            alt_mass_multiplier: 2.0,
            alt_damage_multiplier: 9.0,
        }
    }
}

/// Летящий снаряд
///
/// Скорость живёт прямо здесь: снаряд не участвует в общем velocity
/// pipeline (гравитация, contact resolution), летит по прямой сам.
#[derive(Component, Debug, Clone, Reflect)]
pub struct Projectile {
    pub damage: f32,
    pub mass: f32,
    pub velocity: Vec2,
    pub spawned_by: Entity,
}

/// Система: выстрелы по intents
///
/// Alt-выстрел проверяется способностью уже в input mapper'е; здесь intent
/// либо есть, либо нет.
pub fn player_fire(
    mut commands: Commands,
    players: Query<(Entity, &Transform, &Facing, &PlayerIntent, &ProjectileLauncher), With<Player>>,
) {
    for (player, transform, facing, intent, launcher) in players.iter() {
        let alt = intent.alt_fire_pressed;
        if !intent.fire_pressed && !alt {
            continue;
        }

        let mut speed = launcher.projectile_speed;
        let mut mass = launcher.projectile_mass;
        let mut damage = launcher.projectile_damage;
        let mut half = launcher.projectile_half_extents;
        if alt {
            speed *= launcher.alt_speed_multiplier;
            mass *= launcher.alt_mass_multiplier;
            damage *= launcher.alt_damage_multiplier;
            half *= 2.0;
        }

        let muzzle = transform.translation.truncate()
            + Vec2::new(launcher.muzzle_offset.x * facing.sign(), launcher.muzzle_offset.y);

        commands.spawn((
            Projectile {
                damage,
                mass,
                velocity: Vec2::new(speed * facing.sign(), 0.0),
                spawned_by: player,
            },
            Transform::from_translation(muzzle.extend(0.0)),
            BodyExtents { half },
        ));
    }
}

/// Система: полёт и попадания снарядов
///
/// Снаряд игнорирует игроков и другие снаряды; враг получает урон, любое
/// другое препятствие просто гасит снаряд.
pub fn projectile_flight(
    mut commands: Commands,
    geometry: Res<StaticGeometry>,
    mut projectiles: Query<(Entity, &Projectile, &BodyExtents, &mut Transform), Without<Actor>>,
    mut enemies: Query<(&Transform, &BodyExtents, &mut Health, &Actor), Without<Projectile>>,
) {
    for (entity, projectile, projectile_extents, mut transform) in projectiles.iter_mut() {
        transform.translation += projectile.velocity.extend(0.0) * TICK_DT;

        let projectile_box = Aabb::from_center_half(
            transform.translation.truncate(),
            projectile_extents.half,
        );

        if geometry.hits(&projectile_box) {
            commands.entity(entity).despawn();
            continue;
        }

        for (enemy_transform, extents, mut health, actor) in enemies.iter_mut() {
            if actor.is_player() {
                continue;
            }
            let enemy_box =
                Aabb::from_center_half(enemy_transform.translation.truncate(), extents.half);
            if projectile_box.intersects(&enemy_box) {
                health.damage(projectile.damage);
                commands.entity(entity).despawn();
                break;
            }
        }
    }
}
