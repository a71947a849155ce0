//! Физическая прослойка
//!
//! Архитектура:
//! - Rapier для коллизий (RigidBody::KinematicPositionBased)
//! - Custom velocity integration (не используем Rapier forces)
//! - Gravity по per-unit gravity scale, интеграторы пишут scale сами
//!
//! Детерминизм: fixed timestep (50Hz), дробный dt нигде не появляется.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::components::PhysicsBody;
use crate::sensors::SensorState;

/// Длительность одного fixed tick'а (50Hz)
///
/// Константа, а не `Time<Fixed>`: headless тесты прогоняют FixedUpdate
/// напрямую через `run_schedule`, без часов.
pub const TICK_DT: f32 = 1.0 / 50.0;

/// Базовая гравитация (m/s²), масштабируется per-unit gravity scale
pub const GRAVITY: f32 = -9.81;

/// Collision groups: actors не толкают друг друга, контакты между ними
/// идут триггерами
pub const GROUP_SOLID: Group = Group::GROUP_1;
pub const GROUP_PLAYER: Group = Group::GROUP_2;
pub const GROUP_ENEMY: Group = Group::GROUP_3;
pub const GROUP_PROJECTILE: Group = Group::GROUP_4;

pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_PLAYER, GROUP_SOLID)
}

pub fn enemy_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_ENEMY, GROUP_SOLID | GROUP_PROJECTILE)
}

pub fn solid_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_SOLID, Group::ALL)
}

pub fn projectile_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_PROJECTILE, GROUP_SOLID | GROUP_ENEMY)
}

/// Система применения gravity к velocity
///
/// На земле гравитация не копится: у хоста её гасит collision response,
/// headless обязан делать то же сам.
pub fn apply_gravity(mut query: Query<(&mut PhysicsBody, Option<&SensorState>)>) {
    for (mut body, sensors) in query.iter_mut() {
        let grounded = sensors.is_some_and(|s| s.grounded || s.enemy_below);
        if !grounded {
            let scale = body.gravity_scale;
            body.velocity.y += GRAVITY * scale * TICK_DT;
        }
    }
}

/// Система headless-замены collision response
///
/// Составляющая скорости в сторону зарегистрированного статичного
/// контакта гасится, как это сделал бы solver хоста. Без этого stall-флипы
/// врагов (измеренная скорость 0 у стены) никогда не срабатывают.
pub fn resolve_static_contacts(mut query: Query<(&mut PhysicsBody, &SensorState)>) {
    for (mut body, sensors) in query.iter_mut() {
        if sensors.grounded && body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
        if sensors.roofed && body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
        if sensors.left_walled && body.velocity.x < 0.0 {
            body.velocity.x = 0.0;
        }
        if sensors.right_walled && body.velocity.x > 0.0 {
            body.velocity.x = 0.0;
        }
    }
}

/// Система интеграции velocity → Transform (headless режим, без Rapier)
pub fn integrate_velocity_to_transform(mut query: Query<(&PhysicsBody, &mut Transform)>) {
    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity.extend(0.0) * TICK_DT;
    }
}

/// Система синхронизации нашего PhysicsBody с Rapier
///
/// Rapier сам применяет velocity к KinematicPositionBased телам; здесь
/// только отдаём ему наши значения.
pub fn sync_velocity_to_rapier(
    mut query: Query<(&PhysicsBody, &mut Velocity, &mut GravityScale)>,
) {
    for (body, mut rapier_velocity, mut rapier_gravity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
        rapier_gravity.0 = body.gravity_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_scaled_per_unit() {
        let mut body = PhysicsBody {
            velocity: Vec2::ZERO,
            gravity_scale: 3.0,
        };

        body.velocity.y += GRAVITY * body.gravity_scale * TICK_DT;

        // -9.81 * 3 / 50
        assert!((body.velocity.y + 0.5886).abs() < 1e-4);
    }

    #[test]
    fn test_grounded_blocks_gravity() {
        let sensors = SensorState {
            grounded: true,
            ..Default::default()
        };
        let mut body = PhysicsBody {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        };

        let grounded = sensors.grounded || sensors.enemy_below;
        if !grounded {
            body.velocity.y += GRAVITY * body.gravity_scale * TICK_DT;
        }

        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_integration_step() {
        let body = PhysicsBody {
            velocity: Vec2::new(5.0, -2.0),
            gravity_scale: 1.0,
        };
        let mut translation = Vec3::ZERO;

        translation += body.velocity.extend(0.0) * TICK_DT;

        assert!((translation.x - 0.1).abs() < 1e-6);
        assert!((translation.y + 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_contact_resolution_stops_motion_into_geometry() {
        let sensors = SensorState {
            grounded: true,
            right_walled: true,
            ..Default::default()
        };
        let mut body = PhysicsBody {
            velocity: Vec2::new(5.0, -11.0),
            gravity_scale: 1.0,
        };

        if sensors.grounded && body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
        if sensors.right_walled && body.velocity.x > 0.0 {
            body.velocity.x = 0.0;
        }

        // Движение в сторону контакта гасится, свободные оси не трогаем
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_group_filters() {
        // Игрок не коллайдит с врагами: контактный урон идёт триггерами
        assert!(!player_groups().filters.contains(GROUP_ENEMY));
        assert!(player_groups().filters.contains(GROUP_SOLID));
        assert!(projectile_groups().filters.contains(GROUP_ENEMY));
        assert!(!projectile_groups().filters.contains(GROUP_PLAYER));
    }
}
