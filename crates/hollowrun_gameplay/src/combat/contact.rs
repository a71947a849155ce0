//! Контакты акторов: enter-edge детекция и её потребители
//!
//! Host engine репортит триггерные контакты событием входа; в headless
//! симуляции тот же edge восстанавливается пересечением AABB с памятью о
//! предыдущем tick'е. Весь контактный урон и отбрасывание сидят на edge'ах:
//! пока тела остаются в пересечении, повторных срабатываний нет.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Actor, BodyExtents, PhysicsBody, Player};
use crate::combat::Health;
use crate::movement::{CritterState, LeaperState, PlayerMotionState, WallCrawlerState};
use crate::sensors::probes::Aabb;
use crate::sensors::SensorState;

/// Контактный урон врага при касании игрока
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ContactDamage {
    pub amount: f32,
}

impl Default for ContactDamage {
    fn default() -> Self {
        Self { amount: 1.0 }
    }
}

/// Скорости отбрасывания игрока при касании врага
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct KnockbackConfig {
    pub knock_back_speed: f32,
    pub knock_up_speed: f32,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            knock_back_speed: 10.0,
            knock_up_speed: 10.0,
        }
    }
}

/// Пара акторов вошла в пересечение на этом tick'е
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStarted {
    pub a: Entity,
    pub b: Entity,
}

/// Память пересечений предыдущего tick'а
#[derive(Resource, Debug, Default)]
pub struct ContactTracker {
    touching: HashSet<(Entity, Entity)>,
}

fn ordered(a: Entity, b: Entity) -> (Entity, Entity) {
    if a < b { (a, b) } else { (b, a) }
}

impl ContactTracker {
    pub fn is_touching(&self, a: Entity, b: Entity) -> bool {
        self.touching.contains(&ordered(a, b))
    }
}

/// Система: пересечения всех пар акторов, события только на входе
pub fn detect_actor_contacts(
    mut tracker: ResMut<ContactTracker>,
    actors: Query<(Entity, &Transform, &BodyExtents), With<Actor>>,
    mut contact_events: EventWriter<ContactStarted>,
) {
    let boxes: Vec<(Entity, Aabb)> = actors
        .iter()
        .map(|(entity, transform, extents)| {
            (entity, Aabb::from_center_half(transform.translation.truncate(), extents.half))
        })
        .collect();

    let mut current = HashSet::new();
    for (i, (a, box_a)) in boxes.iter().enumerate() {
        for (b, box_b) in boxes.iter().skip(i + 1) {
            if box_a.intersects(box_b) {
                let key = ordered(*a, *b);
                current.insert(key);
                if !tracker.touching.contains(&key) {
                    contact_events.write(ContactStarted { a: key.0, b: key.1 });
                }
            }
        }
    }

    tracker.touching = current;
}

/// Система: контактный урон врагов по игрокам
///
/// Leaper кусается только когда его собственные enemy-сенсоры что-то видят —
/// унаследованное условие, без него он безобиден (см. DESIGN.md).
pub fn apply_contact_damage(
    mut contact_events: EventReader<ContactStarted>,
    enemies: Query<(&ContactDamage, Option<&LeaperState>, Option<&SensorState>), With<Actor>>,
    mut players: Query<&mut Health, With<Player>>,
) {
    for contact in contact_events.read() {
        for (enemy, player) in [(contact.a, contact.b), (contact.b, contact.a)] {
            let Ok((damage, leaper, sensors)) = enemies.get(enemy) else {
                continue;
            };
            let Ok(mut health) = players.get_mut(player) else {
                continue;
            };
            if leaper.is_some() {
                let adjacent = sensors.is_some_and(|s| s.any_enemy_adjacent());
                if !adjacent {
                    continue;
                }
            }
            health.damage(damage.amount);
        }
    }
}

/// Система: отбрасывание игрока от врага
///
/// Вертикаль по знаку разницы высот; горизонталь только в узкой полосе
/// dy ∈ (-0.9, 0], когда враг примерно на уровне ног.
pub fn apply_contact_knockback(
    mut contact_events: EventReader<ContactStarted>,
    enemies: Query<&Transform, (With<ContactDamage>, Without<Player>)>,
    mut players: Query<
        (&Transform, &KnockbackConfig, &mut PlayerMotionState, &mut PhysicsBody),
        With<Player>,
    >,
) {
    for contact in contact_events.read() {
        for (enemy, player) in [(contact.a, contact.b), (contact.b, contact.a)] {
            let Ok(enemy_transform) = enemies.get(enemy) else {
                continue;
            };
            let Ok((player_transform, knockback, mut state, mut body)) = players.get_mut(player)
            else {
                continue;
            };

            let delta = enemy_transform.translation - player_transform.translation;

            if delta.y > 0.0 {
                state.vertical_speed = -knockback.knock_up_speed;
            } else {
                state.vertical_speed = knockback.knock_up_speed;
            }
            body.velocity.y = state.vertical_speed;

            if delta.y <= 0.0 && delta.y > -0.9 {
                if delta.x >= 0.0 {
                    state.horizontal_speed = -knockback.knock_back_speed;
                } else {
                    state.horizontal_speed = knockback.knock_back_speed;
                }
                body.velocity.x = state.horizontal_speed;
            }
        }
    }
}

/// Система: враги разворачивают патруль при касании друг друга
pub fn flip_patrol_on_enemy_contact(
    mut contact_events: EventReader<ContactStarted>,
    actors: Query<&Actor>,
    mut critters: Query<&mut CritterState>,
    mut leapers: Query<&mut LeaperState>,
    mut crawlers: Query<&mut WallCrawlerState>,
) {
    for contact in contact_events.read() {
        let both_enemies = [contact.a, contact.b]
            .iter()
            .all(|entity| actors.get(*entity).map(|actor| actor.is_enemy()).unwrap_or(false));
        if !both_enemies {
            continue;
        }

        for entity in [contact.a, contact.b] {
            if let Ok(mut state) = critters.get_mut(entity) {
                state.flip_direction();
            } else if let Ok(mut state) = leapers.get_mut(entity) {
                state.flip_direction();
            } else if let Ok(mut state) = crawlers.get_mut(entity) {
                state.flip_direction();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Archetype;

    fn contact_app() -> App {
        let mut app = App::new();
        app.init_resource::<ContactTracker>();
        app.add_event::<ContactStarted>();
        app.add_systems(
            Update,
            (
                detect_actor_contacts,
                apply_contact_damage,
                apply_contact_knockback,
                flip_patrol_on_enemy_contact,
            )
                .chain(),
        );
        app
    }

    fn spawn_player(app: &mut App, pos: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Actor {
                    archetype: Archetype::Player,
                },
                Player,
                Transform::from_translation(pos.extend(0.0)),
                BodyExtents { half: Vec2::splat(0.5) },
                Health::default(),
                KnockbackConfig::default(),
                PlayerMotionState::default(),
                PhysicsBody::default(),
            ))
            .id()
    }

    fn spawn_critter(app: &mut App, pos: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Actor {
                    archetype: Archetype::Critter,
                },
                Transform::from_translation(pos.extend(0.0)),
                BodyExtents { half: Vec2::splat(0.5) },
                ContactDamage::default(),
                CritterState::default(),
            ))
            .id()
    }

    #[test]
    fn test_contact_fires_once_per_overlap() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        spawn_critter(&mut app, Vec2::new(0.6, 0.0));

        app.update();
        let after_first = app.world().get::<Health>(player).unwrap().current();

        // Тела всё ещё пересекаются — повторного урона нет
        app.update();
        let after_second = app.world().get::<Health>(player).unwrap().current();

        assert_eq!(after_first, 9.0);
        assert_eq!(after_second, 9.0);
    }

    #[test]
    fn test_reentry_damages_again() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        let critter = spawn_critter(&mut app, Vec2::new(0.6, 0.0));

        app.update();

        // Враг отходит и возвращается
        app.world_mut().get_mut::<Transform>(critter).unwrap().translation.x = 5.0;
        app.update();
        app.world_mut().get_mut::<Transform>(critter).unwrap().translation.x = 0.6;
        app.update();

        assert_eq!(app.world().get::<Health>(player).unwrap().current(), 8.0);
    }

    #[test]
    fn test_side_contact_knocks_back_and_up() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        // Враг справа, чуть ниже центра — полоса горизонтального добавка
        spawn_critter(&mut app, Vec2::new(0.8, -0.3));

        app.update();

        let state = app.world().get::<PlayerMotionState>(player).unwrap();
        assert_eq!(state.horizontal_speed, -10.0);
        assert_eq!(state.vertical_speed, 10.0);

        let body = app.world().get::<PhysicsBody>(player).unwrap();
        assert_eq!(body.velocity, Vec2::new(-10.0, 10.0));
    }

    #[test]
    fn test_contact_from_above_knocks_down() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        spawn_critter(&mut app, Vec2::new(0.0, 0.8));

        app.update();

        let state = app.world().get::<PlayerMotionState>(player).unwrap();
        assert_eq!(state.vertical_speed, -10.0);
        // Враг выше полосы — горизонталь не тронута
        assert_eq!(state.horizontal_speed, 0.0);
    }

    #[test]
    fn test_stomp_bounces_without_sideways_push() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        // Враг глубоко под ногами, за полосой −0.9
        spawn_critter(&mut app, Vec2::new(0.0, -0.95));

        app.update();

        let state = app.world().get::<PlayerMotionState>(player).unwrap();
        assert_eq!(state.vertical_speed, 10.0);
        assert_eq!(state.horizontal_speed, 0.0);
    }

    #[test]
    fn test_enemy_pair_flips_both() {
        let mut app = contact_app();
        let first = spawn_critter(&mut app, Vec2::ZERO);
        let second = spawn_critter(&mut app, Vec2::new(0.6, 0.0));

        app.update();

        assert!(app.world().get::<CritterState>(first).unwrap().moving_forward);
        assert!(app.world().get::<CritterState>(second).unwrap().moving_forward);
    }

    #[test]
    fn test_player_contact_does_not_flip_enemy() {
        let mut app = contact_app();
        spawn_player(&mut app, Vec2::ZERO);
        let critter = spawn_critter(&mut app, Vec2::new(0.6, 0.0));

        app.update();

        assert!(!app.world().get::<CritterState>(critter).unwrap().moving_forward);
    }

    #[test]
    fn test_leaper_bite_gated_by_adjacency() {
        let mut app = contact_app();
        let player = spawn_player(&mut app, Vec2::ZERO);
        let leaper = app
            .world_mut()
            .spawn((
                Actor {
                    archetype: Archetype::Leaper,
                },
                Transform::from_translation(Vec3::new(0.6, 0.0, 0.0)),
                BodyExtents { half: Vec2::splat(0.5) },
                ContactDamage::default(),
                LeaperState::default(),
                SensorState::default(),
            ))
            .id();

        app.update();
        // Сенсоры молчат — укуса нет
        assert_eq!(app.world().get::<Health>(player).unwrap().current(), 10.0);

        // Повторный вход уже с поднятым enemy-флагом
        app.world_mut().get_mut::<Transform>(leaper).unwrap().translation.x = 5.0;
        app.update();
        app.world_mut().get_mut::<SensorState>(leaper).unwrap().enemy_left = true;
        app.world_mut().get_mut::<Transform>(leaper).unwrap().translation.x = 0.6;
        app.update();

        assert_eq!(app.world().get::<Health>(player).unwrap().current(), 9.0);
    }
}
