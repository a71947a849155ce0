//! Здоровье юнитов: polled-модель
//!
//! damage/heal пишут только живое значение; раз в fixed tick система
//! сравнивает его с последним применённым и публикует разницу. Сколько бы
//! источников ни ударило юнита за tick, наружу уходит ровно одно событие.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Actor, Player};
use crate::logger::log_info;
use crate::stage::{SceneChangeRequest, SpawnAnchor, SpawnPoint};

/// Здоровье юнита
///
/// `current` — живое значение, его двигают damage/heal в любом месте tick'а.
/// `applied` — значение, на которое уже среагировала симуляция.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    applied: f32,
    pub max: f32,
    pub lives: f32,
    /// Заказ на up-size от power-up'а; латч исполняется один раз
    pub up_size: bool,
    pub has_up_sized: bool,
    pub up_size_heal: f32,
    pub up_size_max: f32,
    pub up_size_scale: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: 10.0,
            applied: 10.0,
            max: 10.0,
            lives: 2.0,
            up_size: false,
            has_up_sized: false,
            up_size_heal: 10.0,
            up_size_max: 20.0,
            up_size_scale: 2.0,
        }
    }
}

impl Health {
    pub fn with_health(health: f32, lives: f32) -> Self {
        Self {
            current: health,
            applied: health,
            max: health,
            lives,
            ..Default::default()
        }
    }

    pub fn damage(&mut self, amount: f32) {
        self.current -= amount;
    }

    /// Без клэмпа к max: up-size лечит поверх базового максимума
    pub fn heal(&mut self, amount: f32) {
        self.current += amount;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn applied(&self) -> f32 {
        self.applied
    }
}

/// Юнит потерял здоровье на этом tick'е
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    pub entity: Entity,
    pub remaining: f32,
}

/// У игрока изменилось число жизней
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LivesChanged {
    pub entity: Entity,
    pub lives: f32,
}

/// Система: применение накопленных изменений здоровья
///
/// Смерть не-игрока — despawn. Смерть игрока — refill, минус жизнь,
/// телепорт на spawn anchor; на нуле жизней — запрос сцены GameOver.
pub fn poll_health(
    mut commands: Commands,
    spawn_points: Query<&Transform, (With<SpawnPoint>, Without<Health>)>,
    mut units: Query<(
        Entity,
        &Actor,
        &mut Health,
        &mut Transform,
        Option<&SpawnAnchor>,
        Option<&Player>,
    )>,
    mut damage_events: EventWriter<DamageTaken>,
    mut lives_events: EventWriter<LivesChanged>,
    mut scene_events: EventWriter<SceneChangeRequest>,
) {
    for (entity, actor, mut health, mut transform, anchor, player) in units.iter_mut() {
        if health.applied != health.current {
            if health.applied > health.current {
                damage_events.write(DamageTaken {
                    entity,
                    remaining: health.current,
                });
            }

            health.applied = health.current;

            if health.applied <= 0.0 && player.is_none() {
                log_info(&format!("unit died: {:?} ({:?})", entity, actor.archetype));
                commands.entity(entity).despawn();
            } else if health.applied <= 0.0 && player.is_some() {
                health.current = if health.up_size {
                    health.up_size_max
                } else {
                    health.max
                };
                health.lives -= 1.0;

                if let Some(anchor) = anchor {
                    if let Ok(point) = spawn_points.get(anchor.point) {
                        transform.translation = point.translation;
                    }
                }
            }

            if player.is_some() {
                if health.lives <= 0.0 {
                    scene_events.write(SceneChangeRequest::scene("GameOver"));
                }
                lives_events.write(LivesChanged {
                    entity,
                    lives: health.lives,
                });
            }
        }

        // Up-size латч: исполняется один раз, сколько бы power-up'ов ни
        // заказало его повторно
        if health.up_size && !health.has_up_sized {
            transform.scale = Vec3::new(health.up_size_scale, health.up_size_scale, 1.0);
            health.has_up_sized = true;
            let heal = health.up_size_heal;
            health.heal(heal);
        }
    }
}
