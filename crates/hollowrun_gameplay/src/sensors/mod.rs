//! CollisionSensor — directional proximity probe каждого актора
//!
//! Каждый fixed tick: четыре коротких probe против solid слоя и четыре
//! против enemy слоя. Флаги меняются только на границе tick'а; каждое
//! изменение эмитит ровно одно SensorTransition событие (edge-triggered,
//! не каждый tick пока условие держится).
//!
//! ВАЖНО: по каждой оси enemy-флаг проверяется только если solid-флаг
//! не изменился (else-if chain). Переход по solid подавляет enemy-переход
//! той же оси в тот же tick. Унаследовано от оригинального поведения
//! намеренно — downstream логика калибрована под него (см. DESIGN.md).

use bevy::prelude::*;

use crate::components::{Actor, BodyExtents};

pub mod probes;

pub use probes::{Aabb, ProbeDir, StaticGeometry};

/// Дистанция короткого directional cast
pub const PROBE_DISTANCE: f32 = 0.1;
/// Inset по боковой оси probe-региона (углы не дают двойных хитов)
pub const PROBE_INSET: f32 = 0.02;

/// Какой из восьми sensor флагов сменил значение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SensorFlag {
    Roofed,
    Grounded,
    RightWalled,
    LeftWalled,
    EnemyAbove,
    EnemyBelow,
    EnemyRight,
    EnemyLeft,
}

/// Edge-triggered событие смены sensor флага
#[derive(Event, Debug, Clone)]
pub struct SensorTransition {
    pub entity: Entity,
    pub flag: SensorFlag,
    pub value: bool,
}

/// Геометрия probe-регионов актора
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct SensorShape {
    /// Half-extents тела, от граней которого строятся probes
    pub half_extents: Vec2,
    pub cast_distance: f32,
}

impl SensorShape {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            cast_distance: PROBE_DISTANCE,
        }
    }
}

/// Сырые результаты восьми probes за один tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeSample {
    pub solid_above: bool,
    pub solid_below: bool,
    pub solid_left: bool,
    pub solid_right: bool,
    pub enemy_above: bool,
    pub enemy_below: bool,
    pub enemy_left: bool,
    pub enemy_right: bool,
}

/// Текущее состояние sensor флагов актора
///
/// Инвариант: значения меняются только внутри update_sensors.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SensorState {
    pub roofed: bool,
    pub grounded: bool,
    pub left_walled: bool,
    pub right_walled: bool,
    pub enemy_above: bool,
    pub enemy_below: bool,
    pub enemy_left: bool,
    pub enemy_right: bool,
}

impl SensorState {
    /// Применяет probe sample, собирая edge-переходы.
    ///
    /// Порядок осей и else-if подавление enemy-переходов повторяют
    /// оригинал: roof, ground, right wall, left wall.
    pub fn apply(&mut self, sample: ProbeSample, out: &mut Vec<(SensorFlag, bool)>) {
        if self.roofed != sample.solid_above {
            self.roofed = sample.solid_above;
            out.push((SensorFlag::Roofed, self.roofed));
        } else if self.enemy_above != sample.enemy_above {
            self.enemy_above = sample.enemy_above;
            out.push((SensorFlag::EnemyAbove, self.enemy_above));
        }

        if self.grounded != sample.solid_below {
            self.grounded = sample.solid_below;
            out.push((SensorFlag::Grounded, self.grounded));
        } else if self.enemy_below != sample.enemy_below {
            self.enemy_below = sample.enemy_below;
            out.push((SensorFlag::EnemyBelow, self.enemy_below));
        }

        if self.right_walled != sample.solid_right {
            self.right_walled = sample.solid_right;
            out.push((SensorFlag::RightWalled, self.right_walled));
        } else if self.enemy_right != sample.enemy_right {
            self.enemy_right = sample.enemy_right;
            out.push((SensorFlag::EnemyRight, self.enemy_right));
        }

        if self.left_walled != sample.solid_left {
            self.left_walled = sample.solid_left;
            out.push((SensorFlag::LeftWalled, self.left_walled));
        } else if self.enemy_left != sample.enemy_left {
            self.enemy_left = sample.enemy_left;
            out.push((SensorFlag::EnemyLeft, self.enemy_left));
        }
    }

    /// Есть ли контакт с врагом хоть по одной оси
    pub fn any_enemy_adjacent(&self) -> bool {
        self.enemy_above || self.enemy_below || self.enemy_left || self.enemy_right
    }
}

/// Система: обновление всех sensors за tick
///
/// Выполняется первой в tick chain — все потребители видят свежие флаги.
pub fn update_sensors(
    geometry: Res<StaticGeometry>,
    mut sensors: Query<(Entity, &Transform, &SensorShape, &mut SensorState)>,
    actors: Query<(Entity, &Transform, &BodyExtents, &Actor)>,
    mut transitions: EventWriter<SensorTransition>,
) {
    // AABB врагов собираем один раз за tick (enemy слой общий для всех)
    let enemy_boxes: Vec<(Entity, Aabb)> = actors
        .iter()
        .filter(|(_, _, _, actor)| actor.is_enemy())
        .map(|(entity, transform, extents, _)| {
            (
                entity,
                Aabb::from_center_half(transform.translation.truncate(), extents.half),
            )
        })
        .collect();

    let mut changed: Vec<(SensorFlag, bool)> = Vec::new();

    for (entity, transform, shape, mut state) in sensors.iter_mut() {
        let body = Aabb::from_center_half(transform.translation.truncate(), shape.half_extents);

        let enemy_hit = |probe: &Aabb| {
            enemy_boxes
                .iter()
                .any(|(other, aabb)| *other != entity && probe.intersects(aabb))
        };

        let up = body.face_probe(ProbeDir::Up, shape.cast_distance, PROBE_INSET);
        let down = body.face_probe(ProbeDir::Down, shape.cast_distance, PROBE_INSET);
        let left = body.face_probe(ProbeDir::Left, shape.cast_distance, PROBE_INSET);
        let right = body.face_probe(ProbeDir::Right, shape.cast_distance, PROBE_INSET);

        let sample = ProbeSample {
            solid_above: geometry.hits(&up),
            solid_below: geometry.hits(&down),
            solid_left: geometry.hits(&left),
            solid_right: geometry.hits(&right),
            enemy_above: enemy_hit(&up),
            enemy_below: enemy_hit(&down),
            enemy_left: enemy_hit(&left),
            enemy_right: enemy_hit(&right),
        };

        changed.clear();
        state.apply(sample, &mut changed);

        for (flag, value) in changed.drain(..) {
            transitions.write(SensorTransition { entity, flag, value });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_triggered_once() {
        let mut state = SensorState::default();
        let mut out = Vec::new();

        let grounded = ProbeSample {
            solid_below: true,
            ..Default::default()
        };

        state.apply(grounded, &mut out);
        assert_eq!(out, vec![(SensorFlag::Grounded, true)]);

        // Повторный tick с тем же sample — перехода нет
        out.clear();
        state.apply(grounded, &mut out);
        assert!(out.is_empty());

        // Уход с земли — ровно один переход в false
        out.clear();
        state.apply(ProbeSample::default(), &mut out);
        assert_eq!(out, vec![(SensorFlag::Grounded, false)]);
    }

    #[test]
    fn test_solid_transition_suppresses_enemy_same_axis() {
        let mut state = SensorState::default();
        let mut out = Vec::new();

        // Solid и enemy появляются под актором в один tick
        let both = ProbeSample {
            solid_below: true,
            enemy_below: true,
            ..Default::default()
        };
        state.apply(both, &mut out);

        // else-if: виден только grounded переход, enemy_below подавлен
        assert_eq!(out, vec![(SensorFlag::Grounded, true)]);
        assert!(!state.enemy_below);

        // Следующий tick solid не меняется — enemy_below догоняет
        out.clear();
        state.apply(both, &mut out);
        assert_eq!(out, vec![(SensorFlag::EnemyBelow, true)]);
        assert!(state.enemy_below);
    }

    #[test]
    fn test_axes_are_independent_pairs() {
        let mut state = SensorState::default();
        let mut out = Vec::new();

        // Переход по левой стене НЕ подавляет enemy_below (разные оси)
        let sample = ProbeSample {
            solid_left: true,
            enemy_below: true,
            ..Default::default()
        };
        state.apply(sample, &mut out);

        assert!(out.contains(&(SensorFlag::LeftWalled, true)));
        assert!(out.contains(&(SensorFlag::EnemyBelow, true)));
    }

    #[test]
    fn test_axis_ordering() {
        let mut state = SensorState::default();
        let mut out = Vec::new();

        let all = ProbeSample {
            solid_above: true,
            solid_below: true,
            solid_left: true,
            solid_right: true,
            ..Default::default()
        };
        state.apply(all, &mut out);

        // Порядок осей фиксирован: roof, ground, right, left
        assert_eq!(
            out,
            vec![
                (SensorFlag::Roofed, true),
                (SensorFlag::Grounded, true),
                (SensorFlag::RightWalled, true),
                (SensorFlag::LeftWalled, true),
            ]
        );
    }
}
