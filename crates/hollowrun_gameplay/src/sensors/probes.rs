//! Геометрические probe-запросы для sensor/sight систем
//!
//! Host engine предоставляет directional box/circle casts против именованных
//! слоёв. В headless симуляции те же запросы исполняются против
//! StaticGeometry (solid AABB, регистрируются при загрузке уровня) и живого
//! набора AABB врагов.
//!
//! TODO: маршрутизировать probes через rapier cast_shape когда активен
//! физический pipeline хоста (ReadRapierContext).

use bevy::prelude::*;

/// Axis-aligned bounding box в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Probe-регион у грани тела: слэб толщиной `distance` наружу от грани,
    /// с небольшим inset по боковой оси чтобы углы не давали двойных хитов.
    pub fn face_probe(&self, dir: ProbeDir, distance: f32, inset: f32) -> Aabb {
        match dir {
            ProbeDir::Up => Aabb {
                min: Vec2::new(self.min.x + inset, self.max.y),
                max: Vec2::new(self.max.x - inset, self.max.y + distance),
            },
            ProbeDir::Down => Aabb {
                min: Vec2::new(self.min.x + inset, self.min.y - distance),
                max: Vec2::new(self.max.x - inset, self.min.y),
            },
            ProbeDir::Left => Aabb {
                min: Vec2::new(self.min.x - distance, self.min.y + inset),
                max: Vec2::new(self.min.x, self.max.y - inset),
            },
            ProbeDir::Right => Aabb {
                min: Vec2::new(self.max.x, self.min.y + inset),
                max: Vec2::new(self.max.x + distance, self.max.y - inset),
            },
        }
    }

    /// Бесконечный направленный cast (sight probes): регион продлевается
    /// до "бесконечности" вдоль направления.
    pub fn swept_to_infinity(&self, dir: ProbeDir) -> Aabb {
        const FAR: f32 = 1.0e9;
        let mut out = *self;
        match dir {
            ProbeDir::Up => out.max.y = FAR,
            ProbeDir::Down => out.min.y = -FAR,
            ProbeDir::Left => out.min.x = -FAR,
            ProbeDir::Right => out.max.x = FAR,
        }
        out
    }
}

/// Направление directional probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDir {
    Up,
    Down,
    Left,
    Right,
}

impl ProbeDir {
    pub fn vec(&self) -> Vec2 {
        match self {
            ProbeDir::Up => Vec2::Y,
            ProbeDir::Down => Vec2::NEG_Y,
            ProbeDir::Left => Vec2::NEG_X,
            ProbeDir::Right => Vec2::X,
        }
    }
}

/// Статичная solid-геометрия уровня (слой "ground")
///
/// Регистрируется спавн-хелперами при загрузке уровня, очищается при
/// переходе сцены. Запросы не могут провалиться — только no-hit.
#[derive(Resource, Debug, Default)]
pub struct StaticGeometry {
    solids: Vec<Aabb>,
}

impl StaticGeometry {
    pub fn add_solid(&mut self, center: Vec2, half: Vec2) {
        self.solids.push(Aabb::from_center_half(center, half));
    }

    pub fn clear(&mut self) {
        self.solids.clear();
    }

    pub fn hits(&self, probe: &Aabb) -> bool {
        self.solids.iter().any(|solid| probe.intersects(solid))
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }
}

/// Circle cast на короткую дистанцию (attack-range probe у Leaper)
///
/// Дистанция мала (0.1), поэтому swept circle аппроксимируем кругом в
/// конечной точке cast'а.
pub fn circle_probe_hits(center: Vec2, radius: f32, dir: ProbeDir, distance: f32, target: &Aabb) -> bool {
    let probe_center = center + dir.vec() * distance;
    let closest = probe_center.clamp(target.min, target.max);
    probe_center.distance_squared(closest) <= radius * radius
}
