//! Базовые ECS компоненты геймплейного ядра
//!
//! Архитектура: каждый актор владеет всеми своими суб-компонентами
//! (motion state, sensor state, agent) на одном entity. Компоненты не хранят
//! обратных ссылок друг на друга — системы читают соседей через Query.

use bevy::prelude::*;

/// Архетип актора. Определяет какой motion integrator и какой agent
/// обслуживают entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Archetype {
    Player,
    Critter,
    Leaper,
    WallCrawler,
}

/// Актор (игрок или враг) — базовый компонент живых объектов
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Actor {
    pub archetype: Archetype,
}

impl Actor {
    pub fn new(archetype: Archetype) -> Self {
        Self { archetype }
    }

    pub fn is_player(&self) -> bool {
        self.archetype == Archetype::Player
    }

    /// Враги — всё что не игрок (слой "Enemy" для sensor probes)
    pub fn is_enemy(&self) -> bool {
        !self.is_player()
    }
}

/// Marker component для player-controlled entity
///
/// Акторы БЕЗ этого компонента управляются AI agents.
/// Input mapper пишет intents только акторам с этим компонентом.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Facing — направление движения-интента актора
///
/// НЕ знак мгновенной velocity: во время knockback facing сохраняется.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_velocity_x(vx: f32) -> Option<Self> {
        if vx > 0.0 {
            Some(Facing::Right)
        } else if vx < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Кастомный velocity state актора
///
/// Инвариант: velocity пишется ровно один раз за tick собственным motion
/// integrator'ом (плюс knockback от CombatResolver — last write wins).
/// Rapier используется только как collision surface, интеграцию velocity
/// делаем сами (см. physics модуль).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// Множитель гравитации (1.0 = обычная, 0.0 = подвешен)
    pub gravity_scale: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }
}

/// Half-extents AABB тела актора
///
/// Используется для sensor probe регионов, contact detection и sight probes.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct BodyExtents {
    pub half: Vec2,
}

impl BodyExtents {
    pub fn new(half_x: f32, half_y: f32) -> Self {
        Self {
            half: Vec2::new(half_x, half_y),
        }
    }
}

/// Способности игрока, включаемые pickups (one-shot конфигурация, не tick loop)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Abilities {
    pub double_jump: bool,
    pub dash: bool,
    pub alt_fire: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_layers() {
        assert!(Actor::new(Archetype::Player).is_player());
        assert!(!Actor::new(Archetype::Player).is_enemy());
        assert!(Actor::new(Archetype::Critter).is_enemy());
        assert!(Actor::new(Archetype::WallCrawler).is_enemy());
    }

    #[test]
    fn test_facing_from_velocity() {
        assert_eq!(Facing::from_velocity_x(3.0), Some(Facing::Right));
        assert_eq!(Facing::from_velocity_x(-0.5), Some(Facing::Left));
        // На нуле facing не меняется
        assert_eq!(Facing::from_velocity_x(0.0), None);
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
    }
}
