//! Агент Leaper'а: погоня за игроком и выбор момента атаки

use bevy::prelude::*;

use crate::ai::collect_player_boxes;
use crate::components::{BodyExtents, Player};
use crate::movement::LeaperState;
use crate::sensors::probes::{circle_probe_hits, Aabb, ProbeDir};

/// Sight-конфигурация и наблюдаемые флаги агента Leaper'а
///
/// Два sight-триггера по бокам тела, каждый кастуется в свою сторону до
/// бесконечности против игроков. Отдельный короткий circle cast вниз
/// решает, пора ли исполнять большой прыжок.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LeaperAgent {
    pub sight_offset: Vec2,
    pub sight_half_extents: Vec2,
    pub attack_radius: f32,
    pub attack_offset: Vec2,
    pub attack_cast_distance: f32,
    pub right_line_of_sight: bool,
    pub left_line_of_sight: bool,
    pub in_range_for_attack: bool,
}

impl Default for LeaperAgent {
    fn default() -> Self {
        Self {
            sight_offset: Vec2::new(0.6, 0.0),
            sight_half_extents: Vec2::new(0.1, 0.4),
            attack_radius: 2.5,
            attack_offset: Vec2::ZERO,
            attack_cast_distance: 0.1,
            right_line_of_sight: false,
            left_line_of_sight: false,
            in_range_for_attack: false,
        }
    }
}

impl LeaperAgent {
    /// Один шаг решения против набора игроков. Правая сторона в приоритете:
    /// пока игрок виден справа, левый probe не рассматривается.
    pub fn decide(&mut self, position: Vec2, players: &[Aabb], state: &mut LeaperState) {
        let right_sight = Aabb::from_center_half(position + self.sight_offset, self.sight_half_extents)
            .swept_to_infinity(ProbeDir::Right);
        let left_sight = Aabb::from_center_half(position - self.sight_offset, self.sight_half_extents)
            .swept_to_infinity(ProbeDir::Left);

        let attack_center = position + self.attack_offset;
        self.in_range_for_attack = players.iter().any(|player| {
            circle_probe_hits(attack_center, self.attack_radius, ProbeDir::Down, self.attack_cast_distance, player)
        });

        if players.iter().any(|player| right_sight.intersects(player)) {
            self.right_line_of_sight = true;
            state.move_backward();
            if self.in_range_for_attack {
                state.leap();
            }
        } else if players.iter().any(|player| left_sight.intersects(player)) {
            self.left_line_of_sight = true;
            state.move_forward();
            if self.in_range_for_attack {
                state.leap();
            }
        }
    }
}

/// Система: решения всех Leaper'ов
pub fn leaper_decisions(
    mut agents: Query<(&Transform, &mut LeaperAgent, &mut LeaperState)>,
    players: Query<(&Transform, &BodyExtents), With<Player>>,
) {
    let player_boxes = collect_player_boxes(&players);
    for (transform, mut agent, mut state) in agents.iter_mut() {
        agent.decide(transform.translation.truncate(), &player_boxes, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: f32, y: f32) -> Aabb {
        Aabb::from_center_half(Vec2::new(x, y), Vec2::splat(0.5))
    }

    #[test]
    fn test_player_on_right_chased_backward() {
        let mut agent = LeaperAgent::default();
        let mut state = LeaperState::default();

        agent.decide(Vec2::ZERO, &[player_at(30.0, 0.0)], &mut state);

        assert!(agent.right_line_of_sight);
        // forward — минусовая ось, значит к игроку справа идём backward
        assert!(!state.moving_forward);
        assert!(!state.can_jump);
    }

    #[test]
    fn test_player_on_left_chased_forward() {
        let mut agent = LeaperAgent::default();
        let mut state = LeaperState {
            moving_forward: false,
            ..Default::default()
        };

        agent.decide(Vec2::ZERO, &[player_at(-30.0, 0.0)], &mut state);

        assert!(agent.left_line_of_sight);
        assert!(state.moving_forward);
    }

    #[test]
    fn test_right_sight_shadows_left() {
        let mut agent = LeaperAgent::default();
        let mut state = LeaperState::default();

        // Игроки с обеих сторон — right probe выигрывает
        agent.decide(Vec2::ZERO, &[player_at(-30.0, 0.0), player_at(30.0, 0.0)], &mut state);

        assert!(agent.right_line_of_sight);
        assert!(!agent.left_line_of_sight);
        assert!(!state.moving_forward);
    }

    #[test]
    fn test_leap_only_in_attack_range() {
        let mut agent = LeaperAgent::default();
        let mut state = LeaperState::default();

        // Игрок виден, но далеко — погоня без прыжка
        agent.decide(Vec2::ZERO, &[player_at(30.0, 0.0)], &mut state);
        assert!(!state.can_jump);

        // Игрок рядом — leap
        agent.decide(Vec2::ZERO, &[player_at(1.5, 0.0)], &mut state);
        assert!(agent.in_range_for_attack);
        assert!(state.can_jump);
    }

    #[test]
    fn test_unseen_player_leaves_state_alone() {
        let mut agent = LeaperAgent::default();
        let mut state = LeaperState::default();
        let before = state.moving_forward;

        // Игрок выше линии sight-триггеров
        agent.decide(Vec2::ZERO, &[player_at(30.0, 20.0)], &mut state);

        assert_eq!(state.moving_forward, before);
        assert!(!state.can_jump);
    }
}
