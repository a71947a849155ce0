//! Агент WallCrawler'а: lookout-триггер и режим рывка

use bevy::prelude::*;

use crate::ai::collect_player_boxes;
use crate::components::{BodyExtents, Player};
use crate::movement::{WallCrawlerConfig, WallCrawlerState};
use crate::sensors::probes::{Aabb, ProbeDir};

/// Sight-конфигурация агента WallCrawler'а
///
/// Один lookout-триггер, оба направленных cast'а исходят из него: сначала
/// вправо, затем влево. Увидел игрока — рывок в его сторону, потерял —
/// возврат к базовому темпу.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct WallCrawlerAgent {
    pub lookout_offset: Vec2,
    pub lookout_half_extents: Vec2,
    pub sees_something_in_front: bool,
    pub sees_something_in_back: bool,
}

impl Default for WallCrawlerAgent {
    fn default() -> Self {
        Self {
            lookout_offset: Vec2::new(0.6, 0.0),
            lookout_half_extents: Vec2::new(0.1, 0.4),
            sees_something_in_front: false,
            sees_something_in_back: false,
        }
    }
}

impl WallCrawlerAgent {
    pub fn decide(
        &mut self,
        position: Vec2,
        players: &[Aabb],
        cfg: &WallCrawlerConfig,
        state: &mut WallCrawlerState,
    ) {
        let lookout = Aabb::from_center_half(position + self.lookout_offset, self.lookout_half_extents);
        let right_sight = lookout.swept_to_infinity(ProbeDir::Right);
        let left_sight = lookout.swept_to_infinity(ProbeDir::Left);

        if players.iter().any(|player| right_sight.intersects(player)) {
            self.sees_something_in_front = true;
            state.move_forward();
            state.dash(cfg);
        } else if players.iter().any(|player| left_sight.intersects(player)) {
            self.sees_something_in_back = true;
            state.move_backward();
            state.dash(cfg);
        } else {
            self.sees_something_in_front = false;
            self.sees_something_in_back = false;
            state.walk(cfg);
        }
    }
}

/// Система: решения всех WallCrawler'ов
pub fn wall_crawler_decisions(
    mut agents: Query<(&Transform, &WallCrawlerConfig, &mut WallCrawlerAgent, &mut WallCrawlerState)>,
    players: Query<(&Transform, &BodyExtents), With<Player>>,
) {
    let player_boxes = collect_player_boxes(&players);
    for (transform, cfg, mut agent, mut state) in agents.iter_mut() {
        agent.decide(transform.translation.truncate(), &player_boxes, cfg, &mut state);
    }
}
