//! Decision-агенты врагов
//!
//! Каждый агент раз в fixed tick смотрит на игроков направленными sight
//! probe'ами и переводит увиденное в директивы своему интегратору движения.
//! Агенты не пишут скорость сами — только дергают методы state'а.

pub mod leaper;
pub mod wall_crawler;

pub use leaper::{leaper_decisions, LeaperAgent};
pub use wall_crawler::{wall_crawler_decisions, WallCrawlerAgent};

use bevy::prelude::*;

use crate::components::BodyExtents;
use crate::sensors::probes::Aabb;

/// AABB всех игроков на этот tick, собирается один раз на всех агентов
pub(crate) fn collect_player_boxes(
    players: &Query<(&Transform, &BodyExtents), With<crate::components::Player>>,
) -> Vec<Aabb> {
    players
        .iter()
        .map(|(transform, extents)| {
            Aabb::from_center_half(transform.translation.truncate(), extents.half)
        })
        .collect()
}
