//! HOLLOWRUN Gameplay Core
//!
//! ECS-ядро геймплея 2D-платформера на Bevy 0.16.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = gameplay layer (sensors, motion, AI, combat rules)
//! - Host engine = tactical layer (физический solver, рендеринг, сцены)
//!
//! Ядро владеет velocity и gravity scale каждого актора и раз в fixed tick
//! (50Hz) отдаёт их хосту через rapier-компоненты; хост возвращает
//! коллизии и сырой ввод.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod combat;
pub mod components;
pub mod input;
pub mod logger;
pub mod movement;
pub mod physics;
pub mod sensors;
pub mod shooting;
pub mod stage;

pub use ai::{LeaperAgent, WallCrawlerAgent};
pub use combat::{
    ContactDamage, ContactStarted, ContactTracker, DamageTaken, Health, KnockbackConfig,
    LivesChanged,
};
pub use components::*;
pub use input::{HorizontalInputChanged, InputFrame, PrevInputFrame};
pub use logger::{
    init_logger, log_debug, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use movement::{
    CritterConfig, CritterState, DashStateChanged, LeaperConfig, LeaperState,
    PatrolDirectionChanged, PlayerIntent, PlayerMotionConfig, PlayerMotionState, WallCrawlerConfig,
    WallCrawlerState,
};
pub use physics::TICK_DT;
pub use sensors::probes::StaticGeometry;
pub use sensors::{SensorShape, SensorState, SensorTransition};
pub use shooting::{Projectile, ProjectileLauncher};
pub use stage::{
    DeathBarrier, PortalDestination, PowerUp, PowerUpKind, SceneChangeRequest, SpawnAnchor,
    SpawnPoint, TriggerEntered, TriggerRegion, TriggerTracker,
};

/// Частота fixed tick'а симуляции
pub const FIXED_TICK_HZ: f64 = 50.0;

/// Главный plugin геймплейного ядра
///
/// Все системы сидят в FixedUpdate одной цепочкой: порядок внутри tick'а —
/// часть контракта симуляции, параллелизм здесь запрещён намеренно.
pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(FIXED_TICK_HZ))
            .insert_resource(DeterministicRng::new(42))
            .init_resource::<StaticGeometry>()
            .init_resource::<InputFrame>()
            .init_resource::<PrevInputFrame>()
            .init_resource::<ContactTracker>()
            .init_resource::<TriggerTracker>()
            .add_event::<SensorTransition>()
            .add_event::<HorizontalInputChanged>()
            .add_event::<PatrolDirectionChanged>()
            .add_event::<DashStateChanged>()
            .add_event::<ContactStarted>()
            .add_event::<DamageTaken>()
            .add_event::<LivesChanged>()
            .add_event::<SceneChangeRequest>()
            .add_event::<TriggerEntered>()
            .add_systems(
                FixedUpdate,
                (
                    (
                        stage::validate_actor_setup,
                        sensors::update_sensors,
                        input::map_input_intents,
                    )
                        .chain(),
                    (ai::leaper_decisions, ai::wall_crawler_decisions).chain(),
                    (
                        movement::player_horizontal_motion,
                        movement::player_vertical_motion,
                        movement::critter_motion,
                        movement::leaper_motion,
                        movement::wall_crawler_motion,
                    )
                        .chain(),
                    (
                        physics::apply_gravity,
                        combat::detect_actor_contacts,
                        combat::apply_contact_damage,
                        combat::apply_contact_knockback,
                        combat::flip_patrol_on_enemy_contact,
                        combat::poll_health,
                    )
                        .chain(),
                    (
                        stage::detect_trigger_entries,
                        stage::process_portals,
                        stage::process_death_barriers,
                        stage::process_power_ups,
                    )
                        .chain(),
                    (
                        shooting::player_fire,
                        shooting::projectile_flight,
                        physics::resolve_static_contacts,
                        physics::integrate_velocity_to_transform,
                        physics::sync_velocity_to_rapier,
                    )
                        .chain(),
                )
                    .chain(),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// FixedUpdate прогоняется руками через `run_schedule`, часы не участвуют.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(GameplayPlugin)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
