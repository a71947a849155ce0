//! Property-based тесты детерминизма
//!
//! Полная геймплейная сцена (игрок + все три врага + скриптованный ввод)
//! с одинаковым seed обязана давать побайтово идентичные прогоны.

use bevy::prelude::*;
use rand::Rng;

use hollowrun_gameplay::{
    create_headless_app, stage, world_snapshot, DeterministicRng, Health, InputFrame, PhysicsBody,
    Player, SpawnPoint, StaticGeometry,
};

const TICK_COUNT: usize = 1000;

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_different_seeds_diverge() {
    // Ввод скриптуется из seeded RNG: другой seed — другая история ввода
    // и другое состояние мира
    let snapshot_a = run_simulation(1, 300);
    let snapshot_b = run_simulation(2, 300);

    assert_ne!(
        snapshot_a, snapshot_b,
        "Разные seeds дали идентичные симуляции"
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    let snapshots: Vec<_> = (0..5).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_simulation_survives_long_run() {
    // Смоук: тысяча tick'ов не роняет игрока за геометрию. Враги могут
    // легально перелезть стену (wall crawler), их не проверяем.
    let mut app = build_stage(7);
    for _ in 0..TICK_COUNT {
        app.world_mut().run_schedule(FixedUpdate);
    }

    let world = app.world_mut();
    let mut query = world.query_filtered::<&Transform, With<Player>>();
    let translation = query.single(world).unwrap().translation;
    assert!(
        translation.y > -50.0,
        "player tunneled through the floor: {:?}",
        translation
    );
}

/// Собирает сцену: пол, две стены, игрок и по одному врагу каждого вида
fn build_stage(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    let world = app.world_mut();

    let point = world
        .spawn((SpawnPoint, Transform::from_xyz(0.0, 0.55, 0.0)))
        .id();

    let mut geometry = world.remove_resource::<StaticGeometry>().unwrap();
    {
        let mut commands = world.commands();
        stage::spawn_platform(
            &mut commands,
            &mut geometry,
            Vec2::new(0.0, -0.5),
            Vec2::new(25.0, 0.5),
        );
        stage::spawn_platform(
            &mut commands,
            &mut geometry,
            Vec2::new(-25.5, 5.0),
            Vec2::new(0.5, 6.0),
        );
        stage::spawn_platform(
            &mut commands,
            &mut geometry,
            Vec2::new(25.5, 5.0),
            Vec2::new(0.5, 6.0),
        );

        stage::spawn_player(&mut commands, Vec2::new(0.0, 0.55), point);
        stage::spawn_critter(&mut commands, Vec2::new(8.0, 0.55));
        stage::spawn_leaper(&mut commands, Vec2::new(-8.0, 0.55));
        stage::spawn_wall_crawler(&mut commands, Vec2::new(15.0, 0.55));
    }
    world.insert_resource(geometry);
    world.flush();

    app
}

/// Прогоняет сцену со скриптованным вводом и возвращает snapshot мира
///
/// «Игрок за пультом» разыгрывается из DeterministicRng симуляции: один
/// seed — одна и та же история ввода в каждом прогоне.
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = build_stage(seed);

    for _ in 0..tick_count {
        let frame = {
            let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
            let roll: u32 = rng.rng.gen_range(0..100);
            InputFrame {
                horizontal: match roll % 3 {
                    0 => -1.0,
                    1 => 0.0,
                    _ => 1.0,
                },
                jump_held: roll < 10,
                run_held: (20..35).contains(&roll),
                dash_held: false,
                fire_held: (40..45).contains(&roll),
                alt_fire_held: false,
            }
        };
        *app.world_mut().resource_mut::<InputFrame>() = frame;
        app.world_mut().run_schedule(FixedUpdate);
    }

    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Transform>(world);
    snapshot.extend(world_snapshot::<PhysicsBody>(world));
    snapshot.extend(world_snapshot::<Health>(world));
    snapshot
}
