use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use invaders::config::GameConfig;
use invaders::entities::{EnemyTier, GridPos, ProjectileOwner, Vec2};
use invaders::error::FormationError;
use invaders::events::GameEvent;
use invaders::formation::{AdvanceFormation, EnemyFire, EnemyFormation};
use invaders::scheduler::{CancellationToken, Scheduler};
use invaders::world::World;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn spawned(config: &GameConfig) -> EnemyFormation {
    let mut formation = EnemyFormation::new();
    formation.spawn_grid(config, 1).unwrap();
    formation
}

/// World with a live grid, ready for routines.
fn world_with_grid(config: GameConfig) -> World {
    let mut world = World::with_seed(Rc::new(config), 42);
    world.formation.spawn_grid(&world.config, 1).unwrap();
    world
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn default_grid_is_five_by_twelve() {
    let formation = spawned(&GameConfig::default());
    assert_eq!(formation.rows(), 5);
    assert_eq!(formation.cols(), 12);
    assert_eq!(formation.enemies().len(), 60);
    assert_eq!(formation.alive_count(), 60);
    assert!(formation.any_alive());
    assert_eq!(formation.direction(), Vec2::RIGHT);
}

#[test]
fn lattice_positions_follow_origin_and_spacing() {
    let formation = spawned(&GameConfig::default());
    let corner = formation.get(GridPos { row: 0, col: 0 }).unwrap();
    assert!(approx(corner.position.x, -5.0));
    assert!(approx(corner.position.y, 4.0));

    let far = formation.get(GridPos { row: 4, col: 11 }).unwrap();
    assert!(approx(far.position.x, -5.0 + 11.0 * 0.8));
    assert!(approx(far.position.y, 4.0 - 4.0 * 0.8));
}

#[test]
fn tiers_are_assigned_by_row() {
    let formation = spawned(&GameConfig::default());
    let tier = |row| formation.get(GridPos { row, col: 0 }).unwrap().tier;
    assert_eq!(tier(0), EnemyTier::Red);
    assert_eq!(tier(1), EnemyTier::Yellow);
    assert_eq!(tier(2), EnemyTier::Yellow);
    assert_eq!(tier(3), EnemyTier::Green);
    assert_eq!(tier(4), EnemyTier::Green);
}

#[test]
fn rows_past_the_fifth_fall_back_to_red() {
    let mut config = GameConfig::default();
    config.grid.rows = 7;
    let formation = spawned(&config);
    assert_eq!(
        formation.get(GridPos { row: 6, col: 0 }).unwrap().tier,
        EnemyTier::Red
    );
}

#[test]
fn spawning_over_a_live_grid_is_refused() {
    let config = GameConfig::default();
    let mut formation = spawned(&config);
    assert_eq!(
        formation.spawn_grid(&config, 2),
        Err(FormationError::GridOccupied { rows: 5, cols: 12 })
    );
    formation.clear();
    assert!(formation.spawn_grid(&config, 2).is_ok());
}

#[test]
fn enemy_speed_depends_on_spawn_level() {
    let config = GameConfig::default();
    let mut formation = EnemyFormation::new();
    formation.spawn_grid(&config, 3).unwrap();
    let speed = formation.enemies()[0].speed();
    assert!(approx(speed, config.enemy.base_speed + 2.0 * config.enemy.speed_increment));
}

// ── Killing ───────────────────────────────────────────────────────────────────

#[test]
fn killing_every_enemy_empties_the_formation() {
    let mut formation = spawned(&GameConfig::default());
    for row in 0..5 {
        for col in 0..12 {
            assert!(formation.kill(GridPos { row, col }));
        }
    }
    assert!(!formation.any_alive());
    assert_eq!(formation.alive_count(), 0);
    // Slots persist after death
    assert_eq!(formation.enemies().len(), 60);
}

#[test]
fn kill_is_false_for_dead_or_missing_slots() {
    let mut formation = spawned(&GameConfig::default());
    let slot = GridPos { row: 1, col: 1 };
    assert!(formation.kill(slot));
    assert!(!formation.kill(slot));
    assert!(!formation.kill(GridPos { row: 9, col: 0 }));
    assert!(!formation.kill(GridPos { row: 0, col: 12 }));
}

// ── Shooter selection ─────────────────────────────────────────────────────────

#[test]
fn shooter_is_bottom_most_in_a_live_column() {
    let mut formation = spawned(&GameConfig::default());
    // Leave only column 3 alive
    for row in 0..5 {
        for col in (0..12).filter(|&c| c != 3) {
            formation.kill(GridPos { row, col });
        }
    }
    assert_eq!(formation.alive_columns(), vec![3]);

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        assert_eq!(formation.select_shooter(&mut rng), Some(GridPos { row: 4, col: 3 }));
    }

    formation.kill(GridPos { row: 4, col: 3 });
    formation.kill(GridPos { row: 3, col: 3 });
    assert_eq!(formation.select_shooter(&mut rng), Some(GridPos { row: 2, col: 3 }));
}

#[test]
fn shooter_never_comes_from_a_dead_column() {
    let mut formation = spawned(&GameConfig::default());
    for row in 0..5 {
        for col in [0, 2, 4, 6, 8, 10] {
            formation.kill(GridPos { row, col });
        }
    }
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let slot = formation.select_shooter(&mut rng).unwrap();
        assert_eq!(slot.col % 2, 1);
        assert_eq!(slot.row, 4);
    }
}

#[test]
fn no_shooter_without_live_enemies() {
    let mut rng = StdRng::seed_from_u64(42);
    assert_eq!(EnemyFormation::new().select_shooter(&mut rng), None);

    let mut formation = spawned(&GameConfig::default());
    for (slot, _) in formation.clone().slots() {
        formation.kill(slot);
    }
    assert_eq!(formation.select_shooter(&mut rng), None);
}

// ── Invasion latch ────────────────────────────────────────────────────────────

#[test]
fn player_kill_latches_once_per_wave() {
    let config = GameConfig::default();
    let mut formation = spawned(&config);
    assert!(formation.trigger_player_kill());
    assert!(!formation.trigger_player_kill());

    formation.clear();
    formation.spawn_grid(&config, 1).unwrap();
    assert!(formation.trigger_player_kill());
}

#[test]
fn lowest_alive_y_ignores_the_dead() {
    let mut formation = spawned(&GameConfig::default());
    let bottom = 4.0 - 4.0 * 0.8;
    assert!(approx(formation.lowest_alive_y().unwrap(), bottom));
    for col in 0..12 {
        formation.kill(GridPos { row: 4, col });
    }
    assert!(approx(formation.lowest_alive_y().unwrap(), bottom + 0.8));
}

// ── Marching ──────────────────────────────────────────────────────────────────

/// Two by two grid starting at x = 0 with a speed of 0.25 per step.
fn small_config(half_width: f32) -> GameConfig {
    let mut config = GameConfig::default();
    config.grid.rows = 2;
    config.grid.cols = 2;
    config.grid.start_x = 0.0;
    config.grid.start_y = 2.0;
    config.enemy.base_speed = 0.25;
    config.field.half_width = half_width;
    config
}

// Every tick below is longer than any wait, so each tick is exactly one resume.
const BIG_TICK: f32 = 1.0;

fn xs(world: &World) -> Vec<f32> {
    world.formation.enemies().iter().map(|e| e.position.x).collect()
}

fn ys(world: &World) -> Vec<f32> {
    world.formation.enemies().iter().map(|e| e.position.y).collect()
}

#[test]
fn formation_moves_row_by_row_from_the_bottom() {
    let mut world = world_with_grid(small_config(7.5));
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), CancellationToken::new());

    sched.tick(BIG_TICK, &mut world); // decide direction
    assert_eq!(xs(&world), vec![0.0, 0.8, 0.0, 0.8]);

    sched.tick(BIG_TICK, &mut world); // bottom row
    let after_bottom = xs(&world);
    assert!(approx(after_bottom[0], 0.0));
    assert!(approx(after_bottom[2], 0.25));

    sched.tick(BIG_TICK, &mut world); // top row
    let after_top = xs(&world);
    assert!(approx(after_top[0], 0.25));
    assert!(approx(after_top[1], 1.05));
    assert!(approx(after_top[3], 1.05));
}

#[test]
fn formation_drops_one_step_then_reverses() {
    // Right column sits at 0.8, next step would reach 1.05 > 1.0
    let mut world = world_with_grid(small_config(1.0));
    let start_x = xs(&world);
    let start_y = ys(&world);
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), CancellationToken::new());

    for _ in 0..3 {
        sched.tick(BIG_TICK, &mut world);
    }
    assert_eq!(world.formation.direction(), Vec2::LEFT);
    for (x, x0) in xs(&world).iter().zip(&start_x) {
        assert!(approx(*x, *x0));
    }
    for (y, y0) in ys(&world).iter().zip(&start_y) {
        assert!(approx(*y, y0 - 0.25));
    }

    for _ in 0..3 {
        sched.tick(BIG_TICK, &mut world);
    }
    for (x, x0) in xs(&world).iter().zip(&start_x) {
        assert!(approx(*x, x0 - 0.25));
    }
    for (y, y0) in ys(&world).iter().zip(&start_y) {
        assert!(approx(*y, y0 - 0.25));
    }
}

#[test]
fn dead_enemies_ride_along() {
    let mut world = world_with_grid(small_config(7.5));
    world.formation.kill(GridPos { row: 0, col: 0 });
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), CancellationToken::new());
    for _ in 0..3 {
        sched.tick(BIG_TICK, &mut world);
    }
    assert!(approx(world.formation.enemies()[0].position.x, 0.25));
}

#[test]
fn march_waits_between_rows_and_steps() {
    let config = small_config(7.5);
    let row_delay = config.enemy.row_delay;
    let mut world = world_with_grid(config);
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), CancellationToken::new());

    sched.tick(0.01, &mut world); // decide, wait row_delay
    sched.tick(row_delay / 2.0, &mut world);
    assert!(approx(world.formation.enemies()[2].position.x, 0.0));
    sched.tick(row_delay, &mut world);
    assert!(approx(world.formation.enemies()[2].position.x, 0.25));
}

#[test]
fn cancelled_march_stops_moving() {
    let mut world = world_with_grid(small_config(7.5));
    let token = CancellationToken::new();
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), token.clone());
    sched.tick(BIG_TICK, &mut world);
    token.cancel();

    let before = xs(&world);
    for _ in 0..6 {
        sched.tick(BIG_TICK, &mut world);
    }
    assert_eq!(xs(&world), before);
    assert!(sched.is_empty());
}

#[test]
fn march_ends_once_everyone_is_dead() {
    let mut world = world_with_grid(small_config(7.5));
    for (slot, _) in world.formation.clone().slots() {
        world.formation.kill(slot);
    }
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(AdvanceFormation::new(), CancellationToken::new());
    sched.tick(BIG_TICK, &mut world);
    assert!(sched.is_empty());
}

// ── Enemy fire ────────────────────────────────────────────────────────────────

#[test]
fn enemy_fire_launches_downward_projectiles() {
    let mut world = world_with_grid(GameConfig::default());
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(EnemyFire, CancellationToken::new());

    sched.tick(BIG_TICK, &mut world);
    let shots = world.projectiles.active();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].owner, ProjectileOwner::Enemy);
    assert!(shots[0].velocity < 0.0);
    // Fired from the bottom row
    assert!(shots[0].position.y < 4.0 - 4.0 * 0.8);
    assert!(world
        .drain_events()
        .contains(&GameEvent::ProjectileFired { owner: ProjectileOwner::Enemy }));
}

#[test]
fn enemy_fire_interval_stays_in_range() {
    let mut world = world_with_grid(GameConfig::default());
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(EnemyFire, CancellationToken::new());

    // First shot, then the next one lands within 0.8..=1.2 seconds
    sched.tick(0.01, &mut world);
    assert_eq!(world.projectiles.active().len(), 1);
    sched.tick(0.79, &mut world);
    assert_eq!(world.projectiles.active().len(), 1);
    sched.tick(0.42, &mut world);
    assert_eq!(world.projectiles.active().len(), 2);
}

#[test]
fn enemy_fire_stops_when_formation_is_gone() {
    let mut world = world_with_grid(GameConfig::default());
    let mut sched: Scheduler<World> = Scheduler::new();
    sched.start(EnemyFire, CancellationToken::new());
    sched.tick(BIG_TICK, &mut world);

    world.formation.clear();
    sched.tick(BIG_TICK, &mut world);
    assert!(sched.is_empty());
    assert_eq!(world.projectiles.active().len(), 1);
}
