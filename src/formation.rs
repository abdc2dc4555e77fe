//! The enemy grid: spawning, collective marching, and shooter selection.
//!
//! Enemies are never removed from the grid during a wave. A dead enemy keeps
//! its slot (and keeps being carried along by row moves) so that
//! `(row, col)` addressing stays valid for shooter selection.

use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Enemy, EnemyTier, GridPos, ProjectileOwner, Vec2};
use crate::error::FormationError;
use crate::events::GameEvent;
use crate::projectiles::ProjectileSystem;
use crate::scheduler::{Routine, Step};
use crate::world::World;

#[derive(Clone, Debug)]
pub struct EnemyFormation {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` long while a wave is up, empty otherwise.
    enemies: Vec<Enemy>,
    direction: Vec2,
    player_kill_latched: bool,
}

impl Default for EnemyFormation {
    fn default() -> Self {
        EnemyFormation {
            rows: 0,
            cols: 0,
            enemies: Vec::new(),
            direction: Vec2::RIGHT,
            player_kill_latched: false,
        }
    }
}

impl EnemyFormation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh lattice for `level`. Fails if the previous grid was
    /// never cleared.
    pub fn spawn_grid(&mut self, config: &GameConfig, level: u32) -> Result<(), FormationError> {
        if !self.enemies.is_empty() {
            return Err(FormationError::GridOccupied {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let grid = &config.grid;
        let enemy = &config.enemy;
        self.rows = grid.rows;
        self.cols = grid.cols;
        self.direction = Vec2::RIGHT;
        self.player_kill_latched = false;
        self.enemies.reserve(grid.rows * grid.cols);

        for row in 0..grid.rows {
            let tier = EnemyTier::for_row(row).unwrap_or_else(|| {
                log::error!("No sprite tier for row {}, using red instead", row);
                EnemyTier::Red
            });
            for col in 0..grid.cols {
                let position = Vec2::new(
                    grid.start_x + col as f32 * grid.spacing_x,
                    grid.start_y - row as f32 * grid.spacing_y,
                );
                self.enemies.push(Enemy::new(
                    position,
                    tier,
                    enemy.base_speed,
                    enemy.speed_increment,
                    level,
                ));
            }
        }
        log::info!("Spawned {}x{} enemy grid for level {}", self.rows, self.cols, level);
        Ok(())
    }

    /// Tear the grid down. Dimensions reset to zero.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.rows = 0;
        self.cols = 0;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn get(&self, slot: GridPos) -> Option<&Enemy> {
        if slot.row >= self.rows || slot.col >= self.cols {
            return None;
        }
        self.enemies.get(slot.row * self.cols + slot.col)
    }

    pub fn get_mut(&mut self, slot: GridPos) -> Option<&mut Enemy> {
        if slot.row >= self.rows || slot.col >= self.cols {
            return None;
        }
        self.enemies.get_mut(slot.row * self.cols + slot.col)
    }

    /// Iterate `(slot, enemy)` over the whole grid, dead slots included.
    pub fn slots(&self) -> impl Iterator<Item = (GridPos, &Enemy)> + '_ {
        let cols = self.cols;
        self.enemies.iter().enumerate().map(move |(i, enemy)| {
            (
                GridPos {
                    row: i / cols,
                    col: i % cols,
                },
                enemy,
            )
        })
    }

    /// Mark the enemy at `slot` dead. False if it was already dead or the
    /// slot is out of range.
    pub fn kill(&mut self, slot: GridPos) -> bool {
        match self.get_mut(slot) {
            Some(enemy) if !enemy.is_dead() => {
                enemy.die();
                true
            }
            _ => false,
        }
    }

    pub fn any_alive(&self) -> bool {
        self.enemies.iter().any(|e| !e.is_dead())
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    /// Columns that still hold at least one live enemy, in ascending order.
    pub fn alive_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| {
                (0..self.rows).any(|row| {
                    self.get(GridPos { row, col })
                        .map_or(false, |e| !e.is_dead())
                })
            })
            .collect()
    }

    /// Pick a live column uniformly at random, then its bottom-most live
    /// enemy. `None` when nobody is left.
    pub fn select_shooter(&self, rng: &mut impl Rng) -> Option<GridPos> {
        let columns = self.alive_columns();
        if columns.is_empty() {
            return None;
        }
        let col = columns[rng.gen_range(0..columns.len())];
        (0..self.rows)
            .rev()
            .map(|row| GridPos { row, col })
            .find(|&slot| self.get(slot).map_or(false, |e| !e.is_dead()))
    }

    /// Select a shooter and launch a downward projectile from it.
    pub fn shoot(
        &self,
        rng: &mut impl Rng,
        projectiles: &mut ProjectileSystem,
        config: &GameConfig,
    ) -> Option<GridPos> {
        let slot = self.select_shooter(rng)?;
        let enemy = self.get(slot)?;
        let origin = enemy.position + Vec2::DOWN * config.enemy.half_extent;
        projectiles.fire(ProjectileOwner::Enemy, origin, &config.projectile);
        Some(slot)
    }

    /// True if any live enemy would cross the wall it is heading towards on
    /// its next step. Each enemy uses its own speed.
    pub fn needs_turn(&self, half_width: f32) -> bool {
        self.enemies
            .iter()
            .any(|e| !e.is_dead() && e.will_hit_boundary(self.direction, half_width))
    }

    pub fn reverse(&mut self) {
        self.direction = -self.direction;
    }

    /// Move every enemy in `row` one step along `motion`. Dead enemies ride
    /// along.
    pub fn move_row(&mut self, row: usize, motion: Vec2) {
        if row >= self.rows {
            return;
        }
        let start = row * self.cols;
        for enemy in &mut self.enemies[start..start + self.cols] {
            enemy.advance(motion);
        }
    }

    /// Lowest y among live enemies.
    pub fn lowest_alive_y(&self) -> Option<f32> {
        self.enemies
            .iter()
            .filter(|e| !e.is_dead())
            .map(|e| e.position.y)
            .reduce(f32::min)
    }

    /// Latch a player kill for this wave. Only the first call returns true.
    pub fn trigger_player_kill(&mut self) -> bool {
        if self.player_kill_latched {
            return false;
        }
        self.player_kill_latched = true;
        true
    }
}

// ── Routines ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum MarchPhase {
    Evaluate,
    /// Rows still to move this step, moved bottom row first.
    Rows { remaining: usize, motion: Vec2 },
}

/// Marches the formation until nobody is left.
///
/// Each step either moves every row sideways or, when a live enemy would
/// cross the wall, flips the direction and drops every row instead. Rows go
/// one at a time from the bottom up with `row_delay` between them, then the
/// whole formation rests for `move_delay`.
#[derive(Debug)]
pub struct AdvanceFormation {
    phase: MarchPhase,
}

impl AdvanceFormation {
    pub fn new() -> Self {
        AdvanceFormation {
            phase: MarchPhase::Evaluate,
        }
    }
}

impl Default for AdvanceFormation {
    fn default() -> Self {
        Self::new()
    }
}

impl Routine<World> for AdvanceFormation {
    fn resume(&mut self, world: &mut World) -> Step {
        let row_delay = world.config.enemy.row_delay;
        match self.phase {
            MarchPhase::Evaluate => {
                let formation = &mut world.formation;
                if !formation.any_alive() || formation.rows() == 0 {
                    return Step::Done;
                }
                let motion = if formation.needs_turn(world.config.field.half_width) {
                    formation.reverse();
                    Vec2::DOWN
                } else {
                    formation.direction()
                };
                self.phase = MarchPhase::Rows {
                    remaining: formation.rows(),
                    motion,
                };
                Step::Wait(row_delay)
            }
            MarchPhase::Rows { remaining, motion } => {
                let row = remaining - 1;
                world.formation.move_row(row, motion);
                if row == 0 {
                    self.phase = MarchPhase::Evaluate;
                    Step::Wait(world.config.enemy.move_delay)
                } else {
                    self.phase = MarchPhase::Rows {
                        remaining: row,
                        motion,
                    };
                    Step::Wait(row_delay)
                }
            }
        }
    }
}

/// Makes a random bottom-most enemy shoot every
/// `shot_interval_min..=shot_interval_max` seconds while anyone is alive.
#[derive(Debug, Default)]
pub struct EnemyFire;

impl Routine<World> for EnemyFire {
    fn resume(&mut self, world: &mut World) -> Step {
        if !world.formation.any_alive() {
            return Step::Done;
        }
        let shooter = world
            .formation
            .shoot(&mut world.rng, &mut world.projectiles, &world.config);
        if let Some(slot) = shooter {
            log::debug!("Enemy at {:?} fired", slot);
            world.emit(GameEvent::ProjectileFired {
                owner: ProjectileOwner::Enemy,
            });
        }
        let enemy = &world.config.enemy;
        Step::Wait(
            world
                .rng
                .gen_range(enemy.shot_interval_min..=enemy.shot_interval_max),
        )
    }
}
