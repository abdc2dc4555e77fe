//! Game entity types: plain data and a few geometric helpers.

use std::ops::{Add, AddAssign, Mul, Neg};

use crate::pool::Poolable;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A 2D vector in world units. +x is right, +y is up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
    pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
    pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
    pub const UP: Vec2 = Vec2::new(0.0, 1.0);
    pub const DOWN: Vec2 = Vec2::new(0.0, -1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ── Game state ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    WaveCountdown,
    Playing,
    Won,
    Lost,
}

impl GameState {
    /// Won and Lost only leave through an explicit restart.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Sprite tier, chosen by grid row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyTier {
    /// Top row, strongest.
    Red,
    Yellow,
    Green,
}

impl EnemyTier {
    /// Tier for a known row, `None` past the fifth row.
    pub fn for_row(row: usize) -> Option<EnemyTier> {
        match row {
            0 => Some(EnemyTier::Red),
            1 | 2 => Some(EnemyTier::Yellow),
            3 | 4 => Some(EnemyTier::Green),
            _ => None,
        }
    }
}

/// (row, column) slot inside the enemy grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub position: Vec2,
    pub tier: EnemyTier,
    dead: bool,
    base_speed: f32,
    speed_increment: f32,
    level: u32,
}

impl Enemy {
    pub fn new(
        position: Vec2,
        tier: EnemyTier,
        base_speed: f32,
        speed_increment: f32,
        level: u32,
    ) -> Self {
        Enemy {
            position,
            tier,
            dead: false,
            base_speed,
            speed_increment,
            level,
        }
    }

    /// Distance covered by one formation step. Fixed for the enemy's lifetime.
    pub fn speed(&self) -> f32 {
        self.base_speed + self.speed_increment * self.level.saturating_sub(1) as f32
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Deactivate in place; the grid keeps the slot.
    pub fn die(&mut self) {
        self.dead = true;
    }

    pub fn next_position(&self, direction: Vec2) -> Vec2 {
        self.position + direction * self.speed()
    }

    /// Directional bound check: only the wall the formation is heading
    /// towards counts.
    pub fn will_hit_boundary(&self, direction: Vec2, half_width: f32) -> bool {
        let next_x = self.next_position(direction).x;
        if direction.x > 0.0 {
            next_x > half_width
        } else if direction.x < 0.0 {
            next_x < -half_width
        } else {
            false
        }
    }

    pub fn advance(&mut self, direction: Vec2) {
        self.position = self.next_position(direction);
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

/// A pooled projectile. Moves along the y axis only.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub position: Vec2,
    /// Signed vertical speed in units per second.
    pub velocity: f32,
    pub owner: ProjectileOwner,
    /// Seconds left before the projectile expires on its own.
    pub remaining: f32,
    active: bool,
}

impl Projectile {
    pub fn new(owner: ProjectileOwner) -> Self {
        Projectile {
            position: Vec2::ZERO,
            velocity: 0.0,
            owner,
            remaining: 0.0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn launch(&mut self, origin: Vec2, velocity: f32, lifetime: f32) {
        self.position = origin;
        self.velocity = velocity;
        self.remaining = lifetime;
    }

    pub fn advance(&mut self, dt: f32) {
        self.position.y += self.velocity * dt;
        self.remaining -= dt;
    }

    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

impl Poolable for Projectile {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.velocity = 0.0;
        self.remaining = 0.0;
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Player intent for the current frame, filled in by the front end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// −1.0 left, +1.0 right, 0.0 idle.
    pub axis: f32,
    pub shoot: bool,
}
