//! The player's ship: clamped horizontal movement, shot cooldown, health.

use crate::config::PlayerConfig;
use crate::dispatcher::Behaviour;
use crate::entities::{GameState, ProjectileOwner, Vec2};
use crate::world::World;

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    health: i32,
    active: bool,
    cooldown: f32,
    hit: bool,
}

impl Player {
    pub fn new(config: &PlayerConfig) -> Self {
        Player {
            x: 0.0,
            y: config.y,
            health: config.start_health,
            active: false,
            cooldown: 0.0,
            hit: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn can_shoot(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Back to full health and the starting spot, hidden.
    pub fn reset(&mut self, config: &PlayerConfig) {
        *self = Player::new(config);
    }

    /// Show the ship at the centre for a new wave.
    pub fn activate(&mut self, config: &PlayerConfig) {
        self.x = 0.0;
        self.y = config.y;
        self.active = true;
        self.cooldown = 0.0;
        self.hit = false;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn move_by(&mut self, axis: f32, speed: f32, dt: f32, border: f32) {
        self.x = (self.x + axis * speed * dt).clamp(-border, border);
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    pub fn start_cooldown(&mut self, seconds: f32) {
        self.cooldown = seconds;
    }

    pub fn add_health(&mut self, amount: i32) -> i32 {
        self.health += amount;
        self.health
    }

    /// Take one hit: lose a point of health and disappear until the next
    /// wave. The hit stays latched until the game manager consumes it.
    pub fn remove_health(&mut self) -> i32 {
        self.health -= 1;
        self.hit = true;
        self.active = false;
        self.health
    }

    pub fn take_hit(&mut self) -> bool {
        std::mem::take(&mut self.hit)
    }
}

/// Applies frame input to the ship.
pub struct PlayerBehaviour;

impl Behaviour<World> for PlayerBehaviour {
    fn on_tick(&mut self, dt: f32, world: &mut World) {
        world.player.tick_cooldown(dt);
        if world.session.state != GameState::Playing || !world.player.is_active() {
            return;
        }

        let config = &world.config.player;
        let input = world.input;
        if input.axis != 0.0 {
            world
                .player
                .move_by(input.axis.clamp(-1.0, 1.0), config.move_speed, dt, config.screen_border);
        }

        if input.shoot && world.player.can_shoot() {
            let origin = world.player.position() + Vec2::UP * config.muzzle_offset;
            world.player.start_cooldown(config.shoot_cooldown);
            world.fire(ProjectileOwner::Player, origin);
        }
    }

    fn on_teardown(&mut self, world: &mut World) {
        world.player.deactivate();
    }
}
