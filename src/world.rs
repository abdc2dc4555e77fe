//! Application context handed to every behaviour and routine.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::entities::{GameState, PlayerInput, ProjectileOwner, Vec2};
use crate::events::GameEvent;
use crate::formation::EnemyFormation;
use crate::obstacles::ObstacleField;
use crate::player::Player;
use crate::projectiles::ProjectileSystem;

/// Per-game bookkeeping. Survives waves, reset on restart.
#[derive(Clone, Debug)]
pub struct Session {
    /// Starts at 1.
    pub level: u32,
    pub state: GameState,
    pub kills: u32,
    countdown_elapsed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            level: 1,
            state: GameState::Idle,
            kills: 0,
            countdown_elapsed: false,
        }
    }
}

impl Session {
    pub fn finish_countdown(&mut self) {
        self.countdown_elapsed = true;
    }

    pub fn take_countdown_elapsed(&mut self) -> bool {
        std::mem::take(&mut self.countdown_elapsed)
    }
}

pub struct World {
    pub config: Rc<GameConfig>,
    pub session: Session,
    pub player: Player,
    pub formation: EnemyFormation,
    pub projectiles: ProjectileSystem,
    pub obstacles: ObstacleField,
    pub input: PlayerInput,
    pub rng: StdRng,
    outbox: Vec<GameEvent>,
}

impl World {
    pub fn new(config: Rc<GameConfig>, rng: StdRng) -> Self {
        World {
            session: Session::default(),
            player: Player::new(&config.player),
            formation: EnemyFormation::new(),
            projectiles: ProjectileSystem::new(&config.projectile),
            obstacles: ObstacleField::new(),
            input: PlayerInput::default(),
            rng,
            outbox: Vec::new(),
            config,
        }
    }

    pub fn with_seed(config: Rc<GameConfig>, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Queue an event for delivery after the current frame.
    pub fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn fire(&mut self, owner: ProjectileOwner, origin: Vec2) {
        self.projectiles.fire(owner, origin, &self.config.projectile);
        self.emit(GameEvent::ProjectileFired { owner });
    }
}
