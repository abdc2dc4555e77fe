//! Wave and level lifecycle.
//!
//! ```text
//! Idle ──start──▶ WaveCountdown ──countdown──▶ Playing
//!                      ▲                          │
//!                      ├──── level cleared ───────┤ (health bonus)
//!                      └──── hit, still alive ────┤
//!                                                 ├── health ≤ 0 ──▶ Lost
//!                                                 └── level > max ──▶ Won
//! Won / Lost ──restart──▶ Idle
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;

use crate::collision::CollisionBehaviour;
use crate::config::GameConfig;
use crate::dispatcher::UpdateDispatcher;
use crate::entities::{GameState, PlayerInput};
use crate::error::ServiceError;
use crate::events::{EventBus, GameEvent, GameEventListener, ListenerId};
use crate::formation::{AdvanceFormation, EnemyFire};
use crate::hud::Hud;
use crate::player::PlayerBehaviour;
use crate::projectiles::ProjectileBehaviour;
use crate::scheduler::{CancellationToken, Step};
use crate::services::ServiceLocator;
use crate::sound::SoundManager;
use crate::world::{Session, World};

pub struct GameManager {
    world: World,
    dispatcher: UpdateDispatcher<World>,
    events: EventBus,
    countdown_token: Option<CancellationToken>,
    wave_token: Option<CancellationToken>,
}

impl GameManager {
    pub fn new(config: Rc<GameConfig>, rng: StdRng) -> Self {
        let mut world = World::new(Rc::clone(&config), rng);
        let mut dispatcher = UpdateDispatcher::new(config.timing.fixed_step);
        // Projectiles must move before collisions are resolved.
        dispatcher.register(Box::new(PlayerBehaviour), &mut world);
        dispatcher.register(Box::new(ProjectileBehaviour), &mut world);
        dispatcher.register(Box::new(CollisionBehaviour), &mut world);

        GameManager {
            world,
            dispatcher,
            events: EventBus::new(),
            countdown_token: None,
            wave_token: None,
        }
    }

    /// Build from registered services. The config is required; the HUD and
    /// sound manager are subscribed when present.
    pub fn from_services(services: &ServiceLocator, rng: StdRng) -> Result<Self, ServiceError> {
        let config = services.try_get_service::<GameConfig>()?;
        let mut manager = GameManager::new(config, rng);

        match services.get_service::<RefCell<Hud>>() {
            Some(hud) => {
                manager.subscribe(hud);
            }
            None => log::warn!("No HUD registered, running without overlay state"),
        }
        match services.get_service::<RefCell<SoundManager>>() {
            Some(sound) => {
                manager.subscribe(sound);
            }
            None => log::warn!("No sound manager registered, running silent"),
        }
        Ok(manager)
    }

    pub fn subscribe(&mut self, listener: Rc<RefCell<dyn GameEventListener>>) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn state(&self) -> GameState {
        self.world.session.state
    }

    pub fn level(&self) -> u32 {
        self.world.session.level
    }

    pub fn health(&self) -> i32 {
        self.world.player.health()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == GameState::Playing
    }

    /// Routines still queued in the scheduler.
    pub fn pending_routines(&self) -> usize {
        self.dispatcher.scheduler().len()
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.world.input = input;
    }

    /// Leave Idle and count down to the first wave.
    pub fn start(&mut self) -> bool {
        if self.state() != GameState::Idle {
            log::warn!("start ignored in state {:?}", self.state());
            return false;
        }
        log::info!("Game started");
        let config = Rc::clone(&self.world.config);
        self.world.player.reset(&config.player);
        self.world.obstacles.spawn(&config.obstacle);
        self.begin_countdown();
        self.flush_events();
        true
    }

    /// Abandon the current game, whatever its state, and return to Idle.
    pub fn restart(&mut self) {
        log::info!("Game restarted from {:?}", self.state());
        self.cancel_countdown();
        self.end_wave();
        let config = Rc::clone(&self.world.config);
        self.world.session = Session::default();
        self.world.player.reset(&config.player);
        self.world.obstacles.clear();
        self.world.emit(GameEvent::Restarted);
        self.flush_events();
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32) {
        self.dispatcher.frame(dt, &mut self.world);
        self.evaluate();
        self.flush_events();
    }

    /// Tear down every behaviour; the manager is inert afterwards.
    pub fn shutdown(&mut self) {
        self.cancel_countdown();
        self.end_wave();
        self.dispatcher.teardown_all(&mut self.world);
        self.flush_events();
    }

    fn evaluate(&mut self) {
        match self.world.session.state {
            GameState::WaveCountdown => {
                if self.world.session.take_countdown_elapsed() {
                    self.start_wave();
                }
            }
            GameState::Playing => {
                if self.world.player.take_hit() {
                    self.end_wave();
                    if self.world.player.health() <= 0 {
                        self.finish(GameState::Lost);
                    } else {
                        self.begin_countdown();
                    }
                } else if !self.world.formation.any_alive() {
                    self.level_cleared();
                }
            }
            GameState::Idle | GameState::Won | GameState::Lost => {}
        }
    }

    fn level_cleared(&mut self) {
        self.end_wave();
        let cleared = self.world.session.level;
        self.world.emit(GameEvent::LevelCleared { level: cleared });
        self.world.session.level += 1;

        if self.world.session.level > self.world.config.session.max_level {
            self.finish(GameState::Won);
        } else {
            let bonus = self.world.config.session.level_bonus_health;
            self.world.player.add_health(bonus);
            self.begin_countdown();
        }
    }

    fn finish(&mut self, state: GameState) {
        log::info!("Game over: {:?} at level {}", state, self.world.session.level);
        self.world.session.state = state;
        self.world.emit(match state {
            GameState::Won => GameEvent::PlayerWon,
            _ => GameEvent::PlayerLost,
        });
    }

    fn begin_countdown(&mut self) {
        self.cancel_countdown();
        let session = &mut self.world.session;
        session.state = GameState::WaveCountdown;
        session.take_countdown_elapsed();
        let level = session.level;
        self.world.emit(GameEvent::WaveCountdownStarted {
            level,
            health: self.world.player.health(),
        });

        let mut remaining = self.world.config.session.countdown_seconds;
        let token = CancellationToken::new();
        self.dispatcher.start_routine(
            move |world: &mut World| {
                if remaining == 0 {
                    world.session.finish_countdown();
                    return Step::Done;
                }
                world.emit(GameEvent::CountdownTick { remaining });
                remaining -= 1;
                Step::Wait(1.0)
            },
            token.clone(),
        );
        self.countdown_token = Some(token);
        log::debug!("Countdown started for level {}", level);
    }

    fn cancel_countdown(&mut self) {
        if let Some(token) = self.countdown_token.take() {
            token.cancel();
        }
    }

    fn start_wave(&mut self) {
        self.countdown_token = None;
        let level = self.world.session.level;
        if let Err(err) = self.world.formation.spawn_grid(&self.world.config, level) {
            log::warn!("{}; clearing the stale grid", err);
            self.world.formation.clear();
            if let Err(err) = self.world.formation.spawn_grid(&self.world.config, level) {
                log::error!("Could not spawn wave {}: {}", level, err);
                return;
            }
        }
        self.world.player.activate(&self.world.config.player);
        self.world.session.state = GameState::Playing;

        let token = CancellationToken::new();
        self.dispatcher
            .start_routine(AdvanceFormation::new(), token.clone());
        self.dispatcher.start_routine(EnemyFire, token.clone());
        self.wave_token = Some(token);

        self.world.emit(GameEvent::WaveStarted {
            level,
            health: self.world.player.health(),
        });
        log::info!("Wave {} started", level);
    }

    /// Stop the wave's routines and clear everything it put on the field.
    fn end_wave(&mut self) {
        if let Some(token) = self.wave_token.take() {
            token.cancel();
        }
        self.world.formation.clear();
        self.world.projectiles.clear();
        self.world.player.deactivate();
    }

    fn flush_events(&mut self) {
        for event in self.world.drain_events() {
            self.events.publish(&event);
        }
    }
}
