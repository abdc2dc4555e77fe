//! Headless simulation for a grid-formation invaders game.
//!
//! Nothing in the library touches the terminal; the `invaders` binary owns
//! all rendering and input and drives [`game_manager::GameManager`] one
//! frame at a time.

pub mod bootstrap;
pub mod collision;
pub mod config;
pub mod dispatcher;
pub mod entities;
pub mod error;
pub mod events;
pub mod formation;
pub mod game_manager;
pub mod hud;
pub mod logging;
pub mod obstacles;
pub mod player;
pub mod pool;
pub mod projectiles;
pub mod scheduler;
pub mod services;
pub mod sound;
pub mod world;
