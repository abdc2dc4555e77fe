//! Presentation state for the overlay panels. Driven purely by game events.

use crate::events::{GameEvent, GameEventListener};

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub title_visible: bool,
    /// "Level N" banner shown during the countdown.
    pub level_banner: Option<String>,
    pub countdown: Option<u32>,
    /// Hearts panel; `None` while hidden.
    pub hearts: Option<i32>,
    pub level: u32,
    pub kills: u32,
    pub victory_visible: bool,
    pub defeat_visible: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Hud {
            title_visible: true,
            level_banner: None,
            countdown: None,
            hearts: None,
            level: 1,
            kills: 0,
            victory_visible: false,
            defeat_visible: false,
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart/quit prompt shown after the game ends.
    pub fn restart_prompt_visible(&self) -> bool {
        self.victory_visible || self.defeat_visible
    }

    fn show_end_screen(&mut self) {
        self.hearts = None;
        self.level_banner = None;
        self.countdown = None;
    }
}

impl GameEventListener for Hud {
    fn on_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::WaveCountdownStarted { level, .. } => {
                self.title_visible = false;
                self.hearts = None;
                self.level = level;
                self.level_banner = Some(format!("Level {}", level));
            }
            GameEvent::CountdownTick { remaining } => self.countdown = Some(remaining),
            GameEvent::WaveStarted { health, .. } => {
                self.level_banner = None;
                self.countdown = None;
                self.hearts = Some(health);
            }
            GameEvent::PlayerHit { health } => {
                if self.hearts.is_some() {
                    self.hearts = Some(health.max(0));
                }
            }
            GameEvent::EnemyKilled { .. } => self.kills += 1,
            GameEvent::PlayerWon => {
                self.show_end_screen();
                self.victory_visible = true;
            }
            GameEvent::PlayerLost => {
                self.show_end_screen();
                self.defeat_visible = true;
            }
            GameEvent::Restarted => *self = Hud::default(),
            _ => {}
        }
    }
}
