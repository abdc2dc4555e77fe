//! Game events and the observer list that fans them out.

use std::cell::RefCell;
use std::rc::Rc;

use crate::entities::{GridPos, ProjectileOwner};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// A countdown towards `level` has begun.
    WaveCountdownStarted { level: u32, health: i32 },
    CountdownTick { remaining: u32 },
    WaveStarted { level: u32, health: i32 },
    ProjectileFired { owner: ProjectileOwner },
    EnemyKilled { slot: GridPos },
    ObstacleHit,
    PlayerHit { health: i32 },
    LevelCleared { level: u32 },
    PlayerWon,
    PlayerLost,
    Restarted,
}

pub trait GameEventListener {
    fn on_event(&mut self, event: &GameEvent);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Rc<RefCell<dyn GameEventListener>>)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Rc<RefCell<dyn GameEventListener>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn publish(&self, event: &GameEvent) {
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_event(event);
        }
    }
}
