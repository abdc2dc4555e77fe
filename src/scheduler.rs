//! Step scheduler for timed sequences that span many frames.
//!
//! A [`Routine`] is resumed by [`Scheduler::tick`] whenever its wait has
//! elapsed and answers with the next [`Step`]. Resumption happens at most once
//! per tick, so a routine never observes more than one of its own steps per
//! frame. Cancelled tasks are dropped before they get another resume.

use std::cell::Cell;
use std::rc::Rc;

/// Tolerance for accumulated float error when comparing wake times.
const WAKE_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Suspend for this many seconds of simulated time.
    Wait(f32),
    Done,
}

pub trait Routine<C> {
    fn resume(&mut self, ctx: &mut C) -> Step;
}

impl<C, F> Routine<C> for F
where
    F: FnMut(&mut C) -> Step,
{
    fn resume(&mut self, ctx: &mut C) -> Step {
        self(ctx)
    }
}

/// Shared stop flag. Every clone observes the same cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task<C> {
    id: TaskId,
    wake_at: f64,
    token: CancellationToken,
    routine: Box<dyn Routine<C>>,
}

pub struct Scheduler<C> {
    now: f64,
    next_id: u64,
    tasks: Vec<Task<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Scheduler {
            now: 0.0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a routine; its first resume happens on the next tick.
    pub fn start(
        &mut self,
        routine: impl Routine<C> + 'static,
        token: CancellationToken,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            wake_at: self.now,
            token,
            routine: Box::new(routine),
        });
        id
    }

    /// Remove a task. Returns false if it already finished.
    pub fn stop(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.tasks
            .iter()
            .any(|task| task.id == id && !task.token.is_cancelled())
    }

    /// Tasks that will still be resumed. Cancelled ones are not counted even
    /// before the next tick sweeps them out.
    pub fn len(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.token.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Simulated seconds since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut C) {
        self.now += f64::from(dt);
        let now = self.now;

        self.tasks.retain_mut(|task| {
            if task.token.is_cancelled() {
                return false;
            }
            if task.wake_at > now + WAKE_EPSILON {
                return true;
            }
            match task.routine.resume(ctx) {
                Step::Wait(seconds) => {
                    task.wake_at = now + f64::from(seconds.max(0.0));
                    true
                }
                Step::Done => false,
            }
        });
    }
}
