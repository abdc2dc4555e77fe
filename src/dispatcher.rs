//! Per-frame fan-out to registered behaviours, plus the routine façade.
//!
//! Each [`UpdateDispatcher::frame`] runs, in order: as many fixed steps as
//! the accumulated time allows, one variable tick, then one scheduler tick.

use crate::scheduler::{CancellationToken, Routine, Scheduler, TaskId};

/// Something the owning loop drives. All hooks are optional.
pub trait Behaviour<C> {
    fn on_init(&mut self, _ctx: &mut C) {}
    fn on_fixed_tick(&mut self, _dt: f32, _ctx: &mut C) {}
    fn on_tick(&mut self, _dt: f32, _ctx: &mut C) {}
    fn on_teardown(&mut self, _ctx: &mut C) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

pub struct UpdateDispatcher<C> {
    behaviours: Vec<(SubscriberId, Box<dyn Behaviour<C>>)>,
    scheduler: Scheduler<C>,
    fixed_step: f32,
    accumulator: f32,
    next_id: u64,
}

impl<C> UpdateDispatcher<C> {
    pub fn new(fixed_step: f32) -> Self {
        UpdateDispatcher {
            behaviours: Vec::new(),
            scheduler: Scheduler::new(),
            fixed_step,
            accumulator: 0.0,
            next_id: 0,
        }
    }

    pub fn register(&mut self, mut behaviour: Box<dyn Behaviour<C>>, ctx: &mut C) -> SubscriberId {
        behaviour.on_init(ctx);
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.behaviours.push((id, behaviour));
        id
    }

    pub fn unregister(&mut self, id: SubscriberId, ctx: &mut C) -> bool {
        match self.behaviours.iter().position(|(sid, _)| *sid == id) {
            Some(index) => {
                let (_, mut behaviour) = self.behaviours.remove(index);
                behaviour.on_teardown(ctx);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.behaviours.len()
    }

    pub fn frame(&mut self, dt: f32, ctx: &mut C) {
        self.accumulator += dt;
        while self.accumulator >= self.fixed_step {
            self.accumulator -= self.fixed_step;
            for (_, behaviour) in self.behaviours.iter_mut() {
                behaviour.on_fixed_tick(self.fixed_step, ctx);
            }
        }

        for (_, behaviour) in self.behaviours.iter_mut() {
            behaviour.on_tick(dt, ctx);
        }

        self.scheduler.tick(dt, ctx);
    }

    pub fn start_routine(
        &mut self,
        routine: impl Routine<C> + 'static,
        token: CancellationToken,
    ) -> TaskId {
        self.scheduler.start(routine, token)
    }

    pub fn stop_routine(&mut self, id: TaskId) -> bool {
        self.scheduler.stop(id)
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    /// Tear down every behaviour and drop all pending routines.
    pub fn teardown_all(&mut self, ctx: &mut C) {
        for (_, mut behaviour) in self.behaviours.drain(..) {
            behaviour.on_teardown(ctx);
        }
        self.scheduler.clear();
    }
}
