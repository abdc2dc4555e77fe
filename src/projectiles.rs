//! Live projectiles and the two pools that feed them.

use crate::config::{FieldConfig, ProjectileConfig};
use crate::dispatcher::Behaviour;
use crate::entities::{Projectile, ProjectileOwner, Vec2};
use crate::pool::ObjectPool;
use crate::world::World;

pub struct ProjectileSystem {
    active: Vec<Projectile>,
    player_pool: ObjectPool<Projectile>,
    enemy_pool: ObjectPool<Projectile>,
}

impl ProjectileSystem {
    pub fn new(config: &ProjectileConfig) -> Self {
        ProjectileSystem {
            active: Vec::new(),
            player_pool: ObjectPool::new(config.pool_size, || {
                Projectile::new(ProjectileOwner::Player)
            }),
            enemy_pool: ObjectPool::new(config.pool_size, || {
                Projectile::new(ProjectileOwner::Enemy)
            }),
        }
    }

    pub fn active(&self) -> &[Projectile] {
        &self.active
    }

    pub fn pool(&self, owner: ProjectileOwner) -> &ObjectPool<Projectile> {
        match owner {
            ProjectileOwner::Player => &self.player_pool,
            ProjectileOwner::Enemy => &self.enemy_pool,
        }
    }

    fn pool_mut(&mut self, owner: ProjectileOwner) -> &mut ObjectPool<Projectile> {
        match owner {
            ProjectileOwner::Player => &mut self.player_pool,
            ProjectileOwner::Enemy => &mut self.enemy_pool,
        }
    }

    /// Borrow a projectile from the owner's pool and send it on its way.
    /// Player shots travel up, enemy shots down.
    pub fn fire(&mut self, owner: ProjectileOwner, origin: Vec2, config: &ProjectileConfig) {
        let velocity = match owner {
            ProjectileOwner::Player => config.player_speed,
            ProjectileOwner::Enemy => -config.enemy_speed,
        };
        let mut projectile = self.pool_mut(owner).get();
        projectile.launch(origin, velocity, config.lifetime);
        self.active.push(projectile);
    }

    /// Move everything, then retire projectiles that expired or left the
    /// field. Returns how many were retired.
    pub fn step(&mut self, dt: f32, field: &FieldConfig) -> usize {
        let mut retired = 0;
        let mut i = 0;
        while i < self.active.len() {
            let projectile = &mut self.active[i];
            projectile.advance(dt);
            let out_of_bounds =
                projectile.position.y > field.top || projectile.position.y < field.bottom;
            if projectile.expired() || out_of_bounds {
                self.retire(i);
                retired += 1;
            } else {
                i += 1;
            }
        }
        retired
    }

    /// Return the projectile at `index` to its pool.
    pub fn retire(&mut self, index: usize) {
        let projectile = self.active.swap_remove(index);
        let owner = projectile.owner;
        self.pool_mut(owner).return_to_pool(projectile);
    }

    pub fn clear(&mut self) {
        while !self.active.is_empty() {
            self.retire(self.active.len() - 1);
        }
    }
}

/// Moves projectiles on the physics step.
pub struct ProjectileBehaviour;

impl Behaviour<World> for ProjectileBehaviour {
    fn on_fixed_tick(&mut self, dt: f32, world: &mut World) {
        world.projectiles.step(dt, &world.config.field);
    }

    fn on_teardown(&mut self, world: &mut World) {
        world.projectiles.clear();
    }
}
