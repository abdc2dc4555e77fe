//! Box overlap tests and the physics-step resolution of hits.

use crate::dispatcher::Behaviour;
use crate::entities::{GameState, ProjectileOwner, Vec2};
use crate::events::GameEvent;
use crate::world::World;

/// Axis-aligned square overlap; each box is given by centre and half extent.
pub fn overlaps(a: Vec2, a_half: f32, b: Vec2, b_half: f32) -> bool {
    let reach = a_half + b_half;
    (a.x - b.x).abs() <= reach && (a.y - b.y).abs() <= reach
}

/// Resolves projectile hits and invasion on every physics step. Registered
/// after [`ProjectileBehaviour`](crate::projectiles::ProjectileBehaviour) so
/// it sees this step's positions.
pub struct CollisionBehaviour;

impl CollisionBehaviour {
    fn resolve_projectiles(world: &mut World) {
        let enemy_half = world.config.enemy.half_extent;
        let player_half = world.config.player.half_extent;
        let shot_half = world.config.projectile.half_extent;

        let mut i = world.projectiles.active().len();
        while i > 0 {
            i -= 1;
            let projectile = &world.projectiles.active()[i];
            let (position, owner) = (projectile.position, projectile.owner);

            let consumed = match owner {
                ProjectileOwner::Player => {
                    let target = world
                        .formation
                        .slots()
                        .find(|(_, e)| {
                            !e.is_dead() && overlaps(e.position, enemy_half, position, shot_half)
                        })
                        .map(|(slot, _)| slot);
                    if let Some(slot) = target {
                        world.formation.kill(slot);
                        world.session.kills += 1;
                        world.emit(GameEvent::EnemyKilled { slot });
                        true
                    } else if world.obstacles.hit(position, shot_half) {
                        world.emit(GameEvent::ObstacleHit);
                        true
                    } else {
                        false
                    }
                }
                ProjectileOwner::Enemy => {
                    if world.player.is_active()
                        && overlaps(world.player.position(), player_half, position, shot_half)
                    {
                        let health = world.player.remove_health();
                        world.emit(GameEvent::PlayerHit { health });
                        true
                    } else if world.obstacles.hit(position, shot_half) {
                        world.emit(GameEvent::ObstacleHit);
                        true
                    } else {
                        false
                    }
                }
            };

            if consumed {
                world.projectiles.retire(i);
            }
        }
    }

    fn resolve_invasion(world: &mut World) {
        let limit = world.config.enemy.limit_y;
        let invaded = world
            .formation
            .lowest_alive_y()
            .map_or(false, |y| y <= limit);
        // A player already downed this wave has paid for it.
        if invaded && world.player.is_active() && world.formation.trigger_player_kill() {
            log::info!("Formation reached the limit line");
            let health = world.player.remove_health();
            world.emit(GameEvent::PlayerHit { health });
        }
    }
}

impl Behaviour<World> for CollisionBehaviour {
    fn on_fixed_tick(&mut self, _dt: f32, world: &mut World) {
        if world.session.state != GameState::Playing {
            return;
        }
        Self::resolve_projectiles(world);
        Self::resolve_invasion(world);
    }
}
