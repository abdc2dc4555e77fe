//! Destructible bunkers between the formation and the player.

use crate::collision::overlaps;
use crate::config::ObstacleConfig;
use crate::entities::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct ObstaclePart {
    pub position: Vec2,
    pub alive: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    parts: Vec<ObstaclePart>,
    part_half: f32,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing bunkers with `count` fresh ones, evenly spaced
    /// and centred on x = 0.
    pub fn spawn(&mut self, config: &ObstacleConfig) {
        self.clear();
        self.part_half = config.part_size / 2.0;

        let total_width = config.count.saturating_sub(1) as f32 * config.spacing;
        let start_x = -total_width / 2.0;
        let block_width = config.part_cols.saturating_sub(1) as f32 * config.part_size;
        let block_height = config.part_rows.saturating_sub(1) as f32 * config.part_size;

        for i in 0..config.count {
            let centre_x = start_x + i as f32 * config.spacing;
            for row in 0..config.part_rows {
                for col in 0..config.part_cols {
                    let x = centre_x - block_width / 2.0 + col as f32 * config.part_size;
                    let y = config.y + block_height / 2.0 - row as f32 * config.part_size;
                    self.parts.push(ObstaclePart {
                        position: Vec2::new(x, y),
                        alive: true,
                    });
                }
            }
        }
        log::debug!("Spawned {} obstacle parts", self.parts.len());
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    pub fn parts(&self) -> &[ObstaclePart] {
        &self.parts
    }

    pub fn alive_parts(&self) -> usize {
        self.parts.iter().filter(|p| p.alive).count()
    }

    /// Knock out the first live part overlapping the given box.
    pub fn hit(&mut self, position: Vec2, half_extent: f32) -> bool {
        let part_half = self.part_half;
        match self
            .parts
            .iter_mut()
            .find(|p| p.alive && overlaps(p.position, part_half, position, half_extent))
        {
            Some(part) => {
                part.alive = false;
                true
            }
            None => false,
        }
    }
}
