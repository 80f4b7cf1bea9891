//! Destructible Shields
//!
//! Each shield is a grid of small destructible blocks following a heart
//! silhouette. Impacts convert world coordinates to grid cells through the
//! shield's anchor and chip every existing block inside a small radius, so
//! a few hits carve a visible notch. Blocks never regenerate within a
//! wave; shields are rebuilt from the template at wave start.

use serde::{Deserialize, Serialize};

use crate::core::geom::Rect;
use crate::game::config::{ShieldConfig, WorldConfig};

/// Heart silhouette: 1 = block exists, 0 = empty.
const HEART_TEMPLATE: [[u8; 13]; 11] = [
    [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
    [0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0],
];

/// One destructible cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Whether the cell still participates in collision
    pub exists: bool,
    /// Remaining hits. Zero implies `exists == false`.
    pub health: u8,
}

/// What an impact did to a shield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Cells that took a point of damage
    pub cells_hit: u32,
    /// Cells removed by this impact
    pub cells_destroyed: u32,
}

impl DamageReport {
    /// True if the impact connected with at least one block.
    pub fn connected(&self) -> bool {
        self.cells_hit > 0
    }
}

/// A destructible heart-shaped barrier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shield {
    /// Top-left anchor in world space
    pub x: f32,
    /// Top-left anchor in world space
    pub y: f32,
    block_size: f32,
    block_health: u8,
    rows: usize,
    columns: usize,
    /// Row-major cell grid
    blocks: Vec<Block>,
}

impl Shield {
    /// Build a shield from the heart template at the given anchor.
    pub fn new(x: f32, y: f32, config: &ShieldConfig) -> Self {
        let rows = HEART_TEMPLATE.len();
        let columns = HEART_TEMPLATE[0].len();
        let mut shield = Self {
            x,
            y,
            block_size: config.block_size,
            block_health: config.block_health,
            rows,
            columns,
            blocks: Vec::new(),
        };
        shield.rebuild();
        shield
    }

    /// Restore every block to the template at full health.
    pub fn rebuild(&mut self) {
        self.blocks = HEART_TEMPLATE
            .iter()
            .flat_map(|row| row.iter())
            .map(|&cell| Block {
                exists: cell == 1,
                health: if cell == 1 { self.block_health } else { 0 },
            })
            .collect();
    }

    /// Grid height in rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid width in columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// World-space bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.columns as f32 * self.block_size,
            self.rows as f32 * self.block_size,
        )
    }

    /// Cell lookup.
    pub fn block(&self, row: usize, column: usize) -> Option<&Block> {
        if row < self.rows && column < self.columns {
            self.blocks.get(row * self.columns + column)
        } else {
            None
        }
    }

    /// Apply one point of damage to every existing cell within
    /// `impact_radius` block units of the world-space impact point.
    pub fn damage_at(&mut self, world_x: f32, world_y: f32, impact_radius: i32) -> DamageReport {
        let mut report = DamageReport::default();

        let center_column = ((world_x - self.x) / self.block_size).floor() as i64;
        let center_row = ((world_y - self.y) / self.block_size).floor() as i64;
        let radius = impact_radius.max(0) as i64;

        for row in center_row - radius..=center_row + radius {
            for column in center_column - radius..=center_column + radius {
                if row < 0 || column < 0 || row >= self.rows as i64 || column >= self.columns as i64
                {
                    continue;
                }
                let index = row as usize * self.columns + column as usize;
                let block = &mut self.blocks[index];

                if !block.exists || block.health == 0 {
                    continue;
                }

                block.health -= 1;
                report.cells_hit += 1;
                if block.health == 0 {
                    block.exists = false;
                    report.cells_destroyed += 1;
                }
            }
        }

        report
    }

    /// Read-only probe: would an impact at this point connect with any
    /// intact cell? Lets the collision pass stay pure while bullets fly
    /// through already-carved notches.
    pub fn intact_block_near(&self, world_x: f32, world_y: f32, impact_radius: i32) -> bool {
        let center_column = ((world_x - self.x) / self.block_size).floor() as i64;
        let center_row = ((world_y - self.y) / self.block_size).floor() as i64;
        let radius = impact_radius.max(0) as i64;

        for row in center_row - radius..=center_row + radius {
            for column in center_column - radius..=center_column + radius {
                if row < 0 || column < 0 || row >= self.rows as i64 || column >= self.columns as i64
                {
                    continue;
                }
                let block = &self.blocks[row as usize * self.columns + column as usize];
                if block.exists && block.health > 0 {
                    return true;
                }
            }
        }
        false
    }

    /// True once no cell is both existing and above zero health.
    pub fn is_destroyed(&self) -> bool {
        !self.blocks.iter().any(|block| block.exists && block.health > 0)
    }

    /// Count of intact cells.
    pub fn remaining_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| block.exists && block.health > 0).count()
    }

    /// Iterate cells with their grid coordinates, for snapshots.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (index / self.columns, index % self.columns, block))
    }
}

/// Lay out the configured number of shields evenly across the field.
pub fn layout_shields(config: &ShieldConfig, world: &WorldConfig) -> Vec<Shield> {
    let template_width = HEART_TEMPLATE[0].len() as f32 * config.block_size;
    let spacing = world.width / (config.count as f32 + 1.0);
    let y = world.height - config.y_offset;

    (0..config.count)
        .map(|i| {
            let x = spacing * (i as f32 + 1.0) - template_width / 2.0;
            Shield::new(x, y, config)
        })
        .collect()
}
