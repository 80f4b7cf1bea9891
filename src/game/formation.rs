//! Invader Formation Controller
//!
//! Moves every live invader as one rigid rank: march sideways, flip
//! direction at the field edge, drop a fixed step on each flip. Speed
//! scales multiplicatively with the wave number and with how many
//! invaders have been destroyed, recreating the classic heartbeat
//! acceleration as columns empty out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::geom::Rect;
use crate::game::config::FormationConfig;
use crate::game::entities::Invader;

/// Bounding box over the live invaders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationBounds {
    /// Leftmost live edge
    pub left: f32,
    /// Rightmost live edge
    pub right: f32,
    /// Topmost live edge
    pub top: f32,
    /// Bottommost live edge
    pub bottom: f32,
}

/// What the formation did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormationStep {
    /// No live invaders; nothing moved
    Idle,
    /// The rank marched horizontally
    Marched,
    /// The rank hit an edge: direction flipped and every invader dropped.
    /// No horizontal movement happens on a drop tick.
    Dropped,
}

/// The invader grid and its synchronized movement state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Formation {
    /// All invaders spawned this wave, dead ones included
    pub invaders: Vec<Invader>,
    /// Current march direction: +1.0 right, -1.0 left
    pub direction: f32,
    /// Population at spawn. Captured once; the population speedup divides
    /// by this fixed baseline, not by a recomputed count.
    total_spawned: usize,
}

impl Formation {
    /// Spawn a fresh formation grid from the configured layout.
    pub fn spawn(config: &FormationConfig) -> Self {
        let mut invaders = Vec::with_capacity(config.rows * config.columns);

        for row in 0..config.rows {
            for column in 0..config.columns {
                let x = config.start_x + column as f32 * (config.invader_width + config.gap_x);
                let y = config.start_y + row as f32 * (config.invader_height + config.gap_y);
                let rect = Rect::new(x, y, config.invader_width, config.invader_height);
                invaders.push(Invader::new(rect, row, column));
            }
        }

        Self {
            direction: 1.0,
            total_spawned: invaders.len(),
            invaders,
        }
    }

    /// Rebuild the grid for a new wave.
    pub fn reset(&mut self, config: &FormationConfig) {
        *self = Self::spawn(config);
    }

    /// Iterate the live invaders.
    pub fn alive(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter().filter(|invader| invader.alive)
    }

    /// Count of live invaders.
    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Population captured at spawn time.
    pub fn total_spawned(&self) -> usize {
        self.total_spawned
    }

    /// Bounds over the live invaders. `None` once the wave is cleared.
    pub fn bounds(&self) -> Option<FormationBounds> {
        let mut bounds: Option<FormationBounds> = None;

        for invader in self.alive() {
            let rect = &invader.rect;
            bounds = Some(match bounds {
                None => FormationBounds {
                    left: rect.left(),
                    right: rect.right(),
                    top: rect.top(),
                    bottom: rect.bottom(),
                },
                Some(b) => FormationBounds {
                    left: b.left.min(rect.left()),
                    right: b.right.max(rect.right()),
                    top: b.top.min(rect.top()),
                    bottom: b.bottom.max(rect.bottom()),
                },
            });
        }

        bounds
    }

    /// Current horizontal speed in pixels per second.
    ///
    /// `base × levelMultiplier × populationMultiplier`, capped at
    /// `max_speed`. The level multiplier grows `(1 + increase)^(wave-1)`;
    /// the population multiplier interpolates from 1.0 at full strength up
    /// to the configured maximum once the surviving fraction drops to the
    /// threshold.
    pub fn current_speed(&self, config: &FormationConfig, wave: u32) -> f32 {
        let alive = self.alive_count();
        if alive == 0 || self.total_spawned == 0 {
            return 0.0;
        }

        let level_mult = (1.0 + config.level_speed_increase).powi(wave.saturating_sub(1) as i32);

        let alive_fraction = alive as f32 / self.total_spawned as f32;
        let threshold = config.population_speedup_threshold;
        let max_mult = config.population_speedup_max;
        let population_mult = if alive_fraction <= threshold {
            max_mult
        } else {
            // Linear from 1.0 (full population) to max_mult (at threshold)
            1.0 + (max_mult - 1.0) * (1.0 - alive_fraction) / (1.0 - threshold)
        };

        (config.base_speed * level_mult * population_mult).min(config.max_speed)
    }

    /// Advance the rank one tick.
    ///
    /// Edge detection runs before the move commits: if the step would
    /// carry the advancing edge past the margin, the whole rank drops and
    /// reverses instead, with zero horizontal displacement on that tick.
    pub fn advance(
        &mut self,
        dt_seconds: f32,
        config: &FormationConfig,
        world_width: f32,
        wave: u32,
    ) -> FormationStep {
        let Some(bounds) = self.bounds() else {
            return FormationStep::Idle;
        };

        let speed = self.current_speed(config, wave);
        let step = self.direction * speed * dt_seconds;

        let would_hit_right =
            self.direction > 0.0 && bounds.right + step >= world_width - config.edge_margin;
        let would_hit_left = self.direction < 0.0 && bounds.left + step <= config.edge_margin;

        if would_hit_right || would_hit_left {
            self.direction = -self.direction;
            for invader in self.invaders.iter_mut().filter(|invader| invader.alive) {
                invader.rect.y += config.drop_distance;
            }
            return FormationStep::Dropped;
        }

        for invader in self.invaders.iter_mut().filter(|invader| invader.alive) {
            invader.rect.x += step;
        }
        FormationStep::Marched
    }

    /// The front line: for each occupied column, the live invader with the
    /// greatest y. Only these are eligible to fire. Returned in column
    /// order for deterministic shooter selection.
    pub fn bottom_by_column(&self) -> Vec<&Invader> {
        let mut by_column: BTreeMap<usize, &Invader> = BTreeMap::new();

        for invader in self.alive() {
            match by_column.get(&invader.column) {
                Some(current) if current.rect.y >= invader.rect.y => {}
                _ => {
                    by_column.insert(invader.column, invader);
                }
            }
        }

        by_column.into_values().collect()
    }

    /// Whether the lowest live edge has reached the given line.
    pub fn has_reached(&self, limit_y: f32) -> bool {
        self.bounds().is_some_and(|bounds| bounds.bottom >= limit_y)
    }
}
