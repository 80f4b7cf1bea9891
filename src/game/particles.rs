//! Heart-Burst Particles
//!
//! Cosmetic debris spawned on invader kills, shield chips, and parries.
//! Purely visual: nothing in collision or scoring reads particles. The
//! pool holds a hard cap; past it, the oldest particles are evicted first
//! rather than letting the pool grow without bound.

use serde::{Deserialize, Serialize};

use crate::core::geom::Vec2;
use crate::core::rng::GameRng;
use crate::game::config::ParticleConfig;

/// A single particle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Particle {
    /// Current position
    pub position: Vec2,
    /// Velocity in pixels per second
    pub velocity: Vec2,
    /// Seconds lived so far
    pub age: f32,
    /// Seconds until expiry
    pub lifetime: f32,
    /// Draw size in pixels
    pub size: f32,
}

impl Particle {
    /// Remaining life as a fraction in `[0, 1]`, for fade-out rendering.
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            0.0
        } else {
            (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }
}

/// Bounded particle pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
}

impl ParticleSystem {
    /// Create an empty pool with the configured cap.
    pub fn new(config: &ParticleConfig) -> Self {
        Self {
            particles: Vec::with_capacity(config.max_particles.min(512)),
            max_particles: config.max_particles,
        }
    }

    /// Radial burst of hearts at an invader's death site.
    pub fn spawn_heart_burst(&mut self, x: f32, y: f32, config: &ParticleConfig, rng: &mut GameRng) {
        let count = rng.range_u32(config.burst_min, config.burst_max);

        for i in 0..count {
            let angle = std::f32::consts::TAU / count as f32 * i as f32
                + rng.range_f32(-0.18, 0.18);
            let speed = rng.range_f32(80.0, 190.0);

            self.push(Particle {
                position: Vec2::new(x, y),
                velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
                age: 0.0,
                lifetime: rng.range_f32(0.5, 0.65),
                size: rng.range_f32(4.0, 6.0),
            });
        }
    }

    /// Small spark scatter for shield chips and bullet parries.
    pub fn spawn_sparks(&mut self, x: f32, y: f32, rng: &mut GameRng) {
        for _ in 0..3 {
            self.push(Particle {
                position: Vec2::new(x, y),
                velocity: Vec2::new(rng.range_f32(-40.0, 40.0), rng.range_f32(-60.0, 20.0)),
                age: 0.0,
                lifetime: 0.5,
                size: 2.0,
            });
        }
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() >= self.max_particles {
            // Oldest-first eviction; spawn order is insertion order
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Integrate movement and expire old particles.
    pub fn advance(&mut self, dt_seconds: f32) {
        for particle in &mut self.particles {
            particle.age += dt_seconds;
            particle.position = particle.position + particle.velocity * dt_seconds;
        }
        self.particles.retain(|particle| particle.age < particle.lifetime);
    }

    /// Live particles.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Count of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every particle, e.g. at wave start.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
