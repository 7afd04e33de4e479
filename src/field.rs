use nalgebra::Point2;
use rand::prelude::*;
use rayon::prelude::*;

use crate::particle::Particle;
use crate::settings::{Bounds, Settings};

/// Configured speeds are in thousandths of a pixel per tick.
const SPEED_SCALE: f64 = 1000.0;

/// Two particles closer than the link tolerance. `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        ParticleField::default()
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        ParticleField { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replaces every particle with `settings.particle_count()` fresh ones.
    pub fn initialize<R: Rng>(&mut self, settings: &Settings, rng: &mut R) {
        let count = settings.particle_count();
        log::info!("creating {count} particles");
        self.particles = (0..count)
            .map(|_| {
                // Size first, the position ranges were derived from it.
                let size = sample(rng, settings.size_min, settings.size_max);
                let x = sample(rng, settings.position_x_min, settings.position_x_max);
                let y = sample(rng, settings.position_y_min, settings.position_y_max);
                let speed = sample(rng, settings.speed_min, settings.speed_max);
                let direction = sample(rng, settings.direction_min, settings.direction_max);
                let hue = sample(rng, settings.color_min, settings.color_max);
                Particle::new(Point2::new(x, y), size, speed / SPEED_SCALE, direction, hue)
            })
            .collect();
    }

    pub fn tick(&mut self, bounds: Bounds) {
        let width = f64::from(bounds.width());
        let height = f64::from(bounds.height());
        self.particles
            .par_iter_mut()
            .for_each(|particle| particle.update(width, height));
    }

    /// Every unordered pair strictly closer than `tolerance`, each pair once.
    ///
    /// This is a plain O(n²) scan over all pairs.
    pub fn compute_links(&self, tolerance: f64) -> Vec<Link> {
        let mut links = Vec::new();
        for (a, first) in self.particles.iter().enumerate() {
            for (offset, second) in self.particles[a + 1..].iter().enumerate() {
                let distance = first.distance_to(second);
                if distance < tolerance {
                    links.push(Link {
                        a,
                        b: a + 1 + offset,
                        distance,
                        opacity: 1.0 - distance / tolerance,
                    });
                }
            }
        }
        links
    }

    pub fn set_global_multiplier(&mut self, multiplier: f64) {
        for particle in &mut self.particles {
            particle.set_multiplier(multiplier);
        }
    }
}

/// Uniform over `[a, b]`, both ends included, whichever order they come in.
fn sample<R: Rng>(rng: &mut R, a: f64, b: f64) -> f64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    rng.random_range(low..=high)
}
