use std::ops::{Index, IndexMut};

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;

use crate::config::SimConfig;

/// A disc body. `color` is carried for the renderer and never read by the physics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            color: Color::WHITE,
        }
    }

    pub fn speed_squared(&self) -> f32 {
        self.vel.length_squared()
    }

    /// Samples a particle of `initial_radius` somewhere inside the domain with
    /// each velocity component drawn from `±initial_velocity`.
    pub fn random<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let r = config.initial_radius;
        let pos = Vec2::new(
            sample_span(rng, r, config.domain.x - r),
            sample_span(rng, r, config.domain.y - r),
        );
        let v = config.initial_velocity;
        let vel = Vec2::new(rng.gen_range(-v..=v), rng.gen_range(-v..=v));
        Self {
            pos,
            vel,
            radius: r,
            color: random_color(rng),
        }
    }
}

fn sample_span<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::srgb(rng.gen(), rng.gen(), rng.gen())
}

/// The live, ordered particle collection. Holds at most `capacity` particles.
///
/// Indices are the only handle other parts of the engine keep into the store,
/// so a slot overwritten in place is seen by every holder of its index.
#[derive(Clone, Debug, Default)]
pub struct Population {
    particles: Vec<Particle>,
    capacity: usize,
}

impl Population {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a population from existing particles, keeping only the first `capacity`.
    pub fn from_particles(mut particles: Vec<Particle>, capacity: usize) -> Self {
        particles.truncate(capacity);
        Self {
            particles,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    /// Appends `p`, returning `false` and dropping it when at capacity.
    pub fn push(&mut self, p: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles.push(p);
        true
    }

    pub fn pop(&mut self) -> Option<Particle> {
        self.particles.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// `(x, y, radius, color)` per particle, in store order, for the renderer.
    pub fn render_view(&self) -> impl Iterator<Item = (f32, f32, f32, Color)> + '_ {
        self.particles
            .iter()
            .map(|p| (p.pos.x, p.pos.y, p.radius, p.color))
    }
}

impl Index<usize> for Population {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.particles[index]
    }
}

impl IndexMut<usize> for Population {
    fn index_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn push_is_a_no_op_at_capacity() {
        let mut pop = Population::new(2);
        assert!(pop.push(Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0)));
        assert!(pop.push(Particle::new(Vec2::ONE, Vec2::ZERO, 1.0)));
        assert!(!pop.push(Particle::new(Vec2::splat(2.0), Vec2::ZERO, 1.0)));
        assert_eq!(pop.len(), 2);
        assert!(pop.is_full());
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let mut pop = Population::new(4);
        assert!(pop.pop().is_none());
        assert!(pop.is_empty());
    }

    #[test]
    fn random_particles_start_inside_the_domain() {
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = Particle::random(&config, &mut rng);
            assert!(p.pos.x >= p.radius && p.pos.x <= config.domain.x - p.radius);
            assert!(p.pos.y >= p.radius && p.pos.y <= config.domain.y - p.radius);
            assert!(p.vel.x.abs() <= config.initial_velocity);
            assert!(p.vel.y.abs() <= config.initial_velocity);
            assert_eq!(p.radius, config.initial_radius);
        }
    }

    #[test]
    fn render_view_follows_store_order() {
        let pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(1.0, 2.0), Vec2::ZERO, 3.0),
                Particle::new(Vec2::new(4.0, 5.0), Vec2::ZERO, 6.0),
            ],
            8,
        );
        let view: Vec<_> = pop.render_view().map(|(x, y, r, _)| (x, y, r)).collect();
        assert_eq!(view, vec![(1.0, 2.0, 3.0), (4.0, 5.0, 6.0)]);
    }
}
