//! Frame pipeline and the owner type the presentation layer drives.
//!
//! One frame is: build a [`QuadTree`] over the current positions, advance every
//! particle, resolve collisions against the tree, drop the tree.

use bevy::color::Color;
use bevy::log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision::{self, CollisionStats};
use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::integrator;
use crate::particle::{Particle, Population};
use crate::quadtree::{Quad, QuadTree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub collisions: usize,
    pub splits: usize,
    pub suppressed_splits: usize,
    pub tree_nodes: usize,
    pub tree_depth: u32,
    /// Particles the index refused because they sat outside the domain.
    pub dropped: usize,
}

/// Seeds `count` particles (capped at `max_particles`) at random positions.
pub fn initialize_population<R: Rng + ?Sized>(
    count: usize,
    config: &SimConfig,
    rng: &mut R,
) -> Population {
    let mut population = Population::new(config.max_particles);
    for _ in 0..count.min(config.max_particles) {
        population.push(Particle::random(config, rng));
    }
    population
}

/// Runs one rebuild → integrate → resolve pass.
pub fn step_frame<R: Rng + ?Sized>(
    population: &mut Population,
    config: &SimConfig,
    dt: f32,
    speed_multiplier: f32,
    rng: &mut R,
) -> FrameStats {
    let tree = QuadTree::build(Quad::from_extent(config.domain), population.as_slice());
    let dropped = population.len() - tree.len();
    if dropped > 0 {
        warn!("{dropped} particles outside the domain were left out of the index");
    }

    integrator::advance(
        population,
        config.domain,
        dt,
        speed_multiplier,
        config.bounce_jitter,
        rng,
    );
    let CollisionStats {
        collisions,
        splits,
        suppressed,
    } = collision::resolve(population, &tree, config, rng);

    FrameStats {
        collisions,
        splits,
        suppressed_splits: suppressed,
        tree_nodes: tree.node_count(),
        tree_depth: tree.depth(),
        dropped,
    }
}

/// Scales `current` up or down by `config.speed_step`, never past
/// [`SimConfig::max_speed_multiplier`].
pub fn adjust_speed_multiplier(current: f32, increase: bool, config: &SimConfig) -> f32 {
    let next = if increase {
        current * config.speed_step
    } else {
        current / config.speed_step
    };
    next.min(config.max_speed_multiplier())
}

pub fn add_particle<R: Rng + ?Sized>(
    population: &mut Population,
    config: &SimConfig,
    rng: &mut R,
) -> bool {
    if population.is_full() {
        return false;
    }
    population.push(Particle::random(config, rng))
}

pub fn remove_particle(population: &mut Population) -> Option<Particle> {
    population.pop()
}

/// A validated config, its population and the generator every random draw
/// comes from.
#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    population: Population,
    rng: StdRng,
    frame: u64,
    last_stats: FrameStats,
}

impl Engine {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let population = initialize_population(config.initial_particles, &config, &mut rng);
        info!(
            "engine ready: {} particles in {}x{} (cap {})",
            population.len(),
            config.domain.x,
            config.domain.y,
            config.max_particles
        );
        Ok(Self {
            config,
            population,
            rng,
            frame: 0,
            last_stats: FrameStats::default(),
        })
    }

    /// Wraps a prepared population. Its capacity must match `max_particles`
    /// and every radius must respect `min_radius`.
    pub fn from_population(config: SimConfig, population: Population) -> Result<Self> {
        config.validate()?;
        if population.capacity() != config.max_particles {
            return Err(Error::InvalidPopulation(format!(
                "capacity {} does not match max_particles {}",
                population.capacity(),
                config.max_particles
            )));
        }
        if population.iter().any(|p| p.radius < config.min_radius) {
            return Err(Error::InvalidPopulation(
                "particle radius below min_radius".into(),
            ));
        }
        let rng = seeded_rng(config.seed);
        Ok(Self {
            config,
            population,
            rng,
            frame: 0,
            last_stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn step_frame(&mut self, speed_multiplier: f32) -> FrameStats {
        let stats = step_frame(
            &mut self.population,
            &self.config,
            self.config.dt,
            speed_multiplier,
            &mut self.rng,
        );
        self.frame += 1;
        self.last_stats = stats;
        trace!(frame = self.frame, n = self.population.len(), ?stats, "frame");
        stats
    }

    pub fn add_particle(&mut self) -> bool {
        add_particle(&mut self.population, &self.config, &mut self.rng)
    }

    pub fn remove_particle(&mut self) -> Option<Particle> {
        remove_particle(&mut self.population)
    }

    /// Reseeds the population from the current config, keeping the generator.
    pub fn reset(&mut self) {
        self.population =
            initialize_population(self.config.initial_particles, &self.config, &mut self.rng);
        self.frame = 0;
        self.last_stats = FrameStats::default();
        info!("engine reset: {} particles", self.population.len());
    }

    pub fn render_view(&self) -> impl Iterator<Item = (f32, f32, f32, Color)> + '_ {
        self.population.render_view()
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
