use std::f32::consts::TAU;

use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;

use crate::particle::{random_color, Particle, Population};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SplitOutcome {
    Split,
    /// `len + 2` would reach the population cap.
    AtCapacity,
    /// Halving the radius would go below the minimum.
    BelowMinRadius,
    /// No particle at the requested index.
    Missing,
}

/// Replaces the particle at `index` with two fragments of half its radius.
///
/// The fragments fly apart along a random axis, each at `speed_factor` times
/// the parent's speed. The first takes over `index`, the second is appended.
pub fn try_split<R: Rng + ?Sized>(
    population: &mut Population,
    index: usize,
    min_radius: f32,
    speed_factor: f32,
    rng: &mut R,
) -> SplitOutcome {
    if population.len() + 2 >= population.capacity() {
        return SplitOutcome::AtCapacity;
    }
    let Some(parent) = population.get(index).copied() else {
        return SplitOutcome::Missing;
    };
    let radius = parent.radius * 0.5;
    if radius < min_radius {
        return SplitOutcome::BelowMinRadius;
    }

    let speed = parent.vel.length() * speed_factor;
    let dir = Vec2::from_angle(rng.gen::<f32>() * TAU);

    let first = Particle {
        pos: parent.pos,
        vel: dir * speed,
        radius,
        color: random_color(rng),
    };
    let second = Particle {
        pos: parent.pos,
        vel: -dir * speed,
        radius,
        color: random_color(rng),
    };

    population[index] = first;
    population.push(second);
    debug!("particle split; population now {}", population.len());
    SplitOutcome::Split
}
