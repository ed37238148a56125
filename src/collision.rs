use rand::Rng;

use crate::config::SimConfig;
use crate::particle::{Particle, Population};
use crate::quadtree::QuadTree;
use crate::split::{try_split, SplitOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Overlapping pairs handled, counting each endpoint's visit separately.
    pub collisions: usize,
    pub splits: usize,
    /// Splits refused by the population cap.
    pub suppressed: usize,
}

fn wants_split(p: &Particle, config: &SimConfig) -> bool {
    p.speed_squared() > config.split_speed_sq_threshold && p.radius > config.min_radius
}

/// Reverses the velocity of every overlapping pair found through `tree` and
/// fragments fast collided particles.
///
/// Each particle queries the index for neighbours within twice its radius, so
/// a pair is handled once from each side and a particle with several
/// neighbours flips several times in one pass. The loop bound is re-read every
/// iteration: fragments appended by a split are visited too. They are not in
/// the index, but they still find the tree's particles around them.
pub fn resolve<R: Rng + ?Sized>(
    population: &mut Population,
    tree: &QuadTree,
    config: &SimConfig,
    rng: &mut R,
) -> CollisionStats {
    let mut stats = CollisionStats::default();
    let mut nearby = Vec::new();

    let mut i = 0;
    while i < population.len() {
        visit(population, tree, i, config, rng, &mut nearby, &mut stats);
        i += 1;
    }
    stats
}

/// One endpoint's visit from `resolve`: only particle `i`'s neighbours are
/// handled, so this is not a full pass.
pub fn resolve_from<R: Rng + ?Sized>(
    population: &mut Population,
    tree: &QuadTree,
    i: usize,
    config: &SimConfig,
    rng: &mut R,
) -> CollisionStats {
    let mut stats = CollisionStats::default();
    if i < population.len() {
        visit(population, tree, i, config, rng, &mut Vec::new(), &mut stats);
    }
    stats
}

fn visit<R: Rng + ?Sized>(
    population: &mut Population,
    tree: &QuadTree,
    i: usize,
    config: &SimConfig,
    rng: &mut R,
    nearby: &mut Vec<usize>,
    stats: &mut CollisionStats,
) {
    let me = population[i];
    nearby.clear();
    tree.query_range(population.as_slice(), me.pos, me.radius * 2.0, nearby);

    for &j in nearby.iter() {
        if j == i {
            continue;
        }
        // Re-read `i`: an earlier split in this loop may have replaced it.
        let (a, b) = (population[i], population[j]);
        if a.pos.distance(b.pos) >= a.radius + b.radius {
            continue;
        }

        population[i].vel = -a.vel;
        population[j].vel = -b.vel;
        stats.collisions += 1;

        for k in [i, j] {
            if !wants_split(&population[k], config) {
                continue;
            }
            match try_split(
                population,
                k,
                config.min_radius,
                config.split_speed_factor,
                rng,
            ) {
                SplitOutcome::Split => stats.splits += 1,
                SplitOutcome::AtCapacity => stats.suppressed += 1,
                SplitOutcome::BelowMinRadius | SplitOutcome::Missing => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadtree::Quad;
    use bevy::math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> SimConfig {
        SimConfig {
            domain: Vec2::new(100.0, 100.0),
            split_speed_sq_threshold: f32::INFINITY,
            ..SimConfig::default()
        }
    }

    fn run(pop: &mut Population, config: &SimConfig, seed: u64) -> CollisionStats {
        let tree = QuadTree::build(Quad::from_extent(config.domain), pop.as_slice());
        let mut rng = StdRng::seed_from_u64(seed);
        resolve(pop, &tree, config, &mut rng)
    }

    #[test]
    fn distant_particles_are_untouched() {
        let config = quiet_config();
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(10.0, 10.0), Vec2::new(1.0, 2.0), 1.0),
                Particle::new(Vec2::new(20.0, 10.0), Vec2::new(-1.0, 0.0), 1.0),
            ],
            16,
        );
        let stats = run(&mut pop, &config, 1);
        assert_eq!(stats.collisions, 0);
        assert_eq!(pop[0].vel, Vec2::new(1.0, 2.0));
        assert_eq!(pop[1].vel, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn a_pair_is_handled_from_both_ends() {
        let config = quiet_config();
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::new(3.0, 1.0), 1.0),
                Particle::new(Vec2::new(50.5, 50.0), Vec2::new(-2.0, 4.0), 1.0),
            ],
            16,
        );
        let stats = run(&mut pop, &config, 1);
        // Visited from 0 then from 1: two flips cancel out.
        assert_eq!(stats.collisions, 2);
        assert_eq!(pop[0].vel, Vec2::new(3.0, 1.0));
        assert_eq!(pop[1].vel, Vec2::new(-2.0, 4.0));
    }

    #[test]
    fn overlapping_pair_is_negated_from_one_side() {
        let config = quiet_config();
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::new(3.0, 1.0), 1.0),
                Particle::new(Vec2::new(50.5, 50.0), Vec2::new(-2.0, 4.0), 1.0),
            ],
            16,
        );
        let tree = QuadTree::build(Quad::from_extent(config.domain), pop.as_slice());
        let mut rng = StdRng::seed_from_u64(1);

        let stats = resolve_from(&mut pop, &tree, 0, &config, &mut rng);
        assert_eq!(stats.collisions, 1);
        assert_eq!(pop[0].vel, Vec2::new(-3.0, -1.0));
        assert_eq!(pop[1].vel, Vec2::new(2.0, -4.0));
    }

    #[test]
    fn several_neighbours_flip_several_times() {
        let config = quiet_config();
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::new(1.0, 0.0), 1.0),
                Particle::new(Vec2::new(51.0, 50.0), Vec2::new(0.0, 1.0), 1.0),
                Particle::new(Vec2::new(49.0, 50.0), Vec2::new(0.0, -1.0), 1.0),
            ],
            16,
        );
        let tree = QuadTree::build(Quad::from_extent(config.domain), pop.as_slice());
        let mut rng = StdRng::seed_from_u64(1);

        let stats = resolve_from(&mut pop, &tree, 0, &config, &mut rng);
        assert_eq!(stats.collisions, 2);
        assert_eq!(pop[0].vel, Vec2::new(1.0, 0.0));
        assert_eq!(pop[1].vel, Vec2::new(0.0, -1.0));
        assert_eq!(pop[2].vel, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn touching_is_not_overlapping() {
        let config = quiet_config();
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::X, 1.0),
                Particle::new(Vec2::new(52.0, 50.0), Vec2::X, 1.0),
            ],
            16,
        );
        assert_eq!(run(&mut pop, &config, 1).collisions, 0);
    }

    #[test]
    fn fast_collision_fragments_and_respects_min_radius() {
        let config = SimConfig {
            domain: Vec2::new(100.0, 100.0),
            split_speed_sq_threshold: 100.0,
            min_radius: 1.0,
            max_particles: 64,
            ..SimConfig::default()
        };
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::new(40.0, 0.0), 4.0),
                Particle::new(Vec2::new(51.0, 50.0), Vec2::new(-40.0, 0.0), 4.0),
            ],
            config.max_particles,
        );
        let stats = run(&mut pop, &config, 5);
        assert!(stats.splits > 0);
        assert!(pop.len() > 2);
        assert!(pop.len() <= config.max_particles);
        assert!(pop.iter().all(|p| p.radius >= config.min_radius));
    }

    #[test]
    fn fragments_appended_mid_pass_are_visited() {
        let config = SimConfig {
            domain: Vec2::new(100.0, 100.0),
            split_speed_sq_threshold: 100.0,
            min_radius: 1.0,
            max_particles: 64,
            ..SimConfig::default()
        };
        let mut pop = Population::from_particles(
            vec![
                Particle::new(Vec2::new(50.0, 50.0), Vec2::new(40.0, 0.0), 4.0),
                Particle::new(Vec2::new(51.0, 50.0), Vec2::new(-40.0, 0.0), 4.0),
            ],
            config.max_particles,
        );
        let entry_len = pop.len();
        let stats = run(&mut pop, &config, 5);

        // The index only holds the two originals, so each of their visits can
        // count at most one collision. Anything beyond that came from a
        // fragment at `entry_len..`.
        assert!(pop.len() > entry_len);
        assert!(
            stats.collisions > entry_len,
            "fragments were not visited: {stats:?}"
        );
    }
}
