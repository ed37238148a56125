use bevy::math::Vec2;
use rand::Rng;

use crate::particle::Population;

/// Moves every particle by `vel * dt * speed_multiplier` and reflects it off the
/// domain walls.
///
/// A component is negated whenever the particle ends the step closer than its
/// radius to a wall on that axis, then its magnitude grows by up to `jitter`
/// so a body cannot settle into a step that exactly undoes itself. The nudge
/// never changes the reflected sign. Positions are finally clamped into
/// `[0, domain]`.
pub fn advance<R: Rng + ?Sized>(
    population: &mut Population,
    domain: Vec2,
    dt: f32,
    speed_multiplier: f32,
    jitter: f32,
    rng: &mut R,
) {
    let step = dt * speed_multiplier;
    for p in population.iter_mut() {
        p.pos += p.vel * step;

        if p.pos.x < p.radius || p.pos.x > domain.x - p.radius {
            p.vel.x = reflect(p.vel.x, jitter, rng);
        }
        if p.pos.y < p.radius || p.pos.y > domain.y - p.radius {
            p.vel.y = reflect(p.vel.y, jitter, rng);
        }

        p.pos = p.pos.clamp(Vec2::ZERO, domain);
    }
}

fn reflect<R: Rng + ?Sized>(v: f32, jitter: f32, rng: &mut R) -> f32 {
    let r = -v;
    if jitter > 0.0 {
        r + r.signum() * rng.gen_range(0.0..=jitter)
    } else {
        r
    }
}
