//! Startup configuration for the collision sandbox.
//!
//! Everything here is fixed once an [`Engine`](crate::engine::Engine) is built;
//! the speed multiplier is the only knob that changes between frames and it is
//! owned by the caller.

use bevy::math::Vec2;

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Scenario {
    #[default]
    Calm,
    Shatter,
    Crowded,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Calm, Scenario::Shatter, Scenario::Crowded];

    pub fn label(&self) -> &'static str {
        match *self {
            Scenario::Calm => "Calm",
            Scenario::Shatter => "Shatter",
            Scenario::Crowded => "Crowded",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Width and height of the simulation domain; positions live in `[0, domain]`.
    pub domain: Vec2,
    /// Hard cap on the live population.
    pub max_particles: usize,
    pub initial_particles: usize,
    pub initial_radius: f32,
    /// Particles never split below this radius.
    pub min_radius: f32,
    /// Per-axis bound for sampled velocities.
    pub initial_velocity: f32,
    pub max_velocity: f32,
    /// Squared speed a particle must exceed after a collision to split.
    pub split_speed_sq_threshold: f32,
    /// Fraction of the parent's speed each fragment carries.
    pub split_speed_factor: f32,
    /// Multiplicative step for speed multiplier changes.
    pub speed_step: f32,
    pub dt: f32,
    /// Half-width of the random kick added to a reflected velocity component.
    pub bounce_jitter: f32,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            domain: Vec2::new(800.0, 600.0),
            max_particles: 2000,
            initial_particles: 100,
            initial_radius: 8.0,
            min_radius: 1.0,
            initial_velocity: 50.0,
            max_velocity: 500.0,
            split_speed_sq_threshold: 1600.0,
            split_speed_factor: 0.7,
            speed_step: 1.1,
            dt: 0.016,
            bounce_jitter: 0.5,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_scenario(scenario: Scenario) -> Self {
        let mut config = SimConfig::default();
        match scenario {
            Scenario::Calm => {}
            Scenario::Shatter => {
                config.initial_particles = 60;
                config.initial_radius = 16.0;
                config.initial_velocity = 120.0;
                config.max_velocity = 1200.0;
                config.split_speed_sq_threshold = 900.0;
            }
            Scenario::Crowded => {
                config.max_particles = 4000;
                config.initial_particles = 1200;
                config.initial_radius = 4.0;
                config.initial_velocity = 30.0;
                config.max_velocity = 300.0;
                config.split_speed_sq_threshold = 2500.0;
            }
        }
        config
    }

    pub fn max_speed_multiplier(&self) -> f32 {
        self.max_velocity / self.initial_velocity
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.domain.is_finite() && self.domain.x > 0.0 && self.domain.y > 0.0) {
            return Err(invalid("domain must be finite and > 0 on both axes"));
        }
        if self.max_particles == 0 {
            return Err(invalid("max_particles must be > 0"));
        }
        if self.initial_particles > self.max_particles {
            return Err(invalid(format!(
                "initial_particles ({}) exceeds max_particles ({})",
                self.initial_particles, self.max_particles
            )));
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(invalid("min_radius must be finite and > 0"));
        }
        if !self.initial_radius.is_finite() || self.initial_radius < self.min_radius {
            return Err(invalid("initial_radius must be finite and >= min_radius"));
        }
        if 2.0 * self.initial_radius > self.domain.min_element() {
            return Err(invalid("initial particle diameter does not fit the domain"));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(invalid("dt must be finite and > 0"));
        }
        if !self.speed_step.is_finite() || self.speed_step <= 1.0 {
            return Err(invalid("speed_step must be finite and > 1"));
        }
        if !self.initial_velocity.is_finite() || self.initial_velocity <= 0.0 {
            return Err(invalid("initial_velocity must be finite and > 0"));
        }
        if !self.max_velocity.is_finite() || self.max_velocity < self.initial_velocity {
            return Err(invalid("max_velocity must be finite and >= initial_velocity"));
        }
        if !(self.split_speed_factor > 0.0 && self.split_speed_factor <= 1.0) {
            return Err(invalid("split_speed_factor must lie in (0, 1]"));
        }
        if !self.split_speed_sq_threshold.is_finite() || self.split_speed_sq_threshold < 0.0 {
            return Err(invalid("split_speed_sq_threshold must be finite and >= 0"));
        }
        if !self.bounce_jitter.is_finite() || self.bounce_jitter < 0.0 {
            return Err(invalid("bounce_jitter must be finite and >= 0"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for scenario in Scenario::ALL {
            let config = SimConfig::from_scenario(scenario);
            assert!(
                config.validate().is_ok(),
                "{} preset failed validation",
                scenario.label()
            );
        }
    }

    #[test]
    fn rejects_radius_below_minimum() {
        let config = SimConfig {
            initial_radius: 0.5,
            min_radius: 1.0,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_initial_count_over_capacity() {
        let config = SimConfig {
            max_particles: 10,
            initial_particles: 11,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_growing_speed_step() {
        let config = SimConfig {
            speed_step: 1.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn max_speed_multiplier_is_velocity_ratio() {
        let config = SimConfig::default();
        assert!((config.max_speed_multiplier() - 10.0).abs() < 1e-6);
    }
}
