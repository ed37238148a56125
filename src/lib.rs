//! 2-D disc bodies that bounce around a box, collide and fragment on hard
//! impacts. Neighbour search goes through a quadtree rebuilt every frame.

pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod particle;
pub mod quadtree;
pub mod split;

pub use config::{Scenario, SimConfig};
pub use engine::{Engine, FrameStats};
pub use error::{Error, Result};
pub use particle::{Particle, Population};
pub use quadtree::QuadTree;
