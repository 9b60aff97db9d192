//! Hunter behavior core for a hide-and-seek arena game.
//!
//! One or more AI hunters guard a can at the center of the arena: they
//! orbit it, scan hiding spots, hear and investigate footsteps, and race
//! for the can once they spot the player. The crate is a pure in-process
//! behavioral module: the host game loop supplies a [`world::WorldView`]
//! snapshot each tick and integrates the resulting transforms into its
//! own rendering and collision layers.

pub mod avoidance;
pub mod config;
pub mod controller;
pub mod corners;
pub mod guard;
pub mod hearing;
pub mod hunter;
pub mod investigate;
pub mod steering;
pub mod tuning;
pub mod vision;
pub mod world;

pub use controller::HunterController;
pub use hunter::{Hunter, HunterConfig, HunterId, HunterState};
pub use tuning::{Param, ParamEntry, Tuning, TuningError};
pub use vision::VisionCone;
pub use world::{GamePhase, Obstacle, Outcome, OutcomeSink, PlayerState, WorldView};
