/*
 * Flocking Simulation - Module Definitions
 *
 * This file defines the module structure of the flocking library.
 * The core (math, rules, agent, flock) has no rendering dependencies; the
 * nannou viewer lives behind the `viewer` feature.
 */

// Re-export key components for easier access
pub use agent::{Agent, AgentId, AgentSettings, AgentSnapshot, Kinematics, Rotation};
pub use debug::DebugInfo;
pub use error::FlockError;
pub use flock::{step, Flock};
pub use params::{ParamChanges, SimulationParams};
pub use rules::{Attractor, Rule, RuleContext, RuleKind, RuleSet, RuleWeights, WorldBounds};

pub use glam::Vec2;

// Define modules
pub mod agent;
pub mod debug;
pub mod error;
pub mod flock;
pub mod math;
pub mod params;
pub mod rules;

#[cfg(feature = "viewer")]
pub mod viewer;

// Constants
pub const AGENT_SIZE: f32 = 1.2;
// Neighbors closer than this get a debug line in the viewer
pub const DEBUG_LINE_DISTANCE: f32 = 15.0;
