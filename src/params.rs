/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters of the flock: rule weights, the world rectangle,
 * agent tuning and host toggles. Parameters can be modified through the
 * viewer UI, which uses the snapshot methods below for change detection.
 */

use serde::{Deserialize, Serialize};

use crate::agent::AgentSettings;
use crate::error::{self, FlockError};
use crate::rules::{RuleSet, RuleWeights, WorldBounds};

// Parameters for the simulation that can be adjusted via UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_agents: usize,
    pub weights: RuleWeights,
    pub world_width: f32,
    pub world_height: f32,
    pub border_margin: f32,
    // Steer away from the walls instead of wrapping around them
    pub is_bounded: bool,
    pub enable_attractor: bool,
    pub agent: AgentSettings,
    pub show_debug: bool,
    pub debug_lines: bool,
    pub pause_simulation: bool,
    pub fixed_physics_fps: f32,
    // Performance settings
    pub enable_parallel: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Debug, Clone, PartialEq)]
struct ParamSnapshot {
    num_agents: usize,
    weights: RuleWeights,
    bounds: WorldBounds,
    is_bounded: bool,
    enable_attractor: bool,
    agent: AgentSettings,
    show_debug: bool,
    debug_lines: bool,
    pause_simulation: bool,
    fixed_physics_fps: f32,
    enable_parallel: bool,
}

// Result of comparing the current parameters against the last snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub num_agents_changed: bool,
    // Rule weights, bounds or agent settings changed
    pub flock_changed: bool,
    pub any_changed: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        let bounds = WorldBounds::default();
        Self {
            num_agents: 1000,
            weights: RuleWeights::default(),
            world_width: bounds.width,
            world_height: bounds.height,
            border_margin: bounds.border_margin,
            is_bounded: false,
            enable_attractor: true,
            agent: AgentSettings::default(),
            show_debug: false,
            debug_lines: true,
            pause_simulation: false,
            fixed_physics_fps: 60.0,
            enable_parallel: true,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds {
            width: self.world_width,
            height: self.world_height,
            border_margin: self.border_margin,
        }
    }

    pub fn set_bounds(&mut self, bounds: WorldBounds) {
        self.world_width = bounds.width;
        self.world_height = bounds.height;
        self.border_margin = bounds.border_margin;
    }

    // The rule template every agent gets a copy of
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::from_config(&self.weights, self.bounds(), self.is_bounded, self.enable_attractor)
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        error::require_positive("world_width", self.world_width)?;
        error::require_positive("world_height", self.world_height)?;
        error::require_non_negative("border_margin", self.border_margin)?;
        error::require_positive("fixed_physics_fps", self.fixed_physics_fps)?;

        let weights = [
            ("weights.cohesion", self.weights.cohesion),
            ("weights.separation", self.weights.separation),
            ("weights.alignment", self.weights.alignment),
            ("weights.point", self.weights.point),
            ("weights.wall", self.weights.wall),
        ];
        // Weights may be zero or negative, just not NaN/infinite
        for (field, weight) in weights {
            if !weight.is_finite() {
                return Err(FlockError::invalid(field, "must be finite"));
            }
        }

        self.agent.validate()
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.current_values());
    }

    // Check if any parameters have changed since the last snapshot
    pub fn detect_changes(&self) -> ParamChanges {
        // If we don't have previous values, nothing has changed
        let Some(prev) = &self.previous_values else {
            return ParamChanges::default();
        };
        let current = self.current_values();

        let num_agents_changed = current.num_agents != prev.num_agents;
        let flock_changed = current.weights != prev.weights
            || current.bounds != prev.bounds
            || current.is_bounded != prev.is_bounded
            || current.enable_attractor != prev.enable_attractor
            || current.agent != prev.agent;

        ParamChanges {
            num_agents_changed,
            flock_changed,
            any_changed: current != *prev,
        }
    }

    fn current_values(&self) -> ParamSnapshot {
        ParamSnapshot {
            num_agents: self.num_agents,
            weights: self.weights,
            bounds: self.bounds(),
            is_bounded: self.is_bounded,
            enable_attractor: self.enable_attractor,
            agent: self.agent,
            show_debug: self.show_debug,
            debug_lines: self.debug_lines,
            pause_simulation: self.pause_simulation,
            fixed_physics_fps: self.fixed_physics_fps,
            enable_parallel: self.enable_parallel,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_num_agents_range() -> std::ops::RangeInclusive<usize> {
        0..=5000
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_speed_range() -> std::ops::RangeInclusive<f32> {
        1.0..=100.0
    }

    pub fn get_visual_range_range() -> std::ops::RangeInclusive<f32> {
        0.0..=50.0
    }

    pub fn get_max_acceleration_range() -> std::ops::RangeInclusive<f32> {
        1.0..=500.0
    }

    pub fn get_world_size_range() -> std::ops::RangeInclusive<f32> {
        20.0..=1000.0
    }

    pub fn get_border_margin_range() -> std::ops::RangeInclusive<f32> {
        0.0..=50.0
    }

    pub fn get_physics_fps_range() -> std::ops::RangeInclusive<f32> {
        10.0..=240.0
    }
}
