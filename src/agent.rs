/*
 * Agent Module
 *
 * This module defines the Agent struct (one boid) and its per-tick update:
 * 1. Find the neighborhood: every other agent within visual range
 * 2. Sum the weighted forces of the agent's own rules
 * 3. Clamp the acceleration, integrate velocity, apply the speed policy
 * 4. Integrate position and derive the facing rotation
 *
 * An agent only ever reads other agents through an immutable snapshot taken
 * before the tick, and only ever writes its own state.
 */

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{self, FlockError};
use crate::math;
use crate::rules::{RuleContext, RuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Kinematic state; everything a tick reads from or writes to an agent's motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    // Force accumulator, zeroed after every integration
    pub acceleration: Vec2,
}

impl Kinematics {
    pub fn at(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
        }
    }
}

// Per-agent tuning. Preconditions are checked by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub visual_range: f32,
    pub speed: f32,
    pub max_acceleration: f32,
    // Hold |velocity| at exactly `speed` instead of only capping it
    pub constant_speed: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            visual_range: 10.0,
            speed: 30.0,
            max_acceleration: 100.0,
            constant_speed: false,
        }
    }
}

impl AgentSettings {
    pub fn validate(&self) -> Result<(), FlockError> {
        error::require_non_negative("visual_range", self.visual_range)?;
        error::require_non_negative("max_acceleration", self.max_acceleration)?;
        if self.constant_speed {
            error::require_positive("speed", self.speed)
        } else {
            error::require_non_negative("speed", self.speed)
        }
    }
}

// What other agents may see of an agent during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Vec2,
    pub velocity: Vec2,
}

// Facing in degrees. The simulation is planar, so pitch and roll stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    pub fn facing(velocity: Vec2) -> Self {
        Self {
            pitch: 0.0,
            yaw: math::yaw(velocity).to_degrees(),
            roll: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    body: Kinematics,
    settings: AgentSettings,
    rules: RuleSet,
    // Neighborhood found during the last update
    neighbors: Vec<AgentId>,
    rotation: Rotation,
}

impl Agent {
    pub fn new(
        id: AgentId,
        position: Vec2,
        velocity: Vec2,
        settings: AgentSettings,
        rules: RuleSet,
    ) -> Result<Self, FlockError> {
        settings.validate()?;
        if !position.is_finite() {
            return Err(FlockError::invalid("position", "must be finite"));
        }
        if !velocity.is_finite() {
            return Err(FlockError::invalid("velocity", "must be finite"));
        }

        Ok(Self {
            id,
            body: Kinematics::at(position, velocity),
            settings,
            rules,
            neighbors: Vec::new(),
            rotation: Rotation::facing(velocity),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn acceleration(&self) -> Vec2 {
        self.body.acceleration
    }

    pub fn speed(&self) -> f32 {
        self.settings.speed
    }

    pub fn visual_range(&self) -> f32 {
        self.settings.visual_range
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn kinematics(&self) -> Kinematics {
        self.body
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn neighbors(&self) -> &[AgentId] {
        &self.neighbors
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    // Heading in radians
    pub fn facing_yaw(&self) -> f32 {
        math::yaw(self.body.velocity)
    }

    pub fn set_settings(&mut self, settings: AgentSettings) -> Result<(), FlockError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    // Replace the rules with a private copy of `template`
    pub fn set_rules(&mut self, template: &RuleSet) {
        self.rules = template.clone();
    }

    pub fn restore_kinematics(&mut self, body: Kinematics) {
        self.body = body;
        self.rotation = Rotation::facing(body.velocity);
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.body.position,
            velocity: self.body.velocity,
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.body.acceleration += force;
    }

    // Every other agent in the roster within visual range (inclusive)
    pub fn compute_neighborhood(&self, roster: &[AgentSnapshot]) -> Vec<AgentSnapshot> {
        let position = self.body.position;
        let range = self.settings.visual_range;

        roster
            .iter()
            .filter(|other| other.id != self.id && position.distance(other.position) <= range)
            .copied()
            .collect()
    }

    // Advance this agent by one tick against a pre-tick snapshot of the whole flock
    pub fn update(&mut self, roster: &[AgentSnapshot], ctx: &RuleContext, delta_time: f32) {
        let neighborhood = self.compute_neighborhood(roster);

        let force = self.rules.net_force(&neighborhood, &mut self.body, ctx);
        self.apply_force(force);

        self.integrate(delta_time);

        self.neighbors.clear();
        self.neighbors.extend(neighborhood.iter().map(|n| n.id));
    }

    // Apply the accumulated force and move; resets the accumulator
    pub fn integrate(&mut self, delta_time: f32) {
        self.clamp_acceleration();

        // Velocity integrates the raw acceleration, position integrates over delta time
        self.body.velocity += self.body.acceleration;
        self.body.acceleration = Vec2::ZERO;

        self.apply_speed_policy();

        self.body.position += self.body.velocity * delta_time;
        self.rotation = Rotation::facing(self.body.velocity);
    }

    pub fn clamp_acceleration(&mut self) {
        self.body.acceleration =
            math::limit(self.body.acceleration, self.settings.max_acceleration);
    }

    // Constant speed renormalizes to `speed` (zero velocity stays zero), otherwise cap at `speed`
    pub fn apply_speed_policy(&mut self) {
        self.body.velocity = if self.settings.constant_speed {
            math::with_magnitude(self.body.velocity, self.settings.speed)
        } else {
            math::limit(self.body.velocity, self.settings.speed)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, WorldBounds};
    use approx::assert_relative_eq;

    fn settings() -> AgentSettings {
        AgentSettings::default()
    }

    fn agent(id: u64, x: f32, y: f32, rules: RuleSet) -> Agent {
        Agent::new(AgentId(id), Vec2::new(x, y), Vec2::ZERO, settings(), rules).unwrap()
    }

    fn snapshot_at(id: u64, x: f32, y: f32) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId(id),
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn neighborhood_excludes_self_and_includes_the_boundary() {
        let a = agent(0, 0.0, 0.0, RuleSet::new());
        let roster = [
            snapshot_at(0, 0.0, 0.0),
            snapshot_at(1, 10.0, 0.0),
            snapshot_at(2, 10.5, 0.0),
            snapshot_at(3, 0.0, -3.0),
        ];
        let ids: Vec<_> = a.compute_neighborhood(&roster).iter().map(|n| n.id).collect();
        assert_eq!(ids, [AgentId(1), AgentId(3)]);
    }

    #[test]
    fn zero_visual_range_sees_only_stacked_agents() {
        let mut s = settings();
        s.visual_range = 0.0;
        let a = Agent::new(AgentId(0), Vec2::ZERO, Vec2::ZERO, s, RuleSet::new()).unwrap();
        let roster = [snapshot_at(1, 0.0, 0.0), snapshot_at(2, 0.1, 0.0)];
        assert_eq!(a.compute_neighborhood(&roster).len(), 1);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut s = settings();
        s.visual_range = -1.0;
        assert!(matches!(
            Agent::new(AgentId(0), Vec2::ZERO, Vec2::ZERO, s, RuleSet::new()),
            Err(FlockError::InvalidConfig { field: "visual_range", .. })
        ));

        let mut s = settings();
        s.speed = 0.0;
        s.constant_speed = true;
        assert!(s.validate().is_err());
        s.constant_speed = false;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn non_finite_initial_state_is_rejected() {
        let position = Vec2::new(f32::NAN, 0.0);
        let result = Agent::new(AgentId(0), position, Vec2::ZERO, settings(), RuleSet::new());
        assert!(result.is_err());
    }

    #[test]
    fn acceleration_is_clamped_before_integration() {
        let mut a = agent(0, 0.0, 0.0, RuleSet::new());
        a.apply_force(Vec2::new(300.0, 400.0));
        a.clamp_acceleration();
        assert_relative_eq!(a.acceleration().length(), 100.0, epsilon = 1e-3);
        assert_relative_eq!(a.acceleration().x, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn integration_caps_speed_and_resets_acceleration() {
        let mut a = agent(0, 0.0, 0.0, RuleSet::new());
        a.apply_force(Vec2::new(80.0, 0.0));
        a.integrate(0.5);
        assert_eq!(a.acceleration(), Vec2::ZERO);
        assert_relative_eq!(a.velocity().x, 30.0, epsilon = 1e-4);
        assert_relative_eq!(a.position().x, 15.0, epsilon = 1e-4);
    }

    #[test]
    fn slow_agents_keep_their_speed_without_constant_speed() {
        let velocity = Vec2::new(0.0, 2.0);
        let mut a =
            Agent::new(AgentId(0), Vec2::ZERO, velocity, settings(), RuleSet::new()).unwrap();
        a.integrate(1.0);
        assert_eq!(a.velocity(), Vec2::new(0.0, 2.0));
        assert_eq!(a.position(), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn constant_speed_renormalizes_but_leaves_zero_alone() {
        let mut s = settings();
        s.constant_speed = true;
        let velocity = Vec2::new(0.0, 2.0);
        let mut moving = Agent::new(AgentId(0), Vec2::ZERO, velocity, s, RuleSet::new()).unwrap();
        moving.integrate(1.0);
        assert_relative_eq!(moving.velocity().length(), 30.0, epsilon = 1e-4);

        let mut still = Agent::new(AgentId(1), Vec2::ZERO, Vec2::ZERO, s, RuleSet::new()).unwrap();
        still.integrate(1.0);
        assert_eq!(still.velocity(), Vec2::ZERO);
        assert!(!still.position().is_nan());
    }

    #[test]
    fn rotation_follows_velocity() {
        let velocity = Vec2::new(0.0, 5.0);
        let mut a =
            Agent::new(AgentId(0), Vec2::ZERO, velocity, settings(), RuleSet::new()).unwrap();
        a.integrate(0.1);
        assert_relative_eq!(a.rotation().yaw, 90.0, epsilon = 1e-4);
        assert_eq!(a.rotation().pitch, 0.0);
        assert_eq!(a.rotation().roll, 0.0);
        assert_relative_eq!(a.facing_yaw(), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn update_records_neighbors_and_steers_away() {
        let rules = RuleSet::new().with(Rule::separation(1.0));
        let mut a = agent(0, 50.0, 50.0, rules);
        let roster = [a.snapshot(), snapshot_at(1, 55.0, 50.0), snapshot_at(2, 90.0, 90.0)];
        a.update(&roster, &RuleContext::default(), 1.0);
        assert_eq!(a.neighbors(), [AgentId(1)]);
        assert!(a.velocity().x < 0.0);
    }

    #[test]
    fn wrap_rule_moves_the_agent_before_integration() {
        let rules = RuleSet::new().with(Rule::bounded_area(WorldBounds::default(), false, 1.0));
        let (position, velocity) = (Vec2::new(105.0, 50.0), Vec2::new(10.0, 0.0));
        let mut a = Agent::new(AgentId(0), position, velocity, settings(), rules).unwrap();
        let roster = [a.snapshot()];
        a.update(&roster, &RuleContext::default(), 0.1);
        assert_relative_eq!(a.position().x, 1.0, epsilon = 1e-5);
        assert_eq!(a.position().y, 50.0);
    }

    #[test]
    fn set_rules_clones_the_template() {
        let template = RuleSet::new().with(Rule::alignment(2.0));
        let mut a = agent(0, 0.0, 0.0, RuleSet::new());
        a.set_rules(&template);
        assert_eq!(a.rules(), &template);
    }
}
