/*
 * Rules Module
 *
 * This module defines the steering rules every agent evaluates each tick:
 * 1. Cohesion: Steer towards the average position of neighbors
 * 2. Separation: Move away from neighbors that are too close
 * 3. Alignment: Steer towards the average heading of neighbors
 * 4. Bounded area: Stay inside the world, or wrap around its edges
 * 5. Point attraction: Follow (or flee) an external attractor point
 *
 * Rules are plain values. A RuleSet is built once from the simulation weights
 * and every agent receives its own copy, so the per-rule debug cache is never
 * shared between agents.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentSnapshot, Kinematics};
use crate::math::{self, EPSILON};

// Point attraction switches from pulling to pushing inside this distance
pub const POINT_DISTANCE_THRESHOLD: f32 = 15.0;
pub const POINT_FORCE_MAGNITUDE: f32 = 30.0;
// Point attraction is tuned separately from its user-facing weight
pub const POINT_BASE_WEIGHT_MULTIPLIER: f32 = 0.1;
pub const DEFAULT_SEPARATION_DISTANCE: f32 = 10.0;

// A resolved attractor point supplied by the host (e.g. the cursor on the world plane)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub point: Vec2,
    // Flips the sign of the point force
    pub attract_mode: bool,
}

impl Attractor {
    pub fn new(point: Vec2, attract_mode: bool) -> Self {
        Self { point, attract_mode }
    }
}

// Per-tick inputs shared by every agent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleContext {
    pub attractor: Option<Attractor>,
}

// The rectangle [0, width] x [0, height] agents live in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    pub border_margin: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            border_margin: 10.0,
        }
    }
}

impl WorldBounds {
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RuleKind {
    Cohesion,
    Separation { desired_minimum_distance: f32 },
    Alignment,
    BoundedArea { bounds: WorldBounds, is_bounded: bool },
    PointAttraction { is_repulsive: bool },
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Cohesion => "cohesion",
            RuleKind::Separation { .. } => "separation",
            RuleKind::Alignment => "alignment",
            RuleKind::BoundedArea { .. } => "wall",
            RuleKind::PointAttraction { .. } => "point",
        }
    }

    pub fn base_weight_multiplier(&self) -> f32 {
        match self {
            RuleKind::PointAttraction { .. } => POINT_BASE_WEIGHT_MULTIPLIER,
            _ => 1.0,
        }
    }

    // Colour used when drawing this rule's force for debugging
    pub fn debug_rgb(&self) -> [u8; 3] {
        match self {
            RuleKind::Cohesion => [0, 255, 255],
            RuleKind::Separation { .. } => [255, 0, 0],
            RuleKind::Alignment => [255, 255, 0],
            RuleKind::BoundedArea { .. } => [169, 7, 228],
            RuleKind::PointAttraction { .. } => [255, 0, 255],
        }
    }

    // Unweighted force. Only BoundedArea in wrap mode touches `body`, and only its position.
    pub fn compute_force(
        &self,
        neighbors: &[AgentSnapshot],
        body: &mut Kinematics,
        ctx: &RuleContext,
    ) -> Vec2 {
        match *self {
            RuleKind::Cohesion => cohesion(neighbors, body.position),
            RuleKind::Separation {
                desired_minimum_distance,
            } => separation(neighbors, body.position, desired_minimum_distance),
            RuleKind::Alignment => alignment(neighbors),
            RuleKind::BoundedArea { bounds, is_bounded } => {
                if is_bounded {
                    steer_inside(body.position, &bounds)
                } else {
                    wrap_around(body, &bounds);
                    Vec2::ZERO
                }
            }
            RuleKind::PointAttraction { is_repulsive } => {
                point_attraction(ctx.attractor, body.position, is_repulsive)
            }
        }
    }
}

fn cohesion(neighbors: &[AgentSnapshot], position: Vec2) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let centre = neighbors.iter().map(|n| n.position).sum::<Vec2>() / neighbors.len() as f32;
    math::unit_or_zero(centre - position)
}

fn separation(neighbors: &[AgentSnapshot], position: Vec2, desired_minimum_distance: f32) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let mut force = Vec2::ZERO;
    let mut close_neighbors = 0;

    for neighbor in neighbors {
        let distance = position.distance(neighbor.position);

        if distance > 0.0 && distance < desired_minimum_distance {
            // Closer neighbors push exponentially harder
            force += math::unit_or_zero(position - neighbor.position) * (-distance).exp();
            close_neighbors += 1;
        }
    }

    if close_neighbors > 0 {
        force /= close_neighbors as f32;
    }

    // Always unit length or zero
    math::unit_or_zero(force)
}

fn alignment(neighbors: &[AgentSnapshot]) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let average = neighbors.iter().map(|n| n.velocity).sum::<Vec2>() / neighbors.len() as f32;
    math::unit_or_zero(average)
}

// Push back from any border the agent is within `border_margin` of.
// The lower-edge term grows without bound as the coordinate approaches zero.
fn steer_inside(position: Vec2, bounds: &WorldBounds) -> Vec2 {
    Vec2::new(
        wall_push(position.x, bounds.width, bounds.border_margin),
        wall_push(position.y, bounds.height, bounds.border_margin),
    )
}

fn wall_push(coordinate: f32, extent: f32, margin: f32) -> f32 {
    if coordinate < margin {
        margin / coordinate
    } else if coordinate > extent - margin {
        // Signed offset past the far edge, truncated to whole units (negative inside the band)
        let past_edge = (coordinate - extent).trunc();
        margin / (past_edge + EPSILON)
    } else {
        0.0
    }
}

// Teleport to the opposite edge. Only the first crossed edge is handled per call,
// checked in the order top, bottom, left, right.
fn wrap_around(body: &mut Kinematics, bounds: &WorldBounds) {
    let position = body.position;

    if position.y > bounds.height {
        body.position.y = 0.0;
    } else if position.y < 0.0 {
        body.position.y = bounds.height;
    } else if position.x < 0.0 {
        body.position.x = bounds.width;
    } else if position.x > bounds.width {
        body.position.x = 0.0;
    }
}

fn point_attraction(attractor: Option<Attractor>, position: Vec2, is_repulsive: bool) -> Vec2 {
    let Some(attractor) = attractor else {
        return Vec2::ZERO;
    };

    let direction = attractor.point - position;
    let distance = direction.length();

    let mut force = if distance > POINT_DISTANCE_THRESHOLD || attractor.attract_mode {
        math::with_magnitude(direction, POINT_FORCE_MAGNITUDE)
    } else if distance < POINT_DISTANCE_THRESHOLD {
        -math::with_magnitude(direction, POINT_FORCE_MAGNITUDE)
    } else {
        Vec2::ZERO
    };

    if attractor.attract_mode {
        force = -force;
    }
    if is_repulsive {
        force = -force;
    }

    force
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub weight: f32,
    pub enabled: bool,
    // Last weighted force, kept for debug drawing only
    #[serde(skip)]
    last_force: Vec2,
}

impl Rule {
    pub fn new(kind: RuleKind, weight: f32) -> Self {
        Self {
            kind,
            weight,
            enabled: true,
            last_force: Vec2::ZERO,
        }
    }

    pub fn cohesion(weight: f32) -> Self {
        Self::new(RuleKind::Cohesion, weight)
    }

    pub fn separation(weight: f32) -> Self {
        Self::new(
            RuleKind::Separation {
                desired_minimum_distance: DEFAULT_SEPARATION_DISTANCE,
            },
            weight,
        )
    }

    pub fn alignment(weight: f32) -> Self {
        Self::new(RuleKind::Alignment, weight)
    }

    pub fn bounded_area(bounds: WorldBounds, is_bounded: bool, weight: f32) -> Self {
        Self::new(RuleKind::BoundedArea { bounds, is_bounded }, weight)
    }

    pub fn point_attraction(weight: f32) -> Self {
        Self::new(RuleKind::PointAttraction { is_repulsive: false }, weight)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn last_force(&self) -> Vec2 {
        self.last_force
    }

    // Weighted force of this rule; a disabled rule contributes (and caches) zero.
    // A zero weight also gives zero, even against an infinite wall push.
    pub fn weighted_force(
        &mut self,
        neighbors: &[AgentSnapshot],
        body: &mut Kinematics,
        ctx: &RuleContext,
    ) -> Vec2 {
        let force = if self.enabled {
            self.kind.compute_force(neighbors, body, ctx)
        } else {
            Vec2::ZERO
        };

        self.last_force = if self.weight == 0.0 {
            Vec2::ZERO
        } else {
            self.kind.base_weight_multiplier() * self.weight * force
        };

        self.last_force
    }
}

// Named weights for the five rules, as exposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleWeights {
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
    pub point: f32,
    pub wall: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            cohesion: 0.15,
            separation: 3.0,
            alignment: 2.0,
            point: 0.7,
            wall: 3.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    // The standard template: cohesion, separation, alignment, point, wall
    pub fn from_config(
        weights: &RuleWeights,
        bounds: WorldBounds,
        is_bounded: bool,
        enable_attractor: bool,
    ) -> Self {
        Self::new()
            .with(Rule::cohesion(weights.cohesion))
            .with(Rule::separation(weights.separation))
            .with(Rule::alignment(weights.alignment))
            .with(Rule::point_attraction(weights.point).with_enabled(enable_attractor))
            .with(Rule::bounded_area(bounds, is_bounded, weights.wall))
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Rule> {
        self.rules.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|rule| rule.name() == name)
    }

    // Sum of every rule's weighted force, evaluated in order
    pub fn net_force(
        &mut self,
        neighbors: &[AgentSnapshot],
        body: &mut Kinematics,
        ctx: &RuleContext,
    ) -> Vec2 {
        let mut total = Vec2::ZERO;
        for rule in &mut self.rules {
            total += rule.weighted_force(neighbors, body, ctx);
        }
        total
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
