/*
 * Flock Module
 *
 * This module owns the set of agents and advances them in synchronous ticks.
 * Each tick takes an immutable snapshot of every agent first, then updates
 * all agents against that snapshot, so results never depend on update order.
 *
 * Agents can be updated sequentially or in parallel chunks with rayon; both
 * paths produce identical state.
 */

use std::time::Instant;

use glam::Vec2;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::agent::{Agent, AgentId, AgentSettings, AgentSnapshot, Kinematics};
use crate::debug::DebugInfo;
use crate::error::FlockError;
use crate::params::SimulationParams;
use crate::rules::{Attractor, RuleContext, RuleSet, RuleWeights, WorldBounds};

// Spawned agents start with a random velocity of up to this many times their speed per axis
const SPAWN_VELOCITY_SPREAD: i32 = 100;

pub struct Flock {
    agents: Vec<Agent>,
    params: SimulationParams,
    template: RuleSet,
    next_id: u64,
    debug_info: DebugInfo,
}

impl Flock {
    pub fn new(params: SimulationParams) -> Result<Self, FlockError> {
        params.validate()?;
        let template = params.rule_set();

        Ok(Self {
            agents: Vec::with_capacity(params.num_agents),
            params,
            template,
            next_id: 0,
            debug_info: DebugInfo::default(),
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn rule_template(&self) -> &RuleSet {
        &self.template
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    pub fn debug_info_mut(&mut self) -> &mut DebugInfo {
        &mut self.debug_info
    }

    // Replace the parameters, rebuild the rule template and push both to every agent
    pub fn set_params(&mut self, params: SimulationParams) -> Result<(), FlockError> {
        params.validate()?;

        for agent in &mut self.agents {
            agent.set_settings(params.agent)?;
        }
        self.template = params.rule_set();
        self.params = params;
        self.apply_rule_template();

        debug!(agents = self.agents.len(), "flock parameters updated");
        Ok(())
    }

    pub fn set_weights(&mut self, weights: RuleWeights) -> Result<(), FlockError> {
        let mut params = self.params.clone();
        params.weights = weights;
        self.set_params(params)
    }

    pub fn set_bounds(&mut self, bounds: WorldBounds) -> Result<(), FlockError> {
        let mut params = self.params.clone();
        params.set_bounds(bounds);
        self.set_params(params)
    }

    // Use a custom rule set instead of the one built from the parameters
    pub fn set_rule_template(&mut self, template: RuleSet) {
        self.template = template;
        self.apply_rule_template();
    }

    // Give every agent a fresh copy of the template
    fn apply_rule_template(&mut self) {
        for agent in &mut self.agents {
            agent.set_rules(&self.template);
        }
    }

    pub fn create_agent(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        settings: AgentSettings,
        rules: &RuleSet,
    ) -> Result<AgentId, FlockError> {
        let id = AgentId(self.next_id);
        let agent = Agent::new(id, position, velocity, settings, rules.clone())?;
        self.next_id += 1;
        self.agents.push(agent);

        debug!(%id, x = position.x, y = position.y, "agent created");
        Ok(id)
    }

    // Spawn an agent at `position` with the current settings and a random velocity
    pub fn spawn_at<R: Rng + ?Sized>(
        &mut self,
        position: Vec2,
        rng: &mut R,
    ) -> Result<AgentId, FlockError> {
        let settings = self.params.agent;
        let velocity = Vec2::new(
            rng.gen_range(-SPAWN_VELOCITY_SPREAD..=SPAWN_VELOCITY_SPREAD) as f32,
            rng.gen_range(-SPAWN_VELOCITY_SPREAD..=SPAWN_VELOCITY_SPREAD) as f32,
        ) * settings.speed;
        let template = self.template.clone();

        self.create_agent(position, velocity, settings, &template)
    }

    // Spawn `count` agents at random positions inside the world
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<AgentId>, FlockError> {
        let bounds = self.params.bounds();
        let mut ids = Vec::with_capacity(count);

        for _ in 0..count {
            let position = Vec2::new(
                rng.gen_range(0.0..=bounds.width),
                rng.gen_range(0.0..=bounds.height),
            );
            ids.push(self.spawn_at(position, rng)?);
        }

        Ok(ids)
    }

    // Grow or shrink the flock to exactly `count` agents; the newest are removed first
    pub fn resize<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), FlockError> {
        if count < self.agents.len() {
            self.agents.truncate(count);
            debug!(agents = count, "flock truncated");
            return Ok(());
        }

        self.populate(count - self.agents.len(), rng)?;
        Ok(())
    }

    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|agent| agent.id() == id)?;
        let removed = self.agents.remove(index);

        debug!(%id, "agent removed");
        Some(removed)
    }

    // Overwrite one agent's kinematic state, e.g. from a saved snapshot
    pub fn restore_agent(&mut self, id: AgentId, body: Kinematics) -> Result<(), FlockError> {
        let agent = self
            .agents
            .iter_mut()
            .find(|agent| agent.id() == id)
            .ok_or(FlockError::UnknownAgent(id))?;
        agent.restore_kinematics(body);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }

    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    // Advance every agent by one step. World bounds are not passed per call: they
    // live in the parameters and reach the wall rule through `set_bounds`/`set_params`.
    pub fn tick(&mut self, delta_time: f32, attractor: Option<Attractor>) {
        let started = Instant::now();

        let roster = self.snapshot();
        let ctx = RuleContext { attractor };
        let chunk_size = step(
            &mut self.agents,
            &roster,
            &ctx,
            delta_time,
            self.params.enable_parallel,
        );

        let elapsed = started.elapsed();
        self.debug_info.record_tick(&self.agents, elapsed, chunk_size);

        trace!(
            tick = self.debug_info.ticks,
            agents = self.agents.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "flock tick"
        );
    }
}

// Update every agent against `roster`, the pre-tick snapshot of the whole flock.
// Returns the chunk size used when running in parallel.
pub fn step(
    agents: &mut [Agent],
    roster: &[AgentSnapshot],
    ctx: &RuleContext,
    delta_time: f32,
    parallel: bool,
) -> Option<usize> {
    if parallel && !agents.is_empty() {
        // Chunks keep the number of parallel tasks close to the thread count
        let chunk_size = std::cmp::max(agents.len() / rayon::current_num_threads(), 1);

        agents.par_chunks_mut(chunk_size).for_each(|chunk| {
            for agent in chunk {
                agent.update(roster, ctx, delta_time);
            }
        });

        Some(chunk_size)
    } else {
        for agent in agents.iter_mut() {
            agent.update(roster, ctx, delta_time);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flock() -> Flock {
        Flock::new(SimulationParams::default()).unwrap()
    }

    #[test]
    fn ids_are_never_reused() {
        let mut flock = flock();
        let template = flock.rule_template().clone();
        let a = flock
            .create_agent(Vec2::ZERO, Vec2::ZERO, AgentSettings::default(), &template)
            .unwrap();
        assert!(flock.remove_agent(a).is_some());
        let b = flock
            .create_agent(Vec2::ZERO, Vec2::ZERO, AgentSettings::default(), &template)
            .unwrap();
        assert_ne!(a, b);
        assert!(flock.remove_agent(a).is_none());
        assert_eq!(flock.len(), 1);
    }

    #[test]
    fn invalid_agents_are_not_added() {
        let mut flock = flock();
        let settings = AgentSettings {
            visual_range: -5.0,
            ..AgentSettings::default()
        };
        let template = flock.rule_template().clone();
        assert!(flock.create_agent(Vec2::ZERO, Vec2::ZERO, settings, &template).is_err());
        assert!(flock.is_empty());
    }

    #[test]
    fn populate_places_agents_inside_the_world() {
        let mut flock = flock();
        let mut rng = StdRng::seed_from_u64(7);
        let ids = flock.populate(50, &mut rng).unwrap();
        assert_eq!(ids.len(), 50);
        let bounds = flock.params().bounds();
        assert!(flock.agents().iter().all(|a| bounds.contains(a.position())));
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut flock = flock();
        let mut rng = StdRng::seed_from_u64(1);
        flock.resize(10, &mut rng).unwrap();
        assert_eq!(flock.len(), 10);
        flock.resize(4, &mut rng).unwrap();
        assert_eq!(flock.len(), 4);
        assert_eq!(flock.agents()[3].id(), AgentId(3));
    }

    #[test]
    fn spawned_agents_respect_the_speed_cap_after_a_tick() {
        let mut flock = flock();
        let mut rng = StdRng::seed_from_u64(3);
        flock.spawn_at(Vec2::new(50.0, 50.0), &mut rng).unwrap();
        flock.tick(0.016, None);
        let speed = flock.params().agent.speed;
        assert!(flock.agents()[0].velocity().length() <= speed + 1e-3);
    }

    #[test]
    fn new_bounds_apply_from_the_next_tick() {
        let mut flock = flock();
        let template = flock.rule_template().clone();
        let (position, velocity) = (Vec2::new(60.0, 30.0), Vec2::new(10.0, 0.0));
        let id = flock
            .create_agent(position, velocity, AgentSettings::default(), &template)
            .unwrap();

        flock
            .set_bounds(WorldBounds {
                width: 50.0,
                height: 100.0,
                border_margin: 10.0,
            })
            .unwrap();
        flock.tick(0.1, None);

        let agent = flock.agent(id).unwrap();
        assert_relative_eq!(agent.position().x, 1.0, epsilon = 1e-5);
        assert_eq!(flock.params().world_width, 50.0);
    }

    #[test]
    fn set_params_pushes_rules_and_settings_to_agents() {
        let mut flock = flock();
        let mut rng = StdRng::seed_from_u64(11);
        flock.populate(3, &mut rng).unwrap();

        let mut params = flock.params().clone();
        params.weights.cohesion = 1.25;
        params.agent.speed = 12.0;
        flock.set_params(params).unwrap();

        for agent in flock.agents() {
            assert_eq!(agent.speed(), 12.0);
            assert_eq!(agent.rules().get("cohesion").map(|r| r.weight), Some(1.25));
        }
    }

    #[test]
    fn rejected_params_leave_the_flock_untouched() {
        let mut flock = flock();
        let mut params = flock.params().clone();
        params.world_height = -1.0;
        assert!(flock.set_params(params).is_err());
        assert_eq!(flock.params(), &SimulationParams::default());
    }

    #[test]
    fn tick_reads_the_pre_tick_snapshot() {
        // Two agents approaching each other: each must react to where the other was
        let mut params = SimulationParams::default();
        params.enable_parallel = false;
        let mut flock = Flock::new(params).unwrap();
        flock.set_rule_template(RuleSet::new().with(Rule::cohesion(1.0)));
        let template = flock.rule_template().clone();
        let settings = AgentSettings::default();
        flock.create_agent(Vec2::new(40.0, 50.0), Vec2::ZERO, settings, &template).unwrap();
        flock.create_agent(Vec2::new(44.0, 50.0), Vec2::ZERO, settings, &template).unwrap();

        flock.tick(0.1, None);

        let a = &flock.agents()[0];
        let b = &flock.agents()[1];
        assert_eq!(a.velocity().x, -b.velocity().x);
        assert_relative_eq!(a.position().x - 40.0, 44.0 - b.position().x, epsilon = 1e-4);
    }

    #[test]
    fn parallel_and_sequential_ticks_agree() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut params = SimulationParams::default();
        params.agent.visual_range = 25.0;
        params.enable_parallel = false;

        let mut sequential = Flock::new(params.clone()).unwrap();
        sequential.populate(64, &mut rng).unwrap();

        params.enable_parallel = true;
        let mut parallel = Flock::new(params).unwrap();
        for agent in sequential.agents() {
            let template = parallel.rule_template().clone();
            parallel
                .create_agent(agent.position(), agent.velocity(), *agent.settings(), &template)
                .unwrap();
        }

        let attractor = Some(Attractor::new(Vec2::new(30.0, 60.0), false));
        for _ in 0..5 {
            sequential.tick(0.02, attractor);
            parallel.tick(0.02, attractor);
        }

        for (s, p) in sequential.agents().iter().zip(parallel.agents()) {
            assert_eq!(s.kinematics(), p.kinematics());
        }
        assert!(parallel.debug_info().chunk_size.is_some());
        assert_eq!(parallel.debug_info().ticks, 5);
    }

    #[test]
    fn restoring_an_unknown_agent_fails() {
        let mut flock = flock();
        let template = flock.rule_template().clone();
        let id = flock
            .create_agent(Vec2::new(5.0, 5.0), Vec2::ZERO, AgentSettings::default(), &template)
            .unwrap();

        let body = Kinematics::at(Vec2::new(20.0, 30.0), Vec2::new(1.0, 0.0));
        flock.restore_agent(id, body).unwrap();
        assert_eq!(flock.agent(id).unwrap().kinematics(), body);

        let missing = AgentId(id.0 + 1);
        assert_eq!(flock.restore_agent(missing, body), Err(FlockError::UnknownAgent(missing)));
    }
}
