/*
 * Application Module
 *
 * This module defines the viewer model and its update loop. Physics runs on a
 * fixed timestep: real frame time is accumulated and the flock is ticked once
 * per elapsed physics step.
 */

use std::time::{Duration, Instant};

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::flock::Flock;
use crate::params::SimulationParams;
use crate::rules::Attractor;
use crate::viewer::camera::Camera;
use crate::viewer::{from_nannou, input, renderer, ui};

// Drop any backlog beyond this after a stall instead of catching up
const MAX_ACCUMULATED: Duration = Duration::from_millis(250);

pub struct Model {
    pub flock: Flock,
    // Copy edited by the UI, pushed to the flock when it changes
    pub params: SimulationParams,
    pub egui: Egui,
    pub camera: Camera,
    pub mouse_position: Vec2,
    // Left button: attractor in attract mode, right button: plain attractor
    pub attract_held: bool,
    pub repel_held: bool,
    // Fixed timestep physics variables
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
}

impl Model {
    // The attractor for this frame, if a button is held over the world
    pub fn attractor(&self, window_rect: Rect) -> Option<Attractor> {
        if !(self.attract_held || self.repel_held) || self.egui.ctx().is_pointer_over_area() {
            return None;
        }

        let point = from_nannou(self.camera.screen_to_world(self.mouse_position, window_rect));
        if !self.flock.params().bounds().contains(point) {
            return None;
        }

        Some(Attractor::new(point, self.attract_held))
    }

    fn reset_agents(&mut self) {
        let mut rng = rand::thread_rng();
        self.flock.clear();
        if let Err(err) = self.flock.resize(self.params.num_agents, &mut rng) {
            warn!(%err, "could not respawn agents");
        }
    }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Flocking Simulation")
        .size(1280, 900)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .key_pressed(input::key_pressed)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build the viewer window");

    let window = app.window(window_id).expect("viewer window closed during setup");
    let egui = Egui::from_window(&window);

    let params = SimulationParams::default();
    let mut flock = Flock::new(params.clone()).expect("default parameters are valid");
    let mut rng = rand::thread_rng();
    if let Err(err) = flock.populate(params.num_agents, &mut rng) {
        warn!(%err, "could not spawn the initial flock");
    }
    info!(agents = flock.len(), "flock ready");

    let camera = Camera::fitted(&params.bounds(), window.rect());
    let physics_step_size = Duration::from_secs_f32(1.0 / params.fixed_physics_fps);

    Model {
        flock,
        params,
        egui,
        camera,
        mouse_position: Vec2::ZERO,
        attract_held: false,
        repel_held: false,
        physics_accumulator: Duration::ZERO,
        physics_step_size,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    {
        let debug_info = model.flock.debug_info_mut();
        debug_info.fps = app.fps();
        debug_info.frame_time = update.since_last;
    }

    let actions = ui::update_ui(
        &mut model.egui,
        &mut model.params,
        model.flock.debug_info(),
        &model.camera,
    );

    if actions.changes.any_changed {
        if let Err(err) = model.flock.set_params(model.params.clone()) {
            warn!(%err, "keeping previous parameters");
            model.params = model.flock.params().clone();
        }
        model.physics_step_size = Duration::from_secs_f32(1.0 / model.params.fixed_physics_fps);
    }

    if actions.reset_agents || actions.changes.num_agents_changed {
        model.reset_agents();
    }

    if actions.reset_camera {
        model.camera.fit(&model.params.bounds(), app.window_rect());
    }

    let current_time = Instant::now();
    let frame_time = current_time.duration_since(model.last_update_time);
    model.last_update_time = current_time;

    if model.params.pause_simulation {
        model.physics_accumulator = Duration::ZERO;
        return;
    }

    model.physics_accumulator = (model.physics_accumulator + frame_time).min(MAX_ACCUMULATED);

    let attractor = model.attractor(app.window_rect());
    let step = model.physics_step_size.as_secs_f32();
    let mut physics_updates_this_frame = 0;

    while model.physics_accumulator >= model.physics_step_size {
        model.flock.tick(step, attractor);
        model.physics_accumulator -= model.physics_step_size;
        physics_updates_this_frame += 1;
    }

    model.flock.debug_info_mut().physics_updates_per_frame = physics_updates_this_frame;
}
