/*
 * Input Module
 *
 * This module handles user input events for the viewer:
 * - Left/right button held: attractor on (left also flips it into attract mode)
 * - Middle button drag: pan the camera
 * - Mouse wheel: zoom
 * - Space: spawn an agent under the cursor
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use tracing::warn;

use crate::viewer::app::Model;
use crate::viewer::from_nannou;

pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let new_pos = Vec2::new(pos.x, pos.y);

    if model.camera.is_panning() {
        model.camera.pan_to(new_pos);
    }

    model.mouse_position = new_pos;
}

pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    // Clicks on the UI panel never reach the simulation
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    match button {
        MouseButton::Left => model.attract_held = true,
        MouseButton::Right => model.repel_held = true,
        MouseButton::Middle => model.camera.begin_pan(model.mouse_position),
        _ => {}
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    match button {
        MouseButton::Left => model.attract_held = false,
        MouseButton::Right => model.repel_held = false,
        MouseButton::Middle => model.camera.end_pan(),
        _ => {}
    }
}

pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let window_rect = app.window_rect();
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
    };
    model.camera.zoom_at(lines, model.mouse_position, window_rect);
}

pub fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if key != Key::Space {
        return;
    }

    let point = from_nannou(model.camera.screen_to_world(model.mouse_position, app.window_rect()));
    if !model.flock.params().bounds().contains(point) {
        return;
    }

    let mut rng = rand::thread_rng();
    match model.flock.spawn_at(point, &mut rng) {
        Ok(_) => model.params.num_agents = model.flock.len(),
        Err(err) => warn!(%err, "could not spawn agent"),
    }
}

// Pass raw window events to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
