/*
 * Renderer Module
 *
 * This module draws the flock: the world border, every agent as a triangle
 * facing its heading, the active attractor and, when enabled, each rule's
 * last force in the rule's debug colour plus lines to close neighbors.
 */

use std::collections::HashMap;

use nannou::prelude::*;
use tracing::warn;

use crate::agent::AgentId;
use crate::viewer::app::Model;
use crate::viewer::{to_nannou, ui};
use crate::{AGENT_SIZE, DEBUG_LINE_DISTANCE};

// Screen-space length of a unit force in debug drawing
const FORCE_SCALE: f32 = 4.0;
const MIN_AGENT_PIXELS: f32 = 3.0;

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let camera = &model.camera;
    let flock = &model.flock;
    let params = flock.params();
    let bounds = params.bounds();

    // World boundary
    let bottom_left = camera.world_to_screen(vec2(0.0, 0.0), window_rect);
    let top_right = camera.world_to_screen(vec2(bounds.width, bounds.height), window_rect);
    let world_rect = Rect::from_corners(bottom_left, top_right);
    draw.rect()
        .xy(world_rect.xy())
        .wh(world_rect.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    if params.debug_lines {
        draw_neighbor_lines(&draw, model, window_rect);
    }

    let size = (AGENT_SIZE * camera.scale).max(MIN_AGENT_PIXELS);
    let points = [
        pt2(size, 0.0),
        pt2(-size, size / 2.0),
        pt2(-size, -size / 2.0),
    ];

    for agent in flock.agents() {
        let screen_pos = camera.world_to_screen(to_nannou(agent.position()), window_rect);

        draw.polygon()
            .color(rgb(220u8, 220, 220))
            .points(points.iter().cloned())
            .xy(screen_pos)
            .rotate(agent.facing_yaw());

        if params.show_debug {
            for rule in agent.rules() {
                let force = rule.last_force();
                if force == crate::Vec2::ZERO {
                    continue;
                }
                let [r, g, b] = rule.kind.debug_rgb();
                draw.line()
                    .start(screen_pos)
                    .end(screen_pos + to_nannou(force) * FORCE_SCALE)
                    .color(rgb(r, g, b))
                    .weight(1.0);
            }
        }
    }

    if let Some(attractor) = model.attractor(window_rect) {
        let screen_pos = camera.world_to_screen(to_nannou(attractor.point), window_rect);
        let colour = if attractor.attract_mode { ORANGE } else { MAGENTA };
        draw.ellipse()
            .xy(screen_pos)
            .radius(crate::rules::POINT_DISTANCE_THRESHOLD * camera.scale)
            .no_fill()
            .stroke(colour)
            .stroke_weight(1.0);
    }

    if params.show_debug {
        ui::draw_debug_info(&draw, flock.debug_info(), window_rect, camera.scale);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to draw ui");
    }
}

// Red lines between agents and the neighbors they saw closer than the debug distance
fn draw_neighbor_lines(draw: &Draw, model: &Model, window_rect: Rect) {
    let positions: HashMap<AgentId, crate::Vec2> = model
        .flock
        .agents()
        .iter()
        .map(|agent| (agent.id(), agent.position()))
        .collect();

    for agent in model.flock.agents() {
        let from = agent.position();
        for id in agent.neighbors() {
            let Some(&to) = positions.get(id) else {
                continue;
            };
            if from.distance(to) < DEBUG_LINE_DISTANCE {
                draw.line()
                    .start(model.camera.world_to_screen(to_nannou(from), window_rect))
                    .end(model.camera.world_to_screen(to_nannou(to), window_rect))
                    .color(rgba(1.0, 0.0, 0.0, 0.5))
                    .weight(1.0);
            }
        }
    }
}
