/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for the rule weights, the world,
 * the agents and the debug overlays. Parameter change detection is handled by
 * the SimulationParams struct.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::{ParamChanges, SimulationParams};
use crate::viewer::camera::Camera;

// What the panel asked the app to do this frame
#[derive(Debug, Default, Clone, Copy)]
pub struct UiActions {
    pub reset_agents: bool,
    pub reset_camera: bool,
    pub changes: ParamChanges,
}

pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    debug_info: &DebugInfo,
    camera: &Camera,
) -> UiActions {
    let mut actions = UiActions::default();

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Agents", |ui| {
                ui.add(
                    egui::Slider::new(
                        &mut params.num_agents,
                        SimulationParams::get_num_agents_range(),
                    )
                    .text("Number of Agents"),
                );

                if ui.button("Reset Agents").clicked() {
                    actions.reset_agents = true;
                }

                ui.add(
                    egui::Slider::new(&mut params.agent.speed, SimulationParams::get_speed_range())
                        .text("Speed"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.agent.visual_range,
                        SimulationParams::get_visual_range_range(),
                    )
                    .text("Visual Range"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.agent.max_acceleration,
                        SimulationParams::get_max_acceleration_range(),
                    )
                    .text("Max Acceleration"),
                );
                ui.checkbox(&mut params.agent.constant_speed, "Constant Speed");
            });

            ui.collapsing("Rule Weights", |ui| {
                ui.add(
                    egui::Slider::new(
                        &mut params.weights.cohesion,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Cohesion"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.weights.separation,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Separation"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.weights.alignment,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Alignment"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.weights.point,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Point"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.weights.wall,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Wall"),
                );
                ui.checkbox(&mut params.enable_attractor, "Enable Attractor");
            });

            ui.collapsing("World", |ui| {
                ui.add(
                    egui::Slider::new(
                        &mut params.world_width,
                        SimulationParams::get_world_size_range(),
                    )
                    .text("Width"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.world_height,
                        SimulationParams::get_world_size_range(),
                    )
                    .text("Height"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.border_margin,
                        SimulationParams::get_border_margin_range(),
                    )
                    .text("Border Margin"),
                );
                ui.checkbox(
                    &mut params.is_bounded,
                    "Bounded (steer off walls instead of wrapping)",
                );
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Zoom: mouse wheel");
                ui.label("Pan: middle-click and drag");
                ui.label("Attract: hold left button, repel: hold right button");
                ui.label("Spawn: space bar");
                if ui.button("Reset Camera").clicked() {
                    actions.reset_camera = true;
                }
                ui.label(format!("Zoom Level: {:.2}x", camera.scale));
                let centre = camera.centre;
                ui.label(format!("Camera Centre: ({:.0}, {:.0})", centre.x, centre.y));
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.add(
                    egui::Slider::new(
                        &mut params.fixed_physics_fps,
                        SimulationParams::get_physics_fps_range(),
                    )
                    .text("Physics FPS"),
                );

                ui.separator();

                ui.label(format!("FPS: {:.1}", debug_info.fps));
                let frame_ms = debug_info.frame_time.as_secs_f64() * 1000.0;
                let tick_ms = debug_info.tick_time.as_secs_f64() * 1000.0;
                ui.label(format!("Frame time: {:.2} ms", frame_ms));
                ui.label(format!("Tick time: {:.2} ms", tick_ms));
                ui.label(format!("Agents: {}", debug_info.agents));
            });

            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.debug_lines, "Show Neighbor Lines");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    actions.changes = params.detect_changes();
    actions
}

// Draw debug information on the screen
pub fn draw_debug_info(
    draw: &nannou::Draw,
    debug_info: &DebugInfo,
    window_rect: nannou::geom::Rect,
    camera_scale: f32,
) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!(
            "Tick: {} ({:.2} ms)",
            debug_info.ticks,
            debug_info.tick_time.as_secs_f64() * 1000.0
        ),
        format!("Agents: {}", debug_info.agents),
        format!(
            "Neighbors: {:.1} avg, {} max",
            debug_info.mean_neighbors, debug_info.max_neighbors
        ),
        format!("Physics steps/frame: {}", debug_info.physics_updates_per_frame),
        format!("Zoom: {:.2}x", camera_scale),
    ];

    // Background panel in the top-right corner, clear of the egui window
    let panel_height = line_height * debug_texts.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(text_x + 80.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
