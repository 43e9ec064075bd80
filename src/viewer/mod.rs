/*
 * Viewer Module
 *
 * A nannou host for the flock: it owns the window, turns the pointer into an
 * attractor, spawns agents on demand, exposes the simulation parameters in
 * an egui panel and draws the agents plus optional debug overlays.
 */

pub mod app;
pub mod camera;
pub mod input;
pub mod renderer;
pub mod ui;

pub use app::{model, update, Model};

// Convert a core vector into nannou's vector type
#[inline]
pub(crate) fn to_nannou(v: crate::Vec2) -> nannou::prelude::Vec2 {
    nannou::prelude::vec2(v.x, v.y)
}

#[inline]
pub(crate) fn from_nannou(v: nannou::prelude::Vec2) -> crate::Vec2 {
    crate::Vec2::new(v.x, v.y)
}
