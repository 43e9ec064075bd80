/*
 * Camera Module
 *
 * Maps the flock's world rectangle onto the window. The camera keeps the
 * world point shown at the window centre and a scale in pixels per world
 * unit; middle-button drags move the centre and the wheel changes the scale
 * around the cursor.
 */

use nannou::prelude::*;

use crate::rules::WorldBounds;

// Fraction of the window the world fills after a reset
const FIT_MARGIN: f32 = 0.9;
const MIN_SCALE: f32 = 0.1;
const MAX_SCALE: f32 = 50.0;
// Scale change per wheel line
const WHEEL_STEP: f32 = 0.1;

pub struct Camera {
    pub centre: Vec2,
    pub scale: f32,
    // Cursor position at the last drag event, while a pan is in progress
    pan_anchor: Option<Vec2>,
}

impl Camera {
    // A camera showing the whole world
    pub fn fitted(bounds: &WorldBounds, window_rect: Rect) -> Self {
        let mut camera = Self {
            centre: Vec2::ZERO,
            scale: 1.0,
            pan_anchor: None,
        };
        camera.fit(bounds, window_rect);
        camera
    }

    pub fn fit(&mut self, bounds: &WorldBounds, window_rect: Rect) {
        self.centre = vec2(bounds.width, bounds.height) / 2.0;
        let scale_x = window_rect.w() / bounds.width;
        let scale_y = window_rect.h() / bounds.height;
        self.scale = (FIT_MARGIN * scale_x.min(scale_y)).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.centre) * self.scale + window_rect.xy()
    }

    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.scale + self.centre
    }

    // Rescale so the world point under the cursor stays under the cursor
    pub fn zoom_at(&mut self, wheel_lines: f32, cursor: Vec2, window_rect: Rect) {
        let anchor = self.screen_to_world(cursor, window_rect);
        self.scale = (self.scale * (1.0 + wheel_lines * WHEEL_STEP)).clamp(MIN_SCALE, MAX_SCALE);
        self.centre += anchor - self.screen_to_world(cursor, window_rect);
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    pub fn begin_pan(&mut self, cursor: Vec2) {
        self.pan_anchor = Some(cursor);
    }

    pub fn pan_to(&mut self, cursor: Vec2) {
        if let Some(anchor) = self.pan_anchor.replace(cursor) {
            self.centre -= (cursor - anchor) / self.scale;
        }
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }
}
