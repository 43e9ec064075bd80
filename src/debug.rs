/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and other debug information about the flock.
 *
 * Includes metrics for:
 * - Ticks run so far and the duration of the last one
 * - Neighborhood sizes found during the last tick
 * - Parallel processing chunk size
 * - FPS and frame time (filled in by the viewer)
 */

use std::time::Duration;

use crate::agent::Agent;

// Debug information to display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugInfo {
    pub ticks: u64,
    pub tick_time: Duration,
    pub agents: usize,
    pub mean_neighbors: f32,
    pub max_neighbors: usize,
    pub chunk_size: Option<usize>,
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_updates_per_frame: usize,
}

impl DebugInfo {
    // Record statistics for a finished tick
    pub fn record_tick(&mut self, agents: &[Agent], elapsed: Duration, chunk_size: Option<usize>) {
        self.ticks += 1;
        self.tick_time = elapsed;
        self.agents = agents.len();
        self.chunk_size = chunk_size;

        let total: usize = agents.iter().map(|a| a.neighbors().len()).sum();
        self.max_neighbors = agents.iter().map(|a| a.neighbors().len()).max().unwrap_or(0);
        self.mean_neighbors = if agents.is_empty() {
            0.0
        } else {
            total as f32 / agents.len() as f32
        };
    }
}
