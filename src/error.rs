/*
 * Error Module
 *
 * Errors raised while configuring the flock. The per-tick update itself is
 * infallible; everything that can go wrong is caught when agents or parameters
 * are created.
 */

use thiserror::Error;

use crate::agent::AgentId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlockError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),
}

impl FlockError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        tracing::warn!(field, reason, "rejected flock configuration");
        FlockError::InvalidConfig { field, reason }
    }
}

// Reject NaN/infinite values and values below zero
pub(crate) fn require_non_negative(field: &'static str, value: f32) -> Result<(), FlockError> {
    if !value.is_finite() {
        return Err(FlockError::invalid(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(FlockError::invalid(field, "must not be negative"));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<(), FlockError> {
    require_non_negative(field, value)?;
    if value == 0.0 {
        return Err(FlockError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}
