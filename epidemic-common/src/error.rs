//! Error type shared by the grid, the parameter validation and the engine.

/// Errors raised by the simulation core.
///
/// None of these are transient: the simulation is deterministic given its
/// random stream, so every error points at an invalid configuration or an
/// invalid grid access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A position references a cell outside the grid extent.
    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    /// A second agent was placed on an occupied cell.
    #[error("cell ({x}, {y}) is already occupied")]
    OccupiedCell { x: u32, y: u32 },

    /// A construction parameter is outside its admissible range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter { name, reason: reason.into() }
    }
}
