use serde::{Serialize, Deserialize};

/// A snapshot of the model aggregates at one completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] // Derive traits for easy saving/loading
pub struct Snapshot {
    /// The simulation step at which the snapshot was taken (0 = before any step).
    pub time: u64,
    /// Number of agents currently infected.
    pub infected: u32,
    /// Number of agents currently immune.
    pub immune: u32,
    /// Optional: (x, y) of every agent in row-major order.
    /// Included only if position recording is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")] // Don't write "positions": null
    pub positions: Option<Vec<(u32, u32)>>,
}

impl Snapshot {
    /// True once the infection has died out.
    pub fn is_infection_free(&self) -> bool {
        self.infected == 0
    }
}
