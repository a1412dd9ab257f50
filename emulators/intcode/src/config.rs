use serde::{Deserialize, Serialize};

/// Per-machine settings. The default is an unbounded tape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Maximum number of memory cells. Accesses at or past this address fail
    /// instead of growing the tape.
    #[serde(default)]
    pub memory_limit: Option<usize>,
}

impl MachineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_limit(mut self, cells: usize) -> Self {
        self.memory_limit = Some(cells);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.memory_limit = None;
        self
    }
}
