use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::decode::ParameterMode;
use crate::Word;

/// Register file of a machine: everything except memory and I/O that has to
/// survive between two calls to `resume`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub pc: usize,
    #[serde(default)]
    pub relative_base: Word,
    /// Address of the instruction currently being executed.
    #[serde(default)]
    pub instr_start: usize,
    #[serde(default)]
    modes: VecDeque<ParameterMode>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending modes with those of a freshly decoded instruction.
    pub fn load_modes(&mut self, modes: impl IntoIterator<Item = ParameterMode>) {
        self.modes.clear();
        self.modes.extend(modes);
    }

    /// Next operand mode; digits missing from the instruction word are positional.
    pub fn next_mode(&mut self) -> ParameterMode {
        self.modes.pop_front().unwrap_or(ParameterMode::Position)
    }

    pub fn pending_modes(&self) -> usize {
        self.modes.len()
    }

    /// Undo a partially consumed instruction so it runs again from the start.
    pub fn rewind(&mut self) {
        self.pc = self.instr_start;
        self.modes.clear();
    }
}
