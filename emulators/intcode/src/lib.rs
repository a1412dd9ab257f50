//! Intcode virtual machine.
//!
//! A [`Machine`] interprets an integer program over a growable [`Memory`] tape and
//! suspends every time it emits an output, so callers pull values one at a time.
//! Several machines can be wired into chains or feedback rings with a [`Pipeline`],
//! which drives them with a fixed round-robin schedule.

pub mod config;
pub mod decode;
pub mod exec;
pub mod link;
pub mod machine;
pub mod memory;
pub mod operand;
pub mod pipeline;
pub mod program;
pub mod state;

use thiserror::Error;

pub use config::MachineConfig;
pub use decode::{decode, Opcode, ParameterMode};
pub use exec::{step, Step};
pub use link::Link;
pub use machine::{Event, Machine, Outputs, Status};
pub use memory::Memory;
pub use operand::Parameter;
pub use pipeline::{
    max_signal, max_signal_with, run_chain, run_ring, Pipeline, ScheduleEntry, Topology,
};
pub use program::Program;
pub use state::State;

/// Machine word. Programs, addresses and I/O values all share this type.
pub type Word = i64;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid opcode {0}")]
    InvalidOpcode(Word),
    #[error("invalid parameter mode {digit} in instruction {word}")]
    InvalidParameterMode { word: Word, digit: Word },
    #[error("write through an immediate-mode parameter")]
    InvalidWriteTarget,
    #[error("input requested but the input source is exhausted")]
    InputExhausted,
    #[error("machine is waiting for input that has not been pushed yet")]
    AwaitingInput,
    #[error("negative memory address {0}")]
    NegativeAddress(Word),
    #[error("address {address} exceeds the memory limit of {limit} cells")]
    MemoryLimit { address: Word, limit: usize },
    #[error("relative address {raw} + {relative_base} overflows")]
    AddressOverflow { raw: Word, relative_base: Word },
    #[error("arithmetic overflow in {opcode:?}")]
    Overflow { opcode: Opcode },
    #[error("machine has already halted")]
    MachineHalted,
    #[error("machine stopped after a fatal error")]
    MachineFaulted,
    #[error("pipeline deadlock: machine {machine} is waiting on a producer that can never send")]
    PipelineDeadlock { machine: usize },
    #[error("machine {machine} failed: {source}")]
    Pipeline {
        machine: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("run finished without producing an output")]
    NoOutput,
    #[error("diagnostic check {index} failed with value {value}")]
    DiagnosticFailed { index: usize, value: Word },
    #[error("invalid integer {token:?} at position {index}")]
    Parse { index: usize, token: String },
    #[error("program is empty")]
    EmptyProgram,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
