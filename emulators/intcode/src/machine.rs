//! Resumable machine built on top of the single-step executor.
//!
//! [`Machine::resume`] runs until the next observable event: an output, a halt,
//! or (for streaming machines) an input request that cannot be served yet. All
//! execution state lives in the machine itself, so a caller can stop pulling at
//! any point and pick up again later.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MachineConfig;
use crate::decode::Opcode;
use crate::exec::{step, Step};
use crate::link::Link;
use crate::memory::Memory;
use crate::state::State;
use crate::{Error, Result, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ready,
    Running,
    /// Stopped right after emitting an output.
    Suspended,
    AwaitingInput,
    Halted,
    /// A fatal error was reported; the machine cannot run again.
    Faulted,
}

/// What a call to [`Machine::resume`] stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Output(Word),
    AwaitingInput,
    Halted,
}

#[derive(Debug, Clone)]
pub struct Machine {
    state: State,
    memory: Memory,
    input: Link,
    status: Status,
    instructions: u64,
}

impl Machine {
    /// Machine with no input; any INPUT instruction fails with `InputExhausted`.
    pub fn new(program: &[Word]) -> Self {
        Self::with_link(program, Link::finite([]))
    }

    /// Machine reading from a fixed, pre-supplied input sequence.
    pub fn with_input(program: &[Word], inputs: impl IntoIterator<Item = Word>) -> Self {
        Self::with_link(program, Link::finite(inputs))
    }

    /// Machine whose input is fed externally; an empty queue suspends with
    /// [`Event::AwaitingInput`] rather than failing.
    pub fn streaming(program: &[Word]) -> Self {
        Self::with_link(program, Link::open())
    }

    fn with_link(program: &[Word], input: Link) -> Self {
        Self {
            state: State::new(),
            memory: Memory::from_program(program),
            input,
            status: Status::Ready,
            instructions: 0,
        }
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.memory = self.memory.with_limit(config.memory_limit);
        self
    }

    pub fn push_input(&mut self, value: Word) {
        self.input.push(value);
    }

    /// Mark the input as finite: once drained, INPUT fails instead of waiting.
    pub fn close_input(&mut self) {
        self.input.close();
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn instructions_executed(&self) -> u64 {
        self.instructions
    }

    /// Raw cell at the program counter. Fails only when the program counter
    /// sits past a configured memory limit.
    pub fn peek(&self) -> Result<Word> {
        self.memory.peek(self.state.pc as Word)
    }

    /// Opcode at the program counter, or `None` when that cell does not decode
    /// or cannot be read.
    pub fn peek_opcode(&self) -> Option<Opcode> {
        self.peek().ok().and_then(|word| Opcode::try_from(word).ok())
    }

    pub fn read(&self, addr: Word) -> Result<Word> {
        self.memory.peek(addr)
    }

    pub fn write(&mut self, addr: Word, value: Word) -> Result<()> {
        self.memory.set(addr, value)
    }

    /// Execute until the next output, halt or unanswerable input request.
    pub fn resume(&mut self) -> Result<Event> {
        match self.status {
            Status::Halted => return Err(Error::MachineHalted),
            Status::Faulted => return Err(Error::MachineFaulted),
            _ => {}
        }
        self.status = Status::Running;
        loop {
            let outcome = match step(&mut self.state, &mut self.memory, &mut self.input) {
                Ok(outcome) => outcome,
                Err(err) => {
                    debug!(pc = self.state.instr_start, %err, "machine faulted");
                    self.status = Status::Faulted;
                    return Err(err);
                }
            };
            match outcome {
                Step::Continue => self.instructions += 1,
                Step::Output(value) => {
                    self.instructions += 1;
                    self.status = Status::Suspended;
                    debug!(pc = self.state.pc, value, "output");
                    return Ok(Event::Output(value));
                }
                Step::AwaitingInput => {
                    self.status = Status::AwaitingInput;
                    debug!(pc = self.state.pc, "waiting for input");
                    return Ok(Event::AwaitingInput);
                }
                Step::Halt => {
                    self.instructions += 1;
                    self.status = Status::Halted;
                    debug!(instructions = self.instructions, "halted");
                    return Ok(Event::Halted);
                }
            }
        }
    }

    /// Pull outputs one at a time until the machine halts.
    pub fn outputs(&mut self) -> Outputs<'_> {
        Outputs {
            machine: self,
            done: false,
        }
    }

    pub fn run_to_halt(&mut self) -> Result<Vec<Word>> {
        self.outputs().collect()
    }

    /// Run a self-test program: every output not directly followed by HALT is a
    /// check that must be 0, and the output right before HALT is the result.
    pub fn diagnostic_code(&mut self) -> Result<Word> {
        let mut code = None;
        let mut index = 0;
        loop {
            match self.resume()? {
                Event::Output(value) => {
                    if self.peek_opcode() == Some(Opcode::Halt) {
                        code = Some(value);
                    } else if value != 0 {
                        return Err(Error::DiagnosticFailed { index, value });
                    }
                    index += 1;
                }
                Event::Halted => return code.ok_or(Error::NoOutput),
                Event::AwaitingInput => return Err(Error::AwaitingInput),
            }
        }
    }
}

/// Iterator over the outputs of a machine. Ends after HALT; an error is yielded
/// once and then ends the iteration. A streaming machine with an empty queue
/// yields `AwaitingInput` and stays resumable, so a fresh `outputs()` call picks
/// up once more input has been pushed.
pub struct Outputs<'a> {
    machine: &'a mut Machine,
    done: bool,
}

impl Iterator for Outputs<'_> {
    type Item = Result<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.machine.is_halted() {
            return None;
        }
        let item = match self.machine.resume() {
            Ok(Event::Output(value)) => return Some(Ok(value)),
            Ok(Event::Halted) => None,
            Ok(Event::AwaitingInput) => Some(Err(Error::AwaitingInput)),
            Err(err) => Some(Err(err)),
        };
        self.done = true;
        item
    }
}
