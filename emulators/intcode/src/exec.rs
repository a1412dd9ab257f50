use tracing::trace;

use crate::decode::{decode, Opcode};
use crate::link::Link;
use crate::memory::Memory;
use crate::operand::Parameter;
use crate::state::State;
use crate::{Error, Result, Word};

/// Observable result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Output(Word),
    /// INPUT found an empty open link. The program counter is rewound so the
    /// instruction runs again once a value arrives.
    AwaitingInput,
    Halt,
}

struct Env<'a> {
    state: &'a mut State,
    memory: &'a mut Memory,
    operands: usize,
}

impl Env<'_> {
    fn fetch(&mut self) -> Result<Parameter> {
        self.operands += 1;
        Parameter::fetch(self.state, self.memory)
    }

    fn read(&mut self) -> Result<Word> {
        let param = self.fetch()?;
        param.read(self.memory, self.state.relative_base)
    }

    fn write(&mut self, param: Parameter, value: Word) -> Result<()> {
        param.write(self.memory, self.state.relative_base, value)
    }

    fn binary(&mut self, opcode: Opcode, f: impl Fn(Word, Word) -> Option<Word>) -> Result<()> {
        let a = self.read()?;
        let b = self.read()?;
        let dst = self.fetch()?;
        let value = f(a, b).ok_or(Error::Overflow { opcode })?;
        self.write(dst, value)
    }

    fn jump_if(&mut self, expected: bool) -> Result<()> {
        let cond = self.read()?;
        let target = self.read()?;
        if (cond != 0) == expected {
            self.state.pc = usize::try_from(target).map_err(|_| Error::NegativeAddress(target))?;
        }
        Ok(())
    }
}

/// Decode and execute the instruction at the program counter.
pub fn step(state: &mut State, memory: &mut Memory, input: &mut Link) -> Result<Step> {
    let opcode = decode(state, memory)?;
    trace!(pc = state.instr_start, %opcode, rb = state.relative_base, "exec");
    let mut env = Env {
        state,
        memory,
        operands: 0,
    };
    let outcome = match opcode {
        Opcode::Add => {
            env.binary(opcode, Word::checked_add)?;
            Step::Continue
        }
        Opcode::Multiply => {
            env.binary(opcode, Word::checked_mul)?;
            Step::Continue
        }
        Opcode::Input => {
            let dst = env.fetch()?;
            match input.pop() {
                Some(value) => {
                    env.write(dst, value)?;
                    Step::Continue
                }
                None if input.is_open() => {
                    env.state.rewind();
                    Step::AwaitingInput
                }
                None => return Err(Error::InputExhausted),
            }
        }
        Opcode::Output => Step::Output(env.read()?),
        Opcode::JumpIfTrue => {
            env.jump_if(true)?;
            Step::Continue
        }
        Opcode::JumpIfFalse => {
            env.jump_if(false)?;
            Step::Continue
        }
        Opcode::LessThan => {
            env.binary(opcode, |a, b| Some((a < b) as Word))?;
            Step::Continue
        }
        Opcode::Equal => {
            env.binary(opcode, |a, b| Some((a == b) as Word))?;
            Step::Continue
        }
        Opcode::AdjustRelativeBase => {
            let delta = env.read()?;
            env.state.relative_base = env
                .state
                .relative_base
                .checked_add(delta)
                .ok_or(Error::Overflow { opcode })?;
            Step::Continue
        }
        Opcode::Halt => Step::Halt,
    };
    debug_assert_eq!(
        env.operands,
        opcode.arity(),
        "{opcode} consumed the wrong number of operands"
    );
    Ok(outcome)
}
