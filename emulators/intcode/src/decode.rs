//! Instruction word decoding.
//!
//! An instruction word carries the opcode in its two low decimal digits and one
//! parameter mode per higher digit, least significant first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::memory::Memory;
use crate::state::State;
use crate::{Error, Result, Word};

/// Operations recognised by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equal,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Opcode::Add,
        Opcode::Multiply,
        Opcode::Input,
        Opcode::Output,
        Opcode::JumpIfTrue,
        Opcode::JumpIfFalse,
        Opcode::LessThan,
        Opcode::Equal,
        Opcode::AdjustRelativeBase,
        Opcode::Halt,
    ];

    pub fn from_code(code: Word) -> Option<Self> {
        let op = match code {
            1 => Opcode::Add,
            2 => Opcode::Multiply,
            3 => Opcode::Input,
            4 => Opcode::Output,
            5 => Opcode::JumpIfTrue,
            6 => Opcode::JumpIfFalse,
            7 => Opcode::LessThan,
            8 => Opcode::Equal,
            9 => Opcode::AdjustRelativeBase,
            99 => Opcode::Halt,
            _ => return None,
        };
        Some(op)
    }

    pub fn code(self) -> Word {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equal => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    /// Number of operands that follow the instruction word.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equal => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JNZ",
            Opcode::JumpIfFalse => "JZ",
            Opcode::LessThan => "LT",
            Opcode::Equal => "EQ",
            Opcode::AdjustRelativeBase => "ARB",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<Word> for Opcode {
    type Error = Error;

    fn try_from(word: Word) -> Result<Self> {
        if word < 0 {
            return Err(Error::InvalidOpcode(word));
        }
        Opcode::from_code(word % 100).ok_or(Error::InvalidOpcode(word))
    }
}

/// Operand addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterMode {
    Position,
    Immediate,
    Relative,
}

impl ParameterMode {
    pub fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }
}

/// Split an instruction word into its opcode and parameter modes, in the order
/// the operands consume them.
pub fn split_word(word: Word) -> Result<(Opcode, Vec<ParameterMode>)> {
    let opcode = Opcode::try_from(word)?;
    let mut modes = Vec::new();
    let mut digits = word / 100;
    while digits > 0 {
        let digit = digits % 10;
        let mode = ParameterMode::from_digit(digit)
            .ok_or(Error::InvalidParameterMode { word, digit })?;
        modes.push(mode);
        digits /= 10;
    }
    Ok((opcode, modes))
}

/// Read the instruction word at the program counter, advance past it and queue
/// its parameter modes on `state`.
pub fn decode(state: &mut State, memory: &mut Memory) -> Result<Opcode> {
    state.instr_start = state.pc;
    let word = memory.get(state.pc as Word)?;
    state.pc += 1;
    let (opcode, modes) = split_word(word)?;
    state.load_modes(modes);
    Ok(opcode)
}
