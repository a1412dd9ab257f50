use crate::decode::ParameterMode;
use crate::memory::Memory;
use crate::state::State;
use crate::{Error, Result, Word};

/// A raw operand paired with its addressing mode. Resolution against memory and
/// the relative base happens only when the instruction reads or writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub raw: Word,
    pub mode: ParameterMode,
}

impl Parameter {
    pub fn new(raw: Word, mode: ParameterMode) -> Self {
        Self { raw, mode }
    }

    /// Consume the next operand cell and the next pending mode.
    pub fn fetch(state: &mut State, memory: &mut Memory) -> Result<Self> {
        let raw = memory.get(state.pc as Word)?;
        state.pc += 1;
        Ok(Self::new(raw, state.next_mode()))
    }

    /// Memory address the operand refers to; `None` in immediate mode.
    pub fn address(&self, relative_base: Word) -> Result<Option<Word>> {
        match self.mode {
            ParameterMode::Position => Ok(Some(self.raw)),
            ParameterMode::Immediate => Ok(None),
            ParameterMode::Relative => self
                .raw
                .checked_add(relative_base)
                .map(Some)
                .ok_or(Error::AddressOverflow {
                    raw: self.raw,
                    relative_base,
                }),
        }
    }

    pub fn read(&self, memory: &mut Memory, relative_base: Word) -> Result<Word> {
        match self.address(relative_base)? {
            Some(addr) => memory.get(addr),
            None => Ok(self.raw),
        }
    }

    pub fn write(&self, memory: &mut Memory, relative_base: Word, value: Word) -> Result<()> {
        match self.address(relative_base)? {
            Some(addr) => memory.set(addr, value),
            None => Err(Error::InvalidWriteTarget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_reads_raw_value() {
        let mut memory = Memory::from_program(&[10, 20, 30]);
        let p = Parameter::new(2, ParameterMode::Immediate);
        assert_eq!(p.read(&mut memory, 0).unwrap(), 2);
    }

    #[test]
    fn immediate_write_is_rejected() {
        let mut memory = Memory::from_program(&[10, 20, 30]);
        let p = Parameter::new(1, ParameterMode::Immediate);
        assert!(matches!(
            p.write(&mut memory, 0, 5),
            Err(Error::InvalidWriteTarget)
        ));
        assert_eq!(memory.cells().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn relative_offsets_by_base() {
        let mut memory = Memory::from_program(&[10, 20, 30, 40]);
        let rel = Parameter::new(-1, ParameterMode::Relative);
        assert_eq!(rel.read(&mut memory, 3).unwrap(), 30);
        rel.write(&mut memory, 5, 77).unwrap();
        assert_eq!(memory.cells().collect::<Vec<_>>(), vec![10, 20, 30, 40, 77]);
    }

    #[test]
    fn relative_below_zero_is_negative_address() {
        let mut memory = Memory::new();
        let rel = Parameter::new(-4, ParameterMode::Relative);
        assert!(matches!(
            rel.read(&mut memory, 2),
            Err(Error::NegativeAddress(-2))
        ));
    }

    #[test]
    fn fetch_consumes_cell_and_mode() {
        let mut memory = Memory::from_program(&[104, 7, 99]);
        let mut state = State::new();
        state.pc = 1;
        state.load_modes([ParameterMode::Immediate]);
        let p = Parameter::fetch(&mut state, &mut memory).unwrap();
        assert_eq!(p, Parameter::new(7, ParameterMode::Immediate));
        assert_eq!(state.pc, 2);
    }
}
