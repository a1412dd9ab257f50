use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result, Word};

/// Growable integer tape. Any access past the end first extends the tape with
/// zeroes up to and including the touched address.
///
/// The program image is stored densely. Cells past it live in a sparse map, so
/// touching a far address only moves `len` and allocates nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    image: Vec<Word>,
    #[serde(default)]
    sparse: BTreeMap<usize, Word>,
    len: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `program` into a fresh tape; the caller's slice is never touched again.
    pub fn from_program(program: &[Word]) -> Self {
        Self {
            image: program.to_vec(),
            sparse: BTreeMap::new(),
            len: program.len(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every cell from address 0 up to `len`, in order.
    pub fn cells(&self) -> impl Iterator<Item = Word> + '_ {
        (0..self.len).map(|index| self.cell(index))
    }

    pub fn get(&mut self, addr: Word) -> Result<Word> {
        let index = self.ensure(addr)?;
        Ok(self.cell(index))
    }

    pub fn set(&mut self, addr: Word, value: Word) -> Result<()> {
        let index = self.ensure(addr)?;
        if let Some(cell) = self.image.get_mut(index) {
            *cell = value;
        } else if value == 0 {
            self.sparse.remove(&index);
        } else {
            self.sparse.insert(index, value);
        }
        Ok(())
    }

    /// Read without growing. Cells past the end read as 0.
    pub fn peek(&self, addr: Word) -> Result<Word> {
        let index = self.check(addr)?;
        Ok(self.cell(index))
    }

    fn cell(&self, index: usize) -> Word {
        match self.image.get(index) {
            Some(&value) => value,
            None => self.sparse.get(&index).copied().unwrap_or(0),
        }
    }

    fn check(&self, addr: Word) -> Result<usize> {
        if addr < 0 {
            return Err(Error::NegativeAddress(addr));
        }
        let index = usize::try_from(addr).map_err(|_| Error::MemoryLimit {
            address: addr,
            limit: usize::MAX,
        })?;
        if let Some(limit) = self.limit {
            if index >= limit {
                return Err(Error::MemoryLimit {
                    address: addr,
                    limit,
                });
            }
        }
        Ok(index)
    }

    fn ensure(&mut self, addr: Word) -> Result<usize> {
        let index = self.check(addr)?;
        if index >= self.len {
            self.len = index + 1;
        }
        Ok(index)
    }
}
