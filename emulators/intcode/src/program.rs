use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use crate::machine::Machine;
use crate::{Error, Result, Word};

/// Canonical program image. Machines copy it on construction, so one program
/// can back any number of machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    /// Read a program from a text file of comma-separated integers.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn machine(&self) -> Machine {
        Machine::new(&self.words)
    }

    pub fn machine_with_input(&self, inputs: impl IntoIterator<Item = Word>) -> Machine {
        Machine::with_input(&self.words, inputs)
    }
}

impl Deref for Program {
    type Target = [Word];

    fn deref(&self) -> &[Word] {
        &self.words
    }
}

/// Lines are trimmed and joined before splitting on commas, so a program may be
/// wrapped across lines. A single trailing comma is accepted.
impl FromStr for Program {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let joined: String = text.lines().map(str::trim).collect();
        if joined.is_empty() {
            return Err(Error::EmptyProgram);
        }
        let body = joined.strip_suffix(',').unwrap_or(&joined);
        let words = body
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                token.trim().parse::<Word>().map_err(|_| Error::Parse {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { words })
    }
}
