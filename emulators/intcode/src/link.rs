use std::collections::VecDeque;

use crate::Word;

/// FIFO feeding a machine's INPUT instructions.
///
/// A closed link is a finite, pre-supplied input: once drained, further reads are
/// a fatal `InputExhausted`. An open link may still be refilled by its producer,
/// so an empty read suspends the consumer instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    values: VecDeque<Word>,
    open: bool,
}

impl Link {
    pub fn finite(values: impl IntoIterator<Item = Word>) -> Self {
        Self {
            values: values.into_iter().collect(),
            open: false,
        }
    }

    pub fn open() -> Self {
        Self {
            values: VecDeque::new(),
            open: true,
        }
    }

    pub fn push(&mut self, value: Word) {
        self.values.push_back(value);
    }

    pub fn pop(&mut self) -> Option<Word> {
        self.values.pop_front()
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Extend<Word> for Link {
    fn extend<T: IntoIterator<Item = Word>>(&mut self, iter: T) {
        self.values.extend(iter);
    }
}
