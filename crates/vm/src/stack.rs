//! The call stack and the data stack.
//!
//! Both are plain LIFO sequences. The running program is responsible for
//! keeping them balanced; popping an empty stack is a value error.

use ippcode_common::Value;

use crate::error::RuntimeError;

/// Return positions pushed by CALL and consumed by RETURN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    entries: Vec<usize>,
}

impl CallStack {
    pub fn push(&mut self, return_to: usize) {
        self.entries.push(return_to);
    }

    /// Pop the most recent return position for instruction `at`.
    pub fn pop(&mut self, at: usize) -> Result<usize, RuntimeError> {
        self.entries.pop().ok_or(RuntimeError::CallStackEmpty { at })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Values pushed by PUSHS and consumed by POPS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataStack {
    entries: Vec<Value>,
}

impl DataStack {
    pub fn push(&mut self, value: Value) {
        self.entries.push(value);
    }

    /// Pop the top value for instruction `at`.
    pub fn pop(&mut self, at: usize) -> Result<Value, RuntimeError> {
        self.entries.pop().ok_or(RuntimeError::DataStackEmpty { at })
    }

    /// Top value without removing it.
    pub fn peek(&self) -> Option<&Value> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
