//! Label index, built once before execution.

use std::collections::HashMap;

use ippcode_common::Program;

use crate::error::RuntimeError;

/// Maps label names to the index of their `LABEL` instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan `program` once and record every `LABEL`.
    ///
    /// A label defined twice is a semantic error reported at the second
    /// definition.
    pub fn build(program: &Program) -> Result<Self, RuntimeError> {
        let mut labels = HashMap::new();
        for (index, instr) in program.instructions().iter().enumerate() {
            let Some(name) = instr.label_name() else {
                continue;
            };
            if labels.insert(name.to_string(), index).is_some() {
                return Err(RuntimeError::DuplicateLabel {
                    at: index,
                    label: name.to_string(),
                });
            }
        }
        Ok(Self { labels })
    }

    /// Instruction index of `name`, if defined.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
