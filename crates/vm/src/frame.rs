//! Variable frames: the global frame, the local frame stack and the
//! temporary frame.

use std::collections::HashMap;

use ippcode_common::{FrameKind, Value, VarRef};
use thiserror::Error;

use crate::error::RuntimeError;

/// Contents of one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Declared by DEFVAR, never assigned.
    Uninitialized,
    /// Holds a value; the type is the value's own tag.
    Initialized(Value),
}

/// A single scope mapping variable names to slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: HashMap<String, Slot>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `name`, if declared.
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Returns true if `name` is declared in this frame.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Variables sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &Slot)> {
        let mut entries: Vec<_> = self.slots.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by_key(|&(name, _)| name);
        entries
    }
}

/// Frame lookups that failed. The engine attaches the instruction index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {0} does not exist")]
    MissingFrame(FrameKind),
    #[error("undeclared variable {0}")]
    Undeclared(VarRef),
    #[error("uninitialized variable {0}")]
    Uninitialized(VarRef),
    #[error("variable {0} redefined")]
    Redefinition(VarRef),
}

impl FrameError {
    /// Convert into a runtime error raised by instruction `at`.
    pub fn at(self, at: usize) -> RuntimeError {
        match self {
            FrameError::MissingFrame(frame) => RuntimeError::MissingFrame { at, frame },
            FrameError::Undeclared(v) => RuntimeError::UndeclaredVariable {
                at,
                frame: v.frame,
                name: v.name,
            },
            FrameError::Uninitialized(v) => RuntimeError::UninitializedVariable {
                at,
                frame: v.frame,
                name: v.name,
            },
            FrameError::Redefinition(v) => RuntimeError::Redefinition {
                at,
                frame: v.frame,
                name: v.name,
            },
        }
    }
}

/// All frames visible to a running program.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    global: Frame,
    locals: Vec<Frame>,
    temporary: Option<Frame>,
}

impl FrameSet {
    /// A frame set with an empty global frame and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The frame `kind` currently refers to.
    pub fn get(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Local => self.locals.last(),
            FrameKind::Temporary => self.temporary.as_ref(),
        }
        .ok_or(FrameError::MissingFrame(kind))
    }

    fn get_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Local => self.locals.last_mut(),
            FrameKind::Temporary => self.temporary.as_mut(),
        }
        .ok_or(FrameError::MissingFrame(kind))
    }

    /// Declare `var` as uninitialised. Fails if the name already exists.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.get_mut(var.frame)?;
        if frame.contains(&var.name) {
            return Err(FrameError::Redefinition(var.clone()));
        }
        frame.slots.insert(var.name.clone(), Slot::Uninitialized);
        Ok(())
    }

    /// Store `value` in `var`, creating or overwriting the slot.
    pub fn assign(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let frame = self.get_mut(var.frame)?;
        frame.slots.insert(var.name.clone(), Slot::Initialized(value));
        Ok(())
    }

    /// Slot of a declared variable.
    pub fn slot(&self, var: &VarRef) -> Result<&Slot, FrameError> {
        self.get(var.frame)?
            .get(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.clone()))
    }

    /// Value of an initialised variable.
    pub fn read(&self, var: &VarRef) -> Result<&Value, FrameError> {
        match self.slot(var)? {
            Slot::Initialized(value) => Ok(value),
            Slot::Uninitialized => Err(FrameError::Uninitialized(var.clone())),
        }
    }

    /// Fails unless `var` is declared (initialised or not).
    pub fn require_declared(&self, var: &VarRef) -> Result<(), FrameError> {
        self.slot(var).map(|_| ())
    }

    /// Replace the temporary frame with an empty one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// Move the temporary frame onto the local stack.
    pub fn push_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::MissingFrame(FrameKind::Temporary))?;
        self.locals.push(frame);
        Ok(())
    }

    /// Move the innermost local frame back to the temporary slot.
    pub fn pop_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::MissingFrame(FrameKind::Local))?;
        self.temporary = Some(frame);
        Ok(())
    }

    /// Number of frames on the local stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
