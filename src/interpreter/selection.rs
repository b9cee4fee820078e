//! The currently selected interpreter.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use super::{Interpreter, Validator};
use crate::error::Result;

/// Shared handle to the selected interpreter.
///
/// Clones share the same slot. Selection validates outside the lock and then
/// publishes with a single write, so readers see either the previous
/// interpreter or the new one and a failed selection leaves the slot as it
/// was.
#[derive(Debug, Clone, Default)]
pub struct SelectedInterpreter {
    slot: Arc<RwLock<Option<Interpreter>>>,
    validator: Validator,
}

impl SelectedInterpreter {
    /// Create an empty slot that validates with `validator`.
    pub fn new(validator: Validator) -> Self {
        Self {
            slot: Arc::default(),
            validator,
        }
    }

    /// Validate `path` and make it the selection.
    pub fn select(&self, path: &Path) -> Result<Interpreter> {
        let interpreter = self.validator.validate(path)?;
        *self.write() = Some(interpreter.clone());
        info!(
            "Selected Python {} at {}",
            interpreter.version,
            interpreter.path.display()
        );
        Ok(interpreter)
    }

    /// Re-validate a previously saved selection and publish it.
    ///
    /// The saved version is not trusted; whatever the path reports now wins.
    pub fn restore(&self, saved: &Interpreter) -> Result<Interpreter> {
        self.select(&saved.path)
    }

    /// The current selection, if any.
    pub fn current(&self) -> Option<Interpreter> {
        self.read().clone()
    }

    /// Drop the selection.
    pub fn clear(&self) {
        *self.write() = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Interpreter>> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Interpreter>> {
        self.slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
