//! State shared by every CLI command.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::commands::{Backend, LogSink, Request, Response};
use crate::error::{PipdeskError, Result};
use crate::interpreter::Interpreter;
use crate::state::SelectionStore;

/// The backend plus the presentation-side settings around it.
#[derive(Debug)]
pub struct CommandContext {
    backend: Backend,
    json: bool,
    store: Option<SelectionStore>,
}

impl CommandContext {
    /// `store` is `None` when the selection should not be remembered.
    pub fn new(backend: Backend, json: bool, store: Option<SelectionStore>) -> Self {
        Self {
            backend,
            json,
            store,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Whether results are printed as JSON.
    pub fn json(&self) -> bool {
        self.json
    }

    pub fn store(&self) -> Option<&SelectionStore> {
        self.store.as_ref()
    }

    pub fn handle(&self, request: Request, sink: &mut dyn LogSink) -> Result<Response> {
        self.backend.handle(request, sink)
    }

    /// Re-select the saved interpreter, if any.
    ///
    /// A saved interpreter that no longer validates is reported and left
    /// unselected; the file is kept so a remounted drive can recover.
    pub fn restore_selection(&self) -> Option<Interpreter> {
        let store = self.store.as_ref()?;
        let saved = match store.load() {
            Ok(Some(saved)) => saved,
            Ok(None) => return None,
            Err(e) => {
                warn!("Ignoring saved selection: {}", e);
                return None;
            }
        };

        match self.backend.selected().restore(&saved.interpreter) {
            Ok(interpreter) => {
                debug!("Restored selection {}", interpreter.path.display());
                Some(interpreter)
            }
            Err(e) => {
                warn!(
                    "Saved interpreter {} is no longer usable: {}",
                    saved.interpreter.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Save `interpreter` as the remembered selection.
    pub fn remember(&self, interpreter: &Interpreter) -> Result<()> {
        match &self.store {
            Some(store) => store.save(interpreter),
            None => Ok(()),
        }
    }

    /// Forget the selection, in memory and on disk.
    pub fn forget(&self) -> Result<()> {
        self.backend.selected().clear();
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    /// `explicit` if given, otherwise the selected interpreter.
    pub fn python(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        self.backend
            .selected()
            .current()
            .map(|interpreter| interpreter.path)
            .ok_or_else(|| {
                PipdeskError::invalid_request(
                    "no interpreter selected; run `pipdesk select` or pass --python",
                )
            })
    }
}
