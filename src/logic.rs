// 🧠 Logic - owns the Model and the storage for one session
//
// Startup loads the Book (or sample data), every command runs through
// `execute`, and `shutdown` writes the Book back.

use crate::book::{Book, Result as BookResult};
use crate::cli::{parse_command, ParseContext, ParseError};
use crate::commands::{Command, CommandResult};
use crate::config::Config;
use crate::error::BookError;
use crate::model::Model;
use crate::sample::sample_book;
use crate::storage::{open_storage, BookStorage};
use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a typed line produced no result
#[derive(Debug, Error)]
pub enum LineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Book(#[from] BookError),
}

pub struct Logic {
    model: Model,
    storage: Box<dyn BookStorage>,
}

impl Logic {
    pub fn new(model: Model, storage: Box<dyn BookStorage>) -> Self {
        Logic { model, storage }
    }

    /// Open the configured storage and load the starting Book
    ///
    /// A saved Book that fails to load is an error rather than a silent
    /// fresh start, so shutdown never overwrites data it could not read.
    pub fn start(config: &Config) -> Result<Self> {
        let storage = open_storage(config)?;
        let book = match storage.load_book()? {
            Some(book) => book,
            None if config.load_sample_when_missing => {
                info!(path = %storage.location().display(), "no saved book, using sample data");
                sample_book().context("Failed to build sample data")?
            }
            None => {
                info!(path = %storage.location().display(), "no saved book, starting empty");
                Book::new()
            }
        };
        Ok(Logic::new(Model::new(book), storage))
    }

    pub fn execute(&mut self, command: &dyn Command) -> BookResult<CommandResult> {
        debug!(command = command.name(), "executing");
        match command.execute(&mut self.model) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(command = command.name(), kind = ?e.kind(), "command failed: {}", e);
                Err(e)
            }
        }
    }

    /// Parse one input line and run it
    pub fn execute_line(
        &mut self,
        line: &str,
        context: &ParseContext,
    ) -> std::result::Result<CommandResult, LineError> {
        let command = parse_command(line, context)?;
        Ok(self.execute(command.as_ref())?)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn can_undo(&self) -> bool {
        self.model.can_undo_book()
    }

    pub fn storage_location(&self) -> &std::path::Path {
        self.storage.location()
    }

    /// Persist the current Book
    pub fn shutdown(&self) -> Result<()> {
        self.storage
            .save_book(self.model.book())
            .with_context(|| format!("Failed to save to {}", self.storage.location().display()))
    }
}
