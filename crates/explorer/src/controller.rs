//! Repository list state and the operations that change it.
//!
//! # Invariants
//! - `full_name` is unique within the list for any sequence of completed adds.
//! - Entries keep insertion order.
//! - Every add or remove writes the whole list back to the store.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::{
    lookup::{LookupError, RepositoryLookup},
    model::Repository,
    storage::{RepositoryStore, StoreError},
};

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;

pub const EMPTY_INPUT_MESSAGE: &str = "Enter the owner/name of the repository";
pub const DUPLICATE_MESSAGE: &str = "Repository already added";
pub const LOOKUP_FAILED_MESSAGE: &str = "Error searching for that repository";
pub const SAVE_FAILED_MESSAGE: &str = "Could not save the repository list";

/// What the presentation layer renders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListState {
    pub repositories: Vec<Repository>,
    /// User-facing text of the last failed add, cleared by a successful one.
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum AddRepositoryError {
    #[error("no repository identifier given")]
    EmptyInput,

    #[error("repository [{0}] is already in the list")]
    Duplicate(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl AddRepositoryError {
    /// The fixed message shown next to the search form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AddRepositoryError::EmptyInput => EMPTY_INPUT_MESSAGE,
            AddRepositoryError::Duplicate(_) => DUPLICATE_MESSAGE,
            AddRepositoryError::Lookup(_) => LOOKUP_FAILED_MESSAGE,
            AddRepositoryError::Persistence(_) => SAVE_FAILED_MESSAGE,
        }
    }
}

pub struct RepositoryListController<L, S> {
    lookup: L,
    store: S,
    state: watch::Sender<ListState>,
    /// Serializes save-then-publish so the published list is always the saved one.
    writer: Mutex<()>,
}

impl<L: RepositoryLookup, S: RepositoryStore> RepositoryListController<L, S> {
    /// Restores the list from the store, or starts empty when nothing was saved.
    ///
    /// # Errors
    /// - Fails when the stored slot cannot be read or does not decode into a list.
    pub fn initialize(lookup: L, store: S) -> Result<Self, StoreError> {
        let repositories = store.load()?.unwrap_or_default();
        info!(count = repositories.len(), "Repository list restored");

        let (state, _) = watch::channel(ListState {
            repositories,
            error: None,
        });

        Ok(Self {
            lookup,
            store,
            state,
            writer: Mutex::new(()),
        })
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Receives a new [`ListState`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Looks up `identifier` and appends the result to the list.
    ///
    /// Empty and duplicate identifiers are rejected without a lookup. The
    /// state lock is not held while the lookup is in flight, so two adds can
    /// run concurrently.
    #[instrument(skip(self))]
    pub async fn add_repository(&self, identifier: &str) -> Result<Repository, AddRepositoryError> {
        if let Err(e) = self.validate(identifier) {
            return Err(self.fail(e));
        }

        let repository = match self.lookup.fetch_repository(identifier).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e.into())),
        };

        match self.commit_add(&repository) {
            Ok(()) => {
                info!("Added repository [{}]", repository.full_name);
                Ok(repository)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Removes the entry named `identifier`, if any, and writes the list back.
    ///
    /// The list is left untouched when the write fails.
    #[instrument(skip(self))]
    pub fn remove_repository(&self, identifier: &str) -> Result<(), StoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut candidate = self.state.borrow().repositories.clone();
        let removed = match candidate.iter().position(|r| r.full_name == identifier) {
            Some(index) => {
                candidate.remove(index);
                true
            }
            None => false,
        };

        if let Err(e) = self.store.save(&candidate) {
            error!(error_message = e.to_string(), "Saving repository list failed");
            return Err(e);
        }

        self.state.send_modify(|state| state.repositories = candidate);
        if removed {
            info!("Removed repository [{}]", identifier);
        }
        Ok(())
    }

    /// Saves the list with `repository` appended, then publishes it.
    ///
    /// The lookup may return a canonical name that differs from what was
    /// typed, so the returned `full_name` is checked again here.
    fn commit_add(&self, repository: &Repository) -> Result<(), AddRepositoryError> {
        // Saving blocks the calling worker; the watch lock is not held meanwhile,
        // so readers still see the last published list.
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut candidate = self.state.borrow().repositories.clone();
        if candidate.iter().any(|r| r.full_name == repository.full_name) {
            return Err(AddRepositoryError::Duplicate(repository.full_name.clone()));
        }
        candidate.push(repository.clone());

        self.store.save(&candidate)?;

        self.state.send_modify(|state| {
            state.repositories = candidate;
            state.error = None;
        });
        Ok(())
    }

    fn validate(&self, identifier: &str) -> Result<(), AddRepositoryError> {
        if identifier.is_empty() {
            return Err(AddRepositoryError::EmptyInput);
        }

        let exists = self
            .state
            .borrow()
            .repositories
            .iter()
            .any(|r| r.full_name == identifier);
        if exists {
            return Err(AddRepositoryError::Duplicate(identifier.to_string()));
        }

        Ok(())
    }

    fn fail(&self, err: AddRepositoryError) -> AddRepositoryError {
        warn!(error_message = err.to_string(), "Adding repository failed");
        self.state.send_modify(|state| {
            state.error = Some(err.user_message().to_string());
        });
        err
    }
}
