//! Explore GitHub repositories.
//!
//! Users search repositories by `owner/name`, keep the results in a list that
//! is persisted between runs, and open a detail page per repository.

pub mod config;
pub mod controller;
pub mod lookup;
pub mod model;
pub mod storage;
pub mod telemetry;
pub mod web;

pub use controller::{AddRepositoryError, ListState, RepositoryListController};
pub use lookup::{GithubClient, LookupError, RepositoryLookup};
pub use model::{Owner, Repository};
pub use storage::{FileKeyValueStore, RepositoryStore, SlotRepositoryStore, StoreError};
