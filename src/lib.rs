//! TabVault: the decision-making core behind a tab organizer.
//!
//! The crate owns four engines (an encrypted store over a flat key/value
//! backend, a heuristic tab-clustering pass, a scheduled automation-rule
//! engine, and a fuzzy ranked search) plus the repository tying collections,
//! settings, and rules to the store. Everything the host browser owns (tabs,
//! history, bookmarks, the raw key/value namespace) enters through the trait
//! seams in [`host`] and [`kv`]; the UI layer lives entirely outside.

pub mod automation;
pub mod clustering;
pub mod error;
pub mod host;
pub mod kv;
pub mod models;
pub mod repository;
pub mod search;
pub mod sessions;
pub mod store;
pub mod utils;

pub use error::{Result, VaultError};
pub use repository::CollectionRepository;
pub use store::SecureStore;
