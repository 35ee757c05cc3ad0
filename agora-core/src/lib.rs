//! Core traits and types for agora
//!
//! agora keeps the session state of a community app (selected chapter,
//! likes, RSVPs, memberships, follows and ad-hoc entity collections) in one
//! persisted, observable store.
//!
//! # Core Concepts
//!
//! - **AppState**: the whole session state, stored as one JSON document
//! - **AppStore**: discrete mutations, snapshot reads, subscriptions
//! - **StateRepository**: where the document is loaded from and saved to
//! - **Mutation / reduce**: the pure transitions behind each store method
//! - **Store / Middleware**: the generic reducer store the app store is built on
//!
//! # Basic Example
//!
//! ```
//! use agora_core::prelude::*;
//!
//! let mut store = AppStore::new(MemoryRepository::new());
//! store.set_rsvp_status("e1", RsvpStatus::Going);
//! store.set_rsvp_status("e1", RsvpStatus::Maybe);
//!
//! let state = store.state();
//! assert_eq!(state.rsvp_statuses.len(), 1);
//! assert_eq!(state.rsvp_status("e1"), RsvpStatus::Maybe);
//! ```
//!
//! # Persistence
//!
//! Every mutation saves the full state before returning. Save errors are
//! logged and counted, never returned. A stored document that fails to parse
//! is replaced by the default state at startup.
//!
//! ```
//! use agora_core::{AppState, AppStore, MemoryRepository};
//!
//! let repo = MemoryRepository::with_raw("{ definitely not json");
//! let store = AppStore::new(repo);
//! assert_eq!(*store.state(), AppState::default());
//! ```

pub mod action;
pub mod app_action;
pub mod app_store;
pub mod config;
pub mod debug;
pub mod error;
pub mod mutation;
pub mod repository;
pub mod seed;
pub mod state;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Store exports
pub use store::{Middleware, Reducer, Store, StoreWithMiddleware};

// Application exports
pub use app_action::{AppAction, DispatchOutcome, RawAction};
pub use app_store::{AppStore, DynRepository, Snapshot};
pub use config::StoreConfig;
pub use error::StoreError;
pub use mutation::{reduce, Mutation, Slices};
pub use repository::{JsonFileRepository, MemoryRepository, StateRepository};
pub use state::{AppState, Record, RsvpStatus, User, ALL_CHAPTERS};

// Testing exports
pub use testing::{RecordingRepository, StoreHarness, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::app_action::{AppAction, DispatchOutcome};
    pub use crate::app_store::{AppStore, Snapshot};
    pub use crate::config::StoreConfig;
    pub use crate::debug::{ActionLog, DebugState};
    pub use crate::error::StoreError;
    pub use crate::mutation::Slices;
    pub use crate::repository::{JsonFileRepository, MemoryRepository, StateRepository};
    pub use crate::state::{AppState, Record, RsvpStatus, User, ALL_CHAPTERS};
    pub use crate::store::{Middleware, Reducer, Store, StoreWithMiddleware};
}
