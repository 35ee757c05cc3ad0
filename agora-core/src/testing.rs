//! Test utilities for agora stores and their consumers
//!
//! - [`RecordingRepository`]: in-memory repository that counts saves and can
//!   be told to fail
//! - [`StoreHarness`]: an [`AppStore`] wired to a recording repository with a
//!   subscriber attached
//! - [`TestHarness`]: action channel for testing code that emits actions
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```
//! use agora_core::testing::StoreHarness;
//!
//! let mut harness = StoreHarness::new();
//! harness.store.toggle_like_post("p1");
//! harness.assert_persisted();
//! assert_eq!(harness.saves(), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};

use crate::app_store::{AppStore, Snapshot};
use crate::error::{Result, StoreError};
use crate::repository::StateRepository;
use crate::state::AppState;
use crate::{Action, ActionCategory};

#[derive(Debug, Default)]
struct Recording {
    stored: Option<AppState>,
    saves: usize,
    fail_saves: bool,
}

/// Repository that records every save
///
/// Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingRepository {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored state, as if a previous session saved it
    pub fn with_state(state: AppState) -> Self {
        let repo = Self::new();
        repo.lock().stored = Some(state);
        repo
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Successful saves so far
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// The last state that was saved successfully
    pub fn last_saved(&self) -> Option<AppState> {
        self.lock().stored.clone()
    }
}

impl StateRepository for RecordingRepository {
    fn load(&self) -> Result<Option<AppState>> {
        Ok(self.lock().stored.clone())
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        let mut recording = self.lock();
        if recording.fail_saves {
            return Err(StoreError::io(
                "recording",
                std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
            ));
        }
        recording.stored = Some(state.clone());
        recording.saves += 1;
        Ok(())
    }
}

/// An [`AppStore`] on a [`RecordingRepository`] with a subscriber attached
pub struct StoreHarness {
    pub store: AppStore<RecordingRepository>,
    repository: RecordingRepository,
    updates: watch::Receiver<Snapshot>,
}

impl Default for StoreHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreHarness {
    /// Store starting from the default state
    pub fn new() -> Self {
        Self::from_repository(RecordingRepository::new())
    }

    /// Store that loads `state` on startup
    pub fn with_state(state: AppState) -> Self {
        Self::from_repository(RecordingRepository::with_state(state))
    }

    fn from_repository(repository: RecordingRepository) -> Self {
        let store = AppStore::new(repository.clone());
        let updates = store.subscribe();
        Self {
            store,
            repository,
            updates,
        }
    }

    pub fn repository(&self) -> &RecordingRepository {
        &self.repository
    }

    pub fn saves(&self) -> usize {
        self.repository.saves()
    }

    /// Latest published snapshot, if one arrived since the last call
    pub fn take_update(&mut self) -> Option<Snapshot> {
        match self.updates.has_changed() {
            Ok(true) => Some(self.updates.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Panics unless the last saved state equals the current snapshot
    #[track_caller]
    pub fn assert_persisted(&self) {
        let saved = self
            .repository
            .last_saved()
            .unwrap_or_else(|| panic!("nothing was persisted"));
        assert_eq!(saved, *self.store.state(), "persisted state is stale");
    }
}

/// Action channel for testing code that emits actions
///
/// # Example
///
/// ```
/// use agora_core::testing::TestHarness;
/// use agora_core::Action;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum UiAction {
///     Like(String),
///     Quit,
/// }
///
/// impl Action for UiAction {
///     fn name(&self) -> &'static str {
///         match self {
///             UiAction::Like(_) => "Like",
///             UiAction::Quit => "Quit",
///         }
///     }
/// }
///
/// let mut harness = TestHarness::<(), UiAction>::new(());
/// harness.emit(UiAction::Like("p1".into()));
/// harness.emit(UiAction::Quit);
/// assert_eq!(harness.drain_emitted().len(), 2);
/// ```
pub struct TestHarness<S, A: Action> {
    /// The state under test
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Sender to hand to code under test
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain all emitted actions
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S, A: ActionCategory> TestHarness<S, A> {
    /// Drain emitted actions of one category, leaving the rest queued
    pub fn drain_category(&mut self, category: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .drain_emitted()
            .into_iter()
            .partition(|a| a.category() == Some(category));

        for action in rest {
            let _ = self.tx.send(action);
        }
        matching
    }
}

/// Assert that an action matching the pattern was emitted.
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching the pattern was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}
