//! The application store
//!
//! [`AppStore`] owns the single [`AppState`], exposes discrete mutation
//! methods and persists the full state through a [`StateRepository`] after
//! each one. Readers get immutable `Arc<AppState>` snapshots, either on
//! demand via [`AppStore::state`] or pushed through [`AppStore::subscribe`].
//!
//! ```
//! use agora_core::{AppStore, MemoryRepository};
//!
//! let mut store = AppStore::new(MemoryRepository::new());
//! store.toggle_join_group("group1");
//! store.toggle_join_group("group2");
//! store.toggle_join_group("group1");
//! assert_eq!(store.state().joined_groups, vec!["group2"]);
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::app_action::{AppAction, DispatchOutcome};
use crate::config::StoreConfig;
use crate::debug::{ActionLog, ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
use crate::error::Result;
use crate::mutation::{reduce, Mutation, Slices};
use crate::repository::StateRepository;
use crate::state::{AppState, Record, RsvpStatus, User};
use crate::store::StoreWithMiddleware;

/// What subscribers receive after each mutation
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub state: Arc<AppState>,
    /// Mutations applied since the store was created
    pub version: u64,
    /// Parts of the state the last mutation was aimed at
    pub touched: Slices,
}

/// Repository type used by [`AppStore::open`]
pub type DynRepository = Box<dyn StateRepository + Send>;

pub struct AppStore<R: StateRepository = DynRepository> {
    store: StoreWithMiddleware<AppState, Mutation, ActionLoggerMiddleware>,
    repository: R,
    version: u64,
    persist_failures: u64,
    publisher: watch::Sender<Snapshot>,
}

impl AppStore<DynRepository> {
    /// Build a store from configuration
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            persist = config.persist,
            dir = %config.storage_dir.display(),
            key = %config.storage_key,
            "opening store"
        );
        Ok(Self::with_action_log(
            config.repository(),
            Some(config.action_log()),
        ))
    }
}

impl<R: StateRepository> AppStore<R> {
    /// Load state from `repository` (or start from default) with a default
    /// action log
    pub fn new(repository: R) -> Self {
        Self::with_action_log(repository, Some(ActionLogConfig::default()))
    }

    /// Like [`AppStore::new`]; `None` logs to `tracing` only and keeps no
    /// in-memory action log
    pub fn with_action_log(repository: R, log: Option<ActionLogConfig>) -> Self {
        let state = load_or_default(&repository);
        let logger = match log {
            Some(config) => ActionLoggerMiddleware::with_log(config),
            None => ActionLoggerMiddleware::new(ActionLoggerConfig::default()),
        };
        let store = StoreWithMiddleware::new(state, reduce, logger);
        let (publisher, _) = watch::channel(Snapshot {
            state: store.snapshot(),
            version: 0,
            touched: Slices::empty(),
        });

        Self {
            store,
            repository,
            version: 0,
            persist_failures: 0,
            publisher,
        }
    }

    /// Current snapshot. Later mutations never change a returned snapshot.
    pub fn state(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    /// Receive a [`Snapshot`] after every mutation
    ///
    /// The channel keeps only the latest snapshot; slow readers skip
    /// intermediate versions.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Saves that failed and were swallowed
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Recent mutations and dispatched actions, if the log is enabled
    pub fn action_log(&self) -> Option<&ActionLog> {
        self.store.middleware().log()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Replace the chapter filter. The id is not validated.
    pub fn set_selected_chapter(&mut self, id: impl Into<String>) {
        self.apply(Mutation::SetSelectedChapter(id.into()));
    }

    /// Remove `post_id` from the liked posts if present, else append it
    pub fn toggle_like_post(&mut self, post_id: impl Into<String>) {
        self.apply(Mutation::ToggleLikePost(post_id.into()));
    }

    /// Upsert the RSVP for one event
    pub fn set_rsvp_status(&mut self, event_id: impl Into<String>, status: RsvpStatus) {
        self.apply(Mutation::SetRsvpStatus {
            event_id: event_id.into(),
            status,
        });
    }

    pub fn toggle_join_group(&mut self, group_id: impl Into<String>) {
        self.apply(Mutation::ToggleJoinGroup(group_id.into()));
    }

    pub fn toggle_follow_user(&mut self, user_id: impl Into<String>) {
        self.apply(Mutation::ToggleFollowUser(user_id.into()));
    }

    pub fn add_group(&mut self, group: Record) {
        self.apply(Mutation::AddGroup(group));
    }

    /// Drop every group with this id; absent ids are a no-op
    pub fn remove_group(&mut self, id: &str) {
        self.apply(Mutation::RemoveGroup(id.to_string()));
    }

    pub fn add_event(&mut self, event: Record) {
        self.apply(Mutation::AddEvent(event));
    }

    pub fn remove_event(&mut self, id: &str) {
        self.apply(Mutation::RemoveEvent(id.to_string()));
    }

    pub fn add_post(&mut self, post: Record) {
        self.apply(Mutation::AddPost(post));
    }

    pub fn remove_post(&mut self, id: &str) {
        self.apply(Mutation::RemovePost(id.to_string()));
    }

    pub fn add_notification(&mut self, notification: Record) {
        self.apply(Mutation::AddNotification(notification));
    }

    pub fn remove_notification(&mut self, id: &str) {
        self.apply(Mutation::RemoveNotification(id.to_string()));
    }

    /// Sign in (`Some`) or out (`None`)
    pub fn set_user(&mut self, user: Option<User>) {
        self.apply(Mutation::SetUser(user));
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: Value) {
        self.apply(Mutation::SetSetting {
            key: key.into(),
            value,
        });
    }

    pub fn remove_setting(&mut self, key: &str) {
        self.apply(Mutation::RemoveSetting(key.to_string()));
    }

    /// Back to the default state, persisted like any other mutation
    pub fn reset(&mut self) {
        self.apply(Mutation::Reset);
    }

    /// Accept a tagged action
    ///
    /// No tag has a transition yet: the action is logged and state is left
    /// alone. Nothing is persisted or published.
    pub fn dispatch(&mut self, action: AppAction) -> DispatchOutcome {
        let outcome = match &action {
            AppAction::Unhandled { kind, .. } => {
                info!(kind = %kind, "no handler for dispatched action");
                DispatchOutcome::NotHandled
            }
        };

        let changed = matches!(outcome, DispatchOutcome::Handled { changed: true });
        self.store.middleware_mut().record(&action, changed);
        outcome
    }

    // Reduce, persist, then publish. Runs for no-op mutations too, so every
    // call leaves a saved document matching `state()`.
    fn apply(&mut self, mutation: Mutation) {
        let touched = mutation.slices();
        let name = mutation.name();
        let changed = self.store.dispatch(mutation);
        self.persist();

        self.version += 1;
        self.publisher.send_replace(Snapshot {
            state: self.store.snapshot(),
            version: self.version,
            touched,
        });

        debug!(action = name, version = self.version, changed, "mutation applied");
    }

    fn persist(&mut self) {
        if let Err(err) = self.repository.save(self.store.state()) {
            self.persist_failures += 1;
            warn!(error = %err, failures = self.persist_failures, "failed to persist state");
        }
    }
}

fn load_or_default<R: StateRepository>(repository: &R) -> AppState {
    match repository.load() {
        Ok(Some(state)) => {
            debug!("restored persisted state");
            state
        }
        Ok(None) => {
            debug!("no persisted state, starting from default");
            AppState::default()
        }
        Err(err) => {
            warn!(error = %err, "discarding unreadable persisted state");
            AppState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use crate::testing::RecordingRepository;
    use serde_json::json;

    fn fresh() -> AppStore<MemoryRepository> {
        AppStore::new(MemoryRepository::new())
    }

    #[test]
    fn starts_from_default_when_nothing_stored() {
        let store = fresh();
        assert_eq!(*store.state(), AppState::default());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn restores_stored_state() {
        let repo = MemoryRepository::with_raw(r#"{"selectedChapter":"berlin","likedPosts":["p1"]}"#);
        let store = AppStore::new(repo);
        assert_eq!(store.state().selected_chapter, "berlin");
        assert!(store.state().is_liked("p1"));
    }

    #[test]
    fn corrupted_storage_falls_back_to_default() {
        let store = AppStore::new(MemoryRepository::with_raw("{\"likedPosts\":"));
        assert_eq!(*store.state(), AppState::default());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let repo = MemoryRepository::new();
        let mut store = AppStore::new(repo.clone());

        store.toggle_like_post("p1");
        assert_eq!(AppState::from_json(&repo.raw().unwrap()).unwrap(), *store.state());

        store.set_rsvp_status("e1", RsvpStatus::Going);
        let stored = AppState::from_json(&repo.raw().unwrap()).unwrap();
        assert_eq!(stored.rsvp_status("e1"), RsvpStatus::Going);
    }

    #[test]
    fn noop_mutations_still_persist_once() {
        let repo = RecordingRepository::new();
        let mut store = AppStore::new(repo.clone());

        store.remove_group("missing");
        store.remove_setting("missing");

        assert_eq!(repo.saves(), 2);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn save_failures_are_swallowed_and_counted() {
        let repo = RecordingRepository::new();
        let mut store = AppStore::new(repo.clone());

        repo.fail_saves(true);
        store.toggle_follow_user("u1");
        store.toggle_follow_user("u2");

        assert!(store.state().is_following("u1"));
        assert!(store.state().is_following("u2"));
        assert_eq!(store.persist_failures(), 2);

        repo.fail_saves(false);
        store.toggle_follow_user("u3");
        assert_eq!(store.persist_failures(), 2);
        assert_eq!(repo.last_saved().unwrap().followed_users.len(), 3);
    }

    #[test]
    fn snapshots_are_immutable() {
        let mut store = fresh();
        store.add_post(Record::new("p1"));
        let before = store.state();

        store.add_post(Record::new("p2"));
        store.remove_post("p1");

        assert_eq!(before.posts.len(), 1);
        assert_eq!(before.posts[0].id, "p1");
        assert_eq!(store.state().posts[0].id, "p2");
    }

    #[test]
    fn dispatch_changes_nothing_and_is_logged() {
        let repo = RecordingRepository::new();
        let mut store = AppStore::new(repo.clone());
        let before = store.state();

        let outcome = store.dispatch(AppAction::new("poll.vote", json!({ "option": 2 })));

        assert_eq!(outcome, DispatchOutcome::NotHandled);
        assert_eq!(*store.state(), *before);
        assert_eq!(store.version(), 0);
        assert_eq!(repo.saves(), 0);

        let entry = store.action_log().unwrap().last().unwrap();
        assert_eq!(entry.name, "Dispatch");
        assert_eq!(entry.state_changed, Some(false));
        assert!(entry.summary.contains("poll.vote"));
    }

    #[test]
    fn mutations_are_logged_in_order() {
        let mut store = fresh();
        store.toggle_join_group("g1");
        store.set_selected_chapter("lisbon");
        store.remove_event("ghost");

        let names: Vec<_> = store
            .action_log()
            .unwrap()
            .entries()
            .map(|e| (e.name, e.state_changed))
            .collect();
        assert_eq!(
            names,
            vec![
                ("ToggleJoinGroup", Some(true)),
                ("SetSelectedChapter", Some(true)),
                ("RemoveEvent", Some(false)),
            ]
        );
    }

    #[test]
    fn log_can_be_disabled() {
        let mut store = AppStore::with_action_log(MemoryRepository::new(), None);
        store.reset();
        assert!(store.action_log().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_latest_snapshot() {
        let mut store = fresh();
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow().version, 0);

        store.toggle_like_post("p1");
        rx.changed().await.unwrap();
        {
            let snap = rx.borrow_and_update();
            assert_eq!(snap.version, 1);
            assert_eq!(snap.touched, Slices::LIKED_POSTS);
            assert!(snap.state.is_liked("p1"));
        }

        store.set_user(Some(User::new("u1", "Ada")));
        store.set_setting("theme", json!("dark"));
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update();
        assert_eq!(snap.version, 3);
        assert_eq!(snap.touched, Slices::SETTINGS);
        assert_eq!(snap.state.user.as_ref().unwrap().id, "u1");
    }

    #[test]
    fn open_with_ephemeral_config() {
        let mut store = AppStore::open(&StoreConfig::ephemeral()).unwrap();
        store.add_notification(Record::new("n1"));
        store.remove_notification("n1");
        assert!(store.state().notifications.is_empty());
    }

    #[test]
    fn open_rejects_invalid_config() {
        let config = StoreConfig {
            storage_key: String::new(),
            ..StoreConfig::ephemeral()
        };
        assert!(AppStore::open(&config).is_err());
    }

    #[test]
    fn open_persists_to_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            storage_dir: dir.path().to_path_buf(),
            storage_key: "session".into(),
            ..StoreConfig::default()
        };

        let mut store = AppStore::open(&config).unwrap();
        store.set_selected_chapter("nairobi");
        drop(store);

        assert!(dir.path().join("session.json").exists());
        let reopened = AppStore::open(&config).unwrap();
        assert_eq!(reopened.state().selected_chapter, "nairobi");
    }

    #[test]
    fn open_rejects_oversized_action_log() {
        let config = StoreConfig {
            action_log_capacity: usize::MAX,
            ..StoreConfig::ephemeral()
        };
        assert!(matches!(
            AppStore::open(&config),
            Err(crate::StoreError::Config(_))
        ));
    }
}
