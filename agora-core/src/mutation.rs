//! State transitions behind the store's discrete operations
//!
//! Every [`AppStore`](crate::AppStore) mutation is expressed as a
//! [`Mutation`] value applied by [`reduce`]. Keeping transitions in one pure
//! function lets the store log, persist and publish uniformly.

use bitflags::bitflags;
use serde_json::Value;

use crate::action::{Action, ActionSummary};
use crate::state::{AppState, Record, RsvpStatus, User};

bitflags! {
    /// Parts of [`AppState`] a mutation may touch
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Slices: u16 {
        const USER = 1 << 0;
        const GROUPS = 1 << 1;
        const EVENTS = 1 << 2;
        const POSTS = 1 << 3;
        const NOTIFICATIONS = 1 << 4;
        const SETTINGS = 1 << 5;
        const SELECTED_CHAPTER = 1 << 6;
        const LIKED_POSTS = 1 << 7;
        const RSVP_STATUSES = 1 << 8;
        const JOINED_GROUPS = 1 << 9;
        const FOLLOWED_USERS = 1 << 10;
    }
}

/// One state transition
#[derive(Debug, Clone)]
pub enum Mutation {
    SetSelectedChapter(String),
    ToggleLikePost(String),
    SetRsvpStatus { event_id: String, status: RsvpStatus },
    ToggleJoinGroup(String),
    ToggleFollowUser(String),
    AddGroup(Record),
    RemoveGroup(String),
    AddEvent(Record),
    RemoveEvent(String),
    AddPost(Record),
    RemovePost(String),
    AddNotification(Record),
    RemoveNotification(String),
    SetUser(Option<User>),
    SetSetting { key: String, value: Value },
    RemoveSetting(String),
    Reset,
}

impl Action for Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::SetSelectedChapter(_) => "SetSelectedChapter",
            Mutation::ToggleLikePost(_) => "ToggleLikePost",
            Mutation::SetRsvpStatus { .. } => "SetRsvpStatus",
            Mutation::ToggleJoinGroup(_) => "ToggleJoinGroup",
            Mutation::ToggleFollowUser(_) => "ToggleFollowUser",
            Mutation::AddGroup(_) => "AddGroup",
            Mutation::RemoveGroup(_) => "RemoveGroup",
            Mutation::AddEvent(_) => "AddEvent",
            Mutation::RemoveEvent(_) => "RemoveEvent",
            Mutation::AddPost(_) => "AddPost",
            Mutation::RemovePost(_) => "RemovePost",
            Mutation::AddNotification(_) => "AddNotification",
            Mutation::RemoveNotification(_) => "RemoveNotification",
            Mutation::SetUser(_) => "SetUser",
            Mutation::SetSetting { .. } => "SetSetting",
            Mutation::RemoveSetting(_) => "RemoveSetting",
            Mutation::Reset => "Reset",
        }
    }
}

impl ActionSummary for Mutation {
    fn summary(&self) -> String {
        match self {
            Mutation::SetSelectedChapter(id)
            | Mutation::ToggleLikePost(id)
            | Mutation::ToggleJoinGroup(id)
            | Mutation::ToggleFollowUser(id)
            | Mutation::RemoveGroup(id)
            | Mutation::RemoveEvent(id)
            | Mutation::RemovePost(id)
            | Mutation::RemoveNotification(id)
            | Mutation::RemoveSetting(id) => format!("{} {}", self.name(), id),
            Mutation::AddGroup(record)
            | Mutation::AddEvent(record)
            | Mutation::AddPost(record)
            | Mutation::AddNotification(record) => format!("{} {}", self.name(), record.id),
            Mutation::SetRsvpStatus { event_id, status } => {
                format!("SetRsvpStatus {} = {}", event_id, status)
            }
            Mutation::SetUser(Some(user)) => format!("SetUser {}", user.id),
            Mutation::SetUser(None) => "SetUser <signed out>".to_string(),
            Mutation::SetSetting { key, value } => format!("SetSetting {} = {}", key, value),
            Mutation::Reset => "Reset".to_string(),
        }
    }
}

impl Mutation {
    /// Parts of the state this mutation can change
    pub fn slices(&self) -> Slices {
        match self {
            Mutation::SetSelectedChapter(_) => Slices::SELECTED_CHAPTER,
            Mutation::ToggleLikePost(_) => Slices::LIKED_POSTS,
            Mutation::SetRsvpStatus { .. } => Slices::RSVP_STATUSES,
            Mutation::ToggleJoinGroup(_) => Slices::JOINED_GROUPS,
            Mutation::ToggleFollowUser(_) => Slices::FOLLOWED_USERS,
            Mutation::AddGroup(_) | Mutation::RemoveGroup(_) => Slices::GROUPS,
            Mutation::AddEvent(_) | Mutation::RemoveEvent(_) => Slices::EVENTS,
            Mutation::AddPost(_) | Mutation::RemovePost(_) => Slices::POSTS,
            Mutation::AddNotification(_) | Mutation::RemoveNotification(_) => {
                Slices::NOTIFICATIONS
            }
            Mutation::SetUser(_) => Slices::USER,
            Mutation::SetSetting { .. } | Mutation::RemoveSetting(_) => Slices::SETTINGS,
            Mutation::Reset => Slices::all(),
        }
    }
}

/// Apply a mutation. Returns `true` if the state changed.
pub fn reduce(state: &mut AppState, mutation: Mutation) -> bool {
    match mutation {
        Mutation::SetSelectedChapter(id) => replace(&mut state.selected_chapter, id),
        Mutation::ToggleLikePost(id) => toggle(&mut state.liked_posts, id),
        Mutation::SetRsvpStatus { event_id, status } => {
            state.rsvp_statuses.insert(event_id, status) != Some(status)
        }
        Mutation::ToggleJoinGroup(id) => toggle(&mut state.joined_groups, id),
        Mutation::ToggleFollowUser(id) => toggle(&mut state.followed_users, id),
        Mutation::AddGroup(record) => append(&mut state.groups, record),
        Mutation::RemoveGroup(id) => remove_by_id(&mut state.groups, &id),
        Mutation::AddEvent(record) => append(&mut state.events, record),
        Mutation::RemoveEvent(id) => remove_by_id(&mut state.events, &id),
        Mutation::AddPost(record) => append(&mut state.posts, record),
        Mutation::RemovePost(id) => remove_by_id(&mut state.posts, &id),
        Mutation::AddNotification(record) => append(&mut state.notifications, record),
        Mutation::RemoveNotification(id) => remove_by_id(&mut state.notifications, &id),
        Mutation::SetUser(user) => replace(&mut state.user, user),
        Mutation::SetSetting { key, value } => {
            state.settings.insert(key, value.clone()) != Some(value)
        }
        Mutation::RemoveSetting(key) => state.settings.remove(&key).is_some(),
        Mutation::Reset => replace(state, AppState::default()),
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

// Present -> remove every occurrence, absent -> append.
fn toggle(ids: &mut Vec<String>, id: String) -> bool {
    if ids.contains(&id) {
        ids.retain(|existing| *existing != id);
    } else {
        ids.push(id);
    }
    true
}

fn append(records: &mut Vec<Record>, record: Record) -> bool {
    records.push(record);
    true
}

fn remove_by_id(records: &mut Vec<Record>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id != id);
    records.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(state: &mut AppState, mutations: Vec<Mutation>) {
        for m in mutations {
            reduce(state, m);
        }
    }

    #[test]
    fn toggle_join_scenario() {
        let mut state = AppState::default();
        apply(
            &mut state,
            vec![
                Mutation::ToggleJoinGroup("group1".into()),
                Mutation::ToggleJoinGroup("group2".into()),
                Mutation::ToggleJoinGroup("group1".into()),
            ],
        );
        assert_eq!(state.joined_groups, vec!["group2"]);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut state = AppState::default();
        state.liked_posts = vec!["a".into(), "b".into()];
        let original = state.liked_posts.clone();

        reduce(&mut state, Mutation::ToggleLikePost("c".into()));
        assert_eq!(state.liked_posts, vec!["a", "b", "c"]);
        reduce(&mut state, Mutation::ToggleLikePost("c".into()));
        assert_eq!(state.liked_posts, original);
    }

    #[test]
    fn toggle_removes_duplicates_planted_by_callers() {
        let mut state = AppState::default();
        state.followed_users = vec!["u1".into(), "u2".into(), "u1".into()];

        reduce(&mut state, Mutation::ToggleFollowUser("u1".into()));
        assert_eq!(state.followed_users, vec!["u2"]);
    }

    #[test]
    fn rsvp_is_an_upsert() {
        let mut state = AppState::default();
        let set = |status| Mutation::SetRsvpStatus {
            event_id: "e1".into(),
            status,
        };

        assert!(reduce(&mut state, set(RsvpStatus::Going)));
        assert!(reduce(&mut state, set(RsvpStatus::Maybe)));
        assert!(!reduce(&mut state, set(RsvpStatus::Maybe)));

        assert_eq!(state.rsvp_statuses.len(), 1);
        assert_eq!(state.rsvp_statuses["e1"], RsvpStatus::Maybe);
    }

    #[test]
    fn remove_absent_record_is_noop() {
        let mut state = AppState::default();
        reduce(&mut state, Mutation::AddGroup(Record::new("g1")));
        let before = state.groups.clone();

        assert!(!reduce(&mut state, Mutation::RemoveGroup("missing".into())));
        assert_eq!(state.groups, before);
    }

    #[test]
    fn add_keeps_insertion_order_and_allows_duplicate_ids() {
        let mut state = AppState::default();
        apply(
            &mut state,
            vec![
                Mutation::AddPost(Record::new("p2")),
                Mutation::AddPost(Record::new("p1")),
                Mutation::AddPost(Record::new("p2").with("title", "again")),
            ],
        );
        let ids: Vec<_> = state.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1", "p2"]);

        reduce(&mut state, Mutation::RemovePost("p2".into()));
        assert_eq!(state.posts.len(), 1);
    }

    #[test]
    fn selected_chapter_is_unvalidated() {
        let mut state = AppState::default();
        assert!(reduce(
            &mut state,
            Mutation::SetSelectedChapter("nowhere".into())
        ));
        assert_eq!(state.selected_chapter, "nowhere");
        assert!(!reduce(
            &mut state,
            Mutation::SetSelectedChapter("nowhere".into())
        ));
    }

    #[test]
    fn settings_upsert_and_remove() {
        let mut state = AppState::default();
        let set = |value| Mutation::SetSetting {
            key: "theme".into(),
            value,
        };

        assert!(reduce(&mut state, set(json!("dark"))));
        assert!(!reduce(&mut state, set(json!("dark"))));
        assert_eq!(state.settings["theme"], json!("dark"));

        assert!(reduce(&mut state, Mutation::RemoveSetting("theme".into())));
        assert!(!reduce(&mut state, Mutation::RemoveSetting("theme".into())));
    }

    #[test]
    fn reset_restores_default() {
        let mut state = AppState::default();
        apply(
            &mut state,
            vec![
                Mutation::SetUser(Some(User::new("u1", "Ada"))),
                Mutation::ToggleLikePost("p1".into()),
            ],
        );
        assert!(reduce(&mut state, Mutation::Reset));
        assert_eq!(state, AppState::default());
        assert!(!reduce(&mut state, Mutation::Reset));
    }

    #[test]
    fn slices_name_the_touched_field() {
        assert_eq!(
            Mutation::ToggleLikePost("p".into()).slices(),
            Slices::LIKED_POSTS
        );
        assert_eq!(Mutation::RemoveEvent("e".into()).slices(), Slices::EVENTS);
        assert!(Mutation::Reset.slices().contains(Slices::USER | Slices::POSTS));
    }

    #[test]
    fn summary_includes_ids() {
        let m = Mutation::SetRsvpStatus {
            event_id: "e1".into(),
            status: RsvpStatus::Going,
        };
        assert_eq!(m.summary(), "SetRsvpStatus e1 = going");
        assert_eq!(m.name(), "SetRsvpStatus");
        assert_eq!(
            Mutation::AddGroup(Record::new("g7")).summary(),
            "AddGroup g7"
        );
    }
}
