//! Application state and its persisted JSON shape

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// Chapter id meaning "no filter"
pub const ALL_CHAPTERS: &str = "all";

/// Attendance intention for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Going,
    Maybe,
    #[default]
    None,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Going => "going",
            RsvpStatus::Maybe => "maybe",
            RsvpStatus::None => "none",
        }
    }

    /// Cycle none -> going -> maybe -> none
    pub fn next(self) -> Self {
        match self {
            RsvpStatus::None => RsvpStatus::Going,
            RsvpStatus::Going => RsvpStatus::Maybe,
            RsvpStatus::Maybe => RsvpStatus::None,
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loosely-typed entity (group, event, post, notification) keyed by `id`
///
/// Everything except the id is kept as raw JSON so the store never has to
/// know the entity schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field, if present and a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// `title` or `name`, falling back to the id
    pub fn label(&self) -> &str {
        self.str_field("title")
            .or_else(|| self.str_field("name"))
            .unwrap_or(self.id.as_str())
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Session-scoped UI state
///
/// Serialized as one camelCase JSON document. Missing keys take their
/// defaults, so documents written with fewer keys still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub user: Option<User>,
    pub groups: Vec<Record>,
    pub events: Vec<Record>,
    pub posts: Vec<Record>,
    pub notifications: Vec<Record>,
    pub settings: Map<String, Value>,
    pub selected_chapter: String,
    pub liked_posts: Vec<String>,
    pub rsvp_statuses: BTreeMap<String, RsvpStatus>,
    pub joined_groups: Vec<String>,
    pub followed_users: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            groups: Vec::new(),
            events: Vec::new(),
            posts: Vec::new(),
            notifications: Vec::new(),
            settings: Map::new(),
            selected_chapter: ALL_CHAPTERS.to_string(),
            liked_posts: Vec::new(),
            rsvp_statuses: BTreeMap::new(),
            joined_groups: Vec::new(),
            followed_users: Vec::new(),
        }
    }
}

impl AppState {
    /// Parse a persisted document
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(StoreError::Decode)
    }

    /// Serialize to the persisted document form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(StoreError::Encode)
    }

    pub fn is_liked(&self, post_id: &str) -> bool {
        self.liked_posts.iter().any(|id| id == post_id)
    }

    pub fn is_member(&self, group_id: &str) -> bool {
        self.joined_groups.iter().any(|id| id == group_id)
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.followed_users.iter().any(|id| id == user_id)
    }

    /// RSVP for an event; events never answered read as `None`
    pub fn rsvp_status(&self, event_id: &str) -> RsvpStatus {
        self.rsvp_statuses
            .get(event_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_chapter_filter(&self) -> bool {
        self.selected_chapter != ALL_CHAPTERS
    }

    /// Posts visible under the selected chapter
    pub fn visible_posts(&self) -> impl Iterator<Item = &Record> {
        in_chapter(&self.posts, &self.selected_chapter)
    }

    /// Events visible under the selected chapter
    pub fn visible_events(&self) -> impl Iterator<Item = &Record> {
        in_chapter(&self.events, &self.selected_chapter)
    }

    /// Groups visible under the selected chapter
    pub fn visible_groups(&self) -> impl Iterator<Item = &Record> {
        in_chapter(&self.groups, &self.selected_chapter)
    }
}

/// Records whose `chapter` field equals `chapter`, or all of them for
/// [`ALL_CHAPTERS`]
pub fn in_chapter<'a>(
    records: &'a [Record],
    chapter: &'a str,
) -> impl Iterator<Item = &'a Record> + 'a {
    records
        .iter()
        .filter(move |r| chapter == ALL_CHAPTERS || r.str_field("chapter") == Some(chapter))
}
