//! State introspection for inspectors and diagnostics

use crate::state::{AppState, Record};

/// A debug entry (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    pub key: String,
    pub value: String,
}

impl DebugEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A debug section with a title and entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSection {
    pub title: String,
    pub entries: Vec<DebugEntry>,
}

impl DebugSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry to the section
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(DebugEntry::new(key, value));
        self
    }

    pub fn push_entry(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(DebugEntry::new(key, value));
    }

    /// Look up an entry value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

/// Types that can describe themselves as titled key/value sections
///
/// # Example
///
/// ```
/// use agora_core::debug::{DebugSection, DebugState};
///
/// struct Poll {
///     question: String,
///     votes: usize,
/// }
///
/// impl DebugState for Poll {
///     fn debug_sections(&self) -> Vec<DebugSection> {
///         vec![DebugSection::new("Poll")
///             .entry("question", &self.question)
///             .entry("votes", self.votes.to_string())]
///     }
/// }
///
/// let poll = Poll { question: "Picnic?".into(), votes: 3 };
/// assert_eq!(poll.debug_sections()[0].get("votes"), Some("3"));
/// ```
pub trait DebugState {
    fn debug_sections(&self) -> Vec<DebugSection>;

    /// Render all sections as indented plain text
    fn debug_text(&self) -> String {
        let mut out = String::new();
        for section in self.debug_sections() {
            out.push_str(&section.title);
            out.push('\n');
            for entry in section.entries {
                out.push_str(&format!("  {}: {}\n", entry.key, entry.value));
            }
        }
        out
    }
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = ids.into_iter().collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

fn record_ids(records: &[Record]) -> String {
    join_ids(records.iter().map(|r| r.id.as_str()))
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let session = DebugSection::new("Session")
            .entry(
                "user",
                self.user
                    .as_ref()
                    .map(|u| format!("{} ({})", u.name, u.id))
                    .unwrap_or_else(|| "-".to_string()),
            )
            .entry("selected_chapter", &self.selected_chapter);

        let activity = DebugSection::new("Activity")
            .entry("liked_posts", join_ids(self.liked_posts.iter().map(String::as_str)))
            .entry(
                "joined_groups",
                join_ids(self.joined_groups.iter().map(String::as_str)),
            )
            .entry(
                "followed_users",
                join_ids(self.followed_users.iter().map(String::as_str)),
            )
            .entry(
                "rsvp_statuses",
                if self.rsvp_statuses.is_empty() {
                    "-".to_string()
                } else {
                    self.rsvp_statuses
                        .iter()
                        .map(|(event, status)| format!("{}={}", event, status))
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            );

        let collections = DebugSection::new("Collections")
            .entry("groups", record_ids(&self.groups))
            .entry("events", record_ids(&self.events))
            .entry("posts", record_ids(&self.posts))
            .entry("notifications", record_ids(&self.notifications));

        let mut settings = DebugSection::new("Settings");
        for (key, value) in &self.settings {
            settings.push_entry(key, value.to_string());
        }

        vec![session, activity, collections, settings]
    }
}
