//! Action logging with pattern-based filtering and in-memory storage
//!
//! Every mutation applied by the store and every action passed to
//! `dispatch` can be recorded here. Entries go to `tracing` and, when
//! storage is enabled, to a bounded ring buffer the application can inspect.
//!
//! # Example
//!
//! ```
//! use agora_core::debug::{ActionLogConfig, ActionLoggerMiddleware};
//!
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::with_capacity(10));
//! assert!(middleware.log().unwrap().is_empty());
//! ```

use crate::action::ActionSummary;
use crate::store::Middleware;
use std::collections::VecDeque;
use std::time::Instant;

/// Include/exclude filter over action names using glob patterns.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `Toggle*` matches ToggleLikePost, ToggleJoinGroup, ...
/// - `*Group` matches AddGroup, RemoveGroup, ToggleJoinGroup
/// - `Dispatch` matches only Dispatch
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Create a new config from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use agora_core::debug::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("Toggle*,Dispatch"), Some("ToggleFollowUser"));
    /// assert!(config.should_log("ToggleLikePost"));
    /// assert!(config.should_log("Dispatch"));
    /// assert!(!config.should_log("ToggleFollowUser"));
    /// assert!(!config.should_log("AddPost"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: split_patterns(include),
            exclude_patterns: split_patterns(exclude),
        }
    }

    /// Create a config with specific pattern vectors
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check if an action name should be logged based on include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

// ============================================================================
// In-Memory Action Log
// ============================================================================

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action name (from Action::name())
    pub name: &'static str,
    /// Summary representation (from ActionSummary::summary())
    pub summary: String,
    /// When the action was logged
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Whether the action changed state (set after the reducer runs)
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }

    /// Format the elapsed time for display (e.g., "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Configuration for the action log ring buffer
#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Ring buffer of recent actions
///
/// Older entries are discarded once capacity is reached. A capacity of zero
/// keeps nothing.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            // Grows on demand; capacity only bounds it
            entries: VecDeque::new(),
            config,
            next_sequence: 0,
        }
    }

    /// Log an action (if it passes the filter)
    ///
    /// Returns the entry if it was logged, None if filtered out.
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();

        if self.config.capacity == 0 || !self.config.filter.should_log(name) {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Update the last entry with state_changed info (called after reducer)
    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The most recent N entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn last(&self) -> Option<&ActionLogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that logs actions with configurable pattern filtering.
///
/// Supports two modes:
/// - **Tracing only**: logs via `tracing::debug!()`
/// - **With storage**: also keeps an [`ActionLog`] ring buffer
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    /// Whether the last action made it into the log (for state_changed updates)
    last_action_logged: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
        }
    }

    /// Tracing plus in-memory storage
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            last_action_logged: false,
        }
    }

    /// The action log, if storage is enabled
    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    /// Record an action that does not go through a reducer
    ///
    /// Logs it like `before` + `after` would, with the given change flag.
    pub fn record<A: ActionSummary>(&mut self, action: &A, state_changed: bool) {
        Middleware::<A>::before(self, action);
        Middleware::<A>::after(self, action, state_changed);
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, "action");
        }

        self.last_action_logged = false;
        if let Some(ref mut log) = self.log {
            if log.log(action).is_some() {
                self.last_action_logged = true;
            }
        }
    }

    fn after(&mut self, _action: &A, state_changed: bool) {
        // Only touch the entry this action produced
        if self.last_action_logged {
            if let Some(ref mut log) = self.log {
                log.update_last_state_changed(state_changed);
            }
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_impl(&pattern, &text)
}

fn glob_match_impl(pattern: &[char], text: &[char]) -> bool {
    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(spi) = star_pi {
            pi = spi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::Mutation;
    use crate::state::Record;

    fn open_log(capacity: usize) -> ActionLog {
        ActionLog::new(ActionLogConfig::new(capacity, ActionLoggerConfig::default()))
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("AddPost", "AddPost"));
        assert!(!glob_match("AddPost", "AddPosts"));
        assert!(glob_match("Toggle*", "ToggleLikePost"));
        assert!(glob_match("Toggle*", "Toggle"));
        assert!(!glob_match("Toggle*", "SetToggle"));
        assert!(glob_match("*Group", "ToggleJoinGroup"));
        assert!(glob_match("*Rsvp*", "SetRsvpStatus"));
        assert!(glob_match("Add????", "AddPost"));
        assert!(!glob_match("Add????", "AddGroup"));
        assert!(glob_match("Add?????", "AddGroup"));
    }

    #[test]
    fn test_config_include_and_exclude() {
        let config = ActionLoggerConfig::new(Some("*Group"), Some("Toggle*"));
        assert!(config.should_log("AddGroup"));
        assert!(config.should_log("RemoveGroup"));
        assert!(!config.should_log("ToggleJoinGroup"));
        assert!(!config.should_log("AddPost"));
    }

    #[test]
    fn test_default_config_logs_everything() {
        let config = ActionLoggerConfig::default();
        assert!(config.should_log("Dispatch"));
        assert!(config.should_log("Reset"));
    }

    #[test]
    fn test_empty_patterns_are_ignored() {
        let config = ActionLoggerConfig::new(Some(" , "), None);
        assert!(config.include_patterns.is_empty());
        assert!(config.should_log("AddPost"));
    }

    #[test]
    fn test_action_log_basic() {
        let mut log = ActionLog::default();
        assert!(log.is_empty());

        log.log(&Mutation::ToggleLikePost("p1".into()));
        assert_eq!(log.len(), 1);

        let entry = log.entries().next().unwrap();
        assert_eq!(entry.name, "ToggleLikePost");
        assert_eq!(entry.summary, "ToggleLikePost p1");
        assert_eq!(entry.sequence, 0);
    }

    #[test]
    fn test_action_log_capacity() {
        let mut log = open_log(3);
        for i in 0..4 {
            log.log(&Mutation::AddPost(Record::new(format!("p{}", i))));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().next().unwrap().sequence, 1);
        assert_eq!(log.last().unwrap().summary, "AddPost p3");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = open_log(0);
        assert!(log.log(&Mutation::Reset).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut log = open_log(usize::MAX);
        log.log(&Mutation::Reset);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_action_log_recent() {
        let mut log = open_log(10);
        for _ in 0..5 {
            log.log(&Mutation::Reset);
        }

        let recent: Vec<_> = log.recent(3).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![4, 3, 2]);
    }

    #[test]
    fn test_entry_elapsed_display() {
        let entry = ActionLogEntry::new("Reset", "Reset".to_string(), 0);
        let display = entry.elapsed_display();
        assert!(display.ends_with("ms") || display.ends_with('s'));
    }

    #[test]
    fn test_filtered_action_does_not_update_previous_entry() {
        let mut middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::new(
            10,
            ActionLoggerConfig::new(None, Some("Remove*")),
        ));

        middleware.before(&Mutation::AddGroup(Record::new("g1")));
        middleware.after(&Mutation::AddGroup(Record::new("g1")), true);

        middleware.record(&Mutation::RemoveGroup("g9".into()), false);

        let log = middleware.log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().state_changed, Some(true));
    }
}
