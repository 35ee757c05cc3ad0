//! Action traits for type-safe state mutations

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: So they can cross a channel from an input task
///
/// Use `#[derive(Action)]` from `agora-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Category information for actions, generated by `#[action(infer_categories)]`
pub trait ActionCategory: Action {
    /// Enum of every category the action type knows about
    type Category: Copy + Eq + Hash + Debug;

    /// Category name, or `None` for uncategorized actions
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value
    fn category_enum(&self) -> Self::Category;
}

/// One-line description of an action for the action log
///
/// The default uses the `Debug` representation.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
