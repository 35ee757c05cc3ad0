//! Tagged actions accepted by [`AppStore::dispatch`](crate::AppStore::dispatch)
//!
//! `dispatch` is an extension point: it accepts any tagged action but no tag
//! has a state transition yet. Every action currently lands in
//! [`AppAction::Unhandled`], is recorded in the action log and reported as
//! [`DispatchOutcome::NotHandled`]. Giving a tag real behavior means adding a
//! variant here, a parse arm in [`AppAction::from_raw`] and a match arm in
//! the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{Action, ActionSummary};
use crate::error::{Result, StoreError};

/// Wire form of a tagged action: `{ "type": "...", "payload": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// A tag with no transition yet. Kept intact so it can be logged.
    Unhandled { kind: String, payload: Value },
}

impl AppAction {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self::from_raw(RawAction {
            kind: kind.into(),
            payload,
        })
    }

    pub fn from_raw(raw: RawAction) -> Self {
        AppAction::Unhandled {
            kind: raw.kind,
            payload: raw.payload,
        }
    }

    /// Parse `{ "type": ..., "payload": ... }`
    pub fn from_json(raw: &str) -> Result<Self> {
        let raw: RawAction = serde_json::from_str(raw).map_err(StoreError::Decode)?;
        Ok(Self::from_raw(raw))
    }

    /// The action's tag
    pub fn kind(&self) -> &str {
        match self {
            AppAction::Unhandled { kind, .. } => kind,
        }
    }
}

impl Action for AppAction {
    fn name(&self) -> &'static str {
        match self {
            AppAction::Unhandled { .. } => "Dispatch",
        }
    }
}

impl ActionSummary for AppAction {
    fn summary(&self) -> String {
        match self {
            AppAction::Unhandled { kind, payload } if payload.is_null() => {
                format!("Dispatch {} (not handled)", kind)
            }
            AppAction::Unhandled { kind, payload } => {
                format!("Dispatch {} {} (not handled)", kind, payload)
            }
        }
    }
}

/// What `dispatch` did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A transition ran; `changed` says whether state differs
    Handled { changed: bool },
    /// No transition exists for this action; state is untouched
    NotHandled,
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tag_and_payload() {
        let action = AppAction::from_json(r#"{"type":"vote","payload":{"pollId":"q1"}}"#).unwrap();
        assert_eq!(action.kind(), "vote");
        assert_eq!(
            action,
            AppAction::Unhandled {
                kind: "vote".into(),
                payload: json!({ "pollId": "q1" }),
            }
        );
    }

    #[test]
    fn payload_is_optional() {
        let action = AppAction::from_json(r#"{"type":"refresh"}"#).unwrap();
        assert_eq!(action.summary(), "Dispatch refresh (not handled)");
    }

    #[test]
    fn missing_tag_is_a_decode_error() {
        let err = AppAction::from_json(r#"{"payload":1}"#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn summary_carries_payload() {
        let action = AppAction::new("badge.award", json!("gold"));
        assert_eq!(action.name(), "Dispatch");
        assert_eq!(action.summary(), "Dispatch badge.award \"gold\" (not handled)");
    }
}
