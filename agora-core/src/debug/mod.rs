//! Debug and inspection utilities
//!
//! - **Action logging**: pattern-filtered log of applied mutations and
//!   dispatched actions, kept in a bounded ring buffer
//! - **State inspection**: [`DebugState`] renders state as titled sections
//!
//! ```
//! use agora_core::debug::ActionLoggerConfig;
//!
//! // Log only toggles
//! let config = ActionLoggerConfig::new(Some("Toggle*"), None);
//! assert!(config.should_log("ToggleJoinGroup"));
//! assert!(!config.should_log("AddPost"));
//! ```

pub mod action_logger;
pub mod state;

pub use action_logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware,
};
pub use state::{DebugEntry, DebugSection, DebugState};
