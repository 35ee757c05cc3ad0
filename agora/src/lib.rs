//! agora: a persisted, observable application store for community apps
//!
//! One [`AppStore`] owns the session state (selected chapter, likes, RSVPs,
//! memberships, follows and entity collections). Consumers read immutable
//! snapshots, call discrete mutation methods, and every mutation is saved
//! through a [`StateRepository`] before the call returns.
//!
//! # Example
//! ```
//! use agora::prelude::*;
//!
//! let mut store = AppStore::new(MemoryRepository::new());
//! store.toggle_like_post("p1");
//! store.toggle_like_post("p1");
//! assert!(store.state().liked_posts.is_empty());
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum FeedAction {
//!     FeedPostLike(String),
//!     Quit,
//! }
//!
//! assert_eq!(FeedAction::FeedPostLike("p1".into()).category(), Some("feed_post"));
//! assert_eq!(FeedAction::Quit.name(), "Quit");
//! ```

// Re-export everything from core
pub use agora_core::*;

// Re-export derive macros
pub use agora_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use agora_core::prelude::*;

    // Derive macros
    pub use agora_macros::Action;
}
