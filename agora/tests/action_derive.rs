//! Tests for #[derive(Action)]

#![allow(dead_code)]

use agora::testing::TestHarness;
use agora::{Action, ActionCategory};

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories, generate_dispatcher)]
enum FeedAction {
    FeedPostLike(String),
    FeedPostRemove { id: String },
    FeedNext,
    ChapterSelect(String),
    ChapterNext,
    EventRsvpCycle(String),
    DidLoadFeed,
    #[action(category = "chapter")]
    ShowAllChapters,
    #[action(skip_category)]
    InspectorShow,
    Quit,
}

#[test]
fn test_names() {
    assert_eq!(FeedAction::FeedPostLike("p".into()).name(), "FeedPostLike");
    assert_eq!(
        FeedAction::FeedPostRemove { id: "p".into() }.name(),
        "FeedPostRemove"
    );
    assert_eq!(FeedAction::Quit.name(), "Quit");
}

#[test]
fn test_inferred_categories() {
    assert_eq!(
        FeedAction::FeedPostLike("p".into()).category(),
        Some("feed_post")
    );
    assert_eq!(FeedAction::FeedNext.category(), Some("feed"));
    assert_eq!(FeedAction::ChapterNext.category(), Some("chapter"));
    assert_eq!(
        FeedAction::EventRsvpCycle("e".into()).category(),
        Some("event")
    );
    assert_eq!(FeedAction::DidLoadFeed.category(), Some("async_result"));
    assert_eq!(FeedAction::Quit.category(), None);
}

#[test]
fn test_category_overrides() {
    assert_eq!(FeedAction::ShowAllChapters.category(), Some("chapter"));
    assert!(FeedAction::ShowAllChapters.is_chapter());
    assert_eq!(FeedAction::InspectorShow.category(), None);
    assert_eq!(
        FeedAction::InspectorShow.category_enum(),
        FeedActionCategory::Uncategorized
    );
}

#[test]
fn test_category_enum() {
    assert_eq!(
        FeedAction::ChapterSelect("x".into()).category_enum(),
        FeedActionCategory::Chapter
    );
    assert_eq!(FeedActionCategory::FeedPost.name(), "feed_post");

    let names: Vec<_> = FeedActionCategory::all().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec![
            "async_result",
            "chapter",
            "event",
            "feed",
            "feed_post",
            "uncategorized"
        ]
    );
}

#[test]
fn test_action_category_trait() {
    fn category_of<A: ActionCategory>(action: &A) -> Option<&'static str> {
        ActionCategory::category(action)
    }
    assert_eq!(category_of(&FeedAction::FeedNext), Some("feed"));
}

#[derive(Default)]
struct Counter {
    feed: usize,
    other: usize,
}

impl FeedActionDispatcher for Counter {
    fn dispatch_feed(&mut self, _action: &FeedAction) -> bool {
        self.feed += 1;
        true
    }

    fn dispatch_uncategorized(&mut self, _action: &FeedAction) -> bool {
        self.other += 1;
        false
    }
}

#[test]
fn test_dispatcher_routes_by_category() {
    let mut counter = Counter::default();
    assert!(counter.dispatch(&FeedAction::FeedNext));
    assert!(!counter.dispatch(&FeedAction::Quit));
    assert!(!counter.dispatch(&FeedAction::ChapterNext));

    assert_eq!(counter.feed, 1);
    assert_eq!(counter.other, 1);
}

#[test]
fn test_harness_drains_by_category() {
    let mut harness = TestHarness::<(), FeedAction>::new(());
    harness.emit(FeedAction::ChapterNext);
    harness.emit(FeedAction::FeedNext);
    harness.emit(FeedAction::ChapterSelect("berlin".into()));

    let chapter = harness.drain_category("chapter");
    assert_eq!(chapter.len(), 2);

    let rest = harness.drain_emitted();
    agora::assert_emitted!(rest, FeedAction::FeedNext);
    agora::assert_not_emitted!(rest, FeedAction::ChapterNext);
}
