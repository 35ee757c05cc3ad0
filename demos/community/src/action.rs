use agora::Action;

/// What a key press can mean in the demo
#[derive(Action, Clone, Debug, PartialEq, Eq)]
#[action(infer_categories)]
pub enum UiAction {
    TabNext,
    TabPrev,
    CursorNext,
    CursorPrev,
    /// Like a post, cycle an RSVP or join/leave a group, depending on the tab
    ItemToggle,
    /// Follow/unfollow the author of the selected post
    AuthorFollow,
    ChapterNext,
    StoreReset,
    Quit,
}

impl UiAction {
    /// Whether the action changes the app store rather than only the view
    pub fn touches_store(&self) -> bool {
        matches!(
            self,
            UiAction::ItemToggle
                | UiAction::AuthorFollow
                | UiAction::ChapterNext
                | UiAction::StoreReset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(UiAction::TabNext.category(), Some("tab"));
        assert_eq!(UiAction::CursorPrev.category(), Some("cursor"));
        assert_eq!(UiAction::ChapterNext.category(), Some("chapter"));
        assert_eq!(UiAction::StoreReset.category(), Some("store"));
        assert_eq!(UiAction::Quit.category(), None);
    }

    #[test]
    fn store_actions() {
        assert!(UiAction::ItemToggle.touches_store());
        assert!(!UiAction::CursorNext.touches_store());
    }
}
