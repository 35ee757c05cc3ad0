//! View state, key mapping and rendering for the demo

use agora::debug::DebugState;
use agora::seed::CHAPTERS;
use agora::{AppState, AppStore, Record, StateRepository, ALL_CHAPTERS};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::action::UiAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Posts,
    Events,
    Groups,
    Log,
    Inspector,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Posts, Tab::Events, Tab::Groups, Tab::Log, Tab::Inspector];

    fn title(self) -> &'static str {
        match self {
            Tab::Posts => "Posts",
            Tab::Events => "Events",
            Tab::Groups => "Groups",
            Tab::Log => "Action log",
            Tab::Inspector => "State",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn offset(self, delta: isize) -> Tab {
        let len = Tab::ALL.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len);
        Tab::ALL[next as usize]
    }
}

/// View-only state; the app store holds everything else
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tab: Tab,
    pub cursor: usize,
}

pub fn reducer(state: &mut UiState, action: UiAction) -> bool {
    match action {
        UiAction::TabNext => {
            state.tab = state.tab.offset(1);
            state.cursor = 0;
            true
        }
        UiAction::TabPrev => {
            state.tab = state.tab.offset(-1);
            state.cursor = 0;
            true
        }
        UiAction::CursorNext => {
            state.cursor += 1;
            true
        }
        UiAction::CursorPrev => {
            let moved = state.cursor > 0;
            state.cursor = state.cursor.saturating_sub(1);
            moved
        }
        UiAction::ChapterNext | UiAction::StoreReset => {
            state.cursor = 0;
            true
        }
        UiAction::ItemToggle | UiAction::AuthorFollow | UiAction::Quit => false,
    }
}

pub fn map_key(key: KeyEvent) -> Option<UiAction> {
    let action = match key.code {
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => UiAction::TabNext,
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => UiAction::TabPrev,
        KeyCode::Down | KeyCode::Char('j') => UiAction::CursorNext,
        KeyCode::Up | KeyCode::Char('k') => UiAction::CursorPrev,
        KeyCode::Enter | KeyCode::Char(' ') => UiAction::ItemToggle,
        KeyCode::Char('f') => UiAction::AuthorFollow,
        KeyCode::Char('c') => UiAction::ChapterNext,
        KeyCode::Char('R') => UiAction::StoreReset,
        KeyCode::Char('q') | KeyCode::Esc => UiAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Chapter after `current` in the cycle all -> each seeded chapter -> all
pub fn next_chapter(current: &str) -> &'static str {
    let ids: Vec<&'static str> = std::iter::once(ALL_CHAPTERS)
        .chain(CHAPTERS.iter().map(|c| c.id))
        .collect();
    let at = ids.iter().position(|id| *id == current).unwrap_or(0);
    ids[(at + 1) % ids.len()]
}

fn rows<'a>(tab: Tab, state: &'a AppState) -> Vec<&'a Record> {
    match tab {
        Tab::Posts => state.visible_posts().collect(),
        Tab::Events => state.visible_events().collect(),
        Tab::Groups => state.visible_groups().collect(),
        Tab::Log | Tab::Inspector => Vec::new(),
    }
}

/// Record under the cursor, clamped to the visible rows
fn selected<'a>(ui: &UiState, state: &'a AppState) -> Option<&'a Record> {
    let rows = rows(ui.tab, state);
    if rows.is_empty() {
        return None;
    }
    Some(rows[ui.cursor.min(rows.len() - 1)])
}

/// Turn a store-facing UI action into store calls
pub fn apply_to_store<R: StateRepository>(
    action: &UiAction,
    ui: &UiState,
    store: &mut AppStore<R>,
) {
    let state = store.state();
    match action {
        UiAction::ItemToggle => match (ui.tab, selected(ui, &state)) {
            (Tab::Posts, Some(post)) => store.toggle_like_post(post.id.clone()),
            (Tab::Events, Some(event)) => {
                let next = state.rsvp_status(&event.id).next();
                store.set_rsvp_status(event.id.clone(), next);
            }
            (Tab::Groups, Some(group)) => store.toggle_join_group(group.id.clone()),
            _ => {}
        },
        UiAction::AuthorFollow => {
            if let Some(author) = selected(ui, &state).and_then(|p| p.str_field("author")) {
                store.toggle_follow_user(author);
            }
        }
        UiAction::ChapterNext => store.set_selected_chapter(next_chapter(&state.selected_chapter)),
        UiAction::StoreReset => store.reset(),
        _ => {}
    }
}

fn record_line<'a>(tab: Tab, record: &'a Record, state: &AppState) -> Line<'a> {
    let marker = match tab {
        Tab::Posts if state.is_liked(&record.id) => "[liked]".to_string(),
        Tab::Events => format!("[{}]", state.rsvp_status(&record.id)),
        Tab::Groups if state.is_member(&record.id) => "[member]".to_string(),
        _ => String::new(),
    };
    let mut spans = vec![Span::raw(record.label())];
    if let Some(kind) = record.str_field("kind") {
        spans.push(Span::styled(format!("  ({})", kind), Style::default().fg(Color::DarkGray)));
    }
    if let Some(author) = record.str_field("author") {
        let following = if state.is_following(author) { " *" } else { "" };
        spans.push(Span::styled(
            format!("  by {}{}", author, following),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !marker.is_empty() {
        spans.push(Span::styled(format!("  {}", marker), Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

pub fn render<R: StateRepository>(frame: &mut Frame, ui: &UiState, store: &AppStore<R>) {
    let state = store.state();
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let user = state.user.as_ref().map(|u| u.name.as_str()).unwrap_or("guest");
    let title = format!(
        " agora - {} - chapter: {} - v{} ",
        user,
        state.selected_chapter,
        store.version()
    );
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(ui.tab.index())
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, header);

    match ui.tab {
        Tab::Posts | Tab::Events | Tab::Groups => {
            let rows = rows(ui.tab, &state);
            let items: Vec<ListItem> = rows
                .iter()
                .map(|r| ListItem::new(record_line(ui.tab, r, &state)))
                .collect();
            let mut list_state = ListState::default();
            if !rows.is_empty() {
                list_state.select(Some(ui.cursor.min(rows.len() - 1)));
            }
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, body, &mut list_state);
        }
        Tab::Log => {
            let lines: Vec<Line> = store
                .action_log()
                .map(|log| {
                    log.recent(body.height as usize)
                        .map(|e| {
                            let changed = match e.state_changed {
                                Some(true) => "changed",
                                Some(false) => "unchanged",
                                None => "",
                            };
                            Line::from(format!(
                                "#{:<4} {:>7}  {}  {}",
                                e.sequence,
                                e.elapsed_display(),
                                e.summary,
                                changed
                            ))
                        })
                        .collect()
                })
                .unwrap_or_default();
            let log = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
            frame.render_widget(log, body);
        }
        Tab::Inspector => {
            let text = state.debug_text();
            let inspector = Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(inspector, body);
        }
    }

    let mut help = String::from(
        "tab/h/l: switch  j/k: move  enter: like/rsvp/join  f: follow  c: chapter  R: reset  q: quit",
    );
    if store.persist_failures() > 0 {
        help.push_str(&format!("  ({} unsaved)", store.persist_failures()));
    }
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}
