//! Deterministic mock catalog for demos and tests
//!
//! Records carry a `chapter` field so chapter filtering has something to
//! match. Groups use `kind` to tell top-level groups, rings and families
//! apart.

use serde_json::json;

use crate::state::{AppState, Record, User};

/// A locale the app can filter by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapter {
    pub id: &'static str,
    pub name: &'static str,
}

pub const CHAPTERS: &[Chapter] = &[
    Chapter {
        id: "lisbon",
        name: "Lisbon",
    },
    Chapter {
        id: "berlin",
        name: "Berlin",
    },
    Chapter {
        id: "nairobi",
        name: "Nairobi",
    },
];

pub fn chapter(id: &str) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.id == id)
}

pub fn demo_user() -> User {
    let mut user = User::new("u-ada", "Ada Ferreira");
    user.extra.insert("chapter".into(), json!("lisbon"));
    user.extra.insert("badges".into(), json!(["early-bird", "host"]));
    user
}

pub fn groups() -> Vec<Record> {
    vec![
        Record::new("g-cyclists")
            .with("name", "Lisbon Cyclists")
            .with("kind", "group")
            .with("chapter", "lisbon")
            .with("members", 128),
        Record::new("g-ring-sunrise")
            .with("name", "Sunrise Ring")
            .with("kind", "ring")
            .with("parent", "g-cyclists")
            .with("chapter", "lisbon")
            .with("members", 9),
        Record::new("g-makers")
            .with("name", "Kreuzberg Makers")
            .with("kind", "group")
            .with("chapter", "berlin")
            .with("members", 64),
        Record::new("g-family-okafor")
            .with("name", "Okafor Family")
            .with("kind", "family")
            .with("chapter", "nairobi")
            .with("members", 6),
    ]
}

pub fn events() -> Vec<Record> {
    vec![
        Record::new("e-coast-ride")
            .with("title", "Coastal ride to Cascais")
            .with("chapter", "lisbon")
            .with("group", "g-cyclists")
            .with("startsAt", "2026-11-07T08:00:00Z"),
        Record::new("e-repair-cafe")
            .with("title", "Repair cafe")
            .with("chapter", "berlin")
            .with("group", "g-makers")
            .with("startsAt", "2026-11-12T17:30:00Z"),
        Record::new("e-market-day")
            .with("title", "Community market day")
            .with("chapter", "nairobi")
            .with("startsAt", "2026-11-21T09:00:00Z"),
    ]
}

pub fn posts() -> Vec<Record> {
    vec![
        Record::new("p-welcome")
            .with("title", "Welcome to the Lisbon chapter")
            .with("author", "u-ada")
            .with("chapter", "lisbon")
            .with("votes", 14),
        Record::new("p-lights")
            .with("title", "Looking for spare bike lights")
            .with("author", "u-rui")
            .with("chapter", "lisbon")
            .with("marketplace", true)
            .with("votes", 3),
        Record::new("p-soldering")
            .with("title", "Soldering workshop recap")
            .with("author", "u-lena")
            .with("chapter", "berlin")
            .with("votes", 22),
        Record::new("p-harvest")
            .with("title", "Harvest share sign-ups open")
            .with("author", "u-amani")
            .with("chapter", "nairobi")
            .with("votes", 9),
    ]
}

pub fn notifications() -> Vec<Record> {
    vec![
        Record::new("n-1")
            .with("text", "Rui replied to your post")
            .with("read", false),
        Record::new("n-2")
            .with("text", "You earned the host badge")
            .with("read", true),
    ]
}

/// A state populated with the whole catalog and the demo user signed in
pub fn demo_state() -> AppState {
    AppState {
        user: Some(demo_user()),
        groups: groups(),
        events: events(),
        posts: posts(),
        notifications: notifications(),
        ..AppState::default()
    }
}
