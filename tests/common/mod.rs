//! Common test utilities and fixtures

#![allow(dead_code)]

use forum_thread_filter::config::QuickFilterConfig;
use forum_thread_filter::models::{PageKind, PageSnapshot, ScrapedRow, Thread, ThreadId};
use forum_thread_filter::ordering::Placement;
use forum_thread_filter::preferences::StylePreferences;
use forum_thread_filter::presentation::Presenter;
use forum_thread_filter::session::ThreadFilter;
use forum_thread_filter::state::{FilterState, StateStore};
use forum_thread_filter::store::{KeyValueStore, MemoryStore};

pub const MODULE_ID: &str = "FilterThreads";

/// Create an unread row with default values
pub fn create_test_row(id: ThreadId, title: &str, creator: &str) -> ScrapedRow {
    ScrapedRow {
        id: Some(id),
        href: Some(format!("showthread.php?t={}", id)),
        title: Some(title.to_string()),
        creator: creator.to_string(),
        unread: true,
    }
}

/// Create a row without the "new posts" indicator
pub fn create_read_row(id: ThreadId, title: &str, creator: &str) -> ScrapedRow {
    let mut row = create_test_row(id, title, creator);
    row.unread = false;
    row
}

/// Create a row whose id only appears in the thread link
pub fn create_href_row(href: &str, title: &str) -> ScrapedRow {
    ScrapedRow {
        id: None,
        href: Some(href.to_string()),
        title: Some(title.to_string()),
        creator: "someone".to_string(),
        unread: true,
    }
}

pub fn forum_page(rows: Vec<ScrapedRow>) -> PageSnapshot {
    PageSnapshot {
        page: PageKind::ForumDisplay,
        rows,
        separator_index: None,
    }
}

pub fn search_page(rows: Vec<ScrapedRow>) -> PageSnapshot {
    PageSnapshot {
        page: PageKind::Search,
        rows,
        separator_index: None,
    }
}

/// Memory store seeded with namespaced keys, values given as stored JSON
pub fn seeded_store(seed: &[(&str, &str)]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for (key, value) in seed {
        store.set_value(&format!("{}.{}", MODULE_ID, key), value);
    }
    store
}

pub fn create_session(seed: &[(&str, &str)]) -> ThreadFilter<MemoryStore, RecordingPresenter> {
    let state = FilterState::load(StateStore::new(seeded_store(seed), MODULE_ID), None);
    ThreadFilter::new(state, RecordingPresenter::default(), &QuickFilterConfig::default())
}

/// Presentation callback, as recorded by [`RecordingPresenter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Styles(StylePreferences),
    Render(ThreadId),
    Place(ThreadId, Placement),
    MoveToHidden(ThreadId),
    HiddenCount(usize),
    HighlightWarning,
    Alert(String),
    Visible(ThreadId, bool),
    Title(ThreadId, String),
    FadeOut(ThreadId),
    FadeIn(ThreadId),
}

/// Presenter that records every callback and the last rendered state
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<Event>,
    pub rendered: Vec<Thread>,
}

impl RecordingPresenter {
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    pub fn alerts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Alert(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_hidden_count(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|e| match e {
            Event::HiddenCount(n) => Some(*n),
            _ => None,
        })
    }

    pub fn last_render(&self, id: ThreadId) -> Option<&Thread> {
        self.rendered.iter().rev().find(|t| t.id == id)
    }
}

impl Presenter for RecordingPresenter {
    fn apply_styles(&mut self, styles: &StylePreferences) {
        self.events.push(Event::Styles(styles.clone()));
    }

    fn render_thread(&mut self, thread: &Thread) {
        self.events.push(Event::Render(thread.id));
        self.rendered.push(thread.clone());
    }

    fn place_row(&mut self, id: ThreadId, placement: Placement) {
        self.events.push(Event::Place(id, placement));
    }

    fn move_to_hidden(&mut self, id: ThreadId) {
        self.events.push(Event::MoveToHidden(id));
    }

    fn update_hidden_count(&mut self, count: usize) {
        self.events.push(Event::HiddenCount(count));
    }

    fn warn_highlight_suppressed(&mut self) {
        self.events.push(Event::HighlightWarning);
    }

    fn alert(&mut self, message: &str) {
        self.events.push(Event::Alert(message.to_string()));
    }

    fn set_visible(&mut self, id: ThreadId, visible: bool) {
        self.events.push(Event::Visible(id, visible));
    }

    fn set_title(&mut self, id: ThreadId, markup: &str) {
        self.events.push(Event::Title(id, markup.to_string()));
    }

    fn fade_out(&mut self, id: ThreadId) {
        self.events.push(Event::FadeOut(id));
    }

    fn fade_in(&mut self, id: ThreadId) {
        self.events.push(Event::FadeIn(id));
    }
}
