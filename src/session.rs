//! One page view of the thread filter
//!
//! [`ThreadFilter`] owns the working sets, the scanned threads and the list
//! order for the lifetime of a page. The presentation layer forwards user
//! commands here and receives rendering callbacks through [`Presenter`].

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::classifier::{RuleSet, ThreadClassifier};
use crate::config::QuickFilterConfig;
use crate::error::{FilterError, Result};
use crate::models::{PageKind, PageSnapshot, Thread, ThreadId, ThreadStatus};
use crate::ordering::{ListOrderer, Partition};
use crate::preferences::{FilterPreferences, HIDDEN_READ_THREADS};
use crate::presentation::Presenter;
use crate::quick_filter::{FilterKey, KeyOutcome, QuickFilter};
use crate::state::FilterState;
use crate::store::KeyValueStore;

/// Counts from a page load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub threads: usize,
    pub favorites: usize,
    pub hidden: usize,
    pub highlighted: usize,
    pub read: usize,
    pub skipped_rows: usize,
    pub disabled_rules: usize,
}

/// Toggles the thread menu offers for a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuActions {
    /// Favorite toggle is offered; `is_favorite` is its current state
    pub can_favorite: bool,
    pub is_favorite: bool,
    /// Hide/show toggle is offered; `is_hidden` is its current state
    pub can_hide: bool,
    pub is_hidden: bool,
}

pub struct ThreadFilter<S: KeyValueStore, P: Presenter> {
    page: PageKind,
    state: FilterState<S>,
    preferences: FilterPreferences,
    classifier: ThreadClassifier,
    orderer: ListOrderer,
    threads: Vec<Thread>,
    index: HashMap<ThreadId, usize>,
    quick_filter: QuickFilter,
    presenter: P,
    highlight_warning_sent: bool,
}

impl<S: KeyValueStore, P: Presenter> ThreadFilter<S, P> {
    pub fn new(state: FilterState<S>, presenter: P, quick_filter: &QuickFilterConfig) -> Self {
        let preferences = FilterPreferences::load(state.store());
        let orderer = ListOrderer::new(preferences.favorites_top, preferences.highlighted_top);
        let classifier = ThreadClassifier::new(
            PageKind::ForumDisplay,
            RuleSet::default(),
            preferences.hide_read_threads,
        );

        Self {
            page: PageKind::ForumDisplay,
            state,
            preferences,
            classifier,
            orderer,
            threads: Vec::new(),
            index: HashMap::new(),
            quick_filter: QuickFilter::new(quick_filter.debounce(), quick_filter.min_query_len),
            presenter,
            highlight_warning_sent: false,
        }
    }

    /// Scan and classify the rows of a page.
    ///
    /// Rules that fail to compile are disabled with one alert each; rows
    /// without an id or title are skipped.
    pub fn load(&mut self, snapshot: &PageSnapshot) -> LoadSummary {
        let mut summary = LoadSummary::default();
        self.page = snapshot.page;
        self.state.reset_page();
        self.threads.clear();
        self.index.clear();
        self.orderer = ListOrderer::new(self.preferences.favorites_top, self.preferences.highlighted_top);
        self.highlight_warning_sent = false;
        self.presenter.apply_styles(&self.preferences.styles());

        if !self.page.is_list() {
            debug!("{:?} has no thread list", self.page);
            return summary;
        }
        self.presenter.update_hidden_count(0);

        let (rules, errors) = RuleSet::compile(&self.preferences);
        summary.disabled_rules = errors.len();
        for error in &errors {
            self.presenter.alert(&format!(
                "{}. Check the expression entered in the preferences.",
                error
            ));
        }
        self.classifier = ThreadClassifier::new(self.page, rules, self.preferences.hide_read_threads);

        for (row_index, row) in snapshot.rows.iter().enumerate() {
            if snapshot.separator_index == Some(row_index) {
                self.orderer.push_separator();
            }
            match Thread::from_row(row, row_index) {
                Ok(thread) if self.index.contains_key(&thread.id) => {
                    warn!("Skipping duplicate row for thread {}", thread.id);
                    summary.skipped_rows += 1;
                }
                Ok(thread) => {
                    self.orderer.push_thread(thread.id);
                    self.index.insert(thread.id, self.threads.len());
                    self.threads.push(thread);
                }
                Err(e) => {
                    warn!("Skipping row {}: {}", row_index, e);
                    summary.skipped_rows += 1;
                }
            }
        }

        for i in 0..self.threads.len() {
            self.process_thread(i);

            let thread = &self.threads[i];
            match thread.status() {
                ThreadStatus::Favorite => summary.favorites += 1,
                ThreadStatus::Hidden(_) => summary.hidden += 1,
                ThreadStatus::Plain => {}
            }
            if thread.is_highlighted {
                summary.highlighted += 1;
            }
            if thread.is_read {
                summary.read += 1;
            }
        }
        summary.threads = self.threads.len();

        info!(
            "Classified {} threads on {:?}: favorites={}, hidden={}, highlighted={}, read={}, skipped={}",
            summary.threads,
            self.page,
            summary.favorites,
            summary.hidden,
            summary.highlighted,
            summary.read,
            summary.skipped_rows
        );
        summary
    }

    fn process_thread(&mut self, i: usize) {
        let result = self.classifier.classify(&self.threads[i], &self.state);
        ThreadClassifier::apply(&mut self.threads[i], &result);
        let id = self.threads[i].id;

        if result.is_hidden() {
            self.orderer.move_to_hidden(id);
            let count = self.state.increment_hidden_count();
            self.presenter.move_to_hidden(id);
            self.presenter.update_hidden_count(count);
        } else if self.page == PageKind::ForumDisplay {
            let partition = self.orderer.target_partition(&self.threads[i]);
            if let Some(placement) = self.orderer.place(id, partition) {
                self.presenter.place_row(id, placement);
            }
        }

        if result.is_read {
            self.state.mark_read(id);
        }

        self.presenter.render_thread(&self.threads[i]);
        if result.suppress {
            self.presenter.set_visible(id, false);
        }

        if result.highlight_suppressed && !self.highlight_warning_sent {
            self.highlight_warning_sent = true;
            self.presenter.warn_highlight_suppressed();
        }
    }

    fn position(&self, id: ThreadId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(FilterError::UnknownThread(id))
    }

    /// Flip a listed thread's favorite status. Returns the new status.
    pub fn toggle_favorite(&mut self, id: ThreadId) -> Result<bool> {
        let i = self.position(id)?;
        if self.threads[i].is_hidden {
            return Err(FilterError::InvalidTransition(format!(
                "thread {} is hidden and cannot be marked as favorite",
                id
            )));
        }

        let now_favorite = self.state.toggle_favorite(id);
        let thread = &mut self.threads[i];
        thread.is_favorite = now_favorite;
        if !now_favorite && self.orderer.partition_of(id) == Some(Partition::Favorite) {
            self.orderer.demote(id);
        }

        self.presenter.render_thread(&self.threads[i]);
        debug!("Thread {} favorite={}", id, now_favorite);
        Ok(now_favorite)
    }

    /// Hide a listed thread, or show it again. Returns whether it is hidden now.
    ///
    /// Hiding a favorite drops its favorite status; showing a thread again
    /// appends it to the end of the list and does not restore it.
    pub fn toggle_hidden(&mut self, id: ThreadId) -> Result<bool> {
        if self.page != PageKind::ForumDisplay {
            return Err(FilterError::InvalidTransition(format!(
                "threads cannot be hidden on {:?} pages",
                self.page
            )));
        }
        let i = self.position(id)?;

        self.presenter.fade_out(id);

        let now_hidden = if !self.threads[i].is_hidden {
            self.state.add_hidden(id);
            self.state.unmark_read(id);

            let thread = &mut self.threads[i];
            thread.is_hidden = true;
            thread.is_favorite = false;
            thread.is_read = false;
            thread.is_suppressed = false;

            self.orderer.move_to_hidden(id);
            let count = self.state.increment_hidden_count();
            self.presenter.move_to_hidden(id);
            self.presenter.update_hidden_count(count);
            true
        } else {
            self.state.remove_hidden(id);

            let hide_read = self.preferences.hide_read_threads;
            let thread = &mut self.threads[i];
            thread.is_hidden = false;
            thread.is_hidden_by_user = false;
            thread.is_hidden_by_keywords = false;
            thread.creator_markup = None;
            if !thread.unread {
                thread.is_read = true;
                thread.is_suppressed = hide_read;
                self.state.mark_read(id);
            }

            let placement = self.orderer.restore(id);
            let count = self.state.decrement_hidden_count();
            self.presenter.place_row(id, placement);
            self.presenter.update_hidden_count(count);
            self.quick_filter.refresh(&mut self.threads[i], &mut self.presenter)?;
            false
        };

        let thread = &self.threads[i];
        self.presenter.render_thread(thread);
        self.presenter.set_visible(id, thread.is_visible());
        self.presenter.fade_in(id);

        debug!("Thread {} hidden={}", id, now_hidden);
        Ok(now_hidden)
    }

    /// Favorite star of the thread view: flips membership by id alone
    pub fn toggle_favorite_id(&mut self, id: ThreadId) -> Result<bool> {
        if self.index.contains_key(&id) {
            return self.toggle_favorite(id);
        }
        Ok(self.state.toggle_favorite(id))
    }

    pub fn is_favorite_id(&self, id: ThreadId) -> bool {
        self.state.is_favorite(id)
    }

    /// Turn hiding of read threads on or off and persist the choice
    pub fn set_hide_read_threads(&mut self, hide: bool) {
        self.preferences.hide_read_threads = hide;
        self.classifier.set_hide_read_threads(hide);
        self.state.store_mut().set(HIDDEN_READ_THREADS, &hide);

        for thread in self.threads.iter_mut().filter(|t| t.is_read && !t.is_hidden) {
            thread.is_suppressed = hide;
            self.presenter.set_visible(thread.id, thread.is_visible());
        }
        info!("Hide read threads: {}", hide);
    }

    /// Which toggles the thread menu offers
    pub fn menu_actions(&self, id: ThreadId) -> Result<MenuActions> {
        let thread = &self.threads[self.position(id)?];
        Ok(MenuActions {
            can_favorite: !thread.is_hidden,
            is_favorite: thread.is_favorite,
            can_hide: self.page == PageKind::ForumDisplay,
            is_hidden: thread.is_hidden,
        })
    }

    /// Keystroke in the quick filter box
    pub fn quick_filter_input(&mut self, query: &str, now: Instant) {
        self.quick_filter.input(query, now);
    }

    /// Run the quick filter if its debounce delay has elapsed. Returns the
    /// number of visible threads when it ran.
    pub fn quick_filter_tick(&mut self, now: Instant) -> Result<Option<usize>> {
        match self.quick_filter.due(now) {
            Some(query) => self.apply_quick_filter(&query).map(Some),
            None => Ok(None),
        }
    }

    /// Special keys in the quick filter box
    pub fn quick_filter_key(&mut self, key: FilterKey) -> Result<KeyOutcome> {
        let outcome = self.quick_filter.key(key);
        if outcome == KeyOutcome::Cleared {
            self.apply_quick_filter("")?;
        }
        Ok(outcome)
    }

    /// Apply a quick filter query right away
    pub fn apply_quick_filter(&mut self, query: &str) -> Result<usize> {
        self.quick_filter
            .apply(query, &mut self.threads, &mut self.presenter)
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.index.get(&id).map(|i| &self.threads[*i])
    }

    pub fn state(&self) -> &FilterState<S> {
        &self.state
    }

    pub fn preferences(&self) -> &FilterPreferences {
        &self.preferences
    }

    pub fn orderer(&self) -> &ListOrderer {
        &self.orderer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_parts(self) -> (FilterState<S>, P) {
        (self.state, self.presenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapedRow;
    use crate::presentation::LogPresenter;
    use crate::state::StateStore;
    use crate::store::MemoryStore;

    fn row(id: ThreadId, title: &str, creator: &str) -> ScrapedRow {
        ScrapedRow {
            id: Some(id),
            title: Some(title.to_string()),
            creator: creator.to_string(),
            unread: true,
            ..Default::default()
        }
    }

    fn session(seed: &[(&str, &str)]) -> ThreadFilter<MemoryStore, LogPresenter> {
        let mut store = MemoryStore::new();
        for (key, value) in seed {
            store.set_value(&format!("FilterThreads.{}", key), value);
        }
        let state = FilterState::load(StateStore::new(store, "FilterThreads"), None);
        ThreadFilter::new(state, LogPresenter::new(), &QuickFilterConfig::default())
    }

    fn snapshot(rows: Vec<ScrapedRow>) -> PageSnapshot {
        PageSnapshot {
            page: PageKind::ForumDisplay,
            rows,
            separator_index: None,
        }
    }

    #[test]
    fn test_load_skips_malformed_and_duplicate_rows() {
        let mut filter = session(&[]);
        let summary = filter.load(&snapshot(vec![
            row(1, "a", "x"),
            ScrapedRow::default(),
            row(1, "again", "x"),
            row(2, "b", "y"),
        ]));
        assert_eq!(summary.threads, 2);
        assert_eq!(summary.skipped_rows, 2);
        assert_eq!(filter.orderer().order(), vec![1, 2]);
    }

    #[test]
    fn test_invalid_rule_alerts_once() {
        let mut filter = session(&[
            ("HIDDEN_KEYWORDS", "\"(oops\""),
            ("HIDDEN_KEYWORDS_REGEX", "true"),
            ("HIDDEN_USERS", "\"bob\""),
        ]);
        let summary = filter.load(&snapshot(vec![row(1, "(oops", "bob"), row(2, "ok", "ana")]));
        assert_eq!(summary.disabled_rules, 1);
        assert_eq!(filter.presenter().alerts().len(), 1);
        // remaining rules still apply
        assert!(filter.thread(1).unwrap().is_hidden_by_user);
    }

    #[test]
    fn test_toggle_favorite_rejected_for_hidden() {
        let mut filter = session(&[("HIDDEN_THREADS", "[1]")]);
        filter.load(&snapshot(vec![row(1, "a", "x")]));
        assert!(matches!(
            filter.toggle_favorite(1),
            Err(FilterError::InvalidTransition(_))
        ));
        assert!(matches!(
            filter.toggle_favorite(99),
            Err(FilterError::UnknownThread(99))
        ));
    }

    #[test]
    fn test_toggle_hidden_rejected_on_search() {
        let mut filter = session(&[]);
        filter.load(&PageSnapshot {
            page: PageKind::Search,
            rows: vec![row(1, "a", "x")],
            separator_index: None,
        });
        assert!(matches!(
            filter.toggle_hidden(1),
            Err(FilterError::InvalidTransition(_))
        ));
        let actions = filter.menu_actions(1).unwrap();
        assert!(!actions.can_hide);
        assert!(actions.can_favorite);
    }

    #[test]
    fn test_show_thread_page_star() {
        let mut filter = session(&[]);
        let summary = filter.load(&PageSnapshot {
            page: PageKind::ShowThread,
            rows: vec![],
            separator_index: None,
        });
        assert_eq!(summary, LoadSummary::default());

        assert!(filter.toggle_favorite_id(55).unwrap());
        assert!(filter.is_favorite_id(55));
        assert!(!filter.toggle_favorite_id(55).unwrap());
        assert!(!filter.is_favorite_id(55));
    }

    #[test]
    fn test_unhidden_read_thread_respects_hide_read() {
        let mut filter = session(&[("HIDDEN_READ_THREADS", "true")]);
        let mut read_row = row(1, "a", "x");
        read_row.unread = false;
        filter.load(&snapshot(vec![read_row, row(2, "b", "y")]));
        assert!(filter.thread(1).unwrap().is_suppressed);

        assert!(filter.toggle_hidden(1).unwrap());
        assert!(!filter.state().read_ids().contains(&1));
        assert!(!filter.toggle_hidden(1).unwrap());
        assert!(filter.thread(1).unwrap().is_suppressed);
        assert!(filter.state().read_ids().contains(&1));
    }
}
