//! Live, debounced filter over the already classified thread list
//!
//! The quick filter is never persisted. It narrows the visible threads to the
//! ones whose title contains the query, without touching the hidden sublist.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;
use crate::matcher::{Matcher, HIGHLIGHT_KEYWORD_CLASS};
use crate::models::Thread;
use crate::pattern::{compile_pattern, PatternOptions};
use crate::presentation::Presenter;

/// Last-write-wins timer: each push restarts the countdown
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing anything pending
    pub fn push(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now + self.delay));
    }

    /// Take the pending value once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Keys with special meaning in the filter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Escape,
    Enter,
    Other,
}

/// What the input handler should do with a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Query cleared and filter rerun; the input box should be emptied
    Cleared,
    /// Swallow the event so the page form is not submitted
    Suppress,
    /// Let the key through
    Continue,
}

#[derive(Debug, Clone)]
pub struct QuickFilter {
    debouncer: Debouncer,
    min_query_len: usize,
    query: String,
}

impl QuickFilter {
    pub fn new(delay: Duration, min_query_len: usize) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            min_query_len,
            query: String::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Record a keystroke's query; it is applied once the input goes quiet
    pub fn input(&mut self, query: &str, now: Instant) {
        self.debouncer.push(query, now);
    }

    /// Query whose debounce delay has elapsed, if any
    pub fn due(&mut self, now: Instant) -> Option<String> {
        self.debouncer.poll(now)
    }

    /// Classify a key event. Escape clears the query; the caller reruns the
    /// filter with the empty query.
    pub fn key(&mut self, key: FilterKey) -> KeyOutcome {
        match key {
            FilterKey::Escape => {
                self.debouncer.cancel();
                KeyOutcome::Cleared
            }
            FilterKey::Enter => KeyOutcome::Suppress,
            FilterKey::Other => KeyOutcome::Continue,
        }
    }

    /// Apply `query` to every thread outside the hidden sublist. Returns the
    /// number of threads left visible.
    ///
    /// Short queries restore the classified titles; threads suppressed by the
    /// hide-read toggle stay suppressed either way.
    pub fn apply<P: Presenter>(&mut self, query: &str, threads: &mut [Thread], presenter: &mut P) -> Result<usize> {
        self.query = query.to_string();
        let matcher = self.compile()?;

        let mut visible = 0;
        for thread in threads.iter_mut().filter(|t| !t.is_hidden) {
            Self::filter_thread(matcher.as_ref(), thread, presenter);
            presenter.set_visible(thread.id, thread.is_visible());
            if thread.is_visible() {
                visible += 1;
            }
        }

        debug!("Quick filter '{}' leaves {} thread(s) visible", query, visible);
        Ok(visible)
    }

    /// Re-apply the current query to one thread that rejoined the main list
    pub fn refresh<P: Presenter>(&self, thread: &mut Thread, presenter: &mut P) -> Result<()> {
        if thread.is_hidden {
            return Ok(());
        }
        let matcher = self.compile()?;
        Self::filter_thread(matcher.as_ref(), thread, presenter);
        Ok(())
    }

    fn compile(&self) -> Result<Option<Matcher>> {
        if self.query.chars().count() < self.min_query_len {
            return Ok(None);
        }
        compile_pattern("quick filter", &self.query, PatternOptions::substring())
    }

    fn filter_thread<P: Presenter>(matcher: Option<&Matcher>, thread: &mut Thread, presenter: &mut P) {
        match matcher {
            None => {
                thread.title = thread.classified_title.clone();
                thread.is_filtered_out = false;
                presenter.set_title(thread.id, &thread.title);
            }
            Some(matcher) => {
                let hit = matcher.mark_up(&thread.original_title, HIGHLIGHT_KEYWORD_CLASS);
                if hit.matched {
                    thread.title = hit.marked_up;
                    thread.is_filtered_out = false;
                    presenter.set_title(thread.id, &thread.title);
                } else {
                    thread.is_filtered_out = true;
                }
            }
        }
    }
}
