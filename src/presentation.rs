//! Presentation collaborator
//!
//! The engine decides; the presenter renders. Implementations add and remove
//! visual classes, keep the hidden-thread sublist, and run fade transitions.

use tracing::{debug, warn};

use crate::models::{Thread, ThreadId};
use crate::ordering::Placement;
use crate::preferences::StylePreferences;

pub trait Presenter {
    /// Row colors, borders and keyword emphasis for this page
    fn apply_styles(&mut self, styles: &StylePreferences);

    /// Reflect the thread's flags and title/creator markup
    fn render_thread(&mut self, thread: &Thread);

    /// Move a row within the main list
    fn place_row(&mut self, id: ThreadId, placement: Placement);

    /// Move a row into the hidden-thread sublist
    fn move_to_hidden(&mut self, id: ThreadId);

    /// Counter of the hidden sublist; the block is shown from 1 and hidden at 0
    fn update_hidden_count(&mut self, count: usize);

    /// A highlight rule is being overridden by a keyword hide rule
    fn warn_highlight_suppressed(&mut self);

    /// User-visible alert
    fn alert(&mut self, message: &str);

    fn set_visible(&mut self, id: ThreadId, visible: bool);

    fn set_title(&mut self, id: ThreadId, markup: &str);

    fn fade_out(&mut self, _id: ThreadId) {}

    fn fade_in(&mut self, _id: ThreadId) {}
}

/// Presenter that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogPresenter {
    alerts: Vec<String>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl Presenter for LogPresenter {
    fn apply_styles(&mut self, styles: &StylePreferences) {
        debug!(
            "Styles: highlight={} (border only: {}, bold: {}), favorites={} (border only: {})",
            styles.highlight_color,
            styles.highlight_just_border,
            styles.highlight_bold,
            styles.favorites_color,
            styles.favorites_just_border
        );
    }

    fn render_thread(&mut self, thread: &Thread) {
        debug!("Render thread {}: {:?}", thread.id, thread.status());
    }

    fn place_row(&mut self, id: ThreadId, placement: Placement) {
        debug!("Row {} placed {:?}", id, placement);
    }

    fn move_to_hidden(&mut self, id: ThreadId) {
        debug!("Row {} moved to hidden threads", id);
    }

    fn update_hidden_count(&mut self, count: usize) {
        debug!("{} hidden thread(s)", count);
    }

    fn warn_highlight_suppressed(&mut self) {
        warn!("A thread matching the highlight keywords was hidden by the keyword blacklist");
    }

    fn alert(&mut self, message: &str) {
        warn!("{}", message);
        self.alerts.push(message.to_string());
    }

    fn set_visible(&mut self, id: ThreadId, visible: bool) {
        debug!("Row {} visible={}", id, visible);
    }

    fn set_title(&mut self, id: ThreadId, markup: &str) {
        debug!("Row {} title: {}", id, markup);
    }
}
