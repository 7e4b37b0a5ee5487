//! Thread classification engine with priority-ordered rules
//!
//! Hide and favorite status are mutually exclusive and decided first-match:
//! manual hide, favorite, creator blacklist, keyword blacklist. Highlighting
//! is evaluated independently afterwards against the scraped title.

use tracing::{debug, warn};

use crate::error::FilterError;
use crate::matcher::{Matcher, HIDDEN_KEYWORD_CLASS, HIGHLIGHT_KEYWORD_CLASS};
use crate::models::{HideReason, PageKind, Thread, ThreadStatus};
use crate::pattern::{compile_pattern, PatternOptions};
use crate::preferences::{FilterPreferences, HIDDEN_KEYWORDS, HIDDEN_USERS, HIGHLIGHT_KEYWORDS};
use crate::state::FilterState;
use crate::store::KeyValueStore;

/// Compiled automatic rules. A rule is `None` when unset or when it failed
/// to compile.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub hidden_users: Option<Matcher>,
    pub hidden_keywords: Option<Matcher>,
    pub highlight_keywords: Option<Matcher>,
}

impl RuleSet {
    /// Compile the rules from the preferences. Every rule that fails is left
    /// disabled and its error returned alongside.
    pub fn compile(prefs: &FilterPreferences) -> (Self, Vec<FilterError>) {
        let mut errors = Vec::new();

        let mut compile_rule = |rule: &str, source: &str, options: PatternOptions| {
            match compile_pattern(rule, source, options) {
                Ok(matcher) => matcher,
                Err(e) => {
                    warn!("Disabling rule {}: {}", rule, e);
                    errors.push(e);
                    None
                }
            }
        };

        let hidden_users = compile_rule(HIDDEN_USERS, &prefs.hidden_users, PatternOptions::literal());
        let hidden_keywords = compile_rule(
            HIDDEN_KEYWORDS,
            &prefs.hidden_keywords,
            PatternOptions::with_regex(prefs.hidden_keywords_regex),
        );
        let highlight_keywords = compile_rule(
            HIGHLIGHT_KEYWORDS,
            &prefs.highlight_keywords,
            PatternOptions::with_regex(prefs.highlight_keywords_regex),
        );

        (
            Self {
                hidden_users,
                hidden_keywords,
                highlight_keywords,
            },
            errors,
        )
    }
}

/// Decision for one thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub status: ThreadStatus,
    pub highlighted: bool,
    /// Title with rule hits marked up; the highlight markup wins when both apply
    pub title_markup: Option<String>,
    pub creator_markup: Option<String>,
    /// Listed without the unread indicator and not hidden
    pub is_read: bool,
    /// Read and the "hide read threads" toggle is on
    pub suppress: bool,
    /// Hidden by keyword while also matching the highlight rule
    pub highlight_suppressed: bool,
}

impl ClassificationResult {
    fn plain() -> Self {
        Self {
            status: ThreadStatus::Plain,
            highlighted: false,
            title_markup: None,
            creator_markup: None,
            is_read: false,
            suppress: false,
            highlight_suppressed: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.status, ThreadStatus::Hidden(_))
    }
}

pub struct ThreadClassifier {
    page: PageKind,
    rules: RuleSet,
    hide_read_threads: bool,
}

impl ThreadClassifier {
    pub fn new(page: PageKind, rules: RuleSet, hide_read_threads: bool) -> Self {
        Self {
            page,
            rules,
            hide_read_threads,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn hide_read_threads(&self) -> bool {
        self.hide_read_threads
    }

    pub fn set_hide_read_threads(&mut self, hide: bool) {
        self.hide_read_threads = hide;
    }

    /// Classify a thread against the rules and the persisted id sets
    pub fn classify<S: KeyValueStore>(&self, thread: &Thread, state: &FilterState<S>) -> ClassificationResult {
        let mut result = ClassificationResult::plain();

        if self.page != PageKind::ForumDisplay {
            if state.is_favorite(thread.id) {
                result.status = ThreadStatus::Favorite;
            }
            return result;
        }

        if state.is_hidden(thread.id) {
            result.status = ThreadStatus::Hidden(HideReason::Manual);
        } else if state.is_favorite(thread.id) {
            result.status = ThreadStatus::Favorite;
        } else if let Some(hit) = self
            .rules
            .hidden_users
            .as_ref()
            .map(|m| m.mark_up(&thread.creator, HIDDEN_KEYWORD_CLASS))
            .filter(|hit| hit.matched)
        {
            result.status = ThreadStatus::Hidden(HideReason::User);
            result.creator_markup = Some(hit.marked_up);
        } else if let Some(hit) = self
            .rules
            .hidden_keywords
            .as_ref()
            .map(|m| m.mark_up(&thread.original_title, HIDDEN_KEYWORD_CLASS))
            .filter(|hit| hit.matched)
        {
            result.status = ThreadStatus::Hidden(HideReason::Keywords);
            result.title_markup = Some(hit.marked_up);
        }

        if let Some(hit) = self
            .rules
            .highlight_keywords
            .as_ref()
            .map(|m| m.mark_up(&thread.original_title, HIGHLIGHT_KEYWORD_CLASS))
            .filter(|hit| hit.matched)
        {
            result.highlighted = true;
            result.title_markup = Some(hit.marked_up);
            result.highlight_suppressed =
                result.status == ThreadStatus::Hidden(HideReason::Keywords);
        }

        if !result.is_hidden() && !thread.unread {
            result.is_read = true;
            result.suppress = self.hide_read_threads;
        }

        debug!(
            "Thread {} classified as {:?} (highlighted={}, read={})",
            thread.id, result.status, result.highlighted, result.is_read
        );
        result
    }

    /// Copy a decision onto the thread's flags and display fields
    pub fn apply(thread: &mut Thread, result: &ClassificationResult) {
        thread.is_favorite = result.status == ThreadStatus::Favorite;
        thread.is_hidden = result.is_hidden();
        thread.is_hidden_by_user = result.status == ThreadStatus::Hidden(HideReason::User);
        thread.is_hidden_by_keywords = result.status == ThreadStatus::Hidden(HideReason::Keywords);
        thread.is_highlighted = result.highlighted;
        thread.is_read = result.is_read;
        thread.is_suppressed = result.suppress;

        if let Some(markup) = &result.title_markup {
            thread.title = markup.clone();
        }
        thread.classified_title = thread.title.clone();
        thread.creator_markup = result.creator_markup.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStore;
    use crate::store::{KeyValueStore, MemoryStore};

    fn state(favorites: &str, hidden: &str) -> FilterState<MemoryStore> {
        let mut store = MemoryStore::new();
        store.set_value("FilterThreads.FAVORITES", favorites);
        store.set_value("FilterThreads.HIDDEN_THREADS", hidden);
        FilterState::load(StateStore::new(store, "FilterThreads"), None)
    }

    fn prefs(users: &str, hidden: &str, highlight: &str) -> FilterPreferences {
        FilterPreferences {
            hidden_users: users.to_string(),
            hidden_keywords: hidden.to_string(),
            highlight_keywords: highlight.to_string(),
            ..Default::default()
        }
    }

    fn classifier(page: PageKind, prefs: &FilterPreferences) -> ThreadClassifier {
        let (rules, errors) = RuleSet::compile(prefs);
        assert!(errors.is_empty());
        ThreadClassifier::new(page, rules, prefs.hide_read_threads)
    }

    fn unread(id: u64, title: &str, creator: &str) -> Thread {
        let mut thread = Thread::new(id, title, creator, 0);
        thread.unread = true;
        thread
    }

    #[test]
    fn test_manual_hide_beats_everything() {
        let c = classifier(PageKind::ForumDisplay, &prefs("bob", "oferta", "oferta"));
        let result = c.classify(&unread(1, "Oferta", "bob"), &state("[1]", "[1]"));
        assert_eq!(result.status, ThreadStatus::Hidden(HideReason::Manual));
        assert!(result.creator_markup.is_none());
    }

    #[test]
    fn test_favorite_beats_blacklists() {
        let c = classifier(PageKind::ForumDisplay, &prefs("bob", "oferta", ""));
        let result = c.classify(&unread(1, "Oferta", "bob"), &state("[1]", "[]"));
        assert_eq!(result.status, ThreadStatus::Favorite);
    }

    #[test]
    fn test_user_blacklist_before_keywords() {
        let c = classifier(PageKind::ForumDisplay, &prefs("bob", "oferta", ""));
        let result = c.classify(&unread(1, "Oferta", "bob"), &state("[]", "[]"));
        assert_eq!(result.status, ThreadStatus::Hidden(HideReason::User));
        assert_eq!(
            result.creator_markup.as_deref(),
            Some("<span class='hiddenKeyword'>bob</span>")
        );
        assert!(result.title_markup.is_none());
    }

    #[test]
    fn test_keyword_hide_with_highlight_conflict() {
        let c = classifier(PageKind::ForumDisplay, &prefs("", "oferta", "barata"));
        let result = c.classify(&unread(1, "Oferta barata", "ana"), &state("[]", "[]"));
        assert_eq!(result.status, ThreadStatus::Hidden(HideReason::Keywords));
        assert!(result.highlighted);
        assert!(result.highlight_suppressed);
        // highlight runs on the scraped title, not the hide markup
        assert_eq!(
            result.title_markup.as_deref(),
            Some("Oferta <span class='highlightKeyword'>barata</span>")
        );
    }

    #[test]
    fn test_highlight_alone() {
        let c = classifier(PageKind::ForumDisplay, &prefs("", "", "importante"));
        let result = c.classify(&unread(2, "Aviso importante", "ana"), &state("[]", "[]"));
        assert_eq!(result.status, ThreadStatus::Plain);
        assert!(result.highlighted);
        assert!(!result.highlight_suppressed);
    }

    #[test]
    fn test_search_page_only_checks_favorites() {
        let c = classifier(PageKind::Search, &prefs("bob", "oferta", "oferta"));
        let fav = c.classify(&unread(1, "Oferta", "bob"), &state("[1]", "[1]"));
        assert_eq!(fav.status, ThreadStatus::Favorite);

        let other = c.classify(&Thread::new(2, "Oferta", "bob", 0), &state("[1]", "[2]"));
        assert_eq!(other.status, ThreadStatus::Plain);
        assert!(!other.highlighted);
        assert!(!other.is_read);
    }

    #[test]
    fn test_read_threads() {
        let mut p = prefs("", "", "");
        p.hide_read_threads = true;
        let c = classifier(PageKind::ForumDisplay, &p);

        let read = c.classify(&Thread::new(1, "a", "b", 0), &state("[]", "[]"));
        assert!(read.is_read);
        assert!(read.suppress);

        let hidden = c.classify(&Thread::new(1, "a", "b", 0), &state("[]", "[1]"));
        assert!(!hidden.is_read);
        assert!(!hidden.suppress);

        let fresh = c.classify(&unread(1, "a", "b"), &state("[]", "[]"));
        assert!(!fresh.is_read);
    }

    #[test]
    fn test_invalid_rule_is_disabled_others_kept() {
        let mut p = prefs("bob", "(unclosed", "oferta");
        p.hidden_keywords_regex = true;
        let (rules, errors) = RuleSet::compile(&p);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], FilterError::InvalidPattern { rule, .. } if rule == HIDDEN_KEYWORDS));
        assert!(rules.hidden_keywords.is_none());
        assert!(rules.hidden_users.is_some());
        assert!(rules.highlight_keywords.is_some());
    }

    #[test]
    fn test_apply_sets_flags() {
        let c = classifier(PageKind::ForumDisplay, &prefs("", "oferta", ""));
        let mut thread = unread(1, "Oferta", "ana");
        let result = c.classify(&thread, &state("[]", "[]"));
        ThreadClassifier::apply(&mut thread, &result);

        assert!(thread.is_hidden);
        assert!(thread.is_hidden_by_keywords);
        assert!(!thread.is_hidden_by_user);
        assert_eq!(thread.title, "<span class='hiddenKeyword'>Oferta</span>");
        assert_eq!(thread.classified_title, thread.title);
        assert_eq!(thread.original_title, "Oferta");
    }
}
