//! User preferences of the thread filter, read from the key-value store
//!
//! Preferences are edited by the forum-side settings dialog and stored as
//! JSON values under the module namespace.

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::state::StateStore;
use crate::store::KeyValueStore;

pub const HIDDEN_USERS: &str = "HIDDEN_USERS";
pub const HIDDEN_KEYWORDS: &str = "HIDDEN_KEYWORDS";
pub const HIDDEN_KEYWORDS_REGEX: &str = "HIDDEN_KEYWORDS_REGEX";
pub const HIGHLIGHT_KEYWORDS: &str = "HIGHLIGHT_KEYWORDS";
pub const HIGHLIGHT_KEYWORDS_REGEX: &str = "HIGHLIGHT_KEYWORDS_REGEX";
pub const HIGHLIGHT_COLOR: &str = "HIGHLIGHT_COLOR";
pub const HIGHLIGHT_JUST_BORDER: &str = "HIGHLIGHT_JUST_BORDER";
pub const HIGHLIGHT_BOLD: &str = "HIGHLIGHT_BOLD";
pub const HIGHLIGHTED_TOP: &str = "HIGHLIGHTED_TOP";
pub const FAVORITES_COLOR: &str = "FAVORITES_COLOR";
pub const FAVORITES_JUST_BORDER: &str = "FAVORITES_JUST_BORDER";
pub const FAVORITES_TOP: &str = "FAVORITES_TOP";
pub const HIDDEN_READ_THREADS: &str = "HIDDEN_READ_THREADS";

/// Value type of a preference key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKind {
    Text,
    Bool,
}

/// Every known preference with its value type
pub const PREFERENCE_KEYS: &[(&str, PreferenceKind)] = &[
    (HIDDEN_USERS, PreferenceKind::Text),
    (HIDDEN_KEYWORDS, PreferenceKind::Text),
    (HIDDEN_KEYWORDS_REGEX, PreferenceKind::Bool),
    (HIGHLIGHT_KEYWORDS, PreferenceKind::Text),
    (HIGHLIGHT_KEYWORDS_REGEX, PreferenceKind::Bool),
    (HIGHLIGHT_COLOR, PreferenceKind::Text),
    (HIGHLIGHT_JUST_BORDER, PreferenceKind::Bool),
    (HIGHLIGHT_BOLD, PreferenceKind::Bool),
    (HIGHLIGHTED_TOP, PreferenceKind::Bool),
    (FAVORITES_COLOR, PreferenceKind::Text),
    (FAVORITES_JUST_BORDER, PreferenceKind::Bool),
    (FAVORITES_TOP, PreferenceKind::Bool),
    (HIDDEN_READ_THREADS, PreferenceKind::Bool),
];

pub fn preference_kind(key: &str) -> Option<PreferenceKind> {
    PREFERENCE_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreferences {
    pub hidden_users: String,
    pub hidden_keywords: String,
    pub hidden_keywords_regex: bool,
    pub highlight_keywords: String,
    pub highlight_keywords_regex: bool,
    pub highlight_color: String,
    pub highlight_just_border: bool,
    pub highlight_bold: bool,
    pub highlighted_top: bool,
    pub favorites_color: String,
    pub favorites_just_border: bool,
    pub favorites_top: bool,
    pub hide_read_threads: bool,
}

impl Default for FilterPreferences {
    fn default() -> Self {
        Self {
            hidden_users: String::new(),
            hidden_keywords: String::new(),
            hidden_keywords_regex: false,
            highlight_keywords: String::new(),
            highlight_keywords_regex: false,
            highlight_color: default_highlight_color(),
            highlight_just_border: false,
            highlight_bold: true,
            highlighted_top: true,
            favorites_color: default_favorites_color(),
            favorites_just_border: false,
            favorites_top: true,
            hide_read_threads: false,
        }
    }
}

fn default_highlight_color() -> String {
    "#FAF7DD".to_string()
}

fn default_favorites_color() -> String {
    "#D5E6EE".to_string()
}

/// Row styling handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub highlight_color: String,
    /// Only outline highlighted rows instead of tinting them
    pub highlight_just_border: bool,
    /// Render `highlightKeyword` hits in bold
    pub highlight_bold: bool,
    pub favorites_color: String,
    pub favorites_just_border: bool,
}

impl FilterPreferences {
    pub fn styles(&self) -> StylePreferences {
        StylePreferences {
            highlight_color: self.highlight_color.clone(),
            highlight_just_border: self.highlight_just_border,
            highlight_bold: self.highlight_bold,
            favorites_color: self.favorites_color.clone(),
            favorites_just_border: self.favorites_just_border,
        }
    }

    /// Read every preference, using the defaults for missing keys
    pub fn load<S: KeyValueStore>(store: &StateStore<S>) -> Self {
        let d = Self::default();
        Self {
            hidden_users: store.get_string(HIDDEN_USERS, &d.hidden_users),
            hidden_keywords: store.get_string(HIDDEN_KEYWORDS, &d.hidden_keywords),
            hidden_keywords_regex: store.get(HIDDEN_KEYWORDS_REGEX, d.hidden_keywords_regex),
            highlight_keywords: store.get_string(HIGHLIGHT_KEYWORDS, &d.highlight_keywords),
            highlight_keywords_regex: store
                .get(HIGHLIGHT_KEYWORDS_REGEX, d.highlight_keywords_regex),
            highlight_color: store.get_string(HIGHLIGHT_COLOR, &d.highlight_color),
            highlight_just_border: store.get(HIGHLIGHT_JUST_BORDER, d.highlight_just_border),
            highlight_bold: store.get(HIGHLIGHT_BOLD, d.highlight_bold),
            highlighted_top: store.get(HIGHLIGHTED_TOP, d.highlighted_top),
            favorites_color: store.get_string(FAVORITES_COLOR, &d.favorites_color),
            favorites_just_border: store.get(FAVORITES_JUST_BORDER, d.favorites_just_border),
            favorites_top: store.get(FAVORITES_TOP, d.favorites_top),
            hide_read_threads: store.get(HIDDEN_READ_THREADS, d.hide_read_threads),
        }
    }
}

/// Store a preference given as text, e.g. from the command line.
///
/// Boolean preferences accept `true`/`false`; text preferences are stored
/// as JSON strings.
pub fn set_preference<S: KeyValueStore>(store: &mut StateStore<S>, key: &str, value: &str) -> Result<()> {
    match preference_kind(key) {
        Some(PreferenceKind::Bool) => {
            let flag: bool = value.trim().parse().map_err(|_| {
                FilterError::ConfigError(format!(
                    "Preference {} expects true or false, got '{}'",
                    key, value
                ))
            })?;
            store.set(key, &flag);
        }
        Some(PreferenceKind::Text) => store.set(key, value),
        None => {
            return Err(FilterError::ConfigError(format!(
                "Unknown preference: {}",
                key
            )))
        }
    }
    Ok(())
}
