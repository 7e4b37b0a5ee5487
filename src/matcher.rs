//! Applies a compiled rule to free text and marks up every hit

use regex::Regex;

/// Span class for hits of the hide rules
pub const HIDDEN_KEYWORD_CLASS: &str = "hiddenKeyword";

/// Span class for hits of the highlight rule and the quick filter
pub const HIGHLIGHT_KEYWORD_CLASS: &str = "highlightKeyword";

/// Outcome of running a matcher over a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// The input with each hit wrapped in a span, or the input unchanged
    pub marked_up: String,
}

/// A compiled, case-insensitive rule
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// The expression this matcher was compiled from
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether `mark_up` would report a match
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.find(text).map_or(false, |m| !m.is_empty())
    }

    /// Scan `text` left to right, wrapping the trimmed text of every hit in
    /// `<span class='{class_name}'>`. The scan stops at the first empty hit.
    pub fn mark_up(&self, text: &str, class_name: &str) -> MatchResult {
        let mut marked_up = String::with_capacity(text.len());
        let mut pos = 0;
        let mut matched = false;

        while pos <= text.len() {
            let Some(hit) = self.regex.find_at(text, pos) else {
                break;
            };
            if hit.is_empty() {
                break;
            }

            let segment = hit.as_str();
            let trimmed = segment.trim();
            let leading = segment.len() - segment.trim_start().len();
            let core_start = hit.start() + leading;
            let core_end = core_start + trimmed.len();

            marked_up.push_str(&text[pos..core_start]);
            if !trimmed.is_empty() {
                marked_up.push_str("<span class='");
                marked_up.push_str(class_name);
                marked_up.push_str("'>");
                marked_up.push_str(trimmed);
                marked_up.push_str("</span>");
            }
            marked_up.push_str(&text[core_end..hit.end()]);

            pos = hit.end();
            matched = true;
        }

        if !matched {
            return MatchResult {
                matched: false,
                marked_up: text.to_string(),
            };
        }

        marked_up.push_str(&text[pos..]);
        MatchResult { matched, marked_up }
    }
}
