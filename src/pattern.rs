//! Builds matchers from the raw rule text users type into the preferences
//!
//! Two input modes are supported:
//! - **Regex mode**: the text is compiled as-is, case-insensitively.
//! - **List mode**: a comma separated list of literals. Each literal is
//!   escaped, its vowels are folded to classes covering the accented
//!   variants, and the literals are joined with alternation. With whole-word
//!   matching on, the alternation is wrapped in `(\b| )` on both sides, so a
//!   plain space counts as a boundary as well.

use regex::RegexBuilder;
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::matcher::Matcher;

/// Word-or-space boundary used around literal lists
const WORD_OR_SPACE: &str = r"(\b| )";

/// How a rule's text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    pub is_regex: bool,
    pub whole_words: bool,
}

impl PatternOptions {
    /// Comma separated literals matched as whole words
    pub fn literal() -> Self {
        Self {
            is_regex: false,
            whole_words: true,
        }
    }

    /// Comma separated literals matched anywhere, as the quick filter does
    pub fn substring() -> Self {
        Self {
            is_regex: false,
            whole_words: false,
        }
    }

    pub fn regex() -> Self {
        Self {
            is_regex: true,
            whole_words: true,
        }
    }

    pub fn with_regex(is_regex: bool) -> Self {
        if is_regex {
            Self::regex()
        } else {
            Self::literal()
        }
    }
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::literal()
    }
}

/// Replace each vowel with a class matching it and its accented variants
pub fn fold_accents(literal: &str) -> String {
    let mut folded = String::with_capacity(literal.len() * 2);
    for c in literal.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let class = match lower {
            'a' | 'á' | 'à' => Some("[aáà]"),
            'e' | 'é' | 'è' => Some("[eéè]"),
            'i' | 'í' | 'ï' => Some("[iíï]"),
            'o' | 'ó' | 'ò' => Some("[oóò]"),
            'u' | 'ú' | 'ü' => Some("[uúü]"),
            _ => None,
        };
        match class {
            Some(class) => folded.push_str(class),
            None => folded.push(c),
        }
    }
    folded
}

/// Expression for a comma separated literal list, `None` when it holds no terms
pub fn literal_expression(source: &str, whole_words: bool) -> Option<String> {
    let terms: Vec<String> = source
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| fold_accents(&regex::escape(term)))
        .collect();

    if terms.is_empty() {
        return None;
    }

    let alternation = format!("({})", terms.join("|"));
    if whole_words {
        Some(format!("{}{}{}", WORD_OR_SPACE, alternation, WORD_OR_SPACE))
    } else {
        Some(alternation)
    }
}

/// Compile a user rule. Returns `Ok(None)` for an empty rule.
///
/// `rule` names the preference the text came from and is only used in the
/// error message.
pub fn compile_pattern(rule: &str, source: &str, options: PatternOptions) -> Result<Option<Matcher>> {
    if source.trim().is_empty() {
        return Ok(None);
    }

    let expression = if options.is_regex {
        source.to_string()
    } else {
        match literal_expression(source, options.whole_words) {
            Some(expression) => expression,
            None => return Ok(None),
        }
    };

    let regex = RegexBuilder::new(&expression)
        .case_insensitive(true)
        .build()
        .map_err(|e| FilterError::InvalidPattern {
            rule: rule.to_string(),
            message: e.to_string(),
        })?;

    debug!("Compiled {} as {}", rule, expression);
    Ok(Some(Matcher::new(regex)))
}
