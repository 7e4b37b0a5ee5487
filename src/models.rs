use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Forum thread identifier, taken from the `t=` query parameter
pub type ThreadId = u64;

/// Thread links in list rows: `showthread.php?...t=123...`
static THREAD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"showthread\.php\?(?:.*[&?])?t=([0-9]+)").unwrap());

/// Thread tool links on the thread view (subscribe / new poll)
static THREAD_TOOL_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:subscription\.php\?do=addsubscription|poll\.php\?do=newpoll)&t=([0-9]+)")
        .unwrap()
});

/// Page the module runs on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Subforum thread listing
    #[default]
    ForumDisplay,
    /// Search results: only favorites apply
    Search,
    /// Single thread view: favorite star only
    ShowThread,
}

impl PageKind {
    /// Map a request path to the page kind, `None` when the module should not load
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/forumdisplay.php" => Some(PageKind::ForumDisplay),
            "/search.php" => Some(PageKind::Search),
            "/showthread.php" => Some(PageKind::ShowThread),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PageKind::ForumDisplay | PageKind::Search)
    }
}

/// Extract a thread id from a thread link or a thread-view tool link
pub fn thread_id_from_href(href: &str) -> Option<ThreadId> {
    THREAD_LINK
        .captures(href)
        .or_else(|| THREAD_TOOL_LINK.captures(href))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// One row as handed over by the page scraper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedRow {
    #[serde(default)]
    pub id: Option<ThreadId>,
    #[serde(default)]
    pub href: Option<String>,
    /// Raw title markup
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: String,
    /// Whether the row shows the "new posts" indicator
    #[serde(default)]
    pub unread: bool,
}

/// Rows of one page in their rendered order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub page: PageKind,
    pub rows: Vec<ScrapedRow>,
    /// Index of the first row after the sticky-threads separator
    #[serde(default)]
    pub separator_index: Option<usize>,
}

/// Why a thread ended up in the hidden sublist
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HideReason {
    Manual,
    User,
    Keywords,
}

/// Mutually exclusive hide/favorite status of a thread
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThreadStatus {
    Plain,
    Favorite,
    Hidden(HideReason),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// Title markup currently displayed
    pub title: String,
    /// Title markup as scraped
    pub original_title: String,
    /// Title markup after classification, restored when the quick filter clears
    pub classified_title: String,
    pub creator: String,
    /// Creator text with blacklist matches marked up
    pub creator_markup: Option<String>,
    pub original_index: usize,
    pub unread: bool,
    pub is_favorite: bool,
    pub is_hidden: bool,
    pub is_hidden_by_user: bool,
    pub is_hidden_by_keywords: bool,
    pub is_highlighted: bool,
    pub is_read: bool,
    /// Suppressed by the "hide read threads" toggle
    pub is_suppressed: bool,
    /// Hidden by the quick filter
    pub is_filtered_out: bool,
}

impl Thread {
    pub fn new(id: ThreadId, title: &str, creator: &str, original_index: usize) -> Self {
        Self {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            classified_title: title.to_string(),
            creator: creator.to_string(),
            creator_markup: None,
            original_index,
            unread: false,
            is_favorite: false,
            is_hidden: false,
            is_hidden_by_user: false,
            is_hidden_by_keywords: false,
            is_highlighted: false,
            is_read: false,
            is_suppressed: false,
            is_filtered_out: false,
        }
    }

    /// Build a thread from a scraped row, falling back to the link for the id
    pub fn from_row(row: &ScrapedRow, original_index: usize) -> Result<Self> {
        let id = row
            .id
            .or_else(|| row.href.as_deref().and_then(thread_id_from_href))
            .ok_or_else(|| {
                FilterError::MalformedThreadRow(format!(
                    "row {} has no thread id (href: {:?})",
                    original_index, row.href
                ))
            })?;

        let title = row.title.as_deref().ok_or_else(|| {
            FilterError::MalformedThreadRow(format!("thread {} has no title", id))
        })?;

        let mut thread = Self::new(id, title, &row.creator, original_index);
        thread.unread = row.unread;
        Ok(thread)
    }

    pub fn status(&self) -> ThreadStatus {
        if self.is_hidden {
            if self.is_hidden_by_user {
                ThreadStatus::Hidden(HideReason::User)
            } else if self.is_hidden_by_keywords {
                ThreadStatus::Hidden(HideReason::Keywords)
            } else {
                ThreadStatus::Hidden(HideReason::Manual)
            }
        } else if self.is_favorite {
            ThreadStatus::Favorite
        } else {
            ThreadStatus::Plain
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.is_suppressed && !self.is_filtered_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_kind_from_path() {
        assert_eq!(PageKind::from_path("/forumdisplay.php"), Some(PageKind::ForumDisplay));
        assert_eq!(PageKind::from_path("/search.php"), Some(PageKind::Search));
        assert_eq!(PageKind::from_path("/showthread.php"), Some(PageKind::ShowThread));
        assert_eq!(PageKind::from_path("/private.php"), None);
        assert!(!PageKind::ShowThread.is_list());
    }

    #[test]
    fn test_thread_id_from_href() {
        assert_eq!(thread_id_from_href("showthread.php?t=123456"), Some(123456));
        assert_eq!(
            thread_id_from_href("showthread.php?s=abcdef&t=42&page=2"),
            Some(42)
        );
        assert_eq!(
            thread_id_from_href("subscription.php?do=addsubscription&t=77"),
            Some(77)
        );
        assert_eq!(thread_id_from_href("poll.php?do=newpoll&t=8"), Some(8));
        assert_eq!(thread_id_from_href("member.php?u=5"), None);
        assert_eq!(thread_id_from_href("showthread.php?p=99"), None);
    }

    #[test]
    fn test_from_row_with_href_only() {
        let row = ScrapedRow {
            href: Some("showthread.php?t=10".to_string()),
            title: Some("Hola".to_string()),
            creator: "ana".to_string(),
            unread: true,
            ..Default::default()
        };
        let thread = Thread::from_row(&row, 3).unwrap();
        assert_eq!(thread.id, 10);
        assert_eq!(thread.original_index, 3);
        assert!(thread.unread);
        assert_eq!(thread.status(), ThreadStatus::Plain);
    }

    #[test]
    fn test_from_row_malformed() {
        let no_id = ScrapedRow {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Thread::from_row(&no_id, 0),
            Err(FilterError::MalformedThreadRow(_))
        ));

        let no_title = ScrapedRow {
            id: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            Thread::from_row(&no_title, 0),
            Err(FilterError::MalformedThreadRow(_))
        ));
    }

    #[test]
    fn test_snapshot_deserialization_defaults() {
        let json = r#"{"rows": [{"id": 1, "title": "a"}]}"#;
        let snapshot: PageSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.page, PageKind::ForumDisplay);
        assert_eq!(snapshot.separator_index, None);
        assert!(!snapshot.rows[0].unread);

        let json = r#"{"page": "search", "rows": []}"#;
        let snapshot: PageSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.page, PageKind::Search);
    }

    #[test]
    fn test_status_precedence() {
        let mut thread = Thread::new(1, "t", "c", 0);
        thread.is_favorite = true;
        assert_eq!(thread.status(), ThreadStatus::Favorite);
        thread.is_hidden = true;
        thread.is_hidden_by_keywords = true;
        assert_eq!(thread.status(), ThreadStatus::Hidden(HideReason::Keywords));
    }
}
