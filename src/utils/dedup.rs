//! Title clean-up and deduplication.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

struct TitlePatterns {
    slash: Regex,
    colon: Regex,
    period: Regex,
}

fn patterns() -> &'static TitlePatterns {
    static PATTERNS: OnceLock<TitlePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TitlePatterns {
        slash: Regex::new(r"\s/").expect("valid regex"),
        colon: Regex::new(r"\s:").expect("valid regex"),
        period: Regex::new(r"\s\.").expect("valid regex"),
    })
}

/// Strip catalog punctuation from a title.
///
/// `" /"` is removed, `" :"` becomes `":"` and `" ."` is removed.
pub fn normalize_title(title: &str) -> String {
    let p = patterns();
    let title = p.slash.replace_all(title, "");
    let title = p.colon.replace_all(&title, ":");
    p.period.replace_all(&title, "").into_owned()
}

/// Case-insensitive set of titles already placed on a page
#[derive(Debug, Default)]
pub struct TitleSet {
    seen: HashSet<String>,
}

impl TitleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a title; returns `false` if it was already seen
    pub fn insert(&mut self, title: &str) -> bool {
        self.seen.insert(title.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
