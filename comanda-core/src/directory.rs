//! Open and closed tabs as listed by the backend

use std::time::{Duration, Instant};

use shared::order::{TabEntry, TabsListed};

use crate::search::normalize;

/// How long a tab list refresh may wait for its answer
pub const TAB_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tab list with a prefix filter
///
/// The lists are replaced whole by every answer. A refresh counts as running
/// from [`begin_refresh`](Self::begin_refresh) until the answer arrives or
/// [`TAB_LIST_TIMEOUT`] passes, whichever comes first.
#[derive(Debug, Clone, Default)]
pub struct TabDirectory {
    open: Vec<TabEntry>,
    closed: Vec<TabEntry>,
    query: String,
    refresh_deadline: Option<Instant>,
}

impl TabDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both lists and end any running refresh
    pub fn apply(&mut self, listing: TabsListed) {
        tracing::debug!(open = listing.open.len(), closed = listing.closed.len(), "Tab list received");
        self.open = listing.open;
        self.closed = listing.closed;
        self.refresh_deadline = None;
    }

    pub fn begin_refresh(&mut self, now: Instant) {
        self.refresh_deadline = Some(now + TAB_LIST_TIMEOUT);
    }

    /// Stop waiting without touching the lists
    pub fn end_refresh(&mut self) {
        self.refresh_deadline = None;
    }

    pub fn is_refreshing(&self, now: Instant) -> bool {
        self.refresh_deadline.is_some_and(|deadline| now < deadline)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filter both lists to tabs whose number starts with `query`; blank
    /// shows everything.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn open(&self) -> Vec<&TabEntry> {
        self.filtered(&self.open)
    }

    pub fn closed(&self) -> Vec<&TabEntry> {
        self.filtered(&self.closed)
    }

    pub fn is_open(&self, tab_id: &str) -> bool {
        self.open.iter().any(|entry| entry.comanda == tab_id)
    }

    fn filtered<'a>(&self, entries: &'a [TabEntry]) -> Vec<&'a TabEntry> {
        let prefix = normalize(&self.query);
        entries
            .iter()
            .filter(|entry| prefix.is_empty() || normalize(&entry.comanda).starts_with(&prefix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(comanda: &str, ordem: u32) -> TabEntry {
        TabEntry {
            comanda: comanda.to_string(),
            ordem,
        }
    }

    fn listing() -> TabsListed {
        TabsListed {
            open: vec![entry("12", 0), entry("120", 0), entry("Mesa 3", 0), entry("7", 0)],
            closed: vec![entry("12", 1), entry("31", 2)],
        }
    }

    fn ids(entries: &[&TabEntry]) -> Vec<String> {
        entries.iter().map(|e| format!("{}#{}", e.comanda, e.ordem)).collect()
    }

    #[test]
    fn test_prefix_filter_applies_to_both_lists() {
        let mut directory = TabDirectory::new();
        directory.apply(listing());
        assert_eq!(directory.open().len(), 4);

        directory.set_query("12");
        assert_eq!(ids(&directory.open()), vec!["12#0", "120#0"]);
        assert_eq!(ids(&directory.closed()), vec!["12#1"]);

        directory.set_query("mesa");
        assert_eq!(ids(&directory.open()), vec!["Mesa 3#0"]);
        assert!(directory.closed().is_empty());

        directory.set_query("2");
        assert!(directory.open().is_empty());

        directory.set_query("  ");
        assert_eq!(directory.closed().len(), 2);
    }

    #[test]
    fn test_refresh_ends_on_answer_or_timeout() {
        let start = Instant::now();
        let mut directory = TabDirectory::new();
        assert!(!directory.is_refreshing(start));

        directory.begin_refresh(start);
        assert!(directory.is_refreshing(start + Duration::from_secs(9)));
        assert!(!directory.is_refreshing(start + TAB_LIST_TIMEOUT));

        directory.begin_refresh(start);
        directory.apply(listing());
        assert!(!directory.is_refreshing(start));
        assert!(directory.is_open("7"));
        assert!(!directory.is_open("31"));
    }

    #[test]
    fn test_new_listing_replaces_old() {
        let mut directory = TabDirectory::new();
        directory.apply(listing());
        directory.apply(TabsListed {
            open: vec![entry("9", 0)],
            closed: Vec::new(),
        });
        assert_eq!(ids(&directory.open()), vec!["9#0"]);
        assert!(directory.closed().is_empty());

        directory.begin_refresh(Instant::now());
        directory.end_refresh();
        assert!(!directory.is_refreshing(Instant::now()));
        assert_eq!(directory.open().len(), 1);
    }
}
