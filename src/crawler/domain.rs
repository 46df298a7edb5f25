//! Per-domain crawl state
//!
//! A [`Domain`] owns everything scoped to one hostname: the paths it has
//! ever seen with their docids (the dedup boundary), the FIFO of pages still
//! to fetch, the robots gate state, and the politeness timestamp. Domains are
//! created on first registration and live for the process lifetime; all
//! mutation happens under the coordinator's domain lock.

use crate::robots::{self, RobotsState};
use crate::DocId;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// A registered page waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPage {
    /// Path component, the per-domain dedup key.
    pub path: String,
    /// Full registered URL, handed to the fetch worker verbatim.
    pub url: String,
    pub docid: DocId,
}

/// Which cross-domain queue the domain currently sits in.
///
/// Invariant: a domain is in at most one queue at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSlot {
    Out,
    Idle,
    Active,
}

#[derive(Debug)]
pub struct Domain {
    pub name: String,
    /// Scheme of the first URL seen for this host; robots.txt is fetched
    /// over the same scheme.
    scheme: String,
    known_paths: HashMap<String, DocId>,
    pending: VecDeque<PendingPage>,
    pub robots: RobotsState,
    pub robots_docid: Option<DocId>,
    pub slot: QueueSlot,
    /// Earliest instant this domain may next be served.
    pub not_before: Instant,
    /// Backlog size frozen at the moment of the last idle-to-active
    /// promotion; the active queue ranks domains by it.
    pub promoted_backlog: usize,
}

impl Domain {
    pub fn new(name: impl Into<String>, scheme: impl Into<String>, now: Instant) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            known_paths: HashMap::new(),
            pending: VecDeque::new(),
            robots: RobotsState::Unknown,
            robots_docid: None,
            slot: QueueSlot::Out,
            not_before: now,
            promoted_backlog: 0,
        }
    }

    pub fn knows_path(&self, path: &str) -> bool {
        self.known_paths.contains_key(path)
    }

    /// Docid assigned when this path was first registered.
    pub fn docid_for(&self, path: &str) -> Option<DocId> {
        self.known_paths.get(path).copied()
    }

    /// Records a path as known under its docid. The first registration wins;
    /// re-recording an already known path is a silent no-op.
    pub fn record_path(&mut self, path: &str, docid: DocId) {
        self.known_paths.entry(path.to_string()).or_insert(docid);
    }

    pub fn push_pending(&mut self, page: PendingPage) {
        self.pending.push_back(page);
    }

    pub fn backlog(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// URL of this domain's robots.txt file.
    pub fn robots_url(&self) -> String {
        format!("{}://{}/robots.txt", self.scheme, self.name)
    }

    /// Pops the first robots-allowed pending page.
    ///
    /// Disallowed pages in front of it are discarded, not re-queued, and
    /// returned separately so the caller can account for them as visited.
    /// Must only be called once rules are installed.
    pub fn pop_allowed(&mut self) -> (Option<PendingPage>, Vec<PendingPage>) {
        let rules = match &self.robots {
            RobotsState::Rules(rules) => rules,
            _ => return (None, Vec::new()),
        };

        let mut skipped = Vec::new();
        while let Some(page) = self.pending.pop_front() {
            if robots::matches(rules, &page.path) {
                return (Some(page), skipped);
            }
            skipped.push(page);
        }
        (None, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robots::RobotsRule;

    fn page(path: &str, docid: DocId) -> PendingPage {
        PendingPage {
            path: path.to_string(),
            url: format!("http://example.br{}", path),
            docid,
        }
    }

    fn domain_with_rules(rules: Vec<RobotsRule>) -> Domain {
        let mut dom = Domain::new("example.br", "http", Instant::now());
        dom.robots = RobotsState::Rules(rules);
        dom
    }

    #[test]
    fn test_record_path_first_registration_wins() {
        let mut dom = Domain::new("example.br", "http", Instant::now());
        assert!(!dom.knows_path("/a"));

        dom.record_path("/a", 1);
        dom.record_path("/a", 99);

        assert!(dom.knows_path("/a"));
        assert_eq!(dom.docid_for("/a"), Some(1));
        assert_eq!(dom.docid_for("/b"), None);
    }

    #[test]
    fn test_pop_allowed_fifo_order() {
        let mut dom = domain_with_rules(vec![]);
        dom.push_pending(page("/a", 1));
        dom.push_pending(page("/b", 2));

        let (first, skipped) = dom.pop_allowed();
        assert_eq!(first.unwrap().path, "/a");
        assert!(skipped.is_empty());

        let (second, _) = dom.pop_allowed();
        assert_eq!(second.unwrap().path, "/b");
        assert!(!dom.has_pending());
    }

    #[test]
    fn test_pop_allowed_skips_disallowed() {
        let mut dom = domain_with_rules(vec![RobotsRule::disallow("/admin")]);
        dom.push_pending(page("/admin/users", 1));
        dom.push_pending(page("/admin/logs", 2));
        dom.push_pending(page("/public", 3));

        let (popped, skipped) = dom.pop_allowed();
        assert_eq!(popped.unwrap().docid, 3);
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].path, "/admin/users");
        assert!(!dom.has_pending());
    }

    #[test]
    fn test_pop_allowed_drains_to_empty() {
        let mut dom = domain_with_rules(vec![RobotsRule::disallow("/")]);
        dom.push_pending(page("/a", 1));
        dom.push_pending(page("/b", 2));

        let (popped, skipped) = dom.pop_allowed();
        assert!(popped.is_none());
        assert_eq!(skipped.len(), 2);
        assert!(!dom.has_pending());
    }

    #[test]
    fn test_pop_without_rules_yields_nothing() {
        let mut dom = Domain::new("example.br", "http", Instant::now());
        dom.push_pending(page("/a", 1));

        let (popped, skipped) = dom.pop_allowed();
        assert!(popped.is_none());
        assert!(skipped.is_empty());
        assert!(dom.has_pending());
    }

    #[test]
    fn test_robots_url_keeps_scheme() {
        let dom = Domain::new("seguro.br", "https", Instant::now());
        assert_eq!(dom.robots_url(), "https://seguro.br/robots.txt");
    }
}
