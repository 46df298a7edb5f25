//! Domain registry: all known domains plus the two cross-domain queues
//!
//! The registry is the single ownership point for [`Domain`] values; the
//! queues hold hostname keys, never the domains themselves, so moving a
//! domain between queues can never invalidate anything.
//!
//! Two-tier scheduling structure:
//! - `idle`: domains whose politeness timestamp has not elapsed, in append
//!   order. Append order tracks timestamps only approximately (each domain's
//!   own timestamps grow monotonically, but interleaved appends do not), so
//!   eligibility is re-checked by scanning from the front on every refresh
//!   instead of trusting the order.
//! - `active`: domains eligible right now, ranked by the backlog snapshot
//!   taken at promotion time; ties go to the staler timestamp, then to the
//!   hostname so the order is total.

use crate::crawler::domain::{Domain, QueueSlot};
use crate::crawler::politeness::PolitenessClock;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Active-queue entry; the ordering key is frozen at promotion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEntry {
    pub backlog: usize,
    pub stamp: Instant,
    pub host: String,
}

impl Ord for ActiveEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger backlog first; on ties the smaller (staler) timestamp wins,
        // then the hostname keeps the order total.
        self.backlog
            .cmp(&other.backlog)
            .then_with(|| other.stamp.cmp(&self.stamp))
            .then_with(|| other.host.cmp(&self.host))
    }
}

impl PartialOrd for ActiveEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
pub struct DomainRegistry {
    domains: HashMap<String, Domain>,
    idle: VecDeque<String>,
    active: BinaryHeap<ActiveEntry>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.domains.contains_key(host)
    }

    pub fn get(&self, host: &str) -> Option<&Domain> {
        self.domains.get(host)
    }

    pub fn get_mut(&mut self, host: &str) -> Option<&mut Domain> {
        self.domains.get_mut(host)
    }

    pub fn insert(&mut self, domain: Domain) {
        self.domains.insert(domain.name.clone(), domain);
    }

    /// True when no domain is queued anywhere, i.e. there is no pending work.
    pub fn queues_empty(&self) -> bool {
        self.idle.is_empty() && self.active.is_empty()
    }

    pub fn active_is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn queue_depths(&self) -> (usize, usize) {
        (self.active.len(), self.idle.len())
    }

    /// Appends a domain to the idle queue if it has pending work and is not
    /// queued already. Returns true when the domain was actually enqueued.
    pub fn enqueue_idle(&mut self, host: &str) -> bool {
        let Some(dom) = self.domains.get_mut(host) else {
            return false;
        };
        if dom.slot != QueueSlot::Out || !dom.has_pending() {
            return false;
        }
        dom.slot = QueueSlot::Idle;
        self.idle.push_back(dom.name.clone());
        true
    }

    /// Moves every time-eligible idle domain into the active queue,
    /// snapshotting its backlog as the priority key.
    ///
    /// The whole idle queue is scanned; relative order of the domains left
    /// behind is preserved. Domains with an outstanding robots fetch stay
    /// idle: they cannot produce a page until their rules arrive, and
    /// promoting them would just spin the selection loop.
    pub fn promote_eligible(&mut self, clock: &PolitenessClock, now: Instant) {
        let mut still_idle = VecDeque::with_capacity(self.idle.len());
        while let Some(host) = self.idle.pop_front() {
            let Some(dom) = self.domains.get_mut(&host) else {
                continue;
            };
            if matches!(dom.robots, crate::robots::RobotsState::Fetching) {
                still_idle.push_back(host);
                continue;
            }
            if clock.is_eligible(dom.not_before, now) {
                dom.slot = QueueSlot::Active;
                dom.promoted_backlog = dom.backlog();
                self.active.push(ActiveEntry {
                    backlog: dom.promoted_backlog,
                    stamp: dom.not_before,
                    host,
                });
            } else {
                still_idle.push_back(host);
            }
        }
        self.idle = still_idle;
    }

    /// Removes the highest-priority active domain and returns its hostname.
    /// The domain's slot is cleared; the caller decides whether it goes back
    /// into a queue afterwards.
    pub fn pop_active(&mut self) -> Option<String> {
        let entry = self.active.pop()?;
        if let Some(dom) = self.domains.get_mut(&entry.host) {
            dom.slot = QueueSlot::Out;
        }
        Some(entry.host)
    }

    /// Timestamp of the idle queue's front domain, the next candidate for
    /// promotion.
    pub fn next_idle_stamp(&self) -> Option<Instant> {
        let host = self.idle.front()?;
        self.domains.get(host).map(|d| d.not_before)
    }

    /// Time until any queued domain becomes eligible: zero if one already
    /// is, otherwise the minimum over the idle queue.
    pub fn next_eligibility(&self, clock: &PolitenessClock, now: Instant) -> Option<Duration> {
        if !self.active.is_empty() {
            return Some(Duration::ZERO);
        }
        self.idle
            .iter()
            .filter_map(|host| self.domains.get(host))
            .map(|dom| clock.until_eligible(dom.not_before, now).unwrap_or(Duration::ZERO))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::domain::PendingPage;

    fn clock() -> PolitenessClock {
        PolitenessClock::new(Duration::from_secs(30))
    }

    fn pending(path: &str, docid: u64) -> PendingPage {
        PendingPage {
            path: path.to_string(),
            url: format!("http://host.br{}", path),
            docid,
        }
    }

    fn registry_with(hosts: &[(&str, usize)], now: Instant) -> DomainRegistry {
        let mut reg = DomainRegistry::new();
        for (host, pages) in hosts {
            let mut dom = Domain::new(*host, "http", now);
            for i in 0..*pages {
                dom.push_pending(pending(&format!("/p{}", i), i as u64 + 1));
            }
            reg.insert(dom);
            reg.enqueue_idle(host);
        }
        reg
    }

    #[test]
    fn test_enqueue_requires_pending_work() {
        let now = Instant::now();
        let mut reg = DomainRegistry::new();
        reg.insert(Domain::new("empty.br", "http", now));

        assert!(!reg.enqueue_idle("empty.br"));
        assert!(reg.queues_empty());
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let now = Instant::now();
        let mut reg = registry_with(&[("a.br", 1)], now);

        assert!(!reg.enqueue_idle("a.br"));
        assert_eq!(reg.queue_depths(), (0, 1));
    }

    #[test]
    fn test_promotion_moves_eligible_domains() {
        let now = Instant::now();
        let mut reg = registry_with(&[("a.br", 2)], now);

        reg.promote_eligible(&clock(), now);
        assert_eq!(reg.queue_depths(), (1, 0));
        assert_eq!(reg.get("a.br").unwrap().slot, QueueSlot::Active);
        assert_eq!(reg.get("a.br").unwrap().promoted_backlog, 2);
    }

    #[test]
    fn test_promotion_skips_not_yet_eligible() {
        let now = Instant::now();
        let mut reg = registry_with(&[("a.br", 1)], now);
        reg.get_mut("a.br").unwrap().not_before = now + Duration::from_secs(10);

        reg.promote_eligible(&clock(), now);
        assert_eq!(reg.queue_depths(), (0, 1));
    }

    #[test]
    fn test_larger_backlog_pops_first() {
        let now = Instant::now();
        let mut reg = registry_with(&[("small.br", 1), ("big.br", 5)], now);

        reg.promote_eligible(&clock(), now);
        assert_eq!(reg.pop_active().as_deref(), Some("big.br"));
        assert_eq!(reg.pop_active().as_deref(), Some("small.br"));
        assert!(reg.pop_active().is_none());
    }

    #[test]
    fn test_backlog_tie_goes_to_staler_timestamp() {
        let now = Instant::now();
        let mut reg = registry_with(&[("newer.br", 3), ("older.br", 3)], now);
        reg.get_mut("older.br").unwrap().not_before = now - Duration::from_secs(60);

        reg.promote_eligible(&clock(), now);
        assert_eq!(reg.pop_active().as_deref(), Some("older.br"));
        assert_eq!(reg.pop_active().as_deref(), Some("newer.br"));
    }

    #[test]
    fn test_next_eligibility_with_active_work() {
        let now = Instant::now();
        let mut reg = registry_with(&[("a.br", 1)], now);
        reg.promote_eligible(&clock(), now);

        assert_eq!(reg.next_eligibility(&clock(), now), Some(Duration::ZERO));
    }

    #[test]
    fn test_next_eligibility_counts_down_idle() {
        let now = Instant::now();
        let mut reg = registry_with(&[("a.br", 1)], now);
        reg.get_mut("a.br").unwrap().not_before = now + Duration::from_secs(7);

        assert_eq!(
            reg.next_eligibility(&clock(), now),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn test_next_eligibility_empty_registry() {
        let reg = DomainRegistry::new();
        assert_eq!(reg.next_eligibility(&clock(), Instant::now()), None);
    }
}
