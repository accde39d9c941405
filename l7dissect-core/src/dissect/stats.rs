//! Decoder coverage counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::Classification;

#[derive(Debug)]
struct DissectorCount {
    name: &'static str,
    matches: AtomicU64,
}

/// Per-pipeline outcome counters.
///
/// Updated with relaxed atomics on every dispatch; reading them never
/// influences classification.
#[derive(Debug, Default)]
pub struct DecoderStats {
    unclassified: AtomicU64,
    coarse: AtomicU64,
    detailed: AtomicU64,
    rejected: AtomicU64,
    by_dissector: Vec<DissectorCount>,
}

impl DecoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a per-dissector slot. Called at registration time.
    pub(crate) fn track(&mut self, name: &'static str) {
        if !self.by_dissector.iter().any(|c| c.name == name) {
            self.by_dissector.push(DissectorCount {
                name,
                matches: AtomicU64::new(0),
            });
        }
    }

    /// Count one dispatch outcome.
    pub(crate) fn record(&self, classification: Classification, dissector: Option<&'static str>) {
        let counter = match classification {
            Classification::Unclassified => &self.unclassified,
            Classification::Classified { detailed: false } => &self.coarse,
            Classification::Classified { detailed: true } => &self.detailed,
            Classification::Rejected => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let (Classification::Classified { .. }, Some(name)) = (classification, dissector) {
            if let Some(slot) = self.by_dissector.iter().find(|c| c.name == name) {
                slot.matches.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> DecoderStatsSnapshot {
        DecoderStatsSnapshot {
            unclassified: self.unclassified.load(Ordering::Relaxed),
            coarse: self.coarse.load(Ordering::Relaxed),
            detailed: self.detailed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            by_dissector: self
                .by_dissector
                .iter()
                .map(|c| (c.name, c.matches.load(Ordering::Relaxed)))
                .collect(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.unclassified.store(0, Ordering::Relaxed);
        self.coarse.store(0, Ordering::Relaxed);
        self.detailed.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        for slot in &self.by_dissector {
            slot.matches.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of [`DecoderStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderStatsSnapshot {
    pub unclassified: u64,
    pub coarse: u64,
    pub detailed: u64,
    pub rejected: u64,
    /// Accepted messages per dissector, in registration order.
    pub by_dissector: Vec<(&'static str, u64)>,
}

impl DecoderStatsSnapshot {
    /// Total number of dispatched messages.
    pub fn total(&self) -> u64 {
        self.unclassified + self.coarse + self.detailed + self.rejected
    }

    /// Fraction of messages that were classified (coarse or detailed).
    pub fn coverage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.coarse + self.detailed) as f64 / total as f64
        }
    }

    /// Accepted-message count for one dissector.
    pub fn matches(&self, dissector: &str) -> Option<u64> {
        self.by_dissector
            .iter()
            .find(|(name, _)| *name == dissector)
            .map(|(_, count)| *count)
    }

    /// Fold another snapshot into this one.
    pub fn merge(&mut self, other: &DecoderStatsSnapshot) {
        self.unclassified += other.unclassified;
        self.coarse += other.coarse;
        self.detailed += other.detailed;
        self.rejected += other.rejected;
        for (name, count) in &other.by_dissector {
            match self.by_dissector.iter_mut().find(|(n, _)| n == name) {
                Some((_, total)) => *total += count,
                None => self.by_dissector.push((*name, *count)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let mut stats = DecoderStats::new();
        stats.track("mysql_query");
        stats.track("mysql_quit");
        stats.track("mysql_query");

        stats.record(Classification::Classified { detailed: true }, Some("mysql_query"));
        stats.record(Classification::Classified { detailed: true }, Some("mysql_query"));
        stats.record(Classification::Rejected, Some("mysql_quit"));
        stats.record(Classification::Unclassified, None);

        let snap = stats.snapshot();
        assert_eq!(snap.detailed, 2);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.unclassified, 1);
        assert_eq!(snap.total(), 4);
        assert_eq!(snap.by_dissector.len(), 2);
        assert_eq!(snap.matches("mysql_query"), Some(2));
        assert_eq!(snap.matches("mysql_quit"), Some(0));
        assert_eq!(snap.matches("mysql_ping"), None);
        assert!((snap.coverage() - 0.5).abs() < f64::EPSILON);

        stats.reset();
        assert_eq!(stats.snapshot().total(), 0);
    }

    #[test]
    fn test_merge() {
        let mut a = DecoderStatsSnapshot {
            detailed: 1,
            by_dissector: vec![("q", 1)],
            ..Default::default()
        };
        let b = DecoderStatsSnapshot {
            coarse: 2,
            by_dissector: vec![("q", 1), ("r", 2)],
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.total(), 3);
        assert_eq!(a.matches("q"), Some(2));
        assert_eq!(a.matches("r"), Some(2));
    }
}
