//! Per-rule performance samples and cumulative cache counters.
//!
//! Plain append-only storage: callers aggregate. Every operation tolerates a
//! poisoned lock, so recording a sample can never fail.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheLookup;

/// Phase of a rule check a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Phase {
    #[serde(rename = "parse_time")]
    Parse,
    #[serde(rename = "check_time")]
    Check,
    #[serde(rename = "total_time")]
    Total,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Parse => "parse_time",
            Self::Check => "check_time",
            Self::Total => "total_time",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Samples for one rule type, keyed by phase.
pub type PhaseSamples = BTreeMap<Phase, Vec<Duration>>;

/// Aggregated timing for one rule type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTiming {
    pub rule_type: String,
    pub checks: usize,
    pub total_check_time: Duration,
    pub mean_check_time: Duration,
    pub total_time: Duration,
}

#[derive(Debug, Default)]
pub struct PerformanceMetrics {
    samples: Mutex<BTreeMap<String, PhaseSamples>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, rule_type: &str, phase: Phase, duration: Duration) {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        samples
            .entry(rule_type.to_string())
            .or_default()
            .entry(phase)
            .or_default()
            .push(duration);
    }

    pub fn record_cache_access(&self, lookup: CacheLookup) {
        match lookup {
            CacheLookup::Hit => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            CacheLookup::Miss => self.cache_misses.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Cumulative `(hits, misses)` observed by rule checks.
    pub fn cache_counters(&self) -> (u64, u64) {
        (
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }

    /// Snapshot of every sample, ordered by rule type then phase.
    pub fn metrics(&self) -> BTreeMap<String, PhaseSamples> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn samples(&self, rule_type: &str, phase: Phase) -> Vec<Duration> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(rule_type)
            .and_then(|phases| phases.get(&phase))
            .cloned()
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Vec<RuleTiming> {
        let samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        samples
            .iter()
            .map(|(rule_type, phases)| {
                let checks = phases.get(&Phase::Check).map(Vec::as_slice).unwrap_or(&[]);
                let total_check_time: Duration = checks.iter().sum();
                let mean_check_time = if checks.is_empty() {
                    Duration::ZERO
                } else {
                    total_check_time / checks.len() as u32
                };
                RuleTiming {
                    rule_type: rule_type.clone(),
                    checks: checks.len(),
                    total_check_time,
                    mean_check_time,
                    total_time: phases
                        .get(&Phase::Total)
                        .map(|v| v.iter().sum())
                        .unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Truncate every record, including the cache counters.
    pub fn clear(&self) {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_append_in_order() {
        let m = PerformanceMetrics::new();
        m.record("StyleRule", Phase::Check, Duration::from_millis(2));
        m.record("StyleRule", Phase::Check, Duration::from_millis(4));
        assert_eq!(
            m.samples("StyleRule", Phase::Check),
            vec![Duration::from_millis(2), Duration::from_millis(4)]
        );
        assert!(m.samples("StyleRule", Phase::Parse).is_empty());
    }

    #[test]
    fn summary_aggregates_check_time() {
        let m = PerformanceMetrics::new();
        m.record("A", Phase::Check, Duration::from_millis(2));
        m.record("A", Phase::Check, Duration::from_millis(4));
        m.record("A", Phase::Total, Duration::from_millis(10));
        let s = m.summary();
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].checks, 2);
        assert_eq!(s[0].mean_check_time, Duration::from_millis(3));
        assert_eq!(s[0].total_time, Duration::from_millis(10));
    }

    #[test]
    fn phase_names_match_serialized_keys() {
        for phase in [Phase::Parse, Phase::Check, Phase::Total] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.name()));
        }
    }
}
