//! Count-by-bucket aggregation over a location collection

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::location::Location;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// One labeled count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatBucket {
    pub label: String,
    pub count: usize,
}

/// Ordered label -> count buckets plus their total
///
/// The total is kept outside the bucket list so it can never be rendered as
/// a bucket of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatBucketMap {
    buckets: Vec<StatBucket>,
    total: usize,
}

impl StatBucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with every label pre-seeded at zero, in the given order
    pub fn with_labels(labels: &[&str]) -> Self {
        Self {
            buckets: labels
                .iter()
                .map(|label| StatBucket {
                    label: label.to_string(),
                    count: 0,
                })
                .collect(),
            total: 0,
        }
    }

    /// Count one item under `label`, appending the label if it is new
    pub fn increment(&mut self, label: &str) {
        match self.buckets.iter_mut().find(|b| b.label == label) {
            Some(bucket) => bucket.count += 1,
            None => self.buckets.push(StatBucket {
                label: label.to_string(),
                count: 1,
            }),
        }
        self.total += 1;
    }

    pub fn get(&self, label: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn buckets(&self) -> &[StatBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Serialize for StatBucketMap {
    /// `{"<label>": count, ..., "total": n}`
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len() + 1))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.label, &bucket.count)?;
        }
        map.serialize_entry("total", &self.total)?;
        map.end()
    }
}

/// Recency class of a location's last update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    /// Updated within the last 24 hours
    Today,
    /// Updated, but more than a day ago
    Past,
    /// Never updated since creation
    Never,
}

impl RecencyBucket {
    pub const ALL: [RecencyBucket; 3] = [RecencyBucket::Today, RecencyBucket::Past, RecencyBucket::Never];

    pub fn label(&self) -> &'static str {
        match self {
            RecencyBucket::Today => "today",
            RecencyBucket::Past => "past",
            RecencyBucket::Never => "never",
        }
    }

    pub fn classify(loc: &Location, now_ms: i64) -> Self {
        if !loc.is_updated() {
            RecencyBucket::Never
        } else if now_ms.saturating_sub(loc.updated_at) < DAY_MS {
            RecencyBucket::Today
        } else {
            RecencyBucket::Past
        }
    }
}

/// Group locations by their literal rate, ascending, only rates that occur
pub fn aggregate_by_rate(locations: &[Location]) -> StatBucketMap {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for loc in locations {
        *counts.entry(loc.rate).or_insert(0) += 1;
    }

    let buckets: Vec<StatBucket> = counts
        .into_iter()
        .map(|(rate, count)| StatBucket {
            label: rate.to_string(),
            count,
        })
        .collect();

    StatBucketMap {
        buckets,
        total: locations.len(),
    }
}

/// Group locations into `today` / `past` / `never` by their last update
pub fn aggregate_by_recency(locations: &[Location], now_ms: i64) -> StatBucketMap {
    let labels: Vec<&str> = RecencyBucket::ALL.iter().map(|b| b.label()).collect();
    let mut map = StatBucketMap::with_labels(&labels);
    for loc in locations {
        map.increment(RecencyBucket::classify(loc, now_ms).label());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Geo;

    const NOW: i64 = 1_700_000_000_000;

    fn loc(id: &str, rate: u8, created_at: i64, updated_at: i64) -> Location {
        Location {
            id: id.to_string(),
            name: format!("Place {}", id),
            rate,
            geo: Geo::new(0.0, 0.0, ""),
            created_at,
            updated_at,
        }
    }

    #[test]
    fn test_rate_scenario() {
        let locs: Vec<Location> = [1, 1, 3, 5, 5, 5]
            .iter()
            .enumerate()
            .map(|(i, r)| loc(&i.to_string(), *r, NOW, NOW))
            .collect();

        let map = aggregate_by_rate(&locs);
        let labels: Vec<&str> = map.buckets().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "3", "5"]);
        assert_eq!(map.get("1"), 2);
        assert_eq!(map.get("3"), 1);
        assert_eq!(map.get("5"), 3);
        assert_eq!(map.get("2"), 0);
        assert_eq!(map.total(), 6);
    }

    #[test]
    fn test_bucket_counts_sum_to_total() {
        let locs: Vec<Location> = (0..23)
            .map(|i| loc(&i.to_string(), (i % 5 + 1) as u8, NOW - i * DAY_MS, NOW - i * 1000))
            .collect();

        for map in [aggregate_by_rate(&locs), aggregate_by_recency(&locs, NOW)] {
            let sum: usize = map.buckets().iter().map(|b| b.count).sum();
            assert_eq!(sum, map.total());
            assert_eq!(map.total(), locs.len());
        }
    }

    #[test]
    fn test_empty_input() {
        let map = aggregate_by_rate(&[]);
        assert_eq!(map.total(), 0);
        assert!(map.buckets().is_empty());

        let map = aggregate_by_recency(&[], NOW);
        assert_eq!(map.total(), 0);
        assert!(map.buckets().iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_recency_buckets() {
        let locs = vec![
            loc("a", 3, NOW - 5 * DAY_MS, NOW - 5 * DAY_MS),
            loc("b", 3, NOW - 5 * DAY_MS, NOW - 1000),
            loc("c", 3, NOW - 5 * DAY_MS, NOW - 2 * DAY_MS),
            loc("d", 3, NOW - 1000, NOW - 1000),
        ];
        let map = aggregate_by_recency(&locs, NOW);
        let labels: Vec<&str> = map.buckets().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["today", "past", "never"]);
        assert_eq!(map.get("today"), 1);
        assert_eq!(map.get("past"), 1);
        assert_eq!(map.get("never"), 2);
        assert_eq!(map.total(), 4);
    }

    #[test]
    fn test_recency_with_extreme_timestamps() {
        let ancient = loc("a", 2, i64::MIN, i64::MIN + 1);
        assert_eq!(RecencyBucket::classify(&ancient, i64::MAX), RecencyBucket::Past);

        // Updated "after" now, as in a hand-edited store
        let future = loc("b", 2, i64::MIN, i64::MAX);
        assert_eq!(RecencyBucket::classify(&future, i64::MIN), RecencyBucket::Today);
    }

    #[test]
    fn test_serialize_shape() {
        let locs = vec![loc("a", 2, NOW, NOW), loc("b", 4, NOW, NOW)];
        let json = serde_json::to_string(&aggregate_by_rate(&locs)).unwrap();
        assert_eq!(json, r#"{"2":1,"4":1,"total":2}"#);
    }
}
