//! Proportional pie-chart geometry for a [`StatBucketMap`]
//!
//! A chart is a legend (label, count, color, percent) plus a list of gradient
//! stops. Consecutive slices share a boundary: slice `i` ends at the same
//! cumulative percentage where slice `i + 1` begins, and the last slice always
//! closes at 100%. Per-slice rounding drift is left as is.

use serde::Serialize;

use crate::stats::StatBucketMap;

/// Slice colors, assigned by position after empty buckets are dropped
pub const PALETTE: [&str; 6] = [
    "#e63946", "#f4a261", "#e9c46a", "#2a9d8f", "#457b9d", "#8338ec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub count: usize,
    pub color: &'static str,
    /// `round(count / total * 100)`
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradientStop {
    pub color: &'static str,
    pub percent_at: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PieChart {
    pub legend: Vec<LegendEntry>,
    pub stops: Vec<GradientStop>,
}

/// A single slice as `[from, to]` percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpan {
    pub color: &'static str,
    pub from: u32,
    pub to: u32,
}

impl PieChart {
    pub fn is_empty(&self) -> bool {
        self.legend.is_empty()
    }

    /// Slices in drawing order, read back from the stop pairs
    pub fn spans(&self) -> Vec<SliceSpan> {
        self.stops
            .chunks(2)
            .filter_map(|pair| match pair {
                [start, end] => Some(SliceSpan {
                    color: start.color,
                    from: start.percent_at,
                    to: end.percent_at,
                }),
                _ => None,
            })
            .collect()
    }

    /// CSS `conic-gradient(...)` for web presentation
    pub fn conic_gradient(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|s| format!("{} {}%", s.color, s.percent_at))
            .collect();
        format!("conic-gradient({})", stops.join(", "))
    }
}

fn percent_of(count: usize, total: usize) -> u32 {
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Build a chart with the default [`PALETTE`]
pub fn to_segments(map: &StatBucketMap) -> PieChart {
    to_segments_with_palette(map, &PALETTE)
}

/// Build a chart, cycling through `palette` when there are more slices than colors
pub fn to_segments_with_palette(map: &StatBucketMap, palette: &[&'static str]) -> PieChart {
    let total = map.total();
    if total == 0 || palette.is_empty() {
        return PieChart::default();
    }

    // Zero-count buckets must not consume a color slot
    let legend: Vec<LegendEntry> = map
        .buckets()
        .iter()
        .filter(|b| b.count > 0)
        .enumerate()
        .map(|(idx, b)| LegendEntry {
            label: b.label.clone(),
            count: b.count,
            color: palette[idx % palette.len()],
            percent: percent_of(b.count, total),
        })
        .collect();

    let Some(last) = legend.last() else {
        return PieChart::default();
    };

    let mut stops = vec![GradientStop {
        color: legend[0].color,
        percent_at: 0,
    }];
    // Rounded slices may carry the running sum past 100 before the final stop
    let mut sum_percent = 0;
    for pair in legend.windows(2) {
        sum_percent += pair[0].percent;
        stops.push(GradientStop {
            color: pair[0].color,
            percent_at: sum_percent,
        });
        stops.push(GradientStop {
            color: pair[1].color,
            percent_at: sum_percent,
        });
    }
    stops.push(GradientStop {
        color: last.color,
        percent_at: 100,
    });

    PieChart { legend, stops }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(counts: &[(&str, usize)]) -> StatBucketMap {
        let labels: Vec<&str> = counts.iter().map(|(l, _)| *l).collect();
        let mut map = StatBucketMap::with_labels(&labels);
        for (label, count) in counts {
            for _ in 0..*count {
                map.increment(label);
            }
        }
        map
    }

    #[test]
    fn test_rate_scenario() {
        let chart = to_segments(&map_from(&[("1", 2), ("3", 1), ("5", 3)]));

        let counts: Vec<usize> = chart.legend.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![2, 1, 3]);
        let percents: Vec<u32> = chart.legend.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![33, 17, 50]);

        let spans = chart.spans();
        let bounds: Vec<(u32, u32)> = spans.iter().map(|s| (s.from, s.to)).collect();
        assert_eq!(bounds, vec![(0, 33), (33, 50), (50, 100)]);
        assert_eq!(spans[0].color, PALETTE[0]);
        assert_eq!(spans[2].color, PALETTE[2]);
    }

    #[test]
    fn test_zero_buckets_skip_color_slots() {
        let chart = to_segments(&map_from(&[("today", 0), ("past", 1), ("never", 3)]));
        assert_eq!(chart.legend.len(), 2);
        assert_eq!(chart.legend[0].label, "past");
        assert_eq!(chart.legend[0].color, PALETTE[0]);
        assert_eq!(chart.legend[1].color, PALETTE[1]);
    }

    #[test]
    fn test_empty_and_all_zero() {
        assert!(to_segments(&StatBucketMap::new()).is_empty());
        let chart = to_segments(&StatBucketMap::with_labels(&["today", "past", "never"]));
        assert!(chart.legend.is_empty());
        assert!(chart.stops.is_empty());
    }

    #[test]
    fn test_single_slice_spans_full_circle() {
        let chart = to_segments(&map_from(&[("4", 7)]));
        assert_eq!(chart.legend[0].percent, 100);
        assert_eq!(
            chart.stops,
            vec![
                GradientStop { color: PALETTE[0], percent_at: 0 },
                GradientStop { color: PALETTE[0], percent_at: 100 },
            ]
        );
    }

    #[test]
    fn test_last_stop_forced_to_hundred() {
        // 1/3 each rounds to 33, so the displayed percents sum to 99
        let chart = to_segments(&map_from(&[("a", 1), ("b", 1), ("c", 1)]));
        let sum: u32 = chart.legend.iter().map(|e| e.percent).sum();
        assert_eq!(sum, 99);
        assert_eq!(chart.stops.last().map(|s| s.percent_at), Some(100));
        assert_eq!(chart.legend[2].count, 1);
    }

    #[test]
    fn test_rounding_drift_past_hundred() {
        // 21/200 rounds up three times and 1/200 rounds up once: the slices sum to 101
        let chart = to_segments(&map_from(&[("a", 21), ("b", 21), ("c", 21), ("d", 136), ("e", 1)]));
        let percents: Vec<u32> = chart.legend.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![11, 11, 11, 68, 1]);

        let stops: Vec<u32> = chart.stops.iter().map(|s| s.percent_at).collect();
        assert_eq!(stops, vec![0, 11, 11, 22, 22, 33, 33, 101, 101, 100]);
    }

    #[test]
    fn test_palette_cycles() {
        let chart = to_segments_with_palette(&map_from(&[("a", 1), ("b", 1), ("c", 1)]), &["#111", "#222"]);
        let colors: Vec<&str> = chart.legend.iter().map(|e| e.color).collect();
        assert_eq!(colors, vec!["#111", "#222", "#111"]);
    }

    #[test]
    fn test_conic_gradient() {
        let chart = to_segments_with_palette(&map_from(&[("a", 1), ("b", 1)]), &["#111", "#222"]);
        assert_eq!(
            chart.conic_gradient(),
            "conic-gradient(#111 0%, #111 50%, #222 50%, #222 100%)"
        );
    }
}
