//! Utility functions shared by the CLI and the interactive UI

use chrono::{Duration, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ===== TIME UTILITIES =====

/// Current time in milliseconds since epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {} ago", n, unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Human-readable age of a timestamp relative to `now_ms`
pub fn elapsed_time(past_ms: i64, now_ms: i64) -> String {
    let elapsed = Duration::milliseconds(now_ms.saturating_sub(past_ms).max(0));

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

// ===== STRING UTILITIES =====

/// Truncates to a display width, adding "..." if truncated
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 3 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str("...");
    out
}
