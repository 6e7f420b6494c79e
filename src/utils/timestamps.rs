use chrono::{DateTime, Datelike, Utc};

/// Render a record's save time for listings:
/// - Relative under a week: "just now", "12m ago", "3h ago", "2d ago"
/// - Absolute otherwise: "Jan 15", or "Dec 3, 2024" for other years
pub fn format_saved_at(saved_at: &DateTime<Utc>) -> String {
    format_saved_at_relative_to(saved_at, &Utc::now())
}

pub(crate) fn format_saved_at_relative_to(saved_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*saved_at);

    // Clock skew can put a fresh record slightly in the future
    if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    }

    if elapsed.num_days() >= 7 {
        return if saved_at.year() == now.year() {
            saved_at.format("%b %-d").to_string()
        } else {
            saved_at.format("%b %-d, %Y").to_string()
        };
    }

    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}m ago", elapsed.num_minutes())
    }
}
