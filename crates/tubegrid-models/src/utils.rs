//! Presentation helpers shared with view layers.

/// Format a duration in seconds as `m:ss`.
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "0:00".to_string();
    }
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a view count compactly (`982`, `1.5K`, `2.3M`).
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.0), "0:59");
        assert_eq!(format_duration(65.0), "1:05");
        assert_eq!(format_duration(605.9), "10:05");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn view_formatting() {
        assert_eq!(format_views(982), "982");
        assert_eq!(format_views(1_500), "1.5K");
        assert_eq!(format_views(2_340_000), "2.3M");
    }
}
