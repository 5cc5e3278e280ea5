use cafefinder_core::Coordinate;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Four decimals is roughly 11 m, plenty for a café.
pub fn format_coordinate(position: Coordinate) -> String {
    format!("{:.4}, {:.4}", position.lat, position.lng)
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Café Coffee Day", 7), "Café...");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(Coordinate::new(12.9716, 77.5946)), "12.9716, 77.5946");
        assert_eq!(format_coordinate(Coordinate::new(-1.5, 0.25)), "-1.5000, 0.2500");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(42.4), "42 m");
        assert_eq!(format_distance(999.0), "999 m");
        assert_eq!(format_distance(1500.0), "1.5 km");
        assert_eq!(format_distance(12_345.0), "12.3 km");
    }
}
