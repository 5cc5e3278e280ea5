use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored value together with the moment it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes()
    }

    /// Whether the value is no older than `max_age`. Entries stamped in the
    /// future (clock skew) count as fresh.
    pub fn is_fresh(&self, max_age: std::time::Duration) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => self.age() <= max_age,
            Err(_) => true,
        }
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_buckets() {
        let mut cached = CachedData::new(1);
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.cached_at = Utc::now() - Duration::minutes(125);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");
    }

    #[test]
    fn test_cached_data_is_fresh() {
        let fresh = CachedData::new(1);
        assert!(fresh.is_fresh(std::time::Duration::from_secs(300)));

        let mut old = CachedData::new(1);
        old.cached_at = Utc::now() - Duration::minutes(6);
        assert!(!old.is_fresh(std::time::Duration::from_secs(300)));
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let mut skewed = CachedData::new(1);
        skewed.cached_at = Utc::now() + Duration::minutes(10);
        assert!(skewed.is_fresh(std::time::Duration::ZERO));
        assert_eq!(skewed.age_display(), "just now");
    }
}
