//! Search collaborator contract.
//!
//! The browser-automation search step is an external collaborator; the
//! pipeline only depends on its output shape and on a filtering policy
//! that is deployment configuration, not code.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One candidate media item returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaItem {
    /// Platform media identifier
    pub id: String,
    pub title: String,
    /// Channel / author label
    pub channel: String,
    /// Duration in seconds
    pub duration_secs: u64,
    /// Resolvable media locator for the fetcher
    pub url: String,
    pub thumbnail_url: String,
    pub view_count: u64,
}

/// Configurable selection policy applied to search results.
///
/// Thresholds are product policy; `None` disables a bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    pub min_duration_secs: Option<u64>,
    pub max_duration_secs: Option<u64>,
    pub min_view_count: Option<u64>,
}

impl SearchFilter {
    /// Load thresholds from `VIGIE_SEARCH_*` environment variables.
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<u64> {
            std::env::var(name).ok().and_then(|s| s.parse().ok())
        }
        Self {
            min_duration_secs: var("VIGIE_SEARCH_MIN_DURATION_SECS"),
            max_duration_secs: var("VIGIE_SEARCH_MAX_DURATION_SECS"),
            min_view_count: var("VIGIE_SEARCH_MIN_VIEWS"),
        }
    }

    /// Check whether a single item passes the policy.
    pub fn matches(&self, item: &MediaItem) -> bool {
        if let Some(min) = self.min_duration_secs {
            if item.duration_secs < min {
                return false;
            }
        }
        if let Some(max) = self.max_duration_secs {
            if item.duration_secs > max {
                return false;
            }
        }
        if let Some(min) = self.min_view_count {
            if item.view_count < min {
                return false;
            }
        }
        true
    }

    /// Apply the policy to a result list, preserving order.
    pub fn apply(&self, items: Vec<MediaItem>) -> Vec<MediaItem> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(duration_secs: u64, view_count: u64) -> MediaItem {
        MediaItem {
            id: "abc123".to_string(),
            title: "T".to_string(),
            channel: "C".to_string(),
            duration_secs,
            url: "https://example/video/abc123".to_string(),
            thumbnail_url: "https://example/thumb/abc123.jpg".to_string(),
            view_count,
        }
    }

    #[test]
    fn test_unconfigured_filter_keeps_everything() {
        let filter = SearchFilter::default();
        assert!(filter.matches(&item(5, 0)));
        assert!(filter.matches(&item(7200, 1)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = SearchFilter {
            min_duration_secs: Some(10),
            max_duration_secs: Some(180),
            min_view_count: Some(1000),
        };

        assert!(filter.matches(&item(10, 1000)));
        assert!(filter.matches(&item(180, 5000)));
        assert!(!filter.matches(&item(9, 1000)));
        assert!(!filter.matches(&item(181, 1000)));
        assert!(!filter.matches(&item(60, 999)));
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = SearchFilter {
            min_duration_secs: None,
            max_duration_secs: Some(60),
            min_view_count: None,
        };
        let mut a = item(30, 0);
        a.id = "a".to_string();
        let mut b = item(90, 0);
        b.id = "b".to_string();
        let mut c = item(45, 0);
        c.id = "c".to_string();

        let kept = filter.apply(vec![a, b, c]);
        let ids: Vec<_> = kept.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
