//! Engine configuration.
//!
//! All knobs have defaults matching the documented behavior, so
//! `EngineConfig::default()` is what most callers want.

use serde::{Deserialize, Serialize};

/// Back-to-back window for the lecturer preference check (minutes).
pub const DEFAULT_BACK_TO_BACK_MINUTES: u32 = 15;
/// Session count above which conflict detection buckets before comparing.
pub const DEFAULT_BUCKET_THRESHOLD: usize = 10_000;
/// Confidence an import match needs to count as an existing entity.
pub const DEFAULT_MATCH_CONFIDENCE: f64 = 0.8;

/// Settings shared by the engine, the detector and the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// A following session starting less than this many minutes after one
    /// ends counts as back-to-back.
    pub back_to_back_minutes: u32,
    /// Evaluate constraints and conflict scans on the rayon pool.
    pub parallel: bool,
    /// Bucket sessions by (day, resource) above this many sessions.
    pub bucket_threshold: usize,
    /// Minimum import match confidence for "existing".
    pub match_confidence_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            back_to_back_minutes: DEFAULT_BACK_TO_BACK_MINUTES,
            parallel: false,
            bucket_threshold: DEFAULT_BUCKET_THRESHOLD,
            match_confidence_threshold: DEFAULT_MATCH_CONFIDENCE,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the back-to-back window.
    pub fn with_back_to_back_minutes(mut self, minutes: u32) -> Self {
        self.back_to_back_minutes = minutes;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the bucketing threshold.
    pub fn with_bucket_threshold(mut self, threshold: usize) -> Self {
        self.bucket_threshold = threshold;
        self
    }

    /// Sets the import match confidence threshold, clamped to [0, 1].
    pub fn with_match_confidence(mut self, threshold: f64) -> Self {
        self.match_confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.back_to_back_minutes, 15);
        assert!(!cfg.parallel);
        assert_eq!(cfg.bucket_threshold, 10_000);
        assert!((cfg.match_confidence_threshold - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"parallel": true}"#).unwrap();
        assert!(cfg.parallel);
        assert_eq!(cfg.back_to_back_minutes, 15);
        assert_eq!(cfg.bucket_threshold, 10_000);
    }

    #[test]
    fn test_builder() {
        let cfg = EngineConfig::new()
            .with_back_to_back_minutes(10)
            .with_parallel(true)
            .with_bucket_threshold(0)
            .with_match_confidence(2.0);
        assert_eq!(cfg.back_to_back_minutes, 10);
        assert!(cfg.parallel);
        assert_eq!(cfg.bucket_threshold, 0);
        assert!((cfg.match_confidence_threshold - 1.0).abs() < 1e-10);
    }
}
