use crate::error::TrackerError;
use crate::types::Config;
use anyhow::Result;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Startup validation. Malformed parameters are fatal before the first
    /// frame; nothing here is checked again per-frame.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.tracker.stripe_count == 0 {
            return Err(TrackerError::Configuration(
                "tracker.stripe_count must be at least 1".into(),
            ));
        }
        if self.tracker.history_depth < 2 {
            return Err(TrackerError::Configuration(
                "tracker.history_depth must be at least 2 (gap-fill reads one frame back)".into(),
            ));
        }
        if self.tracker.sense == 0 {
            return Err(TrackerError::Configuration(
                "tracker.sense must be at least 1".into(),
            ));
        }
        if self.bird.output_width == 0 || self.bird.output_height == 0 {
            return Err(TrackerError::Configuration(
                "bird.output_width and bird.output_height must be non-zero".into(),
            ));
        }
        if self.detection.line_search_width <= 0.0 {
            return Err(TrackerError::Configuration(
                "detection.line_search_width must be positive".into(),
            ));
        }
        if self.detection.quadratic_gate <= 0.0 {
            return Err(TrackerError::Configuration(
                "detection.quadratic_gate must be positive".into(),
            ));
        }
        Ok(())
    }
}
