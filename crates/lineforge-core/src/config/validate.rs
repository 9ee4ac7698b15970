//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, RunPlan};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.workers == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.workers must be > 0".into(),
            ));
        }
        for (name, value) in [
            ("preprocess.black_clip", self.preprocess.black_clip),
            ("preprocess.white_clip", self.preprocess.white_clip),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0 and 100"
                )));
            }
        }
        if self.preprocess.blur < 0.0 {
            return Err(ConfigError::ValidationError(
                "preprocess.blur must be >= 0".into(),
            ));
        }
        if self.pad.size == 0 {
            return Err(ConfigError::ValidationError("pad.size must be > 0".into()));
        }
        if self.pad.jpeg_quality == 0 || self.pad.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "pad.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.export.width == 0 {
            return Err(ConfigError::ValidationError(
                "export.width must be > 0".into(),
            ));
        }
        RunPlan::from_config(self).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_validate_rejects_zero_pad_size() {
        let mut config = Config::default();
        config.pad.size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pad.size"));
    }

    #[test]
    fn test_validate_rejects_bad_jpeg_quality() {
        let mut config = Config::default();
        config.pad.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_rejects_clip_out_of_range() {
        let mut config = Config::default();
        config.preprocess.white_clip = 120.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("white_clip"));
    }

    #[test]
    fn test_validate_rejects_unknown_finish_mode() {
        let mut config = Config::default();
        config.preprocess.finish_mode = "posterize".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("finish_mode"));
    }
}
