use std::time::Duration;

use crate::error::PlacefinderError;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(200);
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

/// Timing and threshold settings for the autocomplete engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long typing must pause before a lookup is issued.
    pub quiet_period: Duration,
    /// Delay between losing focus and hiding the results panel, so that a tap
    /// on a candidate (which itself blurs the input) is handled first.
    pub blur_grace: Duration,
    /// Queries with fewer characters never reach the provider.
    pub min_query_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            blur_grace: DEFAULT_BLUR_GRACE,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

/// Builder for creating engine configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create a builder that reacts quickly to typing (more lookups)
    pub fn responsive() -> Self {
        let mut builder = Self::new();
        builder.config.quiet_period = Duration::from_millis(150);
        builder
    }

    /// Create a builder for providers with strict rate limits (fewer lookups)
    pub fn conservative() -> Self {
        let mut builder = Self::new();
        builder.config.quiet_period = Duration::from_millis(600);
        builder.config.min_query_chars = 3;
        builder
    }

    /// Set the debounce quiet period
    pub fn quiet_period(mut self, quiet_period: Duration) -> Self {
        self.config.quiet_period = quiet_period;
        self
    }

    /// Set the delay before a blur hides the results panel
    pub fn blur_grace(mut self, blur_grace: Duration) -> Self {
        self.config.blur_grace = blur_grace;
        self
    }

    /// Set the minimum number of characters before a lookup is issued
    pub fn min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.config.min_query_chars = min_query_chars;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<EngineConfig, PlacefinderError> {
        if self.config.min_query_chars == 0 {
            return Err(PlacefinderError::ConfigError(
                "Minimum query length must be at least 1 character".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = EngineConfigBuilder::new().build().unwrap();
        assert_eq!(config.quiet_period, Duration::from_millis(300));
        assert_eq!(config.blur_grace, Duration::from_millis(200));
        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_presets() {
        let responsive = EngineConfigBuilder::responsive().build().unwrap();
        assert_eq!(responsive.quiet_period, Duration::from_millis(150));
        assert_eq!(responsive.min_query_chars, 2);

        let conservative = EngineConfigBuilder::conservative().build().unwrap();
        assert_eq!(conservative.quiet_period, Duration::from_millis(600));
        assert_eq!(conservative.min_query_chars, 3);
    }

    #[test]
    fn test_override_presets() {
        let config = EngineConfigBuilder::conservative()
            .min_query_chars(2)
            .blur_grace(Duration::from_millis(50))
            .build()
            .unwrap();

        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config.blur_grace, Duration::from_millis(50));
        assert_eq!(config.quiet_period, Duration::from_millis(600));
    }

    #[test]
    fn test_zero_minimum_is_rejected() {
        let result = EngineConfig::builder().min_query_chars(0).build();
        assert!(matches!(result, Err(PlacefinderError::ConfigError(_))));
    }
}
