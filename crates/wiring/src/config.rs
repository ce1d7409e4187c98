//! Context configuration.

use std::path::PathBuf;

/// Consumer label attached to every requested GPIO line.
pub const DEFAULT_CONSUMER: &str = "wiring";

/// Directory holding `gpiochipN` and `spidevB.C` nodes.
pub const DEFAULT_DEV_ROOT: &str = "/dev";

/// Configuration for a [`Wiring`](crate::Wiring) context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WiringConfig {
    /// Label the kernel shows as the owner of requested lines.
    pub consumer: String,
    pub dev_root: PathBuf,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            consumer: DEFAULT_CONSUMER.to_owned(),
            dev_root: PathBuf::from(DEFAULT_DEV_ROOT),
        }
    }
}

impl WiringConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> WiringConfigBuilder {
        WiringConfigBuilder::default()
    }
}

/// Builder for ergonomic configuration construction.
#[derive(Debug, Clone, Default)]
pub struct WiringConfigBuilder {
    config: WiringConfig,
}

impl WiringConfigBuilder {
    /// Sets the consumer label.
    pub fn consumer(mut self, consumer: impl Into<String>) -> Self {
        self.config.consumer = consumer.into();
        self
    }

    /// Sets the device directory, e.g. a fixture directory in tests.
    pub fn dev_root(mut self, dev_root: impl Into<PathBuf>) -> Self {
        self.config.dev_root = dev_root.into();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> WiringConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WiringConfig::default();
        assert_eq!(config.consumer, "wiring");
        assert_eq!(config.dev_root, PathBuf::from("/dev"));
    }

    #[test]
    fn builder_overrides() {
        let config = WiringConfig::builder()
            .consumer("relay-board")
            .dev_root("/tmp/dev")
            .build();
        assert_eq!(config.consumer, "relay-board");
        assert_eq!(config.dev_root, PathBuf::from("/tmp/dev"));
    }
}
