//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use ipfsbridge_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let daemon = FakeDaemon::builder().start().await;
/// let config = TestConfigBuilder::new()
///     .base_url(daemon.base_url())
///     .request_timeout_secs(1)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.daemon.base_url = url.to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.daemon.request_timeout_secs = secs;
        self
    }

    pub fn pubsub_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pubsub.idle_timeout_secs = secs;
        self
    }

    pub fn pubsub_max_message_bytes(mut self, bytes: usize) -> Self {
        self.config.pubsub.max_message_bytes = bytes;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
