use std::time::Duration;

use serde::Deserialize;

/// Default bound for a single incremental read.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Manager-wide settings.
///
/// # Examples
///
/// ```
/// use netlane::ManagerConfig;
///
/// let config = ManagerConfig::default()
///     .chunk_size(4096)
///     .user_agent("MyApp/1.0")
///     .default_timeout_ms(30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ManagerConfig {
    /// Upper bound on the bytes carried by one `incremental-data` event.
    ///
    /// Default: 8 KiB
    pub chunk_size: usize,

    /// `User-Agent` sent when the caller did not supply one.
    ///
    /// Default: None
    pub user_agent: Option<String>,

    /// Deadline applied to requests that did not set a positive timeout.
    ///
    /// Default: None (no deadline)
    pub default_timeout_ms: Option<u64>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            user_agent: None,
            default_timeout_ms: None,
        }
    }
}

impl ManagerConfig {
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = Some(timeout_ms);
        self
    }

    /// Chunk size with a floor of one byte.
    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    pub(crate) fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_config() {
        let config: ManagerConfig =
            serde_json::from_str(r#"{ "user-agent": "netlane-test", "chunk-size": 0 }"#).unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("netlane-test"));
        assert_eq!(config.effective_chunk_size(), 1);
        assert_eq!(config.default_timeout(), None);
    }

    #[test]
    fn zero_default_timeout_is_ignored() {
        let config = ManagerConfig::default().default_timeout_ms(0);
        assert_eq!(config.default_timeout(), None);
        let config = ManagerConfig::default().default_timeout_ms(250);
        assert_eq!(config.default_timeout(), Some(Duration::from_millis(250)));
    }
}
