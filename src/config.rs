use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// How long a supervisor waits for a component at each shutdown tier.
///
/// ```yaml
/// soft-stop-timeout: 20s
/// hard-stop-timeout: 5s
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct StopConfig {
    /// Grace period after a soft stop before escalating to a hard stop.
    #[serde(with = "humantime_serde")]
    pub soft_stop_timeout: Duration,
    /// Grace period after a hard stop before giving up on the component.
    #[serde(with = "humantime_serde")]
    pub hard_stop_timeout: Duration,
}

impl StopConfig {
    const fn default_soft_stop_timeout() -> Duration {
        Duration::from_secs(20)
    }

    const fn default_hard_stop_timeout() -> Duration {
        Duration::from_secs(5)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stop config at {}", path.display()))?;
        Self::from_yaml_str(&s)
            .with_context(|| format!("failed to parse stop config at {}", path.display()))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate invariants that serde defaults cannot express.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.soft_stop_timeout.is_zero(),
            "soft-stop-timeout must be greater than zero"
        );
        ensure!(
            !self.hard_stop_timeout.is_zero(),
            "hard-stop-timeout must be greater than zero"
        );
        Ok(self)
    }

    /// Longest time [`crate::supervise::stop`] may wait in total.
    pub fn total_timeout(&self) -> Duration {
        self.soft_stop_timeout.saturating_add(self.hard_stop_timeout)
    }
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            soft_stop_timeout: Self::default_soft_stop_timeout(),
            hard_stop_timeout: Self::default_hard_stop_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = StopConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, StopConfig::default());
        assert_eq!(cfg.total_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = StopConfig {
            soft_stop_timeout: Duration::ZERO,
            ..StopConfig::default()
        };
        let err = cfg.validated().unwrap_err();
        assert!(err.to_string().contains("soft-stop-timeout"));
    }
}
