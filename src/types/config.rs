//! Configuration types for distillation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_INDEX_CONCURRENCY, DEFAULT_MAX_CONCURRENT_JOBS, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_PORT,
};

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP port
    pub port: u16,

    /// Maximum concurrent distillation jobs
    pub max_concurrent_jobs: usize,

    /// Defaults applied to every analysis run
    pub distill: DistillConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            distill: DistillConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS),
            distill: DistillConfig::from_env(),
        }
    }
}

/// Configuration for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillConfig {
    /// Whether dependency-aware mode is on. When off the input tree is returned as-is.
    pub enabled: bool,

    /// Maximum call depth followed from an entry point (0 keeps only the entry points)
    pub max_depth: usize,

    /// Files loaded and indexed concurrently
    pub index_concurrency: usize,

    /// Wall-clock budget for file reads, in milliseconds
    pub deadline_ms: Option<u64>,

    /// Files larger than this are skipped
    pub max_file_size: usize,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: DEFAULT_MAX_DEPTH,
            index_concurrency: DEFAULT_INDEX_CONCURRENCY,
            deadline_ms: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DistillConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("DISTILL_ENABLED")
                .ok()
                .and_then(|s| parse_flag(&s))
                .unwrap_or(true),
            max_depth: std::env::var("DISTILL_MAX_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_DEPTH),
            index_concurrency: std::env::var("DISTILL_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_INDEX_CONCURRENCY),
            deadline_ms: std::env::var("DISTILL_DEADLINE_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            max_file_size: std::env::var("DISTILL_MAX_FILE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
        }
    }

    /// Create a config with the given traversal depth.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            max_depth: depth,
            ..Default::default()
        }
    }

    /// Enable or disable dependency-aware mode.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the read deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    /// Set the indexing concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.index_concurrency = concurrency.max(1);
        self
    }

    /// The read deadline as a duration.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DistillConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.deadline().is_none());
    }

    #[test]
    fn test_builders() {
        let config = DistillConfig::with_depth(0)
            .with_enabled(false)
            .with_concurrency(0)
            .with_deadline(Duration::from_millis(250));

        assert_eq!(config.max_depth, 0);
        assert!(!config.enabled);
        assert_eq!(config.index_concurrency, 1);
        assert_eq!(config.deadline(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
