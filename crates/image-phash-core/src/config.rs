use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest Marr-Hildreth kernel radius the multi-resolution hash accepts
pub const MAX_MH_SIGMA: u32 = 64;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for the hashing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of worker threads (0 = auto)
    pub threads: usize,

    /// Scale factor of the Marr-Hildreth wavelet used by the multi-resolution hash
    pub mh_alpha: f32,

    /// Pyramid level of the Marr-Hildreth wavelet
    pub mh_level: f32,

    /// Log level
    pub log_level: LogLevel,

    /// Directory for rolling log files; `None` leaves logging to the embedding application
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0, // Auto
            mh_alpha: 2.0,
            mh_level: 1.0,
            log_level: LogLevel::Info,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Worker thread count with `0` resolved to the number of CPUs
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Radius of the Marr-Hildreth kernel, `floor(4 * alpha^level)`
    pub fn mh_sigma(&self) -> u32 {
        (4.0 * self.mh_alpha.powf(self.mh_level)) as u32
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.mh_alpha.is_finite() || self.mh_alpha <= 0.0 {
            return Err(Error::Configuration(format!(
                "mh_alpha must be a positive number, got {}",
                self.mh_alpha
            )));
        }

        if !self.mh_level.is_finite() || self.mh_level < 0.0 {
            return Err(Error::Configuration(format!(
                "mh_level must be zero or greater, got {}",
                self.mh_level
            )));
        }

        let sigma = self.mh_sigma();
        if sigma == 0 || sigma > MAX_MH_SIGMA {
            return Err(Error::Configuration(format!(
                "mh_alpha^mh_level gives a kernel radius of {}, expected 1..={}",
                sigma, MAX_MH_SIGMA
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mh_sigma(), 8);
    }

    #[test]
    fn test_worker_threads_auto() {
        let config = Config::default();
        assert_eq!(config.worker_threads(), num_cpus::get());

        let config = Config {
            threads: 3,
            ..Config::default()
        };
        assert_eq!(config.worker_threads(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_wavelet() {
        let config = Config {
            mh_alpha: 0.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config = Config {
            mh_level: -1.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        // 4 * 0.1^1 truncates to a zero radius kernel
        let config = Config {
            mh_alpha: 0.1,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config = Config {
            mh_alpha: 2.0,
            mh_level: 5.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image-phash.json");

        let config = Config {
            threads: 2,
            log_level: LogLevel::Debug,
            log_dir: Some(PathBuf::from("logs")),
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "threads": 4 }"#).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.threads, 4);
        assert_eq!(loaded.mh_alpha, 2.0);
        assert_eq!(loaded.mh_level, 1.0);
    }
}
