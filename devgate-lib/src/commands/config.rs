use crate::Result;
use crate::sources::CollectorSettings;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File name looked up in the working directory when no configuration path is given
pub const DEFAULT_CONFIG_FILE: &str = "devgate.toml";

const MAX_CONTRIBUTION_SAMPLE_SIZE: usize = 20;
const MAX_RETRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How long fetched data is reused before re-fetching
    #[serde(default = "default_cache_max_age", with = "humantime_serde")]
    pub cache_max_age: Duration,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default = "default_devto_api_url")]
    pub devto_api_url: String,

    /// Items per page for listing requests (1..=100)
    #[serde(default = "default_per_page")]
    pub per_page: u8,

    /// Maximum number of concurrent GitHub requests
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,

    /// Repositories sampled for the contribution summary (1..=20)
    #[serde(default = "default_contribution_sample_size")]
    pub contribution_sample_size: usize,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Retries for transport errors and 5xx responses (0..=10)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Longest rate-limit reset worth waiting for
    #[serde(default = "default_rate_limit_max_wait", with = "humantime_serde")]
    pub rate_limit_max_wait: Duration,
}

const fn default_cache_max_age() -> Duration {
    crate::sources::DEFAULT_MAX_AGE
}

fn default_github_api_url() -> String {
    CollectorSettings::default().github_api_url
}

fn default_devto_api_url() -> String {
    CollectorSettings::default().devto_api_url
}

fn default_per_page() -> u8 {
    CollectorSettings::default().per_page
}

fn default_enrichment_concurrency() -> usize {
    CollectorSettings::default().enrichment_concurrency
}

fn default_contribution_sample_size() -> usize {
    CollectorSettings::default().contribution_sample_size
}

fn default_request_timeout() -> Duration {
    CollectorSettings::default().request_timeout
}

fn default_max_retries() -> usize {
    CollectorSettings::default().max_retries
}

fn default_rate_limit_max_wait() -> Duration {
    CollectorSettings::default().rate_limit_max_wait
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `devgate.toml` in `base_dir` is used when present.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading devgate configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // No config file found, use defaults
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading devgate configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Check that every value is within its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.cache_max_age.is_zero() {
            return Err(app_err!("cache_max_age must be greater than zero"));
        }

        for (key, value) in [("github_api_url", &self.github_api_url), ("devto_api_url", &self.devto_api_url)] {
            let _ = url::Url::parse(value).into_app_err_with(|| format!("{key} is not a valid URL: '{value}'"))?;
        }

        if !(1..=100).contains(&self.per_page) {
            return Err(app_err!("per_page must be between 1 and 100, got {}", self.per_page));
        }

        if self.enrichment_concurrency == 0 {
            return Err(app_err!("enrichment_concurrency must be at least 1"));
        }

        if !(1..=MAX_CONTRIBUTION_SAMPLE_SIZE).contains(&self.contribution_sample_size) {
            return Err(app_err!(
                "contribution_sample_size must be between 1 and {MAX_CONTRIBUTION_SAMPLE_SIZE}, got {}",
                self.contribution_sample_size
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.max_retries > MAX_RETRIES {
            return Err(app_err!("max_retries must be at most {MAX_RETRIES}, got {}", self.max_retries));
        }

        Ok(())
    }

    /// The collector settings described by this configuration
    #[must_use]
    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            github_api_url: self.github_api_url.clone(),
            devto_api_url: self.devto_api_url.clone(),
            per_page: self.per_page,
            enrichment_concurrency: self.enrichment_concurrency,
            contribution_sample_size: self.contribution_sample_size,
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
            rate_limit_max_wait: self.rate_limit_max_wait,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_age: default_cache_max_age(),
            github_api_url: default_github_api_url(),
            devto_api_url: default_devto_api_url(),
            per_page: default_per_page(),
            enrichment_concurrency: default_enrichment_concurrency(),
            contribution_sample_size: default_contribution_sample_size(),
            request_timeout: default_request_timeout(),
            max_retries: default_max_retries(),
            rate_limit_max_wait: default_rate_limit_max_wait(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_config_matches_embedded() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_validate_per_page_range() {
        assert!(Config { per_page: 0, ..Config::default() }.validate().is_err());
        assert!(Config { per_page: 101, ..Config::default() }.validate().is_err());
        Config { per_page: 1, ..Config::default() }.validate().unwrap();
    }

    #[test]
    fn test_validate_concurrency_and_sampling() {
        assert!(Config { enrichment_concurrency: 0, ..Config::default() }.validate().is_err());
        assert!(Config { contribution_sample_size: 0, ..Config::default() }.validate().is_err());
        assert!(Config { contribution_sample_size: 21, ..Config::default() }.validate().is_err());
    }

    #[test]
    fn test_validate_durations_and_retries() {
        assert!(Config { cache_max_age: Duration::ZERO, ..Config::default() }.validate().is_err());
        assert!(Config { request_timeout: Duration::ZERO, ..Config::default() }.validate().is_err());
        assert!(Config { max_retries: 11, ..Config::default() }.validate().is_err());
    }

    #[test]
    fn test_validate_urls() {
        let config = Config {
            github_api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_humantime_durations() {
        let config: Config = toml::from_str("cache_max_age = \"1h 30m\"\nrequest_timeout = \"5s\"").unwrap();
        assert_eq!(config.cache_max_age, Duration::from_secs(90 * 60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(toml::from_str::<Config>("cache_ttl = \"1h\"").is_err());
    }

    #[test]
    fn test_collector_settings() {
        let config = Config {
            per_page: 25,
            max_retries: 0,
            ..Config::default()
        };
        let settings = config.collector_settings();
        assert_eq!(settings.per_page, 25);
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.github_api_url, "https://api.github.com");
    }

    #[test]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = Utf8PathBuf::try_from(tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        Config::save_default(&output_path).unwrap();

        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert_eq!(Config::load(&base, Some(&output_path)).unwrap(), Config::default());
        assert_eq!(Config::load(&base, None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert_eq!(Config::load(&base, None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let missing = base.join("nope.toml");
        assert!(Config::load(&base, Some(&missing)).is_err());
    }
}
